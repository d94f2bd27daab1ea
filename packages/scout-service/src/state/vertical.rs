use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
pub struct VerticalSlice {
	pub verticals: Arc<Vec<Vertical>>,
	pub current_key: Option<String>,
}
impl VerticalSlice {
	pub fn current(&self) -> Option<&Vertical> {
		let key = self.current_key.as_deref()?;

		self.verticals.iter().find(|vertical| vertical.key == key)
	}

	/// Installs the tab set. The current key survives when it still names a tab; otherwise the
	/// first tab becomes current.
	pub fn set_verticals(&mut self, verticals: Vec<Vertical>) {
		let keep = self
			.current_key
			.as_deref()
			.is_some_and(|key| verticals.iter().any(|vertical| vertical.key == key));

		if !keep {
			self.current_key = verticals.first().map(|vertical| vertical.key.clone());
		}

		self.verticals = Arc::new(verticals);
	}

	/// Applies the tab named by an address. Without one the first tab is current.
	pub fn select_from_url(&mut self, key: Option<String>) {
		self.current_key = key.or_else(|| self.verticals.first().map(|vertical| vertical.key.clone()));
	}
}

/// A result-scope tab. The optional fields override the session's query settings while the
/// tab is current.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertical {
	pub key: String,
	pub label: String,
	#[serde(default)]
	pub query_template: Option<String>,
	#[serde(default)]
	pub result_source_id: Option<String>,
	#[serde(default)]
	pub data_provider_id: Option<String>,
}
impl Vertical {
	pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			label: label.into(),
			query_template: None,
			result_source_id: None,
			data_provider_id: None,
		}
	}
}
