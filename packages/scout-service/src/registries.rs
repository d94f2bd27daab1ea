use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
	ActionProvider, ProfileLookup, SearchDataProvider, SuggestionProvider, TermLookup,
	formatters::{
		BooleanFormatter, DEFAULT_FILTER_TYPE, DateRangeFormatter, DefaultFormatter, FilterFormatter,
		NumericFormatter, PeopleFormatter, TaxonomyFormatter,
	},
};
use scout_domain::{Registry, RegistryEntry};

/// Every extension point a session exposes. Shared by all surfaces bound to one session.
pub struct RegistryContainer {
	pub data_providers: Registry<dyn SearchDataProvider>,
	pub suggestion_providers: Registry<dyn SuggestionProvider>,
	pub action_providers: Registry<dyn ActionProvider>,
	pub layouts: Registry<LayoutDefinition>,
	pub filter_types: Registry<dyn FilterFormatter>,
}
impl RegistryContainer {
	pub fn new() -> Self {
		Self {
			data_providers: Registry::new("data_providers"),
			suggestion_providers: Registry::new("suggestion_providers"),
			action_providers: Registry::new("action_providers"),
			layouts: Registry::new("layouts"),
			filter_types: Registry::new("filter_types"),
		}
	}

	/// A container holding the built-in formatters and layouts.
	pub fn with_defaults(terms: Arc<dyn TermLookup>, profiles: Arc<dyn ProfileLookup>) -> Self {
		let container = Self::new();
		let formatters: [Arc<dyn FilterFormatter>; 6] = [
			Arc::new(DefaultFormatter),
			Arc::new(TaxonomyFormatter::new(terms)),
			Arc::new(PeopleFormatter::new(profiles)),
			Arc::new(NumericFormatter),
			Arc::new(DateRangeFormatter),
			Arc::new(BooleanFormatter),
		];

		for formatter in formatters {
			container.filter_types.register(formatter, false);
		}
		for layout in [
			LayoutDefinition::new("list", "List", true),
			LayoutDefinition::new("cards", "Cards", true),
			LayoutDefinition::new("details", "Details", true),
		] {
			container.layouts.register(Arc::new(layout), false);
		}

		container
	}

	/// Ends the configuration phase for every registry.
	pub fn freeze_all(&self) {
		self.data_providers.freeze();
		self.suggestion_providers.freeze();
		self.action_providers.freeze();
		self.layouts.freeze();
		self.filter_types.freeze();
	}

	pub fn is_frozen(&self) -> bool {
		self.data_providers.is_frozen()
	}

	/// The formatter for `filter_type`, or the default one when the type is unknown.
	pub fn formatter(&self, filter_type: &str) -> Arc<dyn FilterFormatter> {
		if let Some(formatter) = self.filter_types.get(filter_type) {
			return formatter;
		}

		tracing::debug!(filter_type, "Unknown filter type; using the default formatter.");

		self.filter_types.get(DEFAULT_FILTER_TYPE).unwrap_or_else(|| Arc::new(DefaultFormatter))
	}
}
impl Default for RegistryContainer {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDefinition {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub supports_selection: bool,
}
impl LayoutDefinition {
	pub fn new(id: impl Into<String>, label: impl Into<String>, supports_selection: bool) -> Self {
		Self { id: id.into(), label: label.into(), supports_selection }
	}
}
impl RegistryEntry for LayoutDefinition {
	fn id(&self) -> &str {
		&self.id
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
	pub text: String,
	/// Id of the provider that produced it.
	pub source: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultAction {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub url: Option<String>,
}
