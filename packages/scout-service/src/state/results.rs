use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use scout_domain::PromotedItem;

#[derive(Clone, Debug, Default)]
pub struct ResultsSlice {
	pub items: Arc<Vec<ResultItem>>,
	pub total_count: u64,
	pub promoted: Arc<Vec<PromotedItem>>,
	pub query_suggestion: Option<String>,
	pub status: SearchStatus,
	pub error: Option<String>,
	/// Identifies the latest search; responses tagged with an older value are dropped.
	pub generation: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStatus {
	#[default]
	Idle,
	Loading,
	Completed,
	Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
	/// Stable identity used for selection.
	pub key: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub summary: String,
	#[serde(default)]
	pub properties: Map<String, Value>,
}
