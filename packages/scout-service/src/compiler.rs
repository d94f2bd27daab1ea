//! Turns session state into the request handed to a data provider.
//!
//! Nothing here fails. Tokens are grouped and passed through untouched, so a malformed range
//! reaches the backend as written rather than blocking the search.

use std::collections::HashSet;

use serde::Serialize;

use crate::state::{SessionState, SortSpec};
use scout_domain::{ActiveFilter, FilterOperator, TokenContext, tokens};

pub const DEFAULT_SELECTED_PROPERTIES: [&str; 12] = [
	"Title",
	"Path",
	"Author",
	"Size",
	"LastModifiedTime",
	"FileType",
	"FileExtension",
	"HitHighlightedSummary",
	"SiteName",
	"SiteTitle",
	"UniqueId",
	"ServerRedirectedURL",
];

/// Sent when the template resolves to nothing.
const MATCH_ALL: &str = "*";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
	pub query_text: String,
	pub scope: Option<String>,
	/// Refinement expressions; the backend joins them with AND.
	pub filters: Vec<String>,
	pub sort: Vec<SortEntry>,
	pub page: u32,
	pub page_size: u32,
	pub selected_properties: Vec<String>,
	/// Managed properties to compute refiners for.
	pub refiners: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub collapse_specification: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result_source_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trim_duplicates: Option<bool>,
}
impl SearchQuery {
	/// Zero-based offset of the first requested row.
	pub fn start_row(&self) -> u64 {
		u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortEntry {
	pub property: String,
	/// 0 ascending, 1 descending.
	pub direction: u8,
}

pub fn build_query(template: &str, query_text: &str, ctx: &TokenContext) -> String {
	let ctx = TokenContext { query_text: query_text.to_string(), ..ctx.clone() };

	tokens::resolve(template, &ctx).trim().to_string()
}

pub fn build_refinement_expressions(filters: &[ActiveFilter]) -> Vec<String> {
	let mut groups: Vec<(&str, Vec<&ActiveFilter>)> = Vec::new();

	for filter in filters {
		match groups.iter_mut().find(|(name, _)| *name == filter.filter_name) {
			Some((_, members)) => members.push(filter),
			None => groups.push((filter.filter_name.as_str(), vec![filter])),
		}
	}

	groups
		.into_iter()
		.map(|(name, members)| match members.as_slice() {
			[single] => format!("{name}:{}", single.value),
			_ => {
				let joiner = if members.iter().all(|filter| filter.operator == FilterOperator::And) {
					"and"
				} else {
					"or"
				};
				let values: Vec<&str> = members.iter().map(|filter| filter.value.as_str()).collect();

				format!("{name}:{joiner}({})", values.join(","))
			},
		})
		.collect()
}

pub fn build_sort_list(sort: Option<&SortSpec>) -> Vec<SortEntry> {
	sort.map(|sort| SortEntry { property: sort.property.clone(), direction: sort.direction.ordinal() })
		.into_iter()
		.collect()
}

/// The default property set followed by `custom`, without repeats. Names compare without case.
pub fn build_selected_properties(custom: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();

	DEFAULT_SELECTED_PROPERTIES
		.iter()
		.copied()
		.chain(custom.iter().map(String::as_str))
		.map(str::trim)
		.filter(|name| !name.is_empty() && seen.insert(name.to_ascii_lowercase()))
		.map(str::to_string)
		.collect()
}

/// Builds the request for the current state. The current vertical's overrides win over the
/// session's template and result source.
pub fn compile(state: &SessionState, ctx: &TokenContext, custom_properties: &[String]) -> SearchQuery {
	let vertical = state.vertical.current();
	let template = vertical
		.and_then(|vertical| vertical.query_template.as_deref())
		.unwrap_or(&state.query.query_template);
	let mut query_text = build_query(template, &state.query.query_text, ctx);

	if query_text.is_empty() {
		query_text = MATCH_ALL.to_string();
	}

	let result_source_id = vertical
		.and_then(|vertical| vertical.result_source_id.clone())
		.or_else(|| state.query.result_source_id.clone());

	SearchQuery {
		query_text,
		scope: state.query.scope.as_ref().map(|scope| scope.id.clone()),
		filters: build_refinement_expressions(&state.filters.active),
		sort: build_sort_list(state.query.sort.as_ref()),
		page: state.query.current_page.max(1),
		page_size: state.query.page_size,
		selected_properties: build_selected_properties(custom_properties),
		refiners: state.filters.configs.iter().map(|config| config.filter_name.clone()).collect(),
		collapse_specification: state.query.collapse_specification.clone(),
		result_source_id,
		trim_duplicates: Some(state.query.trim_duplicates),
	}
}
