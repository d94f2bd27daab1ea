//! The session aggregate and its six slices.
//!
//! Every mutation goes through [`crate::SessionStore::update`], which clones the current
//! aggregate, applies one complete transition and publishes the result. Large collections sit
//! behind `Arc` so a clone stays cheap and a replaced list is detectable by pointer.

mod filters;
mod query;
mod results;
mod ui;
mod user;
mod vertical;

pub use filters::{FilterConfig, FilterSlice, NumberFormat, RefinerSort, Refiner, RefinerValue};
pub use query::{QuerySlice, Scope, SortDirection, SortSpec};
pub use results::{ResultItem, ResultsSlice, SearchStatus};
pub use ui::UiSlice;
pub use user::{MAX_RECENT_QUERIES, UserSlice};
pub use vertical::{Vertical, VerticalSlice};

#[derive(Clone, Debug, Default)]
pub struct SessionState {
	/// Bumped on every published transition.
	pub version: u64,
	pub query: QuerySlice,
	pub filters: FilterSlice,
	pub results: ResultsSlice,
	pub vertical: VerticalSlice,
	pub ui: UiSlice,
	pub user: UserSlice,
}
impl SessionState {
	pub fn with_settings(settings: &crate::SessionSettings) -> Self {
		let mut state = Self::default();

		state.query.query_template = settings.query_template.clone();
		state.query.page_size = settings.page_size;
		state.query.trim_duplicates = settings.trim_duplicates;
		state.ui.active_layout_key = settings.url.default_layout.clone();

		state
	}
}
