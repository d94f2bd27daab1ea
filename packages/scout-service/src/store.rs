//! The session store: the one object every surface reads from and mutates through.

use std::{
	fmt::{Display, Formatter},
	sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
	ActionProvider, RegistryContainer, ResultAction, SearchResponse, Suggestion, SuggestionProvider,
	state::{FilterConfig, Refiner, ResultItem, Scope, SearchStatus, SessionState, SortSpec, Vertical},
	url_sync::UrlStatePatch,
};
use scout_domain::{ActiveFilter, PromotedItem, RegistryEntry};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);
impl SessionId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for SessionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
	Uninitialized,
	Active,
	Disposed,
}

pub struct SessionStore {
	id: SessionId,
	state: watch::Sender<Arc<SessionState>>,
	registries: Arc<RegistryContainer>,
	lifecycle: Mutex<Lifecycle>,
	cancel: CancellationToken,
}
impl SessionStore {
	pub fn new(id: SessionId, initial: SessionState, registries: Arc<RegistryContainer>) -> Self {
		let (state, _) = watch::channel(Arc::new(initial));

		Self {
			id,
			state,
			registries,
			lifecycle: Mutex::new(Lifecycle::Uninitialized),
			cancel: CancellationToken::new(),
		}
	}

	pub fn id(&self) -> &SessionId {
		&self.id
	}

	pub fn registries(&self) -> &Arc<RegistryContainer> {
		&self.registries
	}

	pub fn lifecycle(&self) -> Lifecycle {
		*self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn is_disposed(&self) -> bool {
		self.lifecycle() == Lifecycle::Disposed
	}

	/// Marks the store as in use. Has no effect once disposed.
	pub fn activate(&self) {
		let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

		if *lifecycle == Lifecycle::Uninitialized {
			*lifecycle = Lifecycle::Active;

			tracing::debug!(session_id = %self.id, "Session activated.");
		}
	}

	pub fn snapshot(&self) -> Arc<SessionState> {
		self.state.borrow().clone()
	}

	/// Each published value is one complete transition.
	pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
		self.state.subscribe()
	}

	/// A token cancelled when the session is disposed.
	pub fn child_token(&self) -> CancellationToken {
		self.cancel.child_token()
	}

	/// Applies `op` to a copy of the state and publishes it. Returns `None` after disposal.
	pub fn update<R>(&self, op: &'static str, apply: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
		if self.is_disposed() {
			tracing::warn!(session_id = %self.id, op, "Update after dispose ignored.");

			return None;
		}

		self.activate();

		let mut out = None;

		self.state.send_modify(|current| {
			let mut next = SessionState::clone(current);

			out = Some(apply(&mut next));
			next.version += 1;
			*current = Arc::new(next);
		});

		out
	}

	pub fn set_query_text(&self, text: &str) -> bool {
		self.update("set_query_text", |state| state.query.set_text(text)).is_some()
	}

	pub fn set_query_template(&self, template: &str) -> bool {
		self.update("set_query_template", |state| state.query.query_template = template.to_string())
			.is_some()
	}

	pub fn set_scope(&self, scope: Option<Scope>) -> bool {
		self.update("set_scope", |state| state.query.set_scope(scope)).is_some()
	}

	pub fn set_sort(&self, sort: Option<SortSpec>) -> bool {
		self.update("set_sort", |state| state.query.set_sort(sort)).is_some()
	}

	pub fn set_page(&self, page: u32) -> bool {
		self.update("set_page", |state| state.query.set_page(page)).is_some()
	}

	pub fn set_page_size(&self, page_size: u32) -> bool {
		self.update("set_page_size", |state| state.query.set_page_size(page_size)).is_some()
	}

	pub fn set_result_source(&self, result_source_id: Option<String>) -> bool {
		self.update("set_result_source", |state| {
			state.query.result_source_id = result_source_id;
			state.query.current_page = 1;
		})
		.is_some()
	}

	/// Adds the `(filter_name, value)` pair, or removes it when already active.
	pub fn toggle_filter(&self, filter_name: &str, value: &str) -> bool {
		self.update("toggle_filter", |state| {
			let operator = state.filters.operator_for(filter_name);

			state.filters.toggle(ActiveFilter::new(filter_name, value, operator));
			state.query.current_page = 1;
		})
		.is_some()
	}

	pub fn set_filter_values(&self, filter_name: &str, values: &[String]) -> bool {
		self.update("set_filter_values", |state| {
			state.filters.set_values(filter_name, values);
			state.query.current_page = 1;
		})
		.is_some()
	}

	pub fn remove_filter(&self, filter_name: &str) -> bool {
		self.update("remove_filter", |state| {
			state.filters.remove_field(filter_name);
			state.query.current_page = 1;
		})
		.is_some()
	}

	pub fn clear_filters(&self) -> bool {
		self.update("clear_filters", |state| {
			state.filters.clear();
			state.query.current_page = 1;
		})
		.is_some()
	}

	pub fn set_refiners(&self, refiners: Vec<Refiner>) -> bool {
		self.update("set_refiners", |state| state.filters.set_refiners(refiners)).is_some()
	}

	pub fn set_filter_configs(&self, configs: Vec<FilterConfig>) -> bool {
		self.update("set_filter_configs", |state| state.filters.set_configs(configs)).is_some()
	}

	pub fn set_verticals(&self, verticals: Vec<Vertical>) -> bool {
		self.update("set_verticals", |state| state.vertical.set_verticals(verticals)).is_some()
	}

	pub fn set_vertical(&self, key: &str) -> bool {
		self.update("set_vertical", |state| {
			if !state.vertical.verticals.iter().any(|vertical| vertical.key == key) {
				tracing::debug!(vertical = key, "Selected vertical is not defined.");
			}

			state.vertical.current_key = Some(key.to_string());
			state.query.current_page = 1;
		})
		.is_some()
	}

	pub fn set_layout(&self, key: &str) -> bool {
		if self.registries.layouts.get(key).is_none() {
			tracing::warn!(session_id = %self.id, layout = key, "Unknown layout ignored.");

			return false;
		}

		self.update("set_layout", |state| state.ui.active_layout_key = key.to_string()).is_some()
	}

	pub fn toggle_selection(&self, key: &str) -> bool {
		self.update("toggle_selection", |state| state.ui.toggle_selection(key)).is_some()
	}

	pub fn clear_selection(&self) -> bool {
		self.update("clear_selection", |state| state.ui.selected_keys.clear()).is_some()
	}

	pub fn set_filter_panel_open(&self, open: bool) -> bool {
		self.update("set_filter_panel_open", |state| state.ui.is_filter_panel_open = open).is_some()
	}

	pub fn set_user(&self, display_name: Option<String>, email: Option<String>) -> bool {
		self.update("set_user", |state| {
			state.user.display_name = display_name;
			state.user.email = email;
		})
		.is_some()
	}

	pub fn set_user_groups(&self, groups: Vec<String>) -> bool {
		self.update("set_user_groups", |state| state.user.groups = Arc::new(groups)).is_some()
	}

	pub fn record_recent_query(&self, query_text: &str) -> bool {
		self.update("record_recent_query", |state| state.user.record_query(query_text)).is_some()
	}

	/// Starts a search and returns its generation.
	pub fn begin_search(&self) -> Option<u64> {
		self.update("begin_search", |state| {
			state.results.generation += 1;
			state.results.status = SearchStatus::Loading;
			state.results.error = None;

			state.results.generation
		})
	}

	/// Stores a response. A response for an older generation is dropped and `false` returned.
	pub fn complete_search(&self, generation: u64, response: SearchResponse, promoted: Vec<PromotedItem>) -> bool {
		if !self.is_current(generation) {
			return false;
		}

		self.update("complete_search", |state| {
			if state.results.generation != generation {
				return false;
			}

			state.results.items = Arc::new(response.items);
			state.results.total_count = response.total_count;
			state.results.promoted = Arc::new(promoted);
			state.results.query_suggestion = response.query_suggestion;
			state.results.status = SearchStatus::Completed;
			state.results.error = None;
			state.filters.set_refiners(response.refiners);
			state.ui.selected_keys.clear();

			true
		})
		.unwrap_or(false)
	}

	pub fn fail_search(&self, generation: u64, message: &str) -> bool {
		if !self.is_current(generation) {
			return false;
		}

		self.update("fail_search", |state| {
			if state.results.generation != generation {
				return false;
			}

			state.results.status = SearchStatus::Failed;
			state.results.error = Some(message.to_string());

			true
		})
		.unwrap_or(false)
	}

	/// Returns the status to idle when `generation` is still the latest search.
	pub fn cancel_search(&self, generation: u64) -> bool {
		if !self.is_current(generation) {
			return false;
		}

		self.update("cancel_search", |state| {
			if state.results.generation != generation || state.results.status != SearchStatus::Loading {
				return false;
			}

			state.results.status = SearchStatus::Idle;

			true
		})
		.unwrap_or(false)
	}

	/// Applies state decoded from the address bar as one transition.
	pub fn apply_url_patch(&self, patch: UrlStatePatch) -> bool {
		self.update("apply_url_patch", |state| {
			state.query.query_text = patch.query_text;
			state.query.sort = patch.sort;
			state.query.current_page = patch.page.max(1);
			state.query.scope = match patch.scope_id {
				Some(id) => match state.query.scope.take() {
					Some(scope) if scope.id == id => Some(scope),
					_ => Some(Scope::new(id)),
				},
				None => None,
			};

			if let Some(filters) = patch.filters {
				state.filters.replace_active(filters);
			}
			state.vertical.select_from_url(patch.vertical_key);

			state.ui.active_layout_key = patch.layout_key;
		})
		.is_some()
	}

	/// The label for a backend token of `filter_name`, resolved through its formatter.
	pub async fn display_value(&self, filter_name: &str, token: &str) -> String {
		let state = self.snapshot();
		let config = state
			.filters
			.config(filter_name)
			.cloned()
			.unwrap_or_else(|| FilterConfig::new(filter_name, crate::formatters::DEFAULT_FILTER_TYPE));
		let formatter = self.registries.formatter(&config.filter_type);

		formatter.to_display(token, &config).await
	}

	/// The backend token for user input on `filter_name`.
	pub fn query_token(&self, filter_name: &str, display: &str) -> String {
		let state = self.snapshot();
		let config = state
			.filters
			.config(filter_name)
			.cloned()
			.unwrap_or_else(|| FilterConfig::new(filter_name, crate::formatters::DEFAULT_FILTER_TYPE));

		self.registries.formatter(&config.filter_type).to_query_token(display, &config)
	}

	/// Suggestions from every registered provider, in registration order. A failing provider is
	/// skipped.
	pub async fn suggestions(&self, text: &str) -> Vec<Suggestion> {
		let mut out = Vec::new();

		for provider in self.registries.suggestion_providers.get_all() {
			match provider.suggest(text).await {
				Ok(mut suggestions) => out.append(&mut suggestions),
				Err(err) => {
					tracing::warn!(provider = provider.id(), error = %err, "Suggestion provider failed.");
				},
			}
		}

		out
	}

	pub fn actions_for(&self, item: &ResultItem) -> Vec<ResultAction> {
		self.registries
			.action_providers
			.get_all()
			.iter()
			.flat_map(|provider| provider.actions(item))
			.collect()
	}

	/// Cancels outstanding work and rejects further updates. Returns `false` when already
	/// disposed.
	pub fn dispose(&self) -> bool {
		{
			let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

			if *lifecycle == Lifecycle::Disposed {
				return false;
			}

			*lifecycle = Lifecycle::Disposed;
		}

		self.cancel.cancel();

		tracing::info!(session_id = %self.id, "Session disposed.");

		true
	}

	fn is_current(&self, generation: u64) -> bool {
		self.state.borrow().results.generation == generation
	}
}
