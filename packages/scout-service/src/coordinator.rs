//! Runs searches for one session: compile, execute, merge promotions, record the outcome.
//!
//! At most one search is in flight. Starting a search cancels the previous one, and disposing
//! the session cancels whatever is running.

use std::{
	collections::HashSet,
	sync::{Arc, Mutex, PoisonError, RwLock},
};

use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use crate::{
	Error, SearchDataProvider, SessionSettings, SessionStore, compiler,
	state::SessionState,
};
use scout_domain::{PromotedItem, PromotionRule, TokenContext, promotions};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
	Completed { generation: u64, total_count: u64 },
	/// Superseded by a newer search or stopped by disposal.
	Cancelled { generation: u64 },
	Failed { generation: u64, message: String },
	/// The session is disposed; nothing ran.
	Disposed,
}

pub struct SearchCoordinator {
	store: Arc<SessionStore>,
	settings: Arc<SessionSettings>,
	rules: RwLock<Arc<Vec<PromotionRule>>>,
	in_flight: Mutex<Option<InFlight>>,
}
impl SearchCoordinator {
	pub fn new(store: Arc<SessionStore>, settings: Arc<SessionSettings>, rules: Arc<Vec<PromotionRule>>) -> Self {
		Self { store, settings, rules: RwLock::new(rules), in_flight: Mutex::new(None) }
	}

	pub fn store(&self) -> &Arc<SessionStore> {
		&self.store
	}

	pub fn set_rules(&self, rules: Vec<PromotionRule>) {
		*self.rules.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(rules);
	}

	/// Promotions for the current state, without running a search.
	pub fn promotions(&self, state: &SessionState) -> Vec<PromotedItem> {
		let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner).clone();

		promotions::evaluate(
			&rules,
			&state.query.query_text,
			state.vertical.current_key.as_deref(),
			self.settings.max_promoted,
			&state.user.groups,
		)
	}

	pub fn token_context(&self, state: &SessionState) -> TokenContext {
		let today = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date();
		let context = &self.settings.context;
		let mut ctx = TokenContext::new(today);

		ctx.query_text = state.query.query_text.clone();
		ctx.site_id = context.site_id.clone();
		ctx.site_url = context.site_url.clone();
		ctx.web_id = context.web_id.clone();
		ctx.web_url = context.web_url.clone();
		ctx.hub_site_id = context.hub_site_id.clone();
		ctx.list_id = context.list_id.clone();
		ctx.user_name = state.user.display_name.clone();
		ctx.user_email = state.user.email.clone();

		ctx
	}

	/// Cancels the running search, if any.
	pub fn cancel(&self) -> bool {
		let previous = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).take();

		match previous {
			Some(previous) => {
				previous.cancel.cancel();

				true
			},
			None => false,
		}
	}

	pub async fn search(&self) -> SearchOutcome {
		if self.store.is_disposed() {
			return SearchOutcome::Disposed;
		}

		let registries = self.store.registries().clone();

		// The first search ends the configuration phase.
		registries.freeze_all();

		let state = self.store.snapshot();
		let ctx = self.token_context(&state);
		let query = compiler::compile(&state, &ctx, &self.settings.selected_properties);
		let provider_id = state
			.vertical
			.current()
			.and_then(|vertical| vertical.data_provider_id.as_deref())
			.unwrap_or(&self.settings.default_data_provider);
		let provider = registries.data_providers.get(provider_id);
		let engine_promotions = self.promotions(&state);
		let Some(generation) = self.store.begin_search() else {
			return SearchOutcome::Disposed;
		};
		let Some(provider) = provider else {
			let message = format!("No data provider is registered as '{provider_id}'.");

			tracing::warn!(session_id = %self.store.id(), provider_id, "Search has no data provider.");
			self.store.fail_search(generation, &message);

			return SearchOutcome::Failed { generation, message };
		};
		let cancel = self.store.child_token();

		if let Some(previous) = self
			.in_flight
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.replace(InFlight { generation, cancel: cancel.clone() })
		{
			tracing::info!(
				session_id = %self.store.id(),
				generation = previous.generation,
				"Previous search cancelled."
			);

			previous.cancel.cancel();
		}

		tracing::info!(
			session_id = %self.store.id(),
			generation,
			provider_id,
			query = %query.query_text,
			filters = query.filters.len(),
			"Search started."
		);

		let outcome = self
			.execute(provider, &query, &state.query.query_text, generation, cancel.clone(), engine_promotions)
			.await;

		self.finish(generation);

		outcome
	}

	async fn execute(
		&self,
		provider: Arc<dyn SearchDataProvider>,
		query: &compiler::SearchQuery,
		user_text: &str,
		generation: u64,
		cancel: CancellationToken,
		engine_promotions: Vec<PromotedItem>,
	) -> SearchOutcome {
		let result = tokio::select! {
			_ = cancel.cancelled() => Err(Error::Cancelled),
			result = provider.execute(query, cancel.clone()) => result,
		};

		match result {
			Ok(response) => {
				let total_count = response.total_count;
				let promoted = merge_promotions(
					engine_promotions,
					&response.promoted_results,
					self.settings.max_promoted,
				);

				if !self.store.complete_search(generation, response, promoted) {
					tracing::debug!(session_id = %self.store.id(), generation, "Stale response dropped.");

					return SearchOutcome::Cancelled { generation };
				}

				self.store.record_recent_query(user_text);

				tracing::info!(session_id = %self.store.id(), generation, total_count, "Search completed.");

				SearchOutcome::Completed { generation, total_count }
			},
			Err(Error::Cancelled) => {
				self.store.cancel_search(generation);

				tracing::info!(session_id = %self.store.id(), generation, "Search cancelled.");

				SearchOutcome::Cancelled { generation }
			},
			Err(err) => {
				let message = err.to_string();

				self.store.fail_search(generation, &message);

				tracing::warn!(session_id = %self.store.id(), generation, error = %message, "Search failed.");

				SearchOutcome::Failed { generation, message }
			},
		}
	}

	fn finish(&self, generation: u64) {
		let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

		if in_flight.as_ref().is_some_and(|current| current.generation == generation) {
			*in_flight = None;
		}
	}
}

struct InFlight {
	generation: u64,
	cancel: CancellationToken,
}

/// Engine promotions first, then backend ones, without repeated URLs and capped at `max`.
pub fn merge_promotions(engine: Vec<PromotedItem>, backend: &[PromotedItem], max: usize) -> Vec<PromotedItem> {
	let mut seen = HashSet::new();

	engine
		.into_iter()
		.chain(backend.iter().cloned())
		.filter(|item| seen.insert(promotions::url_key(&item.url)))
		.take(max)
		.collect()
}
