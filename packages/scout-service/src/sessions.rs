//! Sessions keyed by id. Surfaces that pass the same id share one store and one coordinator.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, PoisonError},
	time::Duration,
};

use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::{
	AddressBar, Error, ProfileLookup, RegistryContainer, Result, SearchCoordinator,
	SearchDataProvider, SessionId, SessionStore, TermLookup,
	state::SessionState,
	url_sync::{self, UrlOptions},
};
use scout_domain::PromotionRule;

/// Per-session defaults taken from configuration.
#[derive(Clone, Debug)]
pub struct SessionSettings {
	pub url: UrlOptions,
	pub url_debounce: Duration,
	pub page_size: u32,
	pub query_template: String,
	pub selected_properties: Vec<String>,
	pub trim_duplicates: bool,
	pub default_data_provider: String,
	pub max_promoted: usize,
	pub context: scout_config::Context,
}
impl SessionSettings {
	pub fn from_config(cfg: &scout_config::Config) -> Self {
		Self {
			url: UrlOptions {
				prefix: cfg.session.url_prefix.clone(),
				default_layout: cfg.session.default_layout.clone(),
			},
			url_debounce: Duration::from_millis(cfg.session.url_debounce_ms),
			page_size: cfg.session.page_size,
			query_template: cfg.session.query_template.clone(),
			selected_properties: cfg.session.selected_properties.clone(),
			trim_duplicates: cfg.session.trim_duplicates,
			default_data_provider: cfg.session.default_data_provider.clone(),
			max_promoted: cfg.promotions.max_results,
			context: cfg.context.clone(),
		}
	}
}
impl Default for SessionSettings {
	fn default() -> Self {
		Self {
			url: UrlOptions::default(),
			url_debounce: Duration::from_millis(300),
			page_size: 10,
			query_template: "{searchTerms}".to_string(),
			selected_properties: Vec::new(),
			trim_duplicates: true,
			default_data_provider: "http".to_string(),
			max_promoted: 3,
			context: scout_config::Context::default(),
		}
	}
}

/// Collaborators every new session is wired to.
#[derive(Clone)]
pub struct SessionServices {
	pub terms: Arc<dyn TermLookup>,
	pub profiles: Arc<dyn ProfileLookup>,
	/// Registered under its own id in each new session.
	pub data_provider: Option<Arc<dyn SearchDataProvider>>,
	pub rules: Arc<Vec<PromotionRule>>,
}
impl SessionServices {
	pub fn new(terms: Arc<dyn TermLookup>, profiles: Arc<dyn ProfileLookup>) -> Self {
		Self { terms, profiles, data_provider: None, rules: Arc::new(Vec::new()) }
	}

	pub fn with_data_provider(mut self, provider: Arc<dyn SearchDataProvider>) -> Self {
		self.data_provider = Some(provider);

		self
	}

	pub fn with_rules(mut self, rules: Vec<PromotionRule>) -> Self {
		self.rules = Arc::new(rules);

		self
	}
}

#[derive(Clone)]
pub struct SessionHandle {
	pub store: Arc<SessionStore>,
	pub coordinator: Arc<SearchCoordinator>,
}

/// What [`SessionRegistry::dispose`] hands back. Awaiting [`DisposedSession::join`] waits for the
/// URL bridge to write its last pending change.
pub struct DisposedSession {
	pub handle: SessionHandle,
	url_sync: Option<JoinHandle<()>>,
}
impl DisposedSession {
	pub async fn join(self) {
		if let Some(task) = self.url_sync
			&& let Err(err) = task.await
		{
			tracing::warn!(session_id = %self.handle.store.id(), error = %err, "URL sync task failed.");
		}
	}
}

pub struct SessionRegistry {
	settings: Arc<SessionSettings>,
	services: SessionServices,
	sessions: Mutex<HashMap<SessionId, Entry>>,
}
impl SessionRegistry {
	pub fn new(settings: SessionSettings, services: SessionServices) -> Self {
		Self { settings: Arc::new(settings), services, sessions: Mutex::new(HashMap::new()) }
	}

	pub fn settings(&self) -> &SessionSettings {
		&self.settings
	}

	/// The session for `id`, created and activated on first reference.
	pub fn get_or_create(&self, id: &SessionId) -> SessionHandle {
		let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

		if let Some(entry) = sessions.get(id) {
			return entry.handle.clone();
		}

		let handle = self.create(id.clone());

		sessions.insert(id.clone(), Entry { handle: handle.clone(), url_sync: None });

		tracing::info!(session_id = %id, "Session created.");

		handle
	}

	pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
		self.sessions.lock().unwrap_or_else(PoisonError::into_inner).get(id).map(|entry| entry.handle.clone())
	}

	pub fn ids(&self) -> Vec<SessionId> {
		self.sessions.lock().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Starts the URL bridge for `id`. Send `()` on the returned channel after every
	/// back/forward navigation. Must be called inside a Tokio runtime.
	pub fn attach_address_bar(
		&self,
		id: &SessionId,
		address_bar: Arc<dyn AddressBar>,
	) -> Result<mpsc::UnboundedSender<()>> {
		if Handle::try_current().is_err() {
			return Err(Error::InvalidRequest {
				message: "URL sync requires a running Tokio runtime.".to_string(),
			});
		}

		let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
		let Some(entry) = sessions.get_mut(id) else {
			return Err(Error::NotFound { message: format!("Session {id} does not exist.") });
		};

		if entry.handle.store.is_disposed() {
			return Err(Error::Disposed { session_id: id.to_string() });
		}
		if entry.url_sync.is_some() {
			return Err(Error::InvalidRequest {
				message: format!("Session {id} already has an address bar attached."),
			});
		}

		let (sender, receiver) = mpsc::unbounded_channel();

		entry.url_sync = Some(url_sync::spawn(
			entry.handle.store.clone(),
			address_bar,
			receiver,
			self.settings.url.clone(),
			self.settings.url_debounce,
		));

		Ok(sender)
	}

	/// Removes the session, cancels its search and stops its URL bridge. Ownership of the
	/// handle passes to the caller.
	pub fn dispose(&self, id: &SessionId) -> Option<DisposedSession> {
		let entry = self.sessions.lock().unwrap_or_else(PoisonError::into_inner).remove(id)?;

		entry.handle.coordinator.cancel();
		entry.handle.store.dispose();

		Some(DisposedSession { handle: entry.handle, url_sync: entry.url_sync })
	}

	fn create(&self, id: SessionId) -> SessionHandle {
		let registries =
			RegistryContainer::with_defaults(self.services.terms.clone(), self.services.profiles.clone());

		if let Some(provider) = &self.services.data_provider {
			registries.data_providers.register(provider.clone(), false);
		}

		let store = Arc::new(SessionStore::new(
			id,
			SessionState::with_settings(&self.settings),
			Arc::new(registries),
		));

		store.activate();

		let coordinator = Arc::new(SearchCoordinator::new(
			store.clone(),
			self.settings.clone(),
			self.services.rules.clone(),
		));

		SessionHandle { store, coordinator }
	}
}

struct Entry {
	handle: SessionHandle,
	url_sync: Option<JoinHandle<()>>,
}
