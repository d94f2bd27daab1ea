//! Two-way bridge between a session and the address bar.
//!
//! State to URL: every published state is reduced to a [`UrlSnapshot`]; a snapshot that differs
//! from the last written one arms a single debounce deadline, and only the newest snapshot is
//! written when it passes. URL to state: on start and on each navigation signal the address is
//! decoded and applied as one store transition.

mod codec;
mod synchronizer;

pub use codec::{
	Decoded, SCHEMA_VERSION, UrlStatePatch, decode, decode_filter, decode_filters, encode,
	encode_filters,
};
pub use synchronizer::UrlSynchronizer;

use std::{sync::Arc, time::Duration};

use tokio::{
	sync::mpsc,
	task::JoinHandle,
	time::{self, Instant},
};

use crate::{
	AddressBar, SessionStore,
	state::{SessionState, SortSpec},
};
use scout_domain::ActiveFilter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlOptions {
	/// Namespace for keys when several sessions share one page.
	pub prefix: Option<String>,
	/// Layout key left out of the URL.
	pub default_layout: String,
}
impl UrlOptions {
	pub fn key(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{prefix}.{key}"),
			None => key.to_string(),
		}
	}
}
impl Default for UrlOptions {
	fn default() -> Self {
		Self { prefix: None, default_layout: "list".to_string() }
	}
}

/// The part of the session state that lives in the address bar.
#[derive(Clone, Debug)]
pub struct UrlSnapshot {
	pub query_text: String,
	pub filters: Arc<Vec<ActiveFilter>>,
	pub vertical_key: Option<String>,
	pub sort: Option<SortSpec>,
	pub page: u32,
	pub scope_id: Option<String>,
	pub layout_key: String,
}
impl UrlSnapshot {
	pub fn from_state(state: &SessionState) -> Self {
		Self {
			query_text: state.query.query_text.clone(),
			filters: state.filters.active.clone(),
			vertical_key: state.vertical.current_key.clone(),
			sort: state.query.sort.clone(),
			page: state.query.current_page,
			scope_id: state.query.scope.as_ref().map(|scope| scope.id.clone()),
			layout_key: state.ui.active_layout_key.clone(),
		}
	}

	/// Whether an address without state for this namespace already describes the snapshot.
	pub fn is_default(&self, options: &UrlOptions) -> bool {
		self.query_text.is_empty()
			&& self.filters.is_empty()
			&& self.vertical_key.is_none()
			&& self.sort.is_none()
			&& self.page < 2
			&& self.scope_id.is_none()
			&& self.layout_key == options.default_layout
	}
}
impl PartialEq for UrlSnapshot {
	/// The store replaces the filter list on change, so the list compares by pointer.
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.filters, &other.filters)
			&& self.query_text == other.query_text
			&& self.vertical_key == other.vertical_key
			&& self.sort == other.sort
			&& self.page == other.page
			&& self.scope_id == other.scope_id
			&& self.layout_key == other.layout_key
	}
}

/// Runs the bridge for `store` until the session is disposed. Each message on `navigation`
/// means the address changed under the session (back/forward).
pub fn spawn(
	store: Arc<SessionStore>,
	address_bar: Arc<dyn AddressBar>,
	mut navigation: mpsc::UnboundedReceiver<()>,
	options: UrlOptions,
	debounce: Duration,
) -> JoinHandle<()> {
	let cancel = store.child_token();

	tokio::spawn(async move {
		let mut sync = UrlSynchronizer::new(options, debounce);
		let mut changes = store.subscribe();

		apply_address(&store, &*address_bar, &mut sync);
		changes.borrow_and_update();

		loop {
			let deadline = sync.deadline();

			tokio::select! {
				_ = cancel.cancelled() => {
					sync.flush(&*address_bar);

					break;
				},
				changed = changes.changed() => {
					if changed.is_err() {
						sync.flush(&*address_bar);

						break;
					}

					let state = changes.borrow_and_update().clone();

					sync.observe(&state, Instant::now());
				},
				Some(()) = navigation.recv() => {
					apply_address(&store, &*address_bar, &mut sync);
					changes.borrow_and_update();
				},
				_ = sleep_until(deadline), if deadline.is_some() => {
					sync.fire(Instant::now(), &*address_bar);
				},
			}
		}

		tracing::debug!(session_id = %store.id(), "URL sync stopped.");
	})
}

fn apply_address(store: &SessionStore, address_bar: &dyn AddressBar, sync: &mut UrlSynchronizer) {
	match sync.read(address_bar) {
		Some(patch) => {
			store.apply_url_patch(patch);
			sync.mark_synced(&store.snapshot());
		},
		None => {
			sync.adopt_empty_address(&store.snapshot(), Instant::now());
		},
	}
}

async fn sleep_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}
