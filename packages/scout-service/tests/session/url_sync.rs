use std::{sync::Arc, time::Duration};

use scout_domain::{ActiveFilter, FilterOperator};
use scout_service::{
	AddressBar, Error, SessionId, SessionRegistry, UrlOptions, Vertical,
	url_sync::{self, UrlSnapshot},
};

use super::{
	CountingProfiles, CountingTerms, MemoryAddressBar, ScriptedProvider, registry_with, services,
	settle,
};

fn attach(
	registry: &SessionRegistry,
	bar: &Arc<MemoryAddressBar>,
) -> tokio::sync::mpsc::UnboundedSender<()> {
	registry.attach_address_bar(&SessionId::new("main"), bar.clone()).expect("address bar attaches")
}

#[tokio::test(start_paused = true)]
async fn keystroke_burst_writes_once() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let bar = Arc::new(MemoryAddressBar::default());

	attach(&registry, &bar);
	settle().await;

	for text in ["b", "bu", "bud"] {
		store.set_query_text(text);
		settle().await;
		tokio::time::advance(Duration::from_millis(100)).await;
	}

	assert!(bar.writes().is_empty());

	tokio::time::advance(Duration::from_millis(300)).await;
	settle().await;

	assert_eq!(bar.writes(), vec!["sv=1&q=bud".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn address_state_is_applied_on_attach() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let filters = vec![ActiveFilter::new("FileType", "\"docx\"", FilterOperator::Or)];
	let encoded = url_sync::encode_filters(&filters).expect("filters encode");
	let bar = Arc::new(MemoryAddressBar::with_query(&format!(
		"?tab=1&sv=1&q=policy&f={encoded}&p=3&s=Size:asc&l=cards"
	)));

	store.set_page(1);
	attach(&registry, &bar);
	settle().await;

	let state = store.snapshot();

	assert_eq!(state.query.query_text, "policy");
	assert_eq!(state.query.current_page, 3);
	assert_eq!(*state.filters.active, filters);
	assert_eq!(state.query.sort.as_ref().map(|sort| sort.property.as_str()), Some("Size"));
	assert_eq!(state.ui.active_layout_key, "cards");

	tokio::time::advance(Duration::from_secs(1)).await;
	settle().await;

	assert!(bar.writes().is_empty(), "reading the address must not write it back");
}

#[tokio::test(start_paused = true)]
async fn unversioned_address_leaves_state_alone() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let bar = Arc::new(MemoryAddressBar::with_query("q=from-elsewhere"));

	store.set_query_text("kept");
	attach(&registry, &bar);
	settle().await;

	assert_eq!(store.snapshot().query.query_text, "kept");
}

#[tokio::test(start_paused = true)]
async fn state_set_before_attach_reaches_an_empty_address() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let bar = Arc::new(MemoryAddressBar::default());

	store.set_query_text("kept");
	attach(&registry, &bar);
	settle().await;
	tokio::time::advance(Duration::from_millis(400)).await;
	settle().await;

	assert_eq!(bar.writes(), vec!["sv=1&q=kept".to_string()]);
	assert_eq!(store.snapshot().query.query_text, "kept");
}

#[tokio::test(start_paused = true)]
async fn untouched_session_leaves_an_empty_address_alone() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let bar = Arc::new(MemoryAddressBar::default());

	registry.get_or_create(&SessionId::new("main"));
	attach(&registry, &bar);
	settle().await;
	tokio::time::advance(Duration::from_secs(1)).await;
	settle().await;

	assert!(bar.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn navigation_replaces_state() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let bar = Arc::new(MemoryAddressBar::default());
	let navigation = attach(&registry, &bar);

	settle().await;
	store.set_query_text("first");
	store.toggle_filter("FileType", "\"docx\"");
	settle().await;
	tokio::time::advance(Duration::from_millis(400)).await;
	settle().await;

	assert_eq!(bar.writes().len(), 1);

	// Back to a page that only had a query.
	bar.navigate("sv=1&q=earlier");
	navigation.send(()).expect("bridge is running");
	settle().await;

	let state = store.snapshot();

	assert_eq!(state.query.query_text, "earlier");
	assert!(state.filters.active.is_empty());

	tokio::time::advance(Duration::from_secs(1)).await;
	settle().await;

	assert_eq!(bar.writes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dispose_flushes_the_pending_write() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let id = SessionId::new("main");
	let store = registry.get_or_create(&id).store;
	let bar = Arc::new(MemoryAddressBar::default());

	attach(&registry, &bar);
	settle().await;
	store.set_query_text("last words");
	settle().await;

	registry.dispose(&id).expect("session exists").join().await;

	assert_eq!(bar.writes(), vec!["sv=1&q=last+words".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn namespaced_sessions_keep_each_other_intact() {
	let mut settings = super::settings();

	settings.url = UrlOptions { prefix: Some("side".to_string()), default_layout: "list".to_string() };

	let services = services(CountingTerms::default(), CountingProfiles::default());
	let registry = SessionRegistry::new(settings, services);
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let bar = Arc::new(MemoryAddressBar::with_query("sv=1&q=main+query"));

	attach(&registry, &bar);
	settle().await;
	store.set_query_text("side query");
	store.set_page(2);
	settle().await;
	tokio::time::advance(Duration::from_millis(400)).await;
	settle().await;

	assert_eq!(bar.query(), "sv=1&q=main+query&side.sv=1&side.q=side+query&side.p=2");
}

#[test]
fn snapshots_compare_filter_lists_by_identity() {
	let mut state = scout_service::SessionState::default();
	let before = UrlSnapshot::from_state(&state);

	state.filters.active = Arc::new(Vec::new());

	assert_ne!(before, UrlSnapshot::from_state(&state));
	assert_eq!(UrlSnapshot::from_state(&state), UrlSnapshot::from_state(&state.clone()));
}

#[tokio::test]
async fn attaching_twice_is_rejected() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let bar = Arc::new(MemoryAddressBar::default());

	registry.get_or_create(&SessionId::new("main"));

	assert!(registry.attach_address_bar(&SessionId::new("main"), bar.clone()).is_ok());
	assert!(registry.attach_address_bar(&SessionId::new("main"), bar.clone()).is_err());
	assert!(registry.attach_address_bar(&SessionId::new("missing"), bar).is_err());
}

#[tokio::test]
async fn disposed_store_rejects_an_address_bar() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let id = SessionId::new("main");
	let store = registry.get_or_create(&id).store;

	store.dispose();

	let result = registry.attach_address_bar(&id, Arc::new(MemoryAddressBar::default()));

	assert!(matches!(result, Err(Error::Disposed { session_id }) if session_id == "main"));
}

#[tokio::test(start_paused = true)]
async fn navigating_to_an_address_without_tab_selects_the_first() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(Default::default())));
	let store = registry.get_or_create(&SessionId::new("main")).store;
	let bar = Arc::new(MemoryAddressBar::with_query("sv=1&q=report&v=docs"));

	store.set_verticals(vec![Vertical::new("all", "All"), Vertical::new("docs", "Documents")]);

	let navigation = attach(&registry, &bar);

	settle().await;

	assert_eq!(store.snapshot().vertical.current_key.as_deref(), Some("docs"));

	bar.navigate("sv=1&q=report");
	navigation.send(()).expect("bridge is running");
	settle().await;

	assert_eq!(store.snapshot().vertical.current_key.as_deref(), Some("all"));
}
