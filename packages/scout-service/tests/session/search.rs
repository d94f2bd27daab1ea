use std::sync::{Arc, atomic::Ordering};

use scout_domain::{FilterOperator, MatchType, PromotedItem, PromotionRule};
use scout_service::{
	FilterConfig, LayoutDefinition, SearchOutcome, SearchResponse, SearchStatus, SessionId,
	SessionRegistry, SortDirection, SortSpec, Vertical,
};

use super::{CountingProfiles, CountingTerms, ScriptedProvider, registry_with, services, settings};

fn item(url: &str, position: i32) -> PromotedItem {
	PromotedItem {
		url: url.to_string(),
		title: url.to_string(),
		description: String::new(),
		image_url: None,
		position,
	}
}

fn response() -> SearchResponse {
	SearchResponse {
		total_count: 42,
		promoted_results: vec![item("https://intranet/budget/", 0), item("https://intranet/travel", 0)],
		query_suggestion: Some("budgets".to_string()),
		..SearchResponse::default()
	}
}

#[tokio::test]
async fn search_compiles_state_and_records_results() {
	let provider = Arc::new(ScriptedProvider::new(response()));
	let rule = PromotionRule {
		id: "budget".to_string(),
		title: "Budget".to_string(),
		is_active: true,
		match_type: MatchType::Contains,
		match_value: "budget".to_string(),
		start_date: None,
		end_date: None,
		vertical_scope: Vec::new(),
		audience_groups: Vec::new(),
		items: vec![item("https://intranet/budget", 1)],
	};
	let services = services(CountingTerms::default(), CountingProfiles::default())
		.with_data_provider(provider.clone())
		.with_rules(vec![rule]);
	let registry = SessionRegistry::new(settings(), services);
	let session = registry.get_or_create(&SessionId::new("main"));
	let store = &session.store;
	let mut tags = FilterConfig::new("Tags", "taxonomy");

	tags.operator = FilterOperator::And;

	store.set_filter_configs(vec![FilterConfig::new("FileType", "default"), tags]);
	store.set_query_text("budget 2024");
	store.toggle_filter("FileType", "\"docx\"");
	store.toggle_filter("FileType", "\"pptx\"");
	store.toggle_filter("Tags", "\"GP0|#a\"");
	store.set_sort(Some(SortSpec::new("LastModifiedTime", SortDirection::Desc)));

	let outcome = session.coordinator.search().await;

	assert_eq!(outcome, SearchOutcome::Completed { generation: 1, total_count: 42 });

	let query = provider.last_query().expect("provider was called");

	assert_eq!(query.query_text, "budget 2024");
	assert_eq!(query.filters, vec!["FileType:or(\"docx\",\"pptx\")", "Tags:\"GP0|#a\""]);
	assert_eq!(query.sort.len(), 1);
	assert_eq!(query.sort[0].direction, 1);
	assert_eq!(query.refiners, vec!["FileType", "Tags"]);

	let state = store.snapshot();
	let promoted: Vec<_> = state.results.promoted.iter().map(|item| item.url.as_str()).collect();

	assert_eq!(state.results.status, SearchStatus::Completed);
	assert_eq!(state.results.total_count, 42);
	assert_eq!(promoted, vec!["https://intranet/budget", "https://intranet/travel"]);
	assert_eq!(state.user.recent_queries, vec!["budget 2024".to_string()]);
}

#[tokio::test]
async fn recent_queries_keep_the_user_text() {
	let provider = Arc::new(ScriptedProvider::new(response()));
	let registry = registry_with(provider.clone());
	let session = registry.get_or_create(&SessionId::new("main"));
	let mut documents = Vertical::new("documents", "Documents");

	documents.query_template = Some("{searchTerms} IsDocument:1".to_string());

	session.store.set_verticals(vec![documents]);
	session.store.set_query_text("budget");
	session.coordinator.search().await;

	let query = provider.last_query().expect("provider was called");

	assert_eq!(query.query_text, "budget IsDocument:1");
	assert_eq!(session.store.snapshot().user.recent_queries, vec!["budget".to_string()]);

	session.store.set_query_text("");
	session.coordinator.search().await;

	assert_eq!(provider.last_query().expect("provider was called").query_text, "IsDocument:1");
	assert_eq!(session.store.snapshot().user.recent_queries, vec!["budget".to_string()]);
}

#[tokio::test]
async fn first_search_freezes_registries() {
	let provider = Arc::new(ScriptedProvider::new(response()));
	let registry = registry_with(provider);
	let session = registry.get_or_create(&SessionId::new("main"));
	let layouts = &session.store.registries().layouts;

	assert!(layouts.register(Arc::new(LayoutDefinition::new("grid", "Grid", false)), false).is_applied());

	session.coordinator.search().await;

	assert!(!layouts.register(Arc::new(LayoutDefinition::new("table", "Table", false)), false).is_applied());
	assert!(session.store.set_layout("grid"));
	assert!(!session.store.set_layout("table"));
}

#[tokio::test]
async fn surfaces_with_one_id_share_a_store() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(response())));
	let id = SessionId::new("shared");
	let query_box = registry.get_or_create(&id);
	let results_list = registry.get_or_create(&id);

	query_box.store.set_query_text("handbook");

	assert!(Arc::ptr_eq(&query_box.store, &results_list.store));
	assert_eq!(results_list.store.snapshot().query.query_text, "handbook");
	assert_eq!(registry.len(), 1);
	assert!(registry.get(&SessionId::new("other")).is_none());
}

#[tokio::test]
async fn new_search_cancels_the_previous_one() {
	let provider = Arc::new(ScriptedProvider::new(response()).hanging(1));
	let registry = registry_with(provider.clone());
	let session = registry.get_or_create(&SessionId::new("main"));
	let coordinator = session.coordinator.clone();
	let first = tokio::spawn(async move { coordinator.search().await });

	provider.started.notified().await;

	let second = session.coordinator.search().await;
	let first = first.await.expect("first search joins");

	assert_eq!(first, SearchOutcome::Cancelled { generation: 1 });
	assert_eq!(second, SearchOutcome::Completed { generation: 2, total_count: 42 });
	assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
	assert_eq!(session.store.snapshot().results.status, SearchStatus::Completed);
}

#[tokio::test]
async fn dispose_cancels_the_running_search() {
	let provider = Arc::new(ScriptedProvider::new(response()).hanging(1));
	let registry = registry_with(provider.clone());
	let id = SessionId::new("main");
	let session = registry.get_or_create(&id);
	let coordinator = session.coordinator.clone();
	let running = tokio::spawn(async move { coordinator.search().await });

	provider.started.notified().await;

	let disposed = registry.dispose(&id).expect("session exists");

	assert_eq!(running.await.expect("search joins"), SearchOutcome::Cancelled { generation: 1 });
	assert!(disposed.handle.store.is_disposed());
	assert!(!disposed.handle.store.set_query_text("late"));
	assert_eq!(disposed.handle.coordinator.search().await, SearchOutcome::Disposed);
	assert!(registry.is_empty());

	disposed.join().await;
}

#[tokio::test]
async fn missing_provider_fails_the_search() {
	let registry = registry_with(Arc::new(ScriptedProvider::new(response())));
	let session = registry.get_or_create(&SessionId::new("main"));
	let mut people = Vertical::new("people", "People");

	people.data_provider_id = Some("directory".to_string());

	session.store.set_verticals(vec![people]);

	let SearchOutcome::Failed { message, .. } = session.coordinator.search().await else {
		panic!("search without a provider must fail");
	};

	assert!(message.contains("directory"));
	assert_eq!(session.store.snapshot().results.status, SearchStatus::Failed);
}

#[tokio::test]
async fn targeted_promotions_stay_hidden_without_groups() {
	let provider = Arc::new(ScriptedProvider::new(SearchResponse::default()));
	let rule = PromotionRule {
		id: "hr-only".to_string(),
		title: String::new(),
		is_active: true,
		match_type: MatchType::Equals,
		match_value: "benefits".to_string(),
		start_date: None,
		end_date: None,
		vertical_scope: Vec::new(),
		audience_groups: vec!["hr".to_string()],
		items: vec![item("https://intranet/benefits", 0)],
	};
	let services = services(CountingTerms::default(), CountingProfiles::default())
		.with_data_provider(provider)
		.with_rules(vec![rule]);
	let registry = SessionRegistry::new(settings(), services);
	let session = registry.get_or_create(&SessionId::new("main"));

	session.store.set_query_text("Benefits");
	session.coordinator.search().await;

	assert!(session.store.snapshot().results.promoted.is_empty());

	session.store.set_user_groups(vec!["HR".to_string()]);
	session.coordinator.search().await;

	assert_eq!(session.store.snapshot().results.promoted.len(), 1);
}
