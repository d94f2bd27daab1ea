use std::sync::{Arc, atomic::Ordering};

use scout_service::{
	FilterConfig, PersonInfo, SessionId, SessionRegistry, SessionStore,
	formatters::UNKNOWN_TERM,
};

use super::{CountingProfiles, CountingTerms, services, settings};

const PAYROLL: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";
const ACCOUNTING: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3302";
const FINANCE: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3303";

fn terms() -> CountingTerms {
	CountingTerms::default()
		.with_term(PAYROLL, "Payroll", Some(ACCOUNTING))
		.with_term(ACCOUNTING, "Accounting", Some(FINANCE))
		.with_term(FINANCE, "Finance", None)
}

fn session_store(registry: &SessionRegistry) -> Arc<SessionStore> {
	let store = registry.get_or_create(&SessionId::new("main")).store;

	store.set_filter_configs(vec![
		FilterConfig::new("Department", "taxonomy"),
		FilterConfig::new("Author", "people"),
		FilterConfig::new("Size", "slider"),
	]);

	store
}

#[tokio::test]
async fn concurrent_taxonomy_labels_share_lookups() {
	let terms = terms();
	let calls = terms.calls.clone();
	let registry = SessionRegistry::new(settings(), services(terms, CountingProfiles::default()));
	let store = session_store(&registry);
	let token = format!("\"GP0|#{PAYROLL}\"");
	let mut tasks = Vec::new();

	for _ in 0..5 {
		let store = store.clone();
		let token = token.clone();

		tasks.push(tokio::spawn(async move { store.display_value("Department", &token).await }));
	}

	for task in tasks {
		assert_eq!(task.await.expect("task joins"), "Finance > Accounting > Payroll");
	}

	assert_eq!(calls.load(Ordering::SeqCst), 3);

	// Ancestors resolved for the leaf are reused by their own tokens.
	assert_eq!(store.display_value("Department", &format!("GP0|#{ACCOUNTING}")).await, "Finance > Accounting");
	assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_term_lookups_render_a_sentinel_and_retry() {
	let terms = CountingTerms::default();
	let calls = terms.calls.clone();
	let registry = SessionRegistry::new(settings(), services(terms, CountingProfiles::default()));
	let store = session_store(&registry);
	let token = "GP0|#0e8a3b1c-5d2f-4a6b-9c7d-1e2f3a4b5c6d";

	assert_eq!(store.display_value("Department", token).await, UNKNOWN_TERM);
	assert_eq!(store.display_value("Department", token).await, UNKNOWN_TERM);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cyclic_term_parents_stop_the_walk() {
	let terms = CountingTerms::default()
		.with_term(PAYROLL, "Payroll", Some(ACCOUNTING))
		.with_term(ACCOUNTING, "Accounting", Some(PAYROLL));
	let registry = SessionRegistry::new(settings(), services(terms, CountingProfiles::default()));
	let store = session_store(&registry);

	assert_eq!(store.display_value("Department", PAYROLL).await, "Accounting > Payroll");
}

#[tokio::test]
async fn people_labels_fall_back_in_order() {
	let claim_ann = "i:0#.f|membership|ann@contoso.com";
	let claim_bo = "i:0#.f|membership|bo@contoso.com";
	let mut profiles = CountingProfiles::default();

	profiles.people.insert(
		claim_ann.to_string(),
		PersonInfo { display_name: Some("Ann Lee".to_string()), preferred_name: None },
	);
	profiles.people.insert(
		claim_bo.to_string(),
		PersonInfo { display_name: Some(" ".to_string()), preferred_name: Some("Bo".to_string()) },
	);

	let calls = profiles.calls.clone();
	let registry = SessionRegistry::new(settings(), services(CountingTerms::default(), profiles));
	let store = session_store(&registry);

	assert_eq!(store.display_value("Author", &format!("\"{claim_ann}\"")).await, "Ann Lee");
	assert_eq!(store.display_value("Author", claim_ann).await, "Ann Lee");
	assert_eq!(store.display_value("Author", claim_bo).await, "Bo");
	assert_eq!(
		store.display_value("Author", "i:0#.f|membership|cy@contoso.com").await,
		"cy@contoso.com"
	);
	assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unknown_filters_use_the_default_formatter() {
	let registry =
		SessionRegistry::new(settings(), services(CountingTerms::default(), CountingProfiles::default()));
	let store = session_store(&registry);

	assert_eq!(store.display_value("FileType", "\"ǂǂ646f6378\"").await, "docx");
	assert_eq!(store.display_value("Size", "range(decimal(10), max)").await, "≥ 10");
	assert_eq!(store.query_token("Size", "1..5"), "range(decimal(1), decimal(5))");
	assert_eq!(store.query_token("Author", "ann@contoso.com"), "\"i:0#.f|membership|ann@contoso.com\"");
	assert_eq!(store.query_token("FileType", "pdf"), "\"pdf\"");
}
