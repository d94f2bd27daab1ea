use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
};

use clap::Parser;

use scout_cli::{AddressArgs, Args, Command};
use scout_domain::{ActiveFilter, FilterOperator, promotions};
use scout_service::url_sync;

const CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/config.template.toml");

fn rules_path() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rules.json")
}

fn write_config() -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let mut path = env::temp_dir();

	path.push(format!("scout_cli_test_{}_{ordinal}.toml", std::process::id()));

	let payload = CONFIG_TEMPLATE_TOML.replace("RULES_PATH", &rules_path().display().to_string());

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn address(url: &str) -> AddressArgs {
	AddressArgs { url: url.to_string(), groups: Vec::new() }
}

#[test]
fn parses_subcommands_with_kebab_flags() {
	let args = Args::try_parse_from([
		"scout", "-c", "scout.toml", "promote", "-q", "benefits", "--vertical", "docs", "--group",
		"hr", "--group", "it",
	])
	.expect("arguments parse");

	assert_eq!(args.config, PathBuf::from("scout.toml"));

	let Command::Promote(promote) = args.command else {
		panic!("expected the promote subcommand");
	};

	assert_eq!(promote.query, "benefits");
	assert_eq!(promote.vertical.as_deref(), Some("docs"));
	assert_eq!(promote.groups, vec!["hr".to_string(), "it".to_string()]);
	assert!(Args::try_parse_from(["scout", "compile"]).is_err());
}

#[test]
fn compile_reflects_the_address_and_configuration() {
	let path = write_config();
	let config = scout_config::load(&path).expect("config loads");
	let registry = scout_cli::session_registry(&config, Vec::new());
	let filters = vec![
		ActiveFilter::new("FileType", "\"docx\"", FilterOperator::Or),
		ActiveFilter::new("FileType", "\"pdf\"", FilterOperator::Or),
	];
	let encoded = url_sync::encode_filters(&filters).expect("filters encode");
	let handle =
		scout_cli::open_session(&registry, &address(&format!("sv=1&q=budget&f={encoded}&s=Size:asc&p=2")));
	let query = scout_cli::compile_request(&registry, &handle);

	assert_eq!(query.query_text, "budget Path:https://contoso.example/sites/hr");
	assert_eq!(query.filters, vec!["FileType:or(\"docx\",\"pdf\")".to_string()]);
	assert_eq!(query.page, 2);
	assert_eq!(query.page_size, 25);
	assert_eq!(query.sort.len(), 1);
	assert_eq!(query.sort[0].direction, 0);
	assert!(query.selected_properties.iter().any(|property| property == "ContentTypeId"));

	fs::remove_file(path).ok();
}

#[test]
fn unversioned_addresses_fall_back_to_defaults() {
	let path = write_config();
	let config = scout_config::load(&path).expect("config loads");
	let registry = scout_cli::session_registry(&config, Vec::new());
	let handle = scout_cli::open_session(&registry, &address("q=ignored"));
	let query = scout_cli::compile_request(&registry, &handle);

	assert_eq!(query.query_text, "Path:https://contoso.example/sites/hr");
	assert!(query.filters.is_empty());
	assert_eq!(query.page, 1);

	fs::remove_file(path).ok();
}

#[test]
fn configured_rules_drive_promotions() {
	let path = write_config();
	let config = scout_config::load(&path).expect("config loads");
	let rules =
		scout_cli::load_rules(config.promotions.rules_path.as_deref()).expect("rules load");

	assert_eq!(rules.len(), 3);

	let everyone = promotions::evaluate(&rules, "Benefits 2024", None, config.promotions.max_results, &[]);
	let urls: Vec<_> = everyone.iter().map(|item| item.url.as_str()).collect();

	assert_eq!(urls, vec!["https://intranet/benefits", "https://intranet/leave"]);

	let hr = promotions::evaluate(
		&rules,
		"benefits",
		None,
		config.promotions.max_results,
		&["HR".to_string()],
	);
	let urls: Vec<_> = hr.iter().map(|item| item.url.as_str()).collect();

	assert_eq!(urls, vec!["https://intranet/hr/benefits", "https://intranet/benefits"]);

	fs::remove_file(path).ok();
}

#[test]
fn missing_rules_file_is_an_error() {
	assert!(scout_cli::load_rules(Some(Path::new("/nonexistent/scout-rules.json"))).is_err());
	assert!(scout_cli::load_rules(None).expect("no rules configured").is_empty());
}
