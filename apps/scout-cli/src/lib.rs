use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::{
	Result,
	eyre::{WrapErr, eyre},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use scout_config::Config;
use scout_domain::{PromotedItem, PromotionRule, promotions};
use scout_service::{
	ResultItem, SearchOutcome, SearchQuery, SessionHandle, SessionId, SessionRegistry,
	SessionServices, SessionSettings, compiler,
	http::{HttpDataProvider, HttpLookups},
	url_sync,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SESSION_ID: &str = "cli";

#[derive(Debug, Parser)]
#[command(version = VERSION, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Print the backend request a search page address compiles to.
	Compile(AddressArgs),
	/// Print the editorial promotions a query triggers.
	Promote(PromoteArgs),
	/// Run the search a page address describes and print the results.
	Search(AddressArgs),
}

#[derive(Debug, clap::Args)]
pub struct AddressArgs {
	/// Query string of the page address, e.g. "sv=1&q=budget&p=2".
	#[arg(long, short = 'u', value_name = "QUERY", default_value = "")]
	pub url: String,
	/// Groups of the signed-in user. Repeat for several.
	#[arg(long = "group", value_name = "GROUP")]
	pub groups: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct PromoteArgs {
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: String,
	#[arg(long, value_name = "KEY")]
	pub vertical: Option<String>,
	#[arg(long = "group", value_name = "GROUP")]
	pub groups: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
	pub total_count: u64,
	pub items: Vec<ResultItem>,
	pub promoted: Vec<PromotedItem>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query_suggestion: Option<String>,
	pub filters: Vec<FilterLabel>,
}

#[derive(Debug, Serialize)]
pub struct FilterLabel {
	pub name: String,
	pub value: String,
	pub label: String,
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

pub async fn run(args: Args) -> Result<()> {
	let config = scout_config::load(&args.config)?;

	init_tracing(&config)?;

	let rules = load_rules(config.promotions.rules_path.as_deref())?;

	match args.command {
		Command::Compile(address) => {
			let registry = session_registry(&config, rules);
			let handle = open_session(&registry, &address);
			let query = compile_request(&registry, &handle);

			print_json(&query)
		},
		Command::Promote(promote) => {
			let items = promotions::evaluate(
				&rules,
				&promote.query,
				promote.vertical.as_deref(),
				config.promotions.max_results,
				&promote.groups,
			);

			print_json(&items)
		},
		Command::Search(address) => {
			let registry = session_registry(&config, rules);
			let handle = open_session(&registry, &address);
			let report = search(&handle).await;

			if let Some(disposed) = registry.dispose(handle.store.id()) {
				disposed.join().await;
			}

			print_json(&report?)
		},
	}
}

/// Reads the promotion rules file, if one is configured.
pub fn load_rules(path: Option<&Path>) -> Result<Vec<PromotionRule>> {
	let Some(path) = path else {
		return Ok(Vec::new());
	};
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read promotion rules at {}.", path.display()))?;
	let rules: Vec<PromotionRule> = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse promotion rules at {}.", path.display()))?;

	tracing::info!(path = %path.display(), rules = rules.len(), "Promotion rules loaded.");

	Ok(rules)
}

pub fn session_registry(config: &Config, rules: Vec<PromotionRule>) -> SessionRegistry {
	let settings = SessionSettings::from_config(config);
	let lookups = Arc::new(HttpLookups::new(
		config.providers.terms.clone(),
		config.providers.profiles.clone(),
	));
	let provider = Arc::new(HttpDataProvider::new(
		settings.default_data_provider.clone(),
		config.providers.search.clone(),
	));
	let services = SessionServices::new(lookups.clone(), lookups)
		.with_data_provider(provider)
		.with_rules(rules);

	SessionRegistry::new(settings, services)
}

/// Creates the CLI session and loads the address into it the way a page load would.
pub fn open_session(registry: &SessionRegistry, address: &AddressArgs) -> SessionHandle {
	let handle = registry.get_or_create(&SessionId::new(SESSION_ID));

	match url_sync::decode(&address.url, &registry.settings().url) {
		Some(patch) => {
			handle.store.apply_url_patch(patch);
		},
		None if !address.url.trim().is_empty() => {
			tracing::warn!(url = %address.url, "Address carries no search state. Using defaults.");
		},
		None => {},
	}

	if !address.groups.is_empty() {
		handle.store.set_user_groups(address.groups.clone());
	}

	handle
}

pub fn compile_request(registry: &SessionRegistry, handle: &SessionHandle) -> SearchQuery {
	let state = handle.store.snapshot();
	let ctx = handle.coordinator.token_context(&state);

	compiler::compile(&state, &ctx, &registry.settings().selected_properties)
}

async fn search(handle: &SessionHandle) -> Result<SearchReport> {
	match handle.coordinator.search().await {
		SearchOutcome::Completed { .. } => {},
		SearchOutcome::Failed { message, .. } => return Err(eyre!(message)),
		SearchOutcome::Cancelled { .. } | SearchOutcome::Disposed => {
			return Err(eyre!("Search was cancelled."));
		},
	}

	let state = handle.store.snapshot();
	let mut filters = Vec::with_capacity(state.filters.active.len());

	for filter in state.filters.active.iter() {
		let label = handle.store.display_value(&filter.filter_name, &filter.value).await;

		filters.push(FilterLabel { name: filter.filter_name.clone(), value: filter.value.clone(), label });
	}

	Ok(SearchReport {
		total_count: state.results.total_count,
		items: state.results.items.to_vec(),
		promoted: state.results.promoted.to_vec(),
		query_suggestion: state.results.query_suggestion.clone(),
		filters,
	})
}

fn print_json<T>(value: &T) -> Result<()>
where
	T: Serialize,
{
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}

fn init_tracing(config: &Config) -> Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
