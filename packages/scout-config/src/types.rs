use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub session: Session,
	#[serde(default)]
	pub context: Context,
	#[serde(default)]
	pub promotions: Promotions,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
	/// Optional namespace for URL keys, e.g. "main" produces "main.q".
	#[serde(default)]
	pub url_prefix: Option<String>,
	#[serde(default = "default_url_debounce_ms")]
	pub url_debounce_ms: u64,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_layout")]
	pub default_layout: String,
	#[serde(default = "default_query_template")]
	pub query_template: String,
	/// Extra managed properties requested on top of the built-in selection.
	#[serde(default)]
	pub selected_properties: Vec<String>,
	#[serde(default = "default_true")]
	pub trim_duplicates: bool,
	#[serde(default = "default_data_provider")]
	pub default_data_provider: String,
}
impl Default for Session {
	fn default() -> Self {
		Self {
			url_prefix: None,
			url_debounce_ms: default_url_debounce_ms(),
			page_size: default_page_size(),
			default_layout: default_layout(),
			query_template: default_query_template(),
			selected_properties: Vec::new(),
			trim_duplicates: true,
			default_data_provider: default_data_provider(),
		}
	}
}

/// Values substituted into query templates.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Context {
	pub site_id: Option<String>,
	pub site_url: Option<String>,
	pub web_id: Option<String>,
	pub web_url: Option<String>,
	pub hub_site_id: Option<String>,
	pub list_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Promotions {
	#[serde(default = "default_max_promoted")]
	pub max_results: usize,
	/// Optional. JSON array of promotion rules.
	#[serde(default)]
	pub rules_path: Option<std::path::PathBuf>,
}
impl Default for Promotions {
	fn default() -> Self {
		Self { max_results: default_max_promoted(), rules_path: None }
	}
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub search: ProviderConfig,
	pub terms: ProviderConfig,
	pub profiles: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_url_debounce_ms() -> u64 {
	300
}

fn default_page_size() -> u32 {
	10
}

fn default_layout() -> String {
	"list".to_string()
}

fn default_query_template() -> String {
	"{searchTerms}".to_string()
}

fn default_true() -> bool {
	true
}

fn default_data_provider() -> String {
	"http".to_string()
}

fn default_max_promoted() -> usize {
	3
}
