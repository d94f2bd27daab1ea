pub mod compiler;
pub mod coordinator;
pub mod error;
pub mod formatters;
pub mod http;
pub mod registries;
pub mod sessions;
pub mod state;
pub mod store;
pub mod url_sync;

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub use compiler::{SearchQuery, SortEntry};
pub use coordinator::{SearchCoordinator, SearchOutcome};
pub use error::{Error, Result};
pub use formatters::FilterFormatter;
pub use registries::{LayoutDefinition, RegistryContainer, ResultAction, Suggestion};
pub use sessions::{DisposedSession, SessionHandle, SessionRegistry, SessionServices, SessionSettings};
pub use state::{
	FilterConfig, Refiner, RefinerValue, ResultItem, Scope, SearchStatus, SessionState, SortDirection,
	SortSpec, Vertical,
};
pub use store::{Lifecycle, SessionId, SessionStore};
pub use url_sync::{UrlOptions, UrlSnapshot, UrlStatePatch, UrlSynchronizer};

use scout_domain::{PromotedItem, RegistryEntry};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Resolves a taxonomy term id to its label and parent.
pub trait TermLookup
where
	Self: Send + Sync,
{
	fn resolve_term<'a>(&'a self, term_id: &'a str) -> BoxFuture<'a, Result<TermInfo>>;
}

/// Resolves a claims-encoded principal to profile names.
pub trait ProfileLookup
where
	Self: Send + Sync,
{
	fn resolve_person<'a>(&'a self, claim: &'a str) -> BoxFuture<'a, Result<PersonInfo>>;
}

/// Executes a compiled query against a backend.
pub trait SearchDataProvider
where
	Self: RegistryEntry + Send + Sync,
{
	fn execute<'a>(
		&'a self,
		query: &'a SearchQuery,
		cancel: CancellationToken,
	) -> BoxFuture<'a, Result<SearchResponse>>;
}

pub trait SuggestionProvider
where
	Self: RegistryEntry + Send + Sync,
{
	fn suggest<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<Suggestion>>>;
}

pub trait ActionProvider
where
	Self: RegistryEntry + Send + Sync,
{
	fn actions(&self, item: &ResultItem) -> Vec<ResultAction>;
}

/// The browser address bar as seen by one session. Only the query string is touched.
pub trait AddressBar
where
	Self: Send + Sync,
{
	fn query(&self) -> String;

	/// Updates the address without creating a history entry.
	fn replace_query(&self, query: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermInfo {
	pub label: String,
	pub parent_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonInfo {
	pub display_name: Option<String>,
	pub preferred_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	#[serde(default)]
	pub items: Vec<ResultItem>,
	#[serde(default)]
	pub total_count: u64,
	#[serde(default)]
	pub refiners: Vec<Refiner>,
	#[serde(default)]
	pub promoted_results: Vec<PromotedItem>,
	#[serde(default)]
	pub query_suggestion: Option<String>,
}
