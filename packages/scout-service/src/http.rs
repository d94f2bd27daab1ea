//! Collaborators backed by the HTTP clients in `scout-providers`.

use tokio_util::sync::CancellationToken;

use crate::{
	BoxFuture, Error, PersonInfo, ProfileLookup, Result, SearchDataProvider, SearchQuery,
	SearchResponse, TermInfo, TermLookup,
};
use scout_config::ProviderConfig;
use scout_domain::RegistryEntry;
use scout_providers::{execution, profiles, terms};

pub struct HttpDataProvider {
	id: String,
	cfg: ProviderConfig,
}
impl HttpDataProvider {
	pub fn new(id: impl Into<String>, cfg: ProviderConfig) -> Self {
		Self { id: id.into(), cfg }
	}
}
impl RegistryEntry for HttpDataProvider {
	fn id(&self) -> &str {
		&self.id
	}
}
impl SearchDataProvider for HttpDataProvider {
	fn execute<'a>(
		&'a self,
		query: &'a SearchQuery,
		cancel: CancellationToken,
	) -> BoxFuture<'a, Result<SearchResponse>> {
		Box::pin(async move {
			let body = serde_json::to_value(query)?;
			let raw = tokio::select! {
				_ = cancel.cancelled() => return Err(Error::Cancelled),
				raw = execution::execute(&self.cfg, &body) => raw?,
			};

			Ok(serde_json::from_value(raw)?)
		})
	}
}

pub struct HttpLookups {
	terms: ProviderConfig,
	profiles: ProviderConfig,
}
impl HttpLookups {
	pub fn new(terms: ProviderConfig, profiles: ProviderConfig) -> Self {
		Self { terms, profiles }
	}
}
impl TermLookup for HttpLookups {
	fn resolve_term<'a>(&'a self, term_id: &'a str) -> BoxFuture<'a, Result<TermInfo>> {
		Box::pin(async move {
			let record = terms::fetch_term(&self.terms, term_id)
				.await
				.map_err(|err| Error::Lookup { message: format!("Term {term_id}: {err}") })?;

			Ok(TermInfo { label: record.label, parent_id: record.parent_id })
		})
	}
}
impl ProfileLookup for HttpLookups {
	fn resolve_person<'a>(&'a self, claim: &'a str) -> BoxFuture<'a, Result<PersonInfo>> {
		Box::pin(async move {
			let record = profiles::fetch_profile(&self.profiles, claim)
				.await
				.map_err(|err| Error::Lookup { message: format!("Profile {claim}: {err}") })?;

			Ok(PersonInfo { display_name: record.display_name, preferred_name: record.preferred_name })
		})
	}
}
