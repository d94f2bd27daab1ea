use std::sync::Arc;

use crate::{
	BoxFuture, PersonInfo, ProfileLookup,
	formatters::{FilterFormatter, LabelCache, default, quote_token},
	state::FilterConfig,
};
use scout_domain::RegistryEntry;

const MEMBERSHIP_PREFIX: &str = "i:0#.f|membership|";

pub struct PeopleFormatter {
	lookup: Arc<dyn ProfileLookup>,
	cache: LabelCache<PersonInfo>,
}
impl PeopleFormatter {
	pub fn new(lookup: Arc<dyn ProfileLookup>) -> Self {
		Self { lookup, cache: LabelCache::new() }
	}

	pub fn cache(&self) -> &LabelCache<PersonInfo> {
		&self.cache
	}

	async fn display_name(&self, claim: &str) -> String {
		let key = claim.to_ascii_lowercase();
		let person = self.cache.get_or_resolve(&key, || self.lookup.resolve_person(claim)).await;

		match person {
			Ok(person) => [person.display_name, person.preferred_name]
				.into_iter()
				.flatten()
				.map(|name| name.trim().to_string())
				.find(|name| !name.is_empty())
				.unwrap_or_else(|| claim_tail(claim).to_string()),
			Err(err) => {
				tracing::debug!(claim, error = %err, "Profile lookup failed.");

				claim_tail(claim).to_string()
			},
		}
	}
}
impl RegistryEntry for PeopleFormatter {
	fn id(&self) -> &str {
		"people"
	}
}
impl FilterFormatter for PeopleFormatter {
	fn to_display<'a>(&'a self, raw: &'a str, _config: &'a FilterConfig) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let plain = default::plain_value(raw);

			if is_claim(&plain) { self.display_name(&plain).await } else { plain }
		})
	}

	fn to_query_token(&self, display: &str, _config: &FilterConfig) -> String {
		let plain = default::plain_value(display);

		if plain.is_empty() {
			return quote_token(display);
		}
		if is_claim(&plain) {
			return format!("\"{plain}\"");
		}

		format!("\"{MEMBERSHIP_PREFIX}{plain}\"")
	}
}

/// Claims look like `i:0#.f|membership|user@contoso.com` or `c:0t.c|tenant|<id>`.
pub fn is_claim(value: &str) -> bool {
	let head = value.get(..3).unwrap_or_default();

	(head.eq_ignore_ascii_case("i:0") || head.eq_ignore_ascii_case("c:0")) && value.contains('|')
}

fn claim_tail(claim: &str) -> &str {
	claim.rsplit('|').next().unwrap_or(claim)
}
