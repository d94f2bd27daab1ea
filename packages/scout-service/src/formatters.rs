//! Per-filter-type codecs between backend tokens, display labels and URL tokens.
//!
//! Formatters never fail. Malformed tokens render as a cleaned-up copy of themselves and
//! unparseable display input is quoted as a plain string token.

mod boolean;
mod date_range;
mod default;
mod label_cache;
mod numeric;
mod people;
mod taxonomy;

pub use boolean::BooleanFormatter;
pub use date_range::DateRangeFormatter;
pub use default::DefaultFormatter;
pub use label_cache::LabelCache;
pub use numeric::NumericFormatter;
pub use people::PeopleFormatter;
pub use taxonomy::{TaxonomyFormatter, UNKNOWN_TERM};

use crate::{BoxFuture, state::FilterConfig};
use scout_domain::RegistryEntry;

pub const DEFAULT_FILTER_TYPE: &str = "default";

pub trait FilterFormatter
where
	Self: RegistryEntry + Send + Sync,
{
	/// Renders a backend token for people. May need a lookup.
	fn to_display<'a>(&'a self, raw: &'a str, config: &'a FilterConfig) -> BoxFuture<'a, String>;

	/// Turns user input back into a backend token.
	fn to_query_token(&self, display: &str, config: &FilterConfig) -> String;

	fn to_url_token(&self, raw: &str) -> String {
		encode_component(raw)
	}

	fn from_url_token(&self, token: &str) -> String {
		decode_component(token)
	}
}

pub(crate) fn encode_component(raw: &str) -> String {
	urlencoding::encode(raw).into_owned()
}

/// Percent-decodes a URL token. Input that is not valid UTF-8 once decoded is kept as written.
pub(crate) fn decode_component(token: &str) -> String {
	match urlencoding::decode(token) {
		Ok(decoded) => decoded.into_owned(),
		Err(err) => {
			tracing::debug!(token, error = %err, "URL token is not valid UTF-8.");

			token.to_string()
		},
	}
}

/// Quotes a plain value as a string token. Values that already look like tokens pass through.
pub(crate) fn quote_token(display: &str) -> String {
	let trimmed = display.trim();

	if is_token(trimmed) {
		return trimmed.to_string();
	}

	format!("\"{}\"", trimmed.replace('"', ""))
}

pub(crate) fn is_token(value: &str) -> bool {
	const FUNCTIONS: [&str; 7] = ["string(", "range(", "or(", "and(", "not(", "equals(", "any("];

	if value.starts_with(default::HEX_MARKER) {
		return true;
	}
	if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
		return true;
	}

	FUNCTIONS.iter().any(|function| {
		value.get(..function.len()).is_some_and(|head| head.eq_ignore_ascii_case(function))
			&& value.ends_with(')')
	})
}
