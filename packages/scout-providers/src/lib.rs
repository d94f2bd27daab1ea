//! HTTP implementations of the collaborators a search session talks to: query execution,
//! term label lookup and people profile lookup.

pub mod error;
pub mod execution;
pub mod profiles;
pub mod terms;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if !api_key.trim().is_empty() {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn client(cfg: &scout_config::ProviderConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

/// Joins `api_base` and `path` and appends `segment` as one percent-encoded path segment.
pub(crate) fn endpoint(cfg: &scout_config::ProviderConfig, segment: Option<&str>) -> Result<url::Url> {
	let raw = format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path);
	let mut url = url::Url::parse(&raw).map_err(|err| Error::InvalidConfig {
		message: format!("Provider {} endpoint '{raw}' is invalid: {err}", cfg.provider_id),
	})?;

	if let Some(segment) = segment {
		url.path_segments_mut()
			.map_err(|_| Error::InvalidConfig {
				message: format!("Provider {} endpoint cannot take path segments.", cfg.provider_id),
			})?
			.pop_if_empty()
			.push(segment);
	}

	Ok(url)
}
