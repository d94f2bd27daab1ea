use serde_json::Value;

use crate::{Error, Result};

/// One taxonomy term as the term store reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermRecord {
	pub label: String,
	pub parent_id: Option<String>,
}

pub async fn fetch_term(cfg: &scout_config::ProviderConfig, term_id: &str) -> Result<TermRecord> {
	let client = crate::client(cfg)?;
	let res = client
		.get(crate::endpoint(cfg, Some(term_id))?)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_term_response(&json)
}

fn parse_term_response(json: &Value) -> Result<TermRecord> {
	let label = json
		.get("label")
		.and_then(Value::as_str)
		.or_else(|| default_label(json))
		.or_else(|| json.get("name").and_then(Value::as_str))
		.filter(|label| !label.trim().is_empty())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Term response is missing a label.".to_string(),
		})?;
	let parent_id = json
		.get("parentId")
		.and_then(Value::as_str)
		.or_else(|| json.get("parent").and_then(|parent| parent.get("id")).and_then(Value::as_str))
		.filter(|id| !id.trim().is_empty())
		.map(str::to_string);

	Ok(TermRecord { label: label.to_string(), parent_id })
}

fn default_label(json: &Value) -> Option<&str> {
	let labels = json.get("labels")?.as_array()?;
	let preferred = labels
		.iter()
		.find(|label| label.get("isDefault").and_then(Value::as_bool).unwrap_or(false))
		.or_else(|| labels.first())?;

	preferred.get("name").and_then(Value::as_str)
}
