use serde_json::Value;

use crate::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileRecord {
	pub display_name: Option<String>,
	pub preferred_name: Option<String>,
}

pub async fn fetch_profile(cfg: &scout_config::ProviderConfig, claim: &str) -> Result<ProfileRecord> {
	let client = crate::client(cfg)?;
	let res = client
		.get(crate::endpoint(cfg, Some(claim))?)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_profile_response(&json))
}

fn parse_profile_response(json: &Value) -> ProfileRecord {
	let display_name = first_string(json, &["displayName", "DisplayName"]);
	let preferred_name = first_string(json, &["preferredName", "PreferredName"])
		.or_else(|| profile_property(json, "PreferredName"));

	ProfileRecord { display_name, preferred_name }
}

fn first_string(json: &Value, keys: &[&str]) -> Option<String> {
	keys.iter()
		.filter_map(|key| json.get(*key).and_then(Value::as_str))
		.map(str::trim)
		.find(|value| !value.is_empty())
		.map(str::to_string)
}

fn profile_property(json: &Value, key: &str) -> Option<String> {
	json.get("UserProfileProperties")?
		.as_array()?
		.iter()
		.find(|entry| entry.get("Key").and_then(Value::as_str) == Some(key))?
		.get("Value")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(str::to_string)
}
