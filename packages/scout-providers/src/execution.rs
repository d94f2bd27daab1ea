use serde_json::Value;

use crate::Result;

/// Posts a compiled query and returns the backend's JSON body untouched.
pub async fn execute(cfg: &scout_config::ProviderConfig, body: &Value) -> Result<Value> {
	let client = crate::client(cfg)?;
	let res = client
		.post(crate::endpoint(cfg, None)?)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}
