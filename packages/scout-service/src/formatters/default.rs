use crate::{
	BoxFuture,
	formatters::{DEFAULT_FILTER_TYPE, FilterFormatter, quote_token},
	state::FilterConfig,
};
use scout_domain::RegistryEntry;

/// Prefix of refinement tokens that carry their value as hex-encoded UTF-8.
pub(crate) const HEX_MARKER: &str = "ǂǂ";

#[derive(Debug, Default)]
pub struct DefaultFormatter;
impl RegistryEntry for DefaultFormatter {
	fn id(&self) -> &str {
		DEFAULT_FILTER_TYPE
	}
}
impl FilterFormatter for DefaultFormatter {
	fn to_display<'a>(&'a self, raw: &'a str, _config: &'a FilterConfig) -> BoxFuture<'a, String> {
		Box::pin(async move { plain_value(raw) })
	}

	fn to_query_token(&self, display: &str, _config: &FilterConfig) -> String {
		quote_token(display)
	}
}

/// Strips the wrappers a backend token may carry: `string("...")`, a hex marker, quotes.
pub(crate) fn plain_value(raw: &str) -> String {
	let mut value = raw.trim();

	if let Some(inner) = strip_call(value, "string") {
		value = inner.trim();
	}

	let value = unquote(value);

	if let Some(hex) = value.strip_prefix(HEX_MARKER) {
		if let Some(decoded) = decode_hex(hex) {
			return unquote(&decoded).to_string();
		}

		tracing::debug!(token = %raw, "Hex refinement token is malformed.");
	}

	value.to_string()
}

/// Returns the argument text of `name(...)`, matching the name without case.
pub(crate) fn strip_call<'a>(value: &'a str, name: &str) -> Option<&'a str> {
	let head = value.get(..name.len())?;

	if !head.eq_ignore_ascii_case(name) {
		return None;
	}

	value[name.len()..].trim_start().strip_prefix('(')?.strip_suffix(')')
}

pub(crate) fn unquote(value: &str) -> &str {
	value
		.strip_prefix('"')
		.and_then(|inner| inner.strip_suffix('"'))
		.unwrap_or(value)
}

fn decode_hex(hex: &str) -> Option<String> {
	if hex.is_empty() || hex.len() % 2 != 0 || !hex.is_ascii() {
		return None;
	}

	let bytes = (0..hex.len())
		.step_by(2)
		.map(|index| u8::from_str_radix(&hex[index..index + 2], 16).ok())
		.collect::<Option<Vec<u8>>>()?;

	String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_value_strips_wrappers() {
		assert_eq!(plain_value("string(\"Annual report\")"), "Annual report");
		assert_eq!(plain_value("\"docx\""), "docx");
		assert_eq!(plain_value("docx"), "docx");
	}

	#[test]
	fn plain_value_decodes_hex_tokens() {
		// "Sales & Marketing"
		assert_eq!(
			plain_value("\"ǂǂ53616c65732026204d61726b6574696e67\""),
			"Sales & Marketing"
		);
		assert_eq!(plain_value("ǂǂzz"), "ǂǂzz");
	}

	#[tokio::test]
	async fn default_round_trip_quotes_plain_values() {
		let formatter = DefaultFormatter;
		let config = FilterConfig::new("FileType", DEFAULT_FILTER_TYPE);
		let token = formatter.to_query_token("pptx", &config);

		assert_eq!(token, "\"pptx\"");
		assert_eq!(formatter.to_display(&token, &config).await, "pptx");
		assert_eq!(formatter.from_url_token(&formatter.to_url_token(&token)), token);
	}
}
