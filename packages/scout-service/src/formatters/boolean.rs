use crate::{
	BoxFuture,
	formatters::{FilterFormatter, default, quote_token},
	state::FilterConfig,
};
use scout_domain::RegistryEntry;

#[derive(Debug, Default)]
pub struct BooleanFormatter;
impl RegistryEntry for BooleanFormatter {
	fn id(&self) -> &str {
		"toggle"
	}
}
impl FilterFormatter for BooleanFormatter {
	fn to_display<'a>(&'a self, raw: &'a str, config: &'a FilterConfig) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let plain = default::plain_value(raw);

			match parse_flag(&plain) {
				Some(true) => config.true_label.clone(),
				Some(false) => config.false_label.clone(),
				None => plain,
			}
		})
	}

	fn to_query_token(&self, display: &str, config: &FilterConfig) -> String {
		let plain = default::plain_value(display);
		let flag = if plain.eq_ignore_ascii_case(config.true_label.trim()) {
			Some(true)
		} else if plain.eq_ignore_ascii_case(config.false_label.trim()) {
			Some(false)
		} else {
			parse_flag(&plain)
		};

		match flag {
			Some(true) => "\"1\"".to_string(),
			Some(false) => "\"0\"".to_string(),
			None => quote_token(display),
		}
	}
}

fn parse_flag(value: &str) -> Option<bool> {
	match value.trim() {
		"1" => Some(true),
		"0" => Some(false),
		other if other.eq_ignore_ascii_case("true") => Some(true),
		other if other.eq_ignore_ascii_case("false") => Some(false),
		_ => None,
	}
}
