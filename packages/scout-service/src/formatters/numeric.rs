use crate::{
	BoxFuture,
	formatters::{FilterFormatter, default, quote_token},
	state::{FilterConfig, NumberFormat},
};
use scout_domain::RegistryEntry;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Numeric ranges such as file size or price, as picked with a slider.
#[derive(Debug, Default)]
pub struct NumericFormatter;
impl RegistryEntry for NumericFormatter {
	fn id(&self) -> &str {
		"slider"
	}
}
impl FilterFormatter for NumericFormatter {
	fn to_display<'a>(&'a self, raw: &'a str, config: &'a FilterConfig) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let Some((low, high)) = parse_range(raw) else {
				return default::plain_value(raw);
			};
			let format = |value: f64| format_number(value, config);

			match (low, high) {
				(Some(low), Some(high)) => format!("{} – {}", format(low), format(high)),
				(Some(low), None) => format!("≥ {}", format(low)),
				(None, Some(high)) => format!("≤ {}", format(high)),
				(None, None) => default::plain_value(raw),
			}
		})
	}

	/// Accepts `a..b` with either side left blank.
	fn to_query_token(&self, display: &str, _config: &FilterConfig) -> String {
		let Some((low, high)) = display.trim().split_once("..") else {
			return quote_token(display);
		};
		let low = parse_bound(low);
		let high = parse_bound(high);

		match (low, high) {
			(Ok(low), Ok(high)) if low.is_some() || high.is_some() => build_range(low, high),
			_ => quote_token(display),
		}
	}
}

pub fn build_range(low: Option<f64>, high: Option<f64>) -> String {
	let low = low.map_or_else(|| "min".to_string(), |value| format!("decimal({value})"));
	let high = high.map_or_else(|| "max".to_string(), |value| format!("decimal({value})"));

	format!("range({low}, {high})")
}

/// Parses `range(decimal(a), decimal(b))`. `min`/`max` leave a side open.
pub fn parse_range(raw: &str) -> Option<(Option<f64>, Option<f64>)> {
	let inner = default::strip_call(raw.trim(), "range")?;
	let (low, high) = inner.split_once(',')?;

	Some((parse_argument(low, "min")?, parse_argument(high, "max")?))
}

fn parse_argument(raw: &str, open: &str) -> Option<Option<f64>> {
	let raw = raw.trim();

	if raw.eq_ignore_ascii_case(open) {
		return Some(None);
	}

	let number = ["decimal", "int", "float", "double"]
		.iter()
		.find_map(|name| default::strip_call(raw, name))
		.unwrap_or(raw);

	number.trim().parse::<f64>().ok().filter(|value| value.is_finite()).map(Some)
}

fn parse_bound(raw: &str) -> Result<Option<f64>, ()> {
	let raw = raw.trim();

	if raw.is_empty() {
		return Ok(None);
	}

	raw.parse::<f64>().ok().filter(|value| value.is_finite()).map(Some).ok_or(())
}

pub fn format_number(value: f64, config: &FilterConfig) -> String {
	match config.number_format {
		NumberFormat::Number => trim_decimal(value),
		NumberFormat::Bytes => format_bytes(value),
		NumberFormat::Currency => format!("{}{value:.2}", config.currency_symbol),
	}
}

fn format_bytes(value: f64) -> String {
	let mut scaled = value;
	let mut unit = 0;

	while scaled.abs() >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
		scaled /= 1024.0;
		unit += 1;
	}

	if unit == 0 {
		return format!("{} {}", trim_decimal(scaled.round()), BYTE_UNITS[0]);
	}
	if scaled.abs() < 10.0 {
		return format!("{scaled:.1} {}", BYTE_UNITS[unit]);
	}

	format!("{scaled:.0} {}", BYTE_UNITS[unit])
}

fn trim_decimal(value: f64) -> String {
	if value.fract() == 0.0 {
		return format!("{value:.0}");
	}

	let formatted = format!("{value:.2}");

	formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}
