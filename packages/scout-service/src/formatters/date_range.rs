use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339, macros::format_description};

use crate::{
	BoxFuture,
	formatters::{FilterFormatter, default, quote_token},
	state::FilterConfig,
};
use scout_domain::{RegistryEntry, time_serde};

#[derive(Debug, Default)]
pub struct DateRangeFormatter;
impl RegistryEntry for DateRangeFormatter {
	fn id(&self) -> &str {
		"daterange"
	}
}
impl FilterFormatter for DateRangeFormatter {
	fn to_display<'a>(&'a self, raw: &'a str, _config: &'a FilterConfig) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let Some((from, to)) = parse_range(raw) else {
				return default::plain_value(raw);
			};

			match (from.map(format_date), to.map(format_date)) {
				(Some(from), Some(to)) => format!("{from} – {to}"),
				(Some(from), None) => format!("From {from}"),
				(None, Some(to)) => format!("Until {to}"),
				(None, None) => default::plain_value(raw),
			}
		})
	}

	/// Accepts `from..to` where each side is a date, a timestamp or blank.
	fn to_query_token(&self, display: &str, _config: &FilterConfig) -> String {
		let Some((from, to)) = display.trim().split_once("..") else {
			return quote_token(display);
		};

		match (parse_bound(from), parse_bound(to)) {
			(Ok(from), Ok(to)) if from.is_some() || to.is_some() => build_range(from, to),
			_ => quote_token(display),
		}
	}
}

pub fn build_range(from: Option<OffsetDateTime>, to: Option<OffsetDateTime>) -> String {
	let side = |value: Option<OffsetDateTime>, open: &str| {
		value
			.and_then(|value| value.to_offset(UtcOffset::UTC).format(&Rfc3339).ok())
			.map_or_else(|| open.to_string(), |iso| format!("datetime(\"{iso}\")"))
	};

	format!("range({}, {})", side(from, "min"), side(to, "max"))
}

/// Parses `range(datetime("iso"), datetime("iso"))` with `min`/`max` for open sides.
pub fn parse_range(raw: &str) -> Option<(Option<OffsetDateTime>, Option<OffsetDateTime>)> {
	let inner = default::strip_call(raw.trim(), "range")?;
	let (from, to) = inner.split_once(',')?;

	Some((parse_argument(from, "min")?, parse_argument(to, "max")?))
}

fn parse_argument(raw: &str, open: &str) -> Option<Option<OffsetDateTime>> {
	let raw = raw.trim();

	if raw.eq_ignore_ascii_case(open) {
		return Some(None);
	}

	let value = default::unquote(default::strip_call(raw, "datetime")?.trim());

	time_serde::parse(value).ok().map(Some)
}

fn parse_bound(raw: &str) -> Result<Option<OffsetDateTime>, String> {
	let raw = raw.trim();

	if raw.is_empty() {
		return Ok(None);
	}

	time_serde::parse(raw).map(Some)
}

fn format_date(value: OffsetDateTime) -> String {
	value
		.format(format_description!("[month repr:short] [day padding:none], [year]"))
		.unwrap_or_else(|_| value.date().to_string())
}
