//! Serde adapters for rule validity bounds.
//!
//! Bounds are written by editors, so a bare calendar date is accepted next to RFC 3339 and
//! means midnight UTC.

pub mod option;

use serde::{Deserialize, Deserializer, Serializer};
use time::{
	Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse(&raw).map_err(serde::de::Error::custom)
}

pub fn parse(raw: &str) -> Result<OffsetDateTime, String> {
	let trimmed = raw.trim();

	if let Ok(value) = OffsetDateTime::parse(trimmed, &Rfc3339) {
		return Ok(value);
	}

	Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
		.map(|date| date.midnight().assume_utc())
		.map_err(|_| format!("'{trimmed}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date."))
}
