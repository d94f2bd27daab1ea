//! Address-bar encoding of a [`UrlSnapshot`].
//!
//! Keys are short and optionally namespaced as `<prefix>.<key>`. Defaults are left out, and
//! parameters that belong to anyone else survive every write untouched.

use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::{
	state::SortSpec,
	url_sync::{UrlOptions, UrlSnapshot},
};
use scout_domain::{ActiveFilter, FilterOperator};

pub const SCHEMA_VERSION: &str = "1";

const KEY_VERSION: &str = "sv";
const KEY_QUERY: &str = "q";
const KEY_FILTERS: &str = "f";
const KEY_VERTICAL: &str = "v";
const KEY_SORT: &str = "s";
const KEY_PAGE: &str = "p";
const KEY_SCOPE: &str = "sc";
const KEY_LAYOUT: &str = "l";
const KEYS: [&str; 8] =
	[KEY_VERSION, KEY_QUERY, KEY_FILTERS, KEY_VERTICAL, KEY_SORT, KEY_PAGE, KEY_SCOPE, KEY_LAYOUT];

/// Outcome of validating one decoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<T> {
	Valid(T),
	Invalid(String),
}
impl<T> Decoded<T> {
	pub fn valid(self) -> Option<T> {
		match self {
			Self::Valid(value) => Some(value),
			Self::Invalid(_) => None,
		}
	}
}

/// Session state read back from the address bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlStatePatch {
	pub query_text: String,
	/// `None` when the encoded list held no usable entry; the current filters are kept.
	pub filters: Option<Vec<ActiveFilter>>,
	pub vertical_key: Option<String>,
	pub sort: Option<SortSpec>,
	pub page: u32,
	pub scope_id: Option<String>,
	pub layout_key: String,
}

/// Rewrites `existing` with this session's keys set from `snapshot`. The result has no
/// leading `?`.
pub fn encode(snapshot: &UrlSnapshot, existing: &str, options: &UrlOptions) -> String {
	let mut serializer = form_urlencoded::Serializer::new(String::new());

	for (key, value) in form_urlencoded::parse(trim_query(existing).as_bytes()) {
		if !is_own_key(&key, options) {
			serializer.append_pair(&key, &value);
		}
	}

	serializer.append_pair(&options.key(KEY_VERSION), SCHEMA_VERSION);

	if !snapshot.query_text.is_empty() {
		serializer.append_pair(&options.key(KEY_QUERY), &snapshot.query_text);
	}
	if !snapshot.filters.is_empty() {
		match encode_filters(&snapshot.filters) {
			Some(encoded) => {
				serializer.append_pair(&options.key(KEY_FILTERS), &encoded);
			},
			None => tracing::warn!(key = %options.key(KEY_FILTERS), "Active filters could not be encoded."),
		}
	}
	if let Some(vertical_key) = &snapshot.vertical_key {
		serializer.append_pair(&options.key(KEY_VERTICAL), vertical_key);
	}
	if let Some(sort) = &snapshot.sort {
		serializer.append_pair(&options.key(KEY_SORT), &sort.to_param());
	}
	if snapshot.page >= 2 {
		serializer.append_pair(&options.key(KEY_PAGE), &snapshot.page.to_string());
	}
	if let Some(scope_id) = &snapshot.scope_id {
		serializer.append_pair(&options.key(KEY_SCOPE), scope_id);
	}
	if snapshot.layout_key != options.default_layout {
		serializer.append_pair(&options.key(KEY_LAYOUT), &snapshot.layout_key);
	}

	serializer.finish()
}

/// Reads this session's keys from `query`. Returns `None` when the version key is absent or
/// unknown, meaning the address carries no state for this session.
pub fn decode(query: &str, options: &UrlOptions) -> Option<UrlStatePatch> {
	let pairs: Vec<(String, String)> = form_urlencoded::parse(trim_query(query).as_bytes())
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect();
	let get = |key: &str| {
		let key = options.key(key);

		pairs.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
	};

	match get(KEY_VERSION) {
		Some(SCHEMA_VERSION) => {},
		Some(other) => {
			tracing::debug!(version = other, "Unsupported URL state version ignored.");

			return None;
		},
		None => return None,
	}

	let filters = match get(KEY_FILTERS) {
		None => Some(Vec::new()),
		Some(raw) => match decode_filters(raw) {
			Decoded::Valid(filters) => Some(filters),
			Decoded::Invalid(reason) => {
				tracing::warn!(key = %options.key(KEY_FILTERS), reason = %reason, "URL filters ignored.");

				None
			},
		},
	};
	let sort = get(KEY_SORT).and_then(|raw| {
		let sort = SortSpec::parse(raw);

		if sort.is_none() {
			tracing::debug!(value = raw, "URL sort ignored.");
		}

		sort
	});
	let page = get(KEY_PAGE).and_then(|raw| raw.trim().parse::<u32>().ok()).filter(|page| *page >= 1);

	Some(UrlStatePatch {
		query_text: get(KEY_QUERY).unwrap_or_default().to_string(),
		filters,
		vertical_key: non_blank(get(KEY_VERTICAL)),
		sort,
		page: page.unwrap_or(1),
		scope_id: non_blank(get(KEY_SCOPE)),
		layout_key: non_blank(get(KEY_LAYOUT)).unwrap_or_else(|| options.default_layout.clone()),
	})
}

pub fn encode_filters(filters: &[ActiveFilter]) -> Option<String> {
	let json = serde_json::to_vec(filters).ok()?;

	Some(URL_SAFE_NO_PAD.encode(json))
}

/// Decodes the filter list, dropping malformed entries one by one. An empty result is invalid.
pub fn decode_filters(raw: &str) -> Decoded<Vec<ActiveFilter>> {
	let raw = raw.trim();
	let bytes = match [URL_SAFE_NO_PAD, URL_SAFE, STANDARD].iter().find_map(|engine| engine.decode(raw).ok()) {
		Some(bytes) => bytes,
		None => return Decoded::Invalid("payload is not base64".to_string()),
	};
	let entries = match serde_json::from_slice::<Value>(&bytes) {
		Ok(Value::Array(entries)) => entries,
		Ok(_) => return Decoded::Invalid("payload is not a JSON array".to_string()),
		Err(err) => return Decoded::Invalid(format!("payload is not JSON: {err}")),
	};
	let mut filters = Vec::with_capacity(entries.len());

	for (index, entry) in entries.iter().enumerate() {
		match decode_filter(entry) {
			Decoded::Valid(filter) => filters.push(filter),
			Decoded::Invalid(reason) => {
				tracing::debug!(index, reason = %reason, "URL filter entry rejected.");
			},
		}
	}

	if filters.is_empty() {
		return Decoded::Invalid("no valid filter entries".to_string());
	}

	Decoded::Valid(filters)
}

pub fn decode_filter(entry: &Value) -> Decoded<ActiveFilter> {
	let Some(object) = entry.as_object() else {
		return Decoded::Invalid("entry is not an object".to_string());
	};
	let field = |name: &str| object.get(name).and_then(Value::as_str);
	let Some(filter_name) = field("filterName").map(str::trim).filter(|name| !name.is_empty()) else {
		return Decoded::Invalid("filterName is missing".to_string());
	};
	let Some(value) = field("value") else {
		return Decoded::Invalid("value is missing".to_string());
	};
	let Some(raw_operator) = field("operator") else {
		return Decoded::Invalid("operator is missing".to_string());
	};
	let Some(operator) = FilterOperator::parse(raw_operator) else {
		return Decoded::Invalid(format!("operator '{raw_operator}' is not AND or OR"));
	};

	Decoded::Valid(ActiveFilter::new(filter_name, value, operator))
}

fn is_own_key(key: &str, options: &UrlOptions) -> bool {
	KEYS.iter().any(|own| options.key(own) == key)
}

fn trim_query(query: &str) -> &str {
	query.strip_prefix('?').unwrap_or(query)
}

fn non_blank(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
