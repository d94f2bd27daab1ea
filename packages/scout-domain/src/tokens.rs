//! Placeholder substitution for query templates.
//!
//! A placeholder is the text between a `{` and the first following `}` when that text holds no
//! other `{`. So `{a{b}c}` substitutes only `{b}`, and an unterminated `{` is copied verbatim.
//! Substituted values are never rescanned.

use time::{Date, Duration};

const MAX_DAY_OFFSET: i64 = 1_000_000;

/// Values available to `{...}` placeholders.
#[derive(Clone, Debug)]
pub struct TokenContext {
	pub query_text: String,
	pub site_id: Option<String>,
	pub site_url: Option<String>,
	pub web_id: Option<String>,
	pub web_url: Option<String>,
	pub hub_site_id: Option<String>,
	pub user_name: Option<String>,
	pub user_email: Option<String>,
	pub list_id: Option<String>,
	/// Local calendar date used by the `Today` family.
	pub today: Date,
}
impl TokenContext {
	pub fn new(today: Date) -> Self {
		Self {
			query_text: String::new(),
			site_id: None,
			site_url: None,
			web_id: None,
			web_url: None,
			hub_site_id: None,
			user_name: None,
			user_email: None,
			list_id: None,
			today,
		}
	}

	fn lookup(&self, name: &str) -> Option<String> {
		let known = [
			("searchTerms", Some(&self.query_text)),
			("Site.ID", self.site_id.as_ref()),
			("Site.URL", self.site_url.as_ref()),
			("Web.ID", self.web_id.as_ref()),
			("Web.URL", self.web_url.as_ref()),
			("Hub", self.hub_site_id.as_ref()),
			("User.Name", self.user_name.as_ref()),
			("User.Email", self.user_email.as_ref()),
			("PageContext.listId", self.list_id.as_ref()),
		];

		for (key, value) in known {
			if key.eq_ignore_ascii_case(name) {
				// Known placeholders without a value collapse to nothing.
				return Some(value.cloned().unwrap_or_default());
			}
		}

		resolve_today(name, self.today)
	}
}

pub fn resolve(template: &str, ctx: &TokenContext) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);

		let after = &rest[open + 1..];
		let Some(stop) = after.find(['{', '}']) else {
			out.push_str(&rest[open..]);

			return out;
		};

		if after[stop..].starts_with('{') {
			// Another `{` opens before this one closes; keep the outer text literally.
			out.push('{');
			out.push_str(&after[..stop]);

			rest = &after[stop..];

			continue;
		}

		let name = &after[..stop];

		match (!name.is_empty()).then(|| ctx.lookup(name.trim())).flatten() {
			Some(value) => out.push_str(&value),
			None => {
				out.push('{');
				out.push_str(name);
				out.push('}');
			},
		}

		rest = &after[stop + 1..];
	}

	out.push_str(rest);

	out
}

fn resolve_today(name: &str, today: Date) -> Option<String> {
	let prefix = name.get(..5)?;

	if !prefix.eq_ignore_ascii_case("today") {
		return None;
	}

	let offset = &name[5..];
	let days = if offset.is_empty() {
		0
	} else {
		let (negative, digits) = if let Some(digits) = offset.strip_prefix('+') {
			(false, digits)
		} else if let Some(digits) = offset.strip_prefix('-') {
			(true, digits)
		} else {
			return None;
		};

		if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
			return None;
		}

		let magnitude = digits.parse::<i64>().ok()?;

		if negative { -magnitude } else { magnitude }
	};

	if days.abs() > MAX_DAY_OFFSET {
		return None;
	}

	let date = today.checked_add(Duration::days(days))?;

	Some(format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()))
}
