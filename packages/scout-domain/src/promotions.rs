//! Editorial promotion rules evaluated against the live query.

use std::collections::HashSet;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const REGEX_SIZE_LIMIT: usize = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
	/// Case-insensitive substring.
	Contains,
	/// Case-insensitive whole-query equality.
	Equals,
	/// Case-insensitive pattern; an invalid pattern never matches.
	Regex,
	/// Every whitespace-separated term of the match value appears in the query. This is an
	/// AND-of-substrings approximation, not a query-language parser.
	Kql,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRule {
	pub id: String,
	#[serde(default)]
	pub title: String,
	#[serde(default = "default_active")]
	pub is_active: bool,
	pub match_type: MatchType,
	pub match_value: String,
	#[serde(default, with = "crate::time_serde::option")]
	pub start_date: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub end_date: Option<OffsetDateTime>,
	/// Vertical keys the rule applies to; empty means every vertical.
	#[serde(default)]
	pub vertical_scope: Vec<String>,
	/// Group ids allowed to see the rule; empty means everyone.
	#[serde(default)]
	pub audience_groups: Vec<String>,
	#[serde(default)]
	pub items: Vec<PromotedItem>,
}
impl PromotionRule {
	fn is_live(&self, now: OffsetDateTime) -> bool {
		self.start_date.is_none_or(|start| start <= now) && self.end_date.is_none_or(|end| now <= end)
	}

	fn in_vertical(&self, vertical: Option<&str>) -> bool {
		if self.vertical_scope.is_empty() {
			return true;
		}

		vertical.is_some_and(|current| {
			self.vertical_scope.iter().any(|key| key.eq_ignore_ascii_case(current))
		})
	}

	fn visible_to(&self, user_groups: &[String]) -> bool {
		if self.audience_groups.is_empty() {
			return true;
		}

		self.audience_groups
			.iter()
			.any(|group| user_groups.iter().any(|user_group| user_group.eq_ignore_ascii_case(group)))
	}

	fn matches(&self, query_text: &str) -> bool {
		let needle = self.match_value.trim();

		if needle.is_empty() {
			return false;
		}

		let query = query_text.trim().to_lowercase();

		match self.match_type {
			MatchType::Contains => query.contains(&needle.to_lowercase()),
			MatchType::Equals => query == needle.to_lowercase(),
			MatchType::Regex => match RegexBuilder::new(needle)
				.case_insensitive(true)
				.size_limit(REGEX_SIZE_LIMIT)
				.build()
			{
				Ok(re) => re.is_match(query_text.trim()),
				Err(err) => {
					tracing::debug!(rule_id = %self.id, error = %err, "Promotion rule pattern is invalid.");

					false
				},
			},
			MatchType::Kql => needle
				.split_whitespace()
				.all(|term| query.contains(&term.to_lowercase())),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotedItem {
	pub url: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub image_url: Option<String>,
	/// Lower positions are shown first.
	#[serde(default)]
	pub position: i32,
}

pub fn evaluate(
	rules: &[PromotionRule],
	query_text: &str,
	vertical: Option<&str>,
	max_results: usize,
	user_groups: &[String],
) -> Vec<PromotedItem> {
	evaluate_at(rules, query_text, vertical, max_results, user_groups, OffsetDateTime::now_utc())
}

/// Pools items of every matching rule, orders them by position, drops repeated URLs, and caps
/// the list at `max_results`.
pub fn evaluate_at(
	rules: &[PromotionRule],
	query_text: &str,
	vertical: Option<&str>,
	max_results: usize,
	user_groups: &[String],
	now: OffsetDateTime,
) -> Vec<PromotedItem> {
	let query = query_text.trim();

	if query.is_empty() || query == "*" || max_results == 0 {
		return Vec::new();
	}

	let mut pooled: Vec<&PromotedItem> = rules
		.iter()
		.filter(|rule| {
			rule.is_active
				&& rule.is_live(now)
				&& rule.in_vertical(vertical)
				&& rule.visible_to(user_groups)
				&& rule.matches(query)
		})
		.flat_map(|rule| rule.items.iter())
		.collect();

	pooled.sort_by_key(|item| item.position);

	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(max_results.min(pooled.len()));

	for item in pooled {
		if out.len() >= max_results {
			break;
		}
		if seen.insert(url_key(&item.url)) {
			out.push(item.clone());
		}
	}

	out
}

/// URLs compare without case and without a trailing slash.
pub fn url_key(url: &str) -> String {
	url.trim().trim_end_matches('/').to_lowercase()
}

fn default_active() -> bool {
	true
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn item(url: &str, position: i32) -> PromotedItem {
		PromotedItem {
			url: url.to_string(),
			title: url.to_string(),
			description: String::new(),
			image_url: None,
			position,
		}
	}

	fn rule(id: &str, match_type: MatchType, match_value: &str, items: Vec<PromotedItem>) -> PromotionRule {
		PromotionRule {
			id: id.to_string(),
			title: id.to_string(),
			is_active: true,
			match_type,
			match_value: match_value.to_string(),
			start_date: None,
			end_date: None,
			vertical_scope: Vec::new(),
			audience_groups: Vec::new(),
			items,
		}
	}

	fn now() -> OffsetDateTime {
		datetime!(2024-06-01 12:00 UTC)
	}

	#[test]
	fn ranks_by_position_and_collapses_duplicate_urls() {
		let rules = vec![
			rule("a", MatchType::Contains, "holiday", vec![item("https://x/c", 3)]),
			rule("b", MatchType::Contains, "holiday", vec![item("https://x/a", 1)]),
			rule("c", MatchType::Contains, "holiday", vec![item("https://x/b", 2), item("https://X/a/", 4)]),
		];
		let out = evaluate_at(&rules, "Holiday calendar", None, 10, &[], now());
		let urls: Vec<_> = out.iter().map(|item| item.url.as_str()).collect();

		assert_eq!(urls, vec!["https://x/a", "https://x/b", "https://x/c"]);

		let capped = evaluate_at(&rules, "Holiday calendar", None, 2, &[], now());

		assert_eq!(capped.len(), 2);
	}

	#[test]
	fn blank_and_wildcard_queries_short_circuit() {
		let rules = vec![rule("a", MatchType::Regex, ".*", vec![item("https://x/a", 1)])];

		assert!(evaluate_at(&rules, "  ", None, 5, &[], now()).is_empty());
		assert!(evaluate_at(&rules, "*", None, 5, &[], now()).is_empty());
	}

	#[test]
	fn match_types() {
		let contains = rule("c", MatchType::Contains, "PAY", vec![]);
		let equals = rule("e", MatchType::Equals, "payroll", vec![]);
		let regex = rule("r", MatchType::Regex, "^pay(roll|slip)$", vec![]);
		let broken = rule("b", MatchType::Regex, "pay(", vec![]);
		let kql = rule("k", MatchType::Kql, "expense  report", vec![]);

		assert!(contains.matches("monthly payroll"));
		assert!(equals.matches("  PayRoll "));
		assert!(!equals.matches("payroll 2024"));
		assert!(regex.matches("PAYSLIP"));
		assert!(!broken.matches("pay("));
		assert!(kql.matches("Report on expense claims"));
		assert!(!kql.matches("expense claims"));
	}

	#[test]
	fn audience_targeting_fails_closed() {
		let mut targeted = rule("t", MatchType::Contains, "benefits", vec![item("https://x/hr", 1)]);

		targeted.audience_groups = vec!["grp-hr".to_string()];

		let rules = vec![targeted];

		assert!(evaluate_at(&rules, "benefits", None, 5, &[], now()).is_empty());
		assert!(
			evaluate_at(&rules, "benefits", None, 5, &["grp-sales".to_string()], now()).is_empty()
		);
		assert_eq!(
			evaluate_at(&rules, "benefits", None, 5, &["GRP-HR".to_string()], now()).len(),
			1
		);
	}

	#[test]
	fn validity_window_and_vertical_scope() {
		let mut expired = rule("x", MatchType::Contains, "news", vec![item("https://x/old", 1)]);

		expired.end_date = Some(datetime!(2024-05-31 23:59 UTC));

		let mut upcoming = rule("u", MatchType::Contains, "news", vec![item("https://x/new", 1)]);

		upcoming.start_date = Some(datetime!(2024-06-02 00:00 UTC));

		let mut scoped = rule("s", MatchType::Contains, "news", vec![item("https://x/docs", 1)]);

		scoped.vertical_scope = vec!["documents".to_string()];

		let mut inactive = rule("i", MatchType::Contains, "news", vec![item("https://x/off", 1)]);

		inactive.is_active = false;

		let rules = vec![expired, upcoming, scoped, inactive];

		assert!(evaluate_at(&rules, "news", Some("people"), 5, &[], now()).is_empty());
		assert!(evaluate_at(&rules, "news", None, 5, &[], now()).is_empty());

		let out = evaluate_at(&rules, "news", Some("Documents"), 5, &[], now());

		assert_eq!(out.len(), 1);
		assert_eq!(out[0].url, "https://x/docs");
	}
}
