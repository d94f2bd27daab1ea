use std::{collections::HashSet, sync::Arc};

use crate::{
	BoxFuture, TermInfo, TermLookup,
	formatters::{FilterFormatter, LabelCache, default, quote_token},
	state::FilterConfig,
};
use scout_domain::RegistryEntry;

pub const UNKNOWN_TERM: &str = "(Unknown term)";

const PATH_SEPARATOR: &str = " > ";
const MAX_PATH_DEPTH: usize = 16;

/// Managed-metadata terms. Tokens carry the term id; labels come from the term store.
pub struct TaxonomyFormatter {
	lookup: Arc<dyn TermLookup>,
	cache: LabelCache<TermInfo>,
}
impl TaxonomyFormatter {
	pub fn new(lookup: Arc<dyn TermLookup>) -> Self {
		Self { lookup, cache: LabelCache::new() }
	}

	pub fn cache(&self) -> &LabelCache<TermInfo> {
		&self.cache
	}

	async fn term(&self, term_id: &str) -> crate::Result<TermInfo> {
		self.cache.get_or_resolve(term_id, || self.lookup.resolve_term(term_id)).await
	}

	async fn label_path(&self, term_id: &str, full_path: bool) -> String {
		let leaf = match self.term(term_id).await {
			Ok(info) => info,
			Err(err) => {
				tracing::debug!(term_id, error = %err, "Term lookup failed.");

				return UNKNOWN_TERM.to_string();
			},
		};

		if !full_path {
			return leaf.label;
		}

		let mut labels = vec![leaf.label];
		let mut visited = HashSet::from([term_id.to_string()]);
		let mut parent = leaf.parent_id;

		while let Some(parent_id) = parent.take() {
			let parent_id = parent_id.to_ascii_lowercase();

			if labels.len() >= MAX_PATH_DEPTH || !visited.insert(parent_id.clone()) {
				tracing::debug!(term_id, parent_id = %parent_id, "Term path walk stopped.");

				break;
			}

			match self.term(&parent_id).await {
				Ok(info) => {
					labels.push(info.label);

					parent = info.parent_id;
				},
				Err(err) => {
					// The path stays partial; the leaf label is still meaningful.
					tracing::debug!(term_id = %parent_id, error = %err, "Parent term lookup failed.");
				},
			}
		}

		labels.reverse();

		labels.join(PATH_SEPARATOR)
	}
}
impl RegistryEntry for TaxonomyFormatter {
	fn id(&self) -> &str {
		"taxonomy"
	}
}
impl FilterFormatter for TaxonomyFormatter {
	fn to_display<'a>(&'a self, raw: &'a str, config: &'a FilterConfig) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let plain = default::plain_value(raw);

			match find_guid(&plain) {
				Some(term_id) => self.label_path(&term_id, config.show_full_path).await,
				None => plain,
			}
		})
	}

	fn to_query_token(&self, display: &str, _config: &FilterConfig) -> String {
		match find_guid(&default::plain_value(display)) {
			Some(term_id) => format!("\"GP0|#{term_id}\""),
			None => quote_token(display),
		}
	}
}

/// The first `8-4-4-4-12` hex group in `value`, lowercased.
pub fn find_guid(value: &str) -> Option<String> {
	const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
	const LEN: usize = 36;

	let bytes = value.as_bytes();

	if bytes.len() < LEN {
		return None;
	}

	(0..=bytes.len() - LEN).find_map(|start| {
		let candidate = &bytes[start..start + LEN];
		let mut offset = 0;

		for (index, group) in GROUPS.iter().enumerate() {
			if !candidate[offset..offset + group].iter().all(u8::is_ascii_hexdigit) {
				return None;
			}

			offset += group;

			if index < GROUPS.len() - 1 {
				if candidate[offset] != b'-' {
					return None;
				}

				offset += 1;
			}
		}

		// Reject a match that is part of a longer hex run.
		let before = start.checked_sub(1).map(|index| bytes[index]);
		let after = bytes.get(start + LEN).copied();

		if before.is_some_and(|byte| byte.is_ascii_hexdigit())
			|| after.is_some_and(|byte| byte.is_ascii_hexdigit())
		{
			return None;
		}

		std::str::from_utf8(candidate).ok().map(str::to_ascii_lowercase)
	})
}
