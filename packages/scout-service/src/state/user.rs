use std::sync::Arc;

pub const MAX_RECENT_QUERIES: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct UserSlice {
	/// Opaque audience group ids supplied by the host.
	pub groups: Arc<Vec<String>>,
	pub display_name: Option<String>,
	pub email: Option<String>,
	/// Newest first.
	pub recent_queries: Vec<String>,
}
impl UserSlice {
	pub fn record_query(&mut self, query_text: &str) {
		let query_text = query_text.trim();

		if query_text.is_empty() || query_text == "*" {
			return;
		}

		self.recent_queries.retain(|existing| !existing.eq_ignore_ascii_case(query_text));
		self.recent_queries.insert(0, query_text.to_string());
		self.recent_queries.truncate(MAX_RECENT_QUERIES);
	}
}
