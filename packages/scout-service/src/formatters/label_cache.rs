use std::{
	collections::HashMap,
	future::Future,
	sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::OnceCell;

use crate::Result;

/// Session-lifetime memo of lookup results keyed by identifier.
///
/// The cell for a key is created before the first lookup starts, so callers arriving while it
/// runs await the same cell instead of issuing their own call. A failed lookup leaves the cell
/// empty and the next caller retries.
pub struct LabelCache<V> {
	entries: Mutex<HashMap<String, Arc<OnceCell<V>>>>,
}
impl<V> LabelCache<V>
where
	V: Clone,
{
	pub fn new() -> Self {
		Self { entries: Mutex::new(HashMap::new()) }
	}

	pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> Result<V>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V>>,
	{
		let cell = {
			let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

			entries.entry(key.to_string()).or_default().clone()
		};

		cell.get_or_try_init(resolve).await.cloned()
	}

	/// The resolved value, without triggering a lookup.
	pub fn get(&self, key: &str) -> Option<V> {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

		entries.get(key).and_then(|cell| cell.get().cloned())
	}

	pub fn resolved_len(&self) -> usize {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

		entries.values().filter(|cell| cell.initialized()).count()
	}
}
impl<V> Default for LabelCache<V>
where
	V: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
