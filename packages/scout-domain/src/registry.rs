//! Named collections of extension points keyed by identifier.
//!
//! A registry moves from a configuration phase, where surfaces register providers in no
//! guaranteed order, to a running phase after [`Registry::freeze`]. Misuse in either phase is
//! reported through `tracing` and never fails the caller.

use std::{
	collections::HashMap,
	fmt::{Debug, Formatter},
	sync::{Arc, PoisonError, RwLock},
};

pub trait RegistryEntry {
	fn id(&self) -> &str;
}

/// What a call to [`Registry::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
	Registered,
	Replaced,
	/// The id was taken and `force` was not set; the first entry stays.
	Duplicate,
	/// The registry was frozen; nothing changed.
	Frozen,
}
impl Registration {
	pub fn is_applied(self) -> bool {
		matches!(self, Self::Registered | Self::Replaced)
	}
}

pub struct Registry<T>
where
	T: ?Sized,
{
	name: &'static str,
	inner: RwLock<Entries<T>>,
}
impl<T> Registry<T>
where
	T: ?Sized + RegistryEntry,
{
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			inner: RwLock::new(Entries { items: Vec::new(), index: HashMap::new(), frozen: false }),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn register(&self, item: Arc<T>, force: bool) -> Registration {
		let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
		let id = item.id().to_string();

		if inner.frozen {
			tracing::warn!(registry = self.name, id = %id, "Registration after freeze ignored.");

			return Registration::Frozen;
		}

		match inner.index.get(&id).copied() {
			Some(position) if force => {
				inner.items[position] = item;

				tracing::debug!(registry = self.name, id = %id, "Registry entry replaced.");

				Registration::Replaced
			},
			Some(_) => {
				tracing::warn!(
					registry = self.name,
					id = %id,
					"Duplicate registration ignored; the first entry wins."
				);

				Registration::Duplicate
			},
			None => {
				let position = inner.items.len();

				inner.items.push(item);
				inner.index.insert(id, position);

				Registration::Registered
			},
		}
	}

	pub fn get(&self, id: &str) -> Option<Arc<T>> {
		let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

		inner.index.get(id).map(|position| inner.items[*position].clone())
	}

	/// Entries in first-registration order.
	pub fn get_all(&self) -> Vec<Arc<T>> {
		self.inner.read().unwrap_or_else(PoisonError::into_inner).items.clone()
	}

	pub fn len(&self) -> usize {
		self.inner.read().unwrap_or_else(PoisonError::into_inner).items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn freeze(&self) {
		let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

		if !inner.frozen {
			inner.frozen = true;

			tracing::debug!(registry = self.name, entries = inner.items.len(), "Registry frozen.");
		}
	}

	pub fn is_frozen(&self) -> bool {
		self.inner.read().unwrap_or_else(PoisonError::into_inner).frozen
	}
}
impl<T> Debug for Registry<T>
where
	T: ?Sized,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

		f.debug_struct("Registry")
			.field("name", &self.name)
			.field("entries", &inner.items.len())
			.field("frozen", &inner.frozen)
			.finish()
	}
}

struct Entries<T>
where
	T: ?Sized,
{
	items: Vec<Arc<T>>,
	index: HashMap<String, usize>,
	frozen: bool,
}
