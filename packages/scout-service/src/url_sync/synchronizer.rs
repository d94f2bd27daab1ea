use std::time::Duration;

use tokio::time::Instant;

use crate::{
	AddressBar,
	state::SessionState,
	url_sync::{UrlOptions, UrlSnapshot, UrlStatePatch, codec},
};

/// Debounce bookkeeping for one session namespace.
///
/// Holds at most one pending snapshot. A newer change replaces it and pushes the deadline out,
/// so a burst of changes ends in a single write of the last state.
#[derive(Debug)]
pub struct UrlSynchronizer {
	options: UrlOptions,
	debounce: Duration,
	last_written: Option<UrlSnapshot>,
	pending: Option<Pending>,
}
impl UrlSynchronizer {
	pub fn new(options: UrlOptions, debounce: Duration) -> Self {
		Self { options, debounce, last_written: None, pending: None }
	}

	pub fn options(&self) -> &UrlOptions {
		&self.options
	}

	/// Records a published state. Returns whether a write is now pending.
	pub fn observe(&mut self, state: &SessionState, now: Instant) -> bool {
		let snapshot = UrlSnapshot::from_state(state);

		if self.last_written.as_ref() == Some(&snapshot) {
			// Back to what the address already shows.
			self.pending = None;

			return false;
		}
		if self.pending.as_ref().is_some_and(|pending| pending.snapshot == snapshot) {
			return true;
		}

		self.pending = Some(Pending { snapshot, deadline: now + self.debounce });

		true
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.pending.as_ref().map(|pending| pending.deadline)
	}

	/// Writes the pending snapshot once its deadline has passed.
	pub fn fire(&mut self, now: Instant, address_bar: &dyn AddressBar) -> bool {
		if !self.pending.as_ref().is_some_and(|pending| pending.deadline <= now) {
			return false;
		}

		self.flush(address_bar)
	}

	/// Writes the pending snapshot now, if any.
	pub fn flush(&mut self, address_bar: &dyn AddressBar) -> bool {
		let Some(pending) = self.pending.take() else {
			return false;
		};

		self.write(pending.snapshot, address_bar)
	}

	/// Reads the address. `None` means it carries no state for this namespace.
	pub fn read(&mut self, address_bar: &dyn AddressBar) -> Option<UrlStatePatch> {
		codec::decode(&address_bar.query(), &self.options)
	}

	/// Treats `state` as already shown by the address and drops any pending write.
	pub fn mark_synced(&mut self, state: &SessionState) {
		self.last_written = Some(UrlSnapshot::from_state(state));
		self.pending = None;
	}

	/// The address carries no state for this namespace. A state other than the defaults is
	/// scheduled for writing so it survives a reload.
	pub fn adopt_empty_address(&mut self, state: &SessionState, now: Instant) -> bool {
		let snapshot = UrlSnapshot::from_state(state);

		self.pending = None;

		if snapshot.is_default(&self.options) {
			self.last_written = Some(snapshot);

			return false;
		}

		self.last_written = None;

		self.observe(state, now)
	}

	fn write(&mut self, snapshot: UrlSnapshot, address_bar: &dyn AddressBar) -> bool {
		let current = address_bar.query();
		let next = codec::encode(&snapshot, &current, &self.options);
		let changed = next != current.strip_prefix('?').unwrap_or(&current);

		if changed {
			address_bar.replace_query(&next);

			tracing::debug!(query = %next, "Address updated.");
		}

		self.last_written = Some(snapshot);

		changed
	}
}

#[derive(Debug)]
struct Pending {
	snapshot: UrlSnapshot,
	deadline: Instant,
}
