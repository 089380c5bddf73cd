// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing what the refresh loop has done so far.
#[derive(Debug, Default)]
pub struct RotationMetrics {
	adoptions: AtomicU64,
	refreshes: AtomicU64,
	refresh_failures: AtomicU64,
	persist_failures: AtomicU64,
	storage_read_failures: AtomicU64,
}
impl RotationMetrics {
	/// Returns how many peer-refreshed credentials were adopted from storage.
	pub fn adoptions(&self) -> u64 {
		self.adoptions.load(Ordering::Relaxed)
	}

	/// Returns how many refreshes were fetched and persisted.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns how many refresher calls failed.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failures.load(Ordering::Relaxed)
	}

	/// Returns how many refreshed credentials were discarded because persisting them failed.
	pub fn persist_failures(&self) -> u64 {
		self.persist_failures.load(Ordering::Relaxed)
	}

	/// Returns how many opportunistic storage re-reads failed.
	pub fn storage_read_failures(&self) -> u64 {
		self.storage_read_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_adoption(&self) {
		self.adoptions.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_persist_failure(&self) {
		self.persist_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_storage_read_failure(&self) {
		self.storage_read_failures.fetch_add(1, Ordering::Relaxed);
	}
}
