//! Thread-safe in-memory [`Storage`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	credential::Credential,
	store::{Storage, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<Credential>>>;

/// Thread-safe storage backend that keeps the credential in-process.
///
/// Clones share the same slot, so several providers built from clones behave like peers
/// pointed at one backing store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(Slot);
impl MemoryStorage {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store seeded with `credential`.
	pub fn with_credential(credential: Credential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}

	/// Returns the stored credential without going through the async contract.
	pub fn snapshot(&self) -> Option<Credential> {
		self.0.read().clone()
	}
}
impl Storage for MemoryStorage {
	fn get(&self) -> StoreFuture<'_, Credential> {
		let slot = self.0.clone();

		Box::pin(async move { slot.read().clone().ok_or(StoreError::NotFound) })
	}

	fn put(&self, credential: Credential) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(credential);

			Ok(())
		})
	}
}
