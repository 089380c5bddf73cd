//! Storage contract and built-in backends persisting the rotated credential.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

// self
use crate::{_prelude::*, credential::Credential};

/// Boxed future returned by [`Storage`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract consumed by the rotated provider.
///
/// Implementations may be shared by several processes. The provider never coordinates writers
/// itself; last-write-wins is acceptable because every refresh tick re-reads the store first.
pub trait Storage
where
	Self: Send + Sync,
{
	/// Returns the last persisted credential, or [`StoreError::NotFound`] /
	/// [`StoreError::Incomplete`] when nothing usable is stored.
	fn get(&self) -> StoreFuture<'_, Credential>;

	/// Persists a credential snapshot, replacing any prior value.
	fn put(&self, credential: Credential) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`Storage`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// The store holds no credential yet.
	#[error("No credential has been stored.")]
	NotFound,
	/// A stored credential is missing a required field.
	#[error("Stored credential is incomplete: {message}.")]
	Incomplete {
		/// Human-readable error payload.
		message: String,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl StoreError {
	/// Returns `true` when the store has no usable credential, as opposed to failing outright.
	pub fn is_missing(&self) -> bool {
		matches!(self, Self::NotFound | Self::Incomplete { .. })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_rotator_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let rotator_error: Error = store_error.clone().into();

		assert!(matches!(rotator_error, Error::Storage(_)));
		assert!(rotator_error.to_string().contains("database unreachable"));

		let source = StdError::source(&rotator_error)
			.expect("Rotator error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn missing_classification_covers_not_found_and_incomplete() {
		assert!(StoreError::NotFound.is_missing());
		assert!(StoreError::Incomplete { message: "no expiry".into() }.is_missing());
		assert!(!StoreError::Serialization { message: "bad json".into() }.is_missing());
		assert!(!StoreError::Backend { message: "io".into() }.is_missing());
	}
}
