//! File-backed [`Storage`] for single-host deployments and bots.
//!
//! The file holds one JSON object with the `AccessToken`, `RefreshToken`, and `ExpiresAt` keys.
//! Every read goes back to disk so a credential rotated by another process is picked up on the
//! next refresh tick. Writes replace the file atomically through a temporary sibling, but there
//! is no file locking: two writers on the same host race and the last rename wins.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	credential::{Credential, RawCredential},
	store::{Storage, StoreError, StoreFuture},
};

/// Persists the rotated credential to a JSON file.
#[derive(Clone, Debug)]
pub struct FileStorage {
	path: PathBuf,
}
impl FileStorage {
	/// Points a store at `path`, creating missing parent directories.
	pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load(path: &Path) -> Result<Credential, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				}),
		};

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Err(StoreError::NotFound);
		}

		let raw: RawCredential =
			serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&bytes))
				.map_err(|e| StoreError::Serialization {
					message: format!("Failed to parse {}: {e}", path.display()),
				})?;

		Credential::try_from(raw).map_err(|e| StoreError::Incomplete {
			message: format!("{} ({e})", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist(&self, credential: &Credential) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(credential).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl Storage for FileStorage {
	fn get(&self) -> StoreFuture<'_, Credential> {
		Box::pin(async move { Self::load(&self.path) })
	}

	fn put(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.persist(&credential) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn temp_path(tag: &str) -> PathBuf {
		let unique = format!(
			"oauth2_rotator_file_storage_{tag}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[tokio::test]
	async fn put_then_get_reads_back_from_disk() {
		let path = temp_path("round_trip");
		let store = FileStorage::new(&path).expect("Failed to open file storage.");
		let credential =
			Credential::new("access", "refresh", macros::datetime!(2025-01-01 00:00 UTC))
				.expect("Credential fixture should be valid.");

		store.put(credential.clone()).await.expect("Failed to persist credential.");

		let reopened = FileStorage::new(&path).expect("Failed to reopen file storage.");

		assert_eq!(reopened.get().await.expect("Persisted credential should load."), credential);
		assert!(!path.with_extension("tmp").exists());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}

	#[tokio::test]
	async fn missing_and_blank_files_report_not_found() {
		let path = temp_path("missing");
		let store = FileStorage::new(&path).expect("Failed to open file storage.");

		assert_eq!(store.get().await.expect_err("Missing file must fail."), StoreError::NotFound);

		fs::write(&path, b"  \n").expect("Failed to write blank credential file.");

		assert_eq!(store.get().await.expect_err("Blank file must fail."), StoreError::NotFound);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}
}
