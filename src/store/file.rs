//! File-backed [`TokenStore`] that keeps the token across process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists entries to a JSON object file after each write.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<BTreeMap<String, String>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
		if !path.exists() {
			return Ok(BTreeMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(BTreeMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
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

	fn persist_locked(&self, contents: &BTreeMap<String, String>) -> Result<(), StoreError> {
		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
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
impl TokenStore for FileStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.inner.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut staged = guard.clone();

			staged.insert(key.to_owned(), value);
			self.persist_locked(&staged)?;
			*guard = staged;

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::{
		auth::AccessToken,
		store::{self, ACCESS_TOKEN_KEY, LEGACY_TOKEN_KEY},
	};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"tailor_client_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn token_survives_reopen() {
		let path = temp_path();
		let file_store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store::save_access_token(&file_store, &AccessToken::new("persisted")))
			.expect("Failed to save token to file store.");
		drop(file_store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let token = rt
			.block_on(store::load_access_token(&reopened))
			.expect("Failed to load token from file store.")
			.expect("File store lost the token after reopen.");

		assert_eq!(token.expose(), "persisted");
		assert_eq!(
			rt.block_on(reopened.get(LEGACY_TOKEN_KEY)).expect("Legacy read should work."),
			Some("persisted".into())
		);
		assert_eq!(
			rt.block_on(reopened.get(ACCESS_TOKEN_KEY)).expect("Canonical read should work."),
			Some("persisted".into())
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_keeps_previous_entries() {
		let dir = temp_path().with_extension("d");
		let file_store =
			FileStore::open(dir.join("session.json")).expect("Failed to open nested file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(file_store.set(ACCESS_TOKEN_KEY, "old".into()))
			.expect("Initial write should persist.");
		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove file store directory {}: {e}", dir.display())
		});

		let err = rt
			.block_on(store::save_access_token(&file_store, &AccessToken::new("new")))
			.expect_err("Writes into a missing directory must fail.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert_eq!(
			rt.block_on(file_store.get(ACCESS_TOKEN_KEY)).expect("Canonical read should work."),
			Some("old".into())
		);
		assert_eq!(
			rt.block_on(file_store.get(LEGACY_TOKEN_KEY)).expect("Legacy read should work."),
			None
		);
	}

	#[test]
	fn corrupt_snapshot_is_reported() {
		let path = temp_path();

		fs::write(&path, b"{not json").expect("Failed to write corrupt snapshot fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshots must be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
