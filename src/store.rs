//! Key-value storage contract for the access token plus built-in backends.
//!
//! The token is kept under two keys: the legacy `token` key and the canonical
//! `accessToken` key. Reads prefer the canonical key; writes always update both so
//! older readers keep working.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::AccessToken};

/// Canonical storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Legacy storage key kept in sync for older readers.
pub const LEGACY_TOKEN_KEY: &str = "token";

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// String key-value storage that survives client restarts.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
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

/// Reads the access token, preferring the canonical key over the legacy one.
///
/// Empty strings are treated as absent.
pub async fn load_access_token(store: &dyn TokenStore) -> Result<Option<AccessToken>, StoreError> {
	for key in [ACCESS_TOKEN_KEY, LEGACY_TOKEN_KEY] {
		if let Some(value) = store.get(key).await?.filter(|v| !v.is_empty()) {
			return Ok(Some(AccessToken::new(value)));
		}
	}

	Ok(None)
}

/// Writes the access token under the canonical key, then the legacy key.
///
/// A failed legacy write still leaves the canonical key, which reads prefer, up to date.
pub async fn save_access_token(store: &dyn TokenStore, token: &AccessToken) -> Result<(), StoreError> {
	store.set(ACCESS_TOKEN_KEY, token.expose().to_owned()).await?;
	store.set(LEGACY_TOKEN_KEY, token.expose().to_owned()).await
}
