//! Durable key-value persistence for cart, session and search-history
//! snapshots.
//!
//! # Schema
//!
//! Every value is written inside a versioned envelope:
//!
//! ```json
//! {"version": 1, "data": {"...": "..."}}
//! ```
//!
//! Loading is forgiving by contract: a missing key, an unreadable file, an
//! unknown schema version and undecodable JSON all come back as `None`. The
//! last two are also purged so they are not met again on the next start.
//! Bare payloads written before the envelope existed are accepted when they
//! decode as the requested type, and are rewritten in the current envelope.
//!
//! # Concurrency
//!
//! There is no locking and no versioning between processes. Two profiles
//! sharing a directory race, and the last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Current envelope version written by [`Store::save`].
pub const SCHEMA_VERSION: u64 = 1;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the underlying file failed.
    #[error("storage I/O error for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The value could not be encoded as JSON.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// The in-memory backend's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// The fixed set of keys the client persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Serialized cart line items.
    Cart,
    /// Serialized signed-in identity.
    User,
    /// Serialized bearer credential string.
    AccessToken,
    /// Most recent catalog search terms, newest first.
    RecentSearches,
}

impl StoreKey {
    /// All keys, in the order they are purged by [`Store::clear_all`].
    pub const ALL: [Self; 4] = [
        Self::Cart,
        Self::User,
        Self::AccessToken,
        Self::RecentSearches,
    ];

    /// Storage name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::User => "user",
            Self::AccessToken => "access_token",
            Self::RecentSearches => "recent_searches",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string storage underneath a [`Store`].
///
/// Implementations only move text around; encoding, versioning and
/// corruption handling live in [`Store`].
pub trait StoreBackend: Send + Sync {
    /// Read the raw value for `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Versioned JSON store over a [`StoreBackend`].
///
/// Cheaply cloneable; clones share the same backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StoreBackend>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Wrap a backend.
    pub fn new(backend: impl StoreBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// A store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Open (creating if needed) a file-backed profile directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(FileStore::open(dir)?))
    }

    /// Serialize `value` and write it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let raw = encode(value)?;
        self.backend.write(key.as_str(), &raw)?;
        debug!(key = %key, bytes = raw.len(), "Saved snapshot");
        Ok(())
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is absent or its content is unusable.
    /// Unusable content is purged; legacy bare payloads are upgraded in place.
    pub fn load<T: Serialize + DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        let raw = match self.backend.read(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored snapshot");
                return None;
            }
        };

        match decode::<T>(&raw) {
            Decoded::Current(value) => Some(value),
            Decoded::Legacy(value) => {
                info!(key = %key, "Upgrading unversioned snapshot");
                if let Err(e) = self.save(key, &value) {
                    warn!(key = %key, error = %e, "Failed to rewrite upgraded snapshot");
                }
                Some(value)
            }
            Decoded::Unsupported(version) => {
                warn!(key = %key, version, "Discarding snapshot with unknown schema version");
                self.purge(key);
                None
            }
            Decoded::Corrupt(e) => {
                warn!(key = %key, error = %e, "Discarding corrupt snapshot");
                self.purge(key);
                None
            }
        }
    }

    /// Delete the value under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.backend.delete(key.as_str())
    }

    /// Remove every key this client writes.
    ///
    /// # Errors
    ///
    /// Returns the first backend error; later keys are still attempted.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in StoreKey::ALL {
            if let Err(e) = self.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn purge(&self, key: StoreKey) {
        if let Err(e) = self.remove(key) {
            warn!(key = %key, error = %e, "Failed to purge unusable snapshot");
        }
    }
}

/// Outcome of decoding a raw stored value.
#[derive(Debug)]
enum Decoded<T> {
    Current(T),
    Legacy(T),
    Unsupported(u64),
    Corrupt(serde_json::Error),
}

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    version: u64,
    data: &'a T,
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope {
        version: SCHEMA_VERSION,
        data: value,
    })
}

fn decode<T: DeserializeOwned>(raw: &str) -> Decoded<T> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return Decoded::Corrupt(e),
    };

    let envelope = value
        .as_object()
        .filter(|obj| obj.len() == 2 && obj.contains_key("data"))
        .and_then(|obj| obj.get("version"))
        .and_then(Value::as_u64);

    match envelope {
        Some(SCHEMA_VERSION) => {
            let data = value.get("data").cloned().unwrap_or(Value::Null);
            serde_json::from_value(data).map_or_else(Decoded::Corrupt, Decoded::Current)
        }
        Some(version) => Decoded::Unsupported(version),
        None => serde_json::from_value(value).map_or_else(Decoded::Corrupt, Decoded::Legacy),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: i64,
        username: String,
    }

    fn profile() -> Profile {
        Profile {
            id: 7,
            username: "lin".to_string(),
        }
    }

    fn store_with_raw(key: StoreKey, raw: &str) -> (Store, MemoryStore) {
        let backend = MemoryStore::default();
        backend.write(key.as_str(), raw).unwrap();
        (Store::new(backend.clone()), backend)
    }

    #[test]
    fn test_save_writes_versioned_envelope() {
        let backend = MemoryStore::default();
        let store = Store::new(backend.clone());
        store.save(StoreKey::User, &profile()).unwrap();

        let raw = backend.read("user").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["data"]["username"], "lin");
    }

    #[test]
    fn test_load_round_trips() {
        let store = Store::in_memory();
        store.save(StoreKey::User, &profile()).unwrap();
        assert_eq!(store.load::<Profile>(StoreKey::User), Some(profile()));
    }

    #[test]
    fn test_missing_key_is_absent() {
        let store = Store::in_memory();
        assert_eq!(store.load::<Profile>(StoreKey::Cart), None);
    }

    #[test]
    fn test_truncated_json_is_absent_and_purged() {
        let (store, backend) = store_with_raw(StoreKey::User, r#"{"version":1,"data":{"id":7,"user"#);
        assert_eq!(store.load::<Profile>(StoreKey::User), None);
        assert_eq!(backend.read("user").unwrap(), None);
    }

    #[test]
    fn test_wrong_shape_is_absent_and_purged() {
        let (store, backend) = store_with_raw(StoreKey::User, r#"{"version":1,"data":[1,2,3]}"#);
        assert_eq!(store.load::<Profile>(StoreKey::User), None);
        assert_eq!(backend.read("user").unwrap(), None);
    }

    #[test]
    fn test_unknown_version_is_rejected_and_purged() {
        let (store, backend) = store_with_raw(
            StoreKey::User,
            r#"{"version":99,"data":{"id":7,"username":"lin"}}"#,
        );
        assert_eq!(store.load::<Profile>(StoreKey::User), None);
        assert_eq!(backend.read("user").unwrap(), None);
    }

    #[test]
    fn test_legacy_payload_is_upgraded_in_place() {
        let (store, backend) = store_with_raw(StoreKey::User, r#"{"id":7,"username":"lin"}"#);
        assert_eq!(store.load::<Profile>(StoreKey::User), Some(profile()));

        let raw = backend.read("user").unwrap().unwrap();
        assert!(raw.starts_with(r#"{"version":1,"#));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = Store::in_memory();
        store.save(StoreKey::AccessToken, "token").unwrap();
        store.remove(StoreKey::AccessToken).unwrap();
        store.remove(StoreKey::AccessToken).unwrap();
        assert_eq!(store.load::<String>(StoreKey::AccessToken), None);
    }

    #[test]
    fn test_clear_all_removes_every_key() {
        let store = Store::in_memory();
        store.save(StoreKey::Cart, &Vec::<u32>::new()).unwrap();
        store.save(StoreKey::User, &profile()).unwrap();
        store.save(StoreKey::AccessToken, "token").unwrap();
        store.save(StoreKey::RecentSearches, &["mug"]).unwrap();

        store.clear_all().unwrap();

        for key in StoreKey::ALL {
            assert_eq!(store.load::<Value>(key), None);
        }
    }
}
