// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Credential resolution and persistence
//!
//! The active API key is the first one produced by an ordered chain of
//! [`CredentialProvider`]s:
//!
//! 1. [`RuntimeOverride`]: a key set during this process's lifetime
//! 2. [`ConfiguredKey`]: the key from [`crate::DetectorConfig`]
//! 3. [`PersistedKey`]: a key saved by an earlier `set_credential`
//!
//! Persistence goes through the [`CredentialStore`] key/value seam, backed by
//! [`MemoryStore`] or the JSON-file [`FileStore`].

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use api_client::ApiKey;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{DetectorError, DetectorResult};

/// Storage key under which the user-supplied credential is persisted
pub const API_KEY_STORAGE_KEY: &str = "hive_api_key";

/// Key/value persistence for the credential override
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> DetectorResult<Option<String>>;

    /// Write a value; visible to the next `get`
    fn set(&self, key: &str, value: &str) -> DetectorResult<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> DetectorResult<()>;
}

/// Process-local credential store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> DetectorResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> DetectorResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DetectorResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Credential store backed by a JSON object file
///
/// Writes are synchronous and serialized through a mutex. The file is replaced
/// atomically via a sibling temporary file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> DetectorResult<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(DetectorError::storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&contents) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(DetectorError::storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(DetectorError::storage(format!(
                "failed to parse {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> DetectorResult<()> {
        let json = serde_json::to_string_pretty(entries).map_err(DetectorError::storage)?;
        let tmp = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DetectorError::storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        fs::write(&tmp, json)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                DetectorError::storage(format!("failed to write {}: {e}", self.path.display()))
            })
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>)) -> DetectorResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> DetectorResult<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> DetectorResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        })
    }

    fn remove(&self, key: &str) -> DetectorResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// One source in the credential chain
pub trait CredentialProvider: Send + Sync {
    /// Produce a key if this source has one
    fn try_resolve(&self) -> Option<ApiKey>;

    /// Source label used in logs
    fn source(&self) -> &'static str;
}

/// Key replaced at runtime through `set_credential`
#[derive(Debug, Default)]
pub struct RuntimeOverride {
    key: RwLock<Option<ApiKey>>,
}

impl RuntimeOverride {
    /// Replace or clear the override
    pub fn set(&self, key: Option<ApiKey>) {
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = key;
    }
}

impl CredentialProvider for RuntimeOverride {
    fn try_resolve(&self) -> Option<ApiKey> {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn source(&self) -> &'static str {
        "runtime"
    }
}

/// Key supplied by configuration
#[derive(Debug, Clone)]
pub struct ConfiguredKey(Option<ApiKey>);

impl ConfiguredKey {
    /// Wrap a configured key, if any
    pub fn new(key: Option<ApiKey>) -> Self {
        Self(key)
    }
}

impl CredentialProvider for ConfiguredKey {
    fn try_resolve(&self) -> Option<ApiKey> {
        self.0.clone()
    }

    fn source(&self) -> &'static str {
        "configured"
    }
}

/// Key persisted in a [`CredentialStore`]
pub struct PersistedKey {
    store: Arc<dyn CredentialStore>,
}

impl PersistedKey {
    /// Read keys from `store`
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl fmt::Debug for PersistedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedKey").finish_non_exhaustive()
    }
}

impl CredentialProvider for PersistedKey {
    fn try_resolve(&self) -> Option<ApiKey> {
        match self.store.get(API_KEY_STORAGE_KEY) {
            Ok(value) => ApiKey::parse_optional(value.as_deref()),
            Err(e) => {
                warn!(error = %e, "credential store unreadable, ignoring persisted key");
                None
            }
        }
    }

    fn source(&self) -> &'static str {
        "persisted"
    }
}

/// Determines the active API key from the provider chain
pub struct CredentialResolver {
    runtime: Arc<RuntimeOverride>,
    store: Arc<dyn CredentialStore>,
    chain: Vec<Arc<dyn CredentialProvider>>,
}

impl CredentialResolver {
    /// Build the standard chain: runtime override, configured key, persisted key
    pub fn new(configured: Option<ApiKey>, store: Arc<dyn CredentialStore>) -> Self {
        let runtime = Arc::new(RuntimeOverride::default());
        let chain: Vec<Arc<dyn CredentialProvider>> = vec![
            Arc::clone(&runtime) as Arc<dyn CredentialProvider>,
            Arc::new(ConfiguredKey::new(configured)),
            Arc::new(PersistedKey::new(Arc::clone(&store))),
        ];

        Self {
            runtime,
            store,
            chain,
        }
    }

    /// First key produced by the chain
    pub fn resolve(&self) -> Option<ApiKey> {
        self.chain.iter().find_map(|provider| {
            let key = provider.try_resolve()?;
            debug!(source = provider.source(), "resolved API key");
            Some(key)
        })
    }

    /// Check whether any source currently yields a key
    pub fn has_credential(&self) -> bool {
        self.resolve().is_some()
    }

    /// Replace the active key, or clear it with a blank token
    ///
    /// A non-blank token becomes the runtime override and is persisted. A blank
    /// token clears the override and removes the persisted entry. The in-memory
    /// change always applies, even when persisting fails.
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Storage` if the store could not be updated
    pub fn set_credential(&self, token: &str) -> DetectorResult<()> {
        match ApiKey::parse_optional(Some(token)) {
            Some(key) => {
                self.runtime.set(Some(key.clone()));
                self.store.set(API_KEY_STORAGE_KEY, key.expose())?;
                info!("API key updated");
            }
            None => {
                self.runtime.set(None);
                self.store.remove(API_KEY_STORAGE_KEY)?;
                info!("API key cleared");
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<_> = self.chain.iter().map(|p| p.source()).collect();
        f.debug_struct("CredentialResolver")
            .field("sources", &sources)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(token: &str) -> ApiKey {
        ApiKey::new(token).unwrap()
    }

    fn resolved(resolver: &CredentialResolver) -> Option<String> {
        resolver.resolve().map(|k| k.expose().to_string())
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        FileStore::new(&path).set(API_KEY_STORAGE_KEY, "abc").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(API_KEY_STORAGE_KEY).unwrap().as_deref(),
            Some("abc")
        );

        reopened.remove(API_KEY_STORAGE_KEY).unwrap();
        assert_eq!(reopened.get(API_KEY_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_keeps_unrelated_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileStore::new(&path);
        store.set(API_KEY_STORAGE_KEY, "abc").unwrap();
        store.remove(API_KEY_STORAGE_KEY).unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get(API_KEY_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(API_KEY_STORAGE_KEY),
            Err(DetectorError::Storage { .. })
        ));
    }

    #[test]
    fn configured_key_wins_over_persisted() {
        let store = Arc::new(MemoryStore::new());
        store.set(API_KEY_STORAGE_KEY, "persisted").unwrap();

        let resolver = CredentialResolver::new(Some(key("configured")), store);
        assert_eq!(resolved(&resolver).as_deref(), Some("configured"));
    }

    #[test]
    fn persisted_key_is_the_fallback() {
        let store = Arc::new(MemoryStore::new());
        store.set(API_KEY_STORAGE_KEY, "  persisted  ").unwrap();

        let resolver = CredentialResolver::new(None, store);
        assert_eq!(resolved(&resolver).as_deref(), Some("persisted"));
    }

    #[test]
    fn runtime_override_wins_and_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let resolver = CredentialResolver::new(Some(key("configured")), store.clone());

        resolver.set_credential("runtime").unwrap();

        assert_eq!(resolved(&resolver).as_deref(), Some("runtime"));
        assert_eq!(
            store.get(API_KEY_STORAGE_KEY).unwrap().as_deref(),
            Some("runtime")
        );
    }

    #[test]
    fn clearing_removes_the_persisted_key() {
        let store = Arc::new(MemoryStore::new());
        let resolver = CredentialResolver::new(None, store.clone());

        resolver.set_credential("temporary").unwrap();
        assert!(resolver.has_credential());

        resolver.set_credential("").unwrap();
        assert!(!resolver.has_credential());
        assert_eq!(store.get(API_KEY_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn clearing_falls_back_to_configured_key() {
        let resolver =
            CredentialResolver::new(Some(key("configured")), Arc::new(MemoryStore::new()));

        resolver.set_credential("runtime").unwrap();
        resolver.set_credential("   ").unwrap();

        assert_eq!(resolved(&resolver).as_deref(), Some("configured"));
    }

    #[test]
    fn unreadable_store_means_no_persisted_key() {
        let mut store = MockCredentialStore::new();
        store
            .expect_get()
            .withf(|key| key == API_KEY_STORAGE_KEY)
            .returning(|_| Err(DetectorError::storage("permission denied")));

        let resolver = CredentialResolver::new(None, Arc::new(store));
        assert!(!resolver.has_credential());
    }

    #[test]
    fn failed_write_keeps_the_runtime_override() {
        let mut store = MockCredentialStore::new();
        store
            .expect_set()
            .withf(|key, value| key == API_KEY_STORAGE_KEY && value == "fresh")
            .times(1)
            .returning(|_, _| Err(DetectorError::storage("disk full")));

        let resolver = CredentialResolver::new(None, Arc::new(store));
        let result = resolver.set_credential("fresh");

        assert!(matches!(result, Err(DetectorError::Storage { .. })));
        assert_eq!(resolved(&resolver).as_deref(), Some("fresh"));
    }

    #[test]
    fn resolution_stops_at_the_first_source() {
        let mut store = MockCredentialStore::new();
        store.expect_get().never();

        let resolver = CredentialResolver::new(Some(key("configured")), Arc::new(store));
        assert!(resolver.has_credential());
    }

    #[test]
    fn debug_lists_sources_without_keys() {
        let resolver =
            CredentialResolver::new(Some(key("top-secret")), Arc::new(MemoryStore::new()));
        let debug = format!("{resolver:?}");

        assert!(debug.contains("runtime"));
        assert!(debug.contains("persisted"));
        assert!(!debug.contains("top-secret"));
    }
}
