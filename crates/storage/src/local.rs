//! Client-side key-value persistence.
//!
//! Each key holds one JSON document. The planner client uses it as a
//! write-through cache of API data and as the only home of timer settings.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    User,
    Subjects,
    Tasks,
    StudySessions,
    StudyTimeRecords,
    PomodoroSettings,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::User,
        StorageKey::Subjects,
        StorageKey::Tasks,
        StorageKey::StudySessions,
        StorageKey::StudyTimeRecords,
        StorageKey::PomodoroSettings,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::User => "user",
            StorageKey::Subjects => "subjects",
            StorageKey::Tasks => "tasks",
            StorageKey::StudySessions => "studySessions",
            StorageKey::StudyTimeRecords => "studyTimeRecords",
            StorageKey::PomodoroSettings => "pomodoroSettings",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocalStoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed {key} document: {source}")]
    Malformed {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {key} document: {source}")]
    Encode {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Raw string storage keyed by [`StorageKey`].
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing medium cannot be read.
    fn read(&self, key: StorageKey) -> Result<Option<String>, LocalStoreError>;

    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing medium cannot be written.
    fn write(&self, key: StorageKey, value: &str) -> Result<(), LocalStoreError>;

    /// Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing medium cannot be written.
    fn remove(&self, key: StorageKey) -> Result<(), LocalStoreError>;
}

//
// ─── BACKENDS ──────────────────────────────────────────────────────────────────
//

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the data directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: StorageKey) -> Result<Option<String>, LocalStoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: StorageKey, value: &str) -> Result<(), LocalStoreError> {
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), LocalStoreError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StorageKey, String>>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: StorageKey) -> Result<Option<String>, LocalStoreError> {
        let guard = self.entries.lock().map_err(|_| LocalStoreError::Poisoned)?;
        Ok(guard.get(&key).cloned())
    }

    fn write(&self, key: StorageKey, value: &str) -> Result<(), LocalStoreError> {
        let mut guard = self.entries.lock().map_err(|_| LocalStoreError::Poisoned)?;
        guard.insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), LocalStoreError> {
        let mut guard = self.entries.lock().map_err(|_| LocalStoreError::Poisoned)?;
        guard.remove(&key);
        Ok(())
    }
}

//
// ─── TYPED FACADE ──────────────────────────────────────────────────────────────
//

/// Typed JSON access over a shared [`KeyValueStore`].
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

impl LocalStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// File-backed store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        Ok(Self::new(Arc::new(FileStore::open(dir)?)))
    }

    /// Decode the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the document cannot be read or parsed.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, LocalStoreError> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| LocalStoreError::Malformed { key, source })
    }

    /// Stored value, or `default` when missing or unreadable.
    pub fn get_or<T: DeserializeOwned>(&self, key: StorageKey, default: T) -> T {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(%key, error = %e, "local store read failed; using default");
                default
            }
        }
    }

    /// Encode and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if encoding or writing fails.
    pub fn try_save<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), LocalStoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|source| LocalStoreError::Encode { key, source })?;
        self.backend.write(key, &raw)
    }

    /// Best-effort save. Failures are logged; returns whether it succeeded.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        match self.try_save(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(%key, error = %e, "local store write failed");
                false
            }
        }
    }

    pub fn clear(&self, key: StorageKey) {
        if let Err(e) = self.backend.remove(key) {
            warn!(%key, error = %e, "local store clear failed");
        }
    }

    pub fn clear_all(&self) {
        for key in StorageKey::ALL {
            self.clear(key);
        }
    }

    /// Whether a user document has been stored.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self.backend.read(StorageKey::User), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        volume: u8,
    }

    #[test]
    fn load_round_trips_and_missing_is_none() {
        let store = LocalStore::in_memory();
        assert_eq!(store.load::<Prefs>(StorageKey::PomodoroSettings).unwrap(), None);

        assert!(store.save(StorageKey::PomodoroSettings, &Prefs { volume: 7 }));
        assert_eq!(
            store.load::<Prefs>(StorageKey::PomodoroSettings).unwrap(),
            Some(Prefs { volume: 7 })
        );
    }

    #[test]
    fn malformed_document_errors_on_load_and_defaults_on_get_or() {
        let backend = Arc::new(MemoryStore::default());
        backend.write(StorageKey::Tasks, "{not json").unwrap();
        let store = LocalStore::new(backend);

        assert!(matches!(
            store.load::<Vec<u32>>(StorageKey::Tasks),
            Err(LocalStoreError::Malformed {
                key: StorageKey::Tasks,
                ..
            })
        ));
        assert_eq!(store.get_or(StorageKey::Tasks, vec![1_u32]), vec![1]);
    }

    #[test]
    fn file_store_uses_one_document_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(!store.is_initialized());

        store.save(StorageKey::User, &serde_json::json!({ "id": 1 }));
        store.save(StorageKey::Subjects, &Vec::<u32>::new());
        assert!(store.is_initialized());
        assert!(dir.path().join("user.json").exists());
        assert!(dir.path().join("subjects.json").exists());

        let reopened = LocalStore::open(dir.path()).unwrap();
        assert!(reopened.is_initialized());

        reopened.clear_all();
        assert!(!reopened.is_initialized());
        assert!(!dir.path().join("subjects.json").exists());
    }

    #[test]
    fn clearing_absent_key_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        assert!(store.remove(StorageKey::StudySessions).is_ok());
        assert_eq!(store.read(StorageKey::StudySessions).unwrap(), None);
    }
}
