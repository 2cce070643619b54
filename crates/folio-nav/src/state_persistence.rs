//! Preference persistence.
//!
//! The site persists exactly one user preference (the theme) under a single
//! key. This module provides the [`PreferenceStore`] seam so the same theme
//! logic runs against browser `localStorage` (in `folio-web`), an in-memory
//! map (tests, ephemeral sessions), or a JSON file on native hosts.
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: storage failures never panic; operations
//!    return `Result` and callers decide whether to log and continue.
//! 2. **Atomic writes**: [`FileStorage`] writes a temp file and renames it.
//! 3. **Missing is not an error**: an absent key reads as `Ok(None)`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, nothing cached |
//! | `StorageError::Serialization` | JSON encode/decode | Returns error |
//! | `StorageError::Corruption` | Poisoned lock, bad format | Returns error |
//! | `StorageError::Unavailable` | Storage disabled by host | Returns error |
//!
//! # Feature Gates
//!
//! - `state-persistence`: enables [`FileStorage`]. Without it only
//!   [`MemoryStorage`] is available natively.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during preference storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Stored data or internal state is unusable.
    Corruption(String),
    /// The host refused access (private mode, disabled storage, quota).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable string key/value preference stores.
///
/// Implementations must be `Send + Sync` so a store can be shared with a
/// multi-threaded host; single-threaded hosts pay only an uncontended lock.
pub trait PreferenceStore: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read a value. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store for tests and sessions that should not persist.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl PreferenceStore for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk preferences document.
    #[derive(Serialize, Deserialize)]
    struct PrefsFile {
        format_version: u32,
        entries: HashMap<String, String>,
    }

    impl PrefsFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: HashMap::new(),
            }
        }
    }

    /// JSON-file preference store.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": { "theme": "dark" }
    /// }
    /// ```
    ///
    /// Every write rewrites the whole document via `{path}.tmp` + rename.
    pub struct FileStorage {
        path: PathBuf,
        lock: RwLock<()>,
    }

    impl FileStorage {
        /// Create a store at `path`. The file is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
                lock: RwLock::new(()),
            }
        }

        /// Store under `$XDG_STATE_HOME/folio/{app_name}/prefs.json`, falling
        /// back to `~/.local/state` and then the current directory.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let base = state_dir_or_fallback();
            Self::new(base.join("folio").join(app_name).join("prefs.json"))
        }

        /// Backing file path.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_file(&self) -> StorageResult<PrefsFile> {
            if !self.path.exists() {
                return Ok(PrefsFile::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let file: PrefsFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse prefs file: {e}"))
            })?;
            if file.format_version != PrefsFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = file.format_version,
                    expected = PrefsFile::FORMAT_VERSION,
                    "prefs file format version mismatch, ignoring stored values"
                );
                return Ok(PrefsFile::new());
            }
            Ok(file)
        }

        fn write_file(&self, file: &PrefsFile) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize prefs: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        }
    }

    fn state_dir_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl PreferenceStore for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            let _guard = self
                .lock
                .read()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            Ok(self.read_file()?.entries.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let _guard = self
                .lock
                .write()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            let mut file = self.read_file()?;
            file.entries.insert(key.to_owned(), value.to_owned());
            self.write_file(&file)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let _guard = self
                .lock
                .write()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            let mut file = self.read_file()?;
            if file.entries.remove(key).is_some() {
                self.write_file(&file)?;
            }
            Ok(())
        }

        fn is_available(&self) -> bool {
            self.path
                .parent()
                .is_none_or(|p| p.as_os_str().is_empty() || p.exists() || fs::create_dir_all(p).is_ok())
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_get_set_remove() {
        let store = MemoryStorage::new();
        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
        store.remove("theme").unwrap();
    }

    #[test]
    fn memory_with_entries_and_debug() {
        let store = MemoryStorage::with_entries([("theme", "dark")]);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert!(store.is_available());
        assert_eq!(format!("{store:?}"), "MemoryStorage { entries: 1 }");
    }

    #[test]
    fn error_display_and_source() {
        let io = StorageError::from(std::io::Error::other("disk gone"));
        assert!(io.to_string().contains("disk gone"));
        assert!(std::error::Error::source(&io).is_some());
        let unavailable = StorageError::Unavailable("private mode".into());
        assert_eq!(unavailable.to_string(), "storage unavailable: private mode");
        assert!(std::error::Error::source(&unavailable).is_none());
    }

    #[cfg(feature = "state-persistence")]
    mod file {
        use super::super::*;

        #[test]
        fn file_round_trip_survives_reopen() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("prefs.json");

            let store = FileStorage::new(&path);
            assert!(store.is_available());
            assert_eq!(store.get("theme").unwrap(), None);
            store.set("theme", "dark").unwrap();

            let reopened = FileStorage::new(&path);
            assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
            reopened.remove("theme").unwrap();
            assert_eq!(store.get("theme").unwrap(), None);
            assert!(!path.with_extension("json.tmp").exists());
        }

        #[test]
        fn corrupt_file_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("prefs.json");
            std::fs::write(&path, b"{not json").unwrap();
            let store = FileStorage::new(&path);
            assert!(matches!(
                store.get("theme"),
                Err(StorageError::Serialization(_))
            ));
        }

        #[test]
        fn version_mismatch_reads_empty() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("prefs.json");
            std::fs::write(
                &path,
                br#"{"format_version": 99, "entries": {"theme": "dark"}}"#,
            )
            .unwrap();
            let store = FileStorage::new(&path);
            assert_eq!(store.get("theme").unwrap(), None);
        }
    }
}
