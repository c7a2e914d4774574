//! # File Store
//!
//! [`KeyValueStore`] backed by the filesystem: each key is one file in the
//! storage directory.
//!
//! ```text
//! ~/.local/share/larek-storefront/         (Linux; platform data dir)
//! ├── larek.checkout.json                   { order, basket, savedAt }
//! └── larek.validOrderFields.json           { validOrderFields }
//! ```
//!
//! Writes go to a temporary sibling first and are renamed into place, so
//! a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use larek_core::error::{CoreError, CoreResult};
use larek_core::storage::KeyValueStore;
use tracing::{debug, info};

use crate::error::ClientResult;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> ClientResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Local storage ready");
        Ok(FileStore { dir })
    }

    /// The platform data directory for the storefront.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "larek", "storefront")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Storage(format!("{}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| CoreError::Storage(format!("{}: {e}", path.display())))?;
        debug!(key, bytes = value.len(), "Stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage(format!("{}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_core::storage::{SnapshotStorage, CHECKOUT_KEY};
    use larek_core::types::Order;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_get_set_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.get("larek.checkout").unwrap(), None);
        store.set("larek.checkout", "{}").unwrap();
        assert_eq!(store.get("larek.checkout").unwrap().as_deref(), Some("{}"));
        assert!(dir.path().join("larek.checkout.json").exists());

        store.remove("larek.checkout").unwrap();
        assert_eq!(store.get("larek.checkout").unwrap(), None);
        store.remove("larek.checkout").unwrap();
    }

    #[test]
    fn test_keys_cannot_escape_the_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.set("../evil/key", "x").unwrap();

        assert!(dir.path().join(".._evil_key.json").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(&nested).unwrap();
        assert_eq!(store.dir(), nested.as_path());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let order = Order {
            address: "Spb".into(),
            ..Order::default()
        };
        SnapshotStorage::new(Arc::new(FileStore::new(dir.path()).unwrap()))
            .save_checkout(&order, &[]);

        let reopened = SnapshotStorage::new(Arc::new(FileStore::new(dir.path()).unwrap()));
        assert_eq!(reopened.load_checkout().order.address, "Spb");
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.set(CHECKOUT_KEY, "{{{{").unwrap();

        let storage = SnapshotStorage::new(Arc::new(store));
        assert_eq!(storage.load_checkout().order, Order::default());
    }
}
