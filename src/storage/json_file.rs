//! JSON-file preference store
//!
//! The whole namespace lives in one JSON object. Every write rewrites the
//! file through a temporary sibling and a rename, so a crash mid-write
//! leaves the previous document intact.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{PrefValue, PreferenceStore};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Preference store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: RwLock<BTreeMap<String, PrefValue>>,
}

impl JsonFilePreferences {
    /// Open the store at `path`, creating parent directories.
    ///
    /// A missing file is an empty store. A file that fails to parse is an
    /// error; callers decide whether to fall back to defaults.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = ?path, keys = values.len(), "Opened JSON preferences");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &BTreeMap<String, PrefValue>) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> StorageResult<Option<PrefValue>> {
        let values = self
            .values
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: PrefValue) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        // Memory only changes once the file has been written
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.save(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        if values.contains_key(key) {
            let mut next = values.clone();
            next.remove(key);
            self.save(&next)?;
            *values = next;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(values.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("phone.json");

        // First session: write values
        {
            let prefs = JsonFilePreferences::open(&path).unwrap();
            prefs.put_string("medications", "[]").unwrap();
            prefs.put_bool("onboarded", true).unwrap();
        }

        // Second session: values survive
        {
            let prefs = JsonFilePreferences::open(&path).unwrap();
            assert_eq!(prefs.get_string("medications").unwrap().as_deref(), Some("[]"));
            assert_eq!(prefs.get_bool("onboarded").unwrap(), Some(true));
            assert_eq!(prefs.path(), path.as_path());
        }
    }

    #[test]
    fn test_failed_write_leaves_values_unchanged() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("prefs");
        let prefs = JsonFilePreferences::open(folder.join("watch.json")).unwrap();
        prefs.put_string("text_size", "MEDIUM").unwrap();

        std::fs::remove_dir_all(&folder).unwrap();

        assert!(prefs.put_string("text_size", "LARGE").is_err());
        assert!(prefs.remove("text_size").is_err());
        assert_eq!(prefs.get_string("text_size").unwrap().as_deref(), Some("MEDIUM"));
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watch.json");

        let prefs = JsonFilePreferences::open(&path).unwrap();
        prefs.put_string("medications_data", "a,b,c,d,e").unwrap();
        prefs.remove("medications_data").unwrap();
        drop(prefs);

        let prefs = JsonFilePreferences::open(&path).unwrap();
        assert!(prefs.keys().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFilePreferences::open(&path);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
