//! In-memory preference store

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{PrefValue, PreferenceStore};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Process-local preference store
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<BTreeMap<String, PrefValue>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
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
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        values.remove(key);
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
    use std::collections::BTreeSet;

    #[test]
    fn test_put_get_remove() {
        let prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_string("missing").unwrap(), None);

        prefs.put_string("name", "watch").unwrap();
        prefs.put_bool("dark_mode", true).unwrap();
        assert_eq!(prefs.get_string("name").unwrap().as_deref(), Some("watch"));
        assert_eq!(prefs.get_bool("dark_mode").unwrap(), Some(true));
        assert_eq!(prefs.keys().unwrap(), vec!["dark_mode", "name"]);

        prefs.remove("name").unwrap();
        prefs.remove("name").unwrap();
        assert_eq!(prefs.get_string("name").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let prefs = MemoryPreferences::new();
        prefs.put_bool("flag", false).unwrap();

        let err = prefs.get_string("flag").unwrap_err();
        assert!(matches!(err, StorageError::TypeMismatch { expected: "string", .. }));
    }

    #[test]
    fn test_string_set() {
        let prefs = MemoryPreferences::new();
        let set: BTreeSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        prefs.put_string_set("features", set.clone()).unwrap();
        assert_eq!(prefs.get_string_set("features").unwrap(), Some(set));
    }
}
