//! Core types for the preference store
//!
//! - `PrefValue`: the three value kinds a preference key can hold
//! - `PreferenceStore`: the key-value trait every backend implements
//! - `PrefsBackend`: which backend to open

use crate::storage::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    String(String),
    Bool(bool),
    StringSet(BTreeSet<String>),
}

impl PrefValue {
    fn kind(&self) -> &'static str {
        match self {
            PrefValue::String(_) => "string",
            PrefValue::Bool(_) => "bool",
            PrefValue::StringSet(_) => "string_set",
        }
    }
}

/// Key-value preference storage
///
/// Writes are expected to be atomic per key. Implementations are shared
/// behind `Arc<dyn PreferenceStore>` so all methods take `&self`.
pub trait PreferenceStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<PrefValue>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: PrefValue) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> StorageResult<Vec<String>>;

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        match self.get(key)? {
            None => Ok(None),
            Some(PrefValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "string", &other)),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> StorageResult<()> {
        self.put(key, PrefValue::String(value.to_string()))
    }

    fn get_bool(&self, key: &str) -> StorageResult<Option<bool>> {
        match self.get(key)? {
            None => Ok(None),
            Some(PrefValue::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(mismatch(key, "bool", &other)),
        }
    }

    fn put_bool(&self, key: &str, value: bool) -> StorageResult<()> {
        self.put(key, PrefValue::Bool(value))
    }

    fn get_string_set(&self, key: &str) -> StorageResult<Option<BTreeSet<String>>> {
        match self.get(key)? {
            None => Ok(None),
            Some(PrefValue::StringSet(set)) => Ok(Some(set)),
            Some(other) => Err(mismatch(key, "string_set", &other)),
        }
    }

    fn put_string_set(&self, key: &str, value: BTreeSet<String>) -> StorageResult<()> {
        self.put(key, PrefValue::StringSet(value))
    }
}

fn mismatch(key: &str, expected: &'static str, found: &PrefValue) -> StorageError {
    tracing::debug!(key, expected, found = found.kind(), "Preference type mismatch");
    StorageError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

/// Which preference backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefsBackend {
    /// Process-local, lost on exit
    Memory,
    /// One JSON document per namespace
    #[default]
    Json,
    /// One SQLite database per namespace
    Sqlite,
}

impl std::str::FromStr for PrefsBackend {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(PrefsBackend::Memory),
            "json" => Ok(PrefsBackend::Json),
            "sqlite" | "db" => Ok(PrefsBackend::Sqlite),
            other => Err(StorageError::Config(format!(
                "unknown preference backend: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PrefsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefsBackend::Memory => write!(f, "memory"),
            PrefsBackend::Json => write!(f, "json"),
            PrefsBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pref_value_json_shape() {
        let json = serde_json::to_string(&PrefValue::Bool(true)).unwrap();
        assert_eq!(json, r#"{"kind":"bool","value":true}"#);

        let back: PrefValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PrefValue::Bool(true));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("sqlite".parse::<PrefsBackend>().unwrap(), PrefsBackend::Sqlite);
        assert_eq!(" JSON ".parse::<PrefsBackend>().unwrap(), PrefsBackend::Json);
        assert_eq!("mem".parse::<PrefsBackend>().unwrap(), PrefsBackend::Memory);
        assert!("redis".parse::<PrefsBackend>().is_err());
    }
}
