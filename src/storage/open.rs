//! Backend selection and on-disk layout
//!
//! Each namespace (`phone`, `watch`, `settings`) gets its own store so the
//! phone and watch halves never share keys.

use crate::storage::error::StorageResult;
use crate::storage::json_file::JsonFilePreferences;
use crate::storage::memory::MemoryPreferences;
use crate::storage::sqlite::SqlitePreferences;
use crate::storage::types::{PreferenceStore, PrefsBackend};
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all preference files
    pub data_dir: PathBuf,
    /// Backend used for every namespace
    pub backend: PrefsBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("timelycare_data"),
            backend: PrefsBackend::Json,
        }
    }
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the backend
    pub fn backend(mut self, backend: PrefsBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Get path to the preference file for a namespace
    pub fn prefs_path(&self, namespace: &str) -> PathBuf {
        let ext = match self.backend {
            PrefsBackend::Sqlite => "db",
            _ => "json",
        };
        self.data_dir
            .join("prefs")
            .join(format!("{}.{}", namespace, ext))
    }

    /// Open the preference store for a namespace
    pub fn open(&self, namespace: &str) -> StorageResult<Arc<dyn PreferenceStore>> {
        let store: Arc<dyn PreferenceStore> = match self.backend {
            PrefsBackend::Memory => Arc::new(MemoryPreferences::new()),
            PrefsBackend::Json => Arc::new(JsonFilePreferences::open(self.prefs_path(namespace))?),
            PrefsBackend::Sqlite => Arc::new(SqlitePreferences::open(self.prefs_path(namespace))?),
        };

        tracing::debug!(
            namespace,
            backend = %self.backend,
            "Opened preference store"
        );
        Ok(store)
    }

    /// Open a namespace, falling back to an in-memory store on failure
    pub fn open_or_memory(&self, namespace: &str) -> Arc<dyn PreferenceStore> {
        match self.open(namespace) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    namespace,
                    error = %e,
                    "Failed to open preference store, using in-memory fallback"
                );
                Arc::new(MemoryPreferences::new())
            }
        }
    }
}
