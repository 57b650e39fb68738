//! Watch Medication Store
//!
//! Holds the reduced list last received from the phone. It is replaced
//! wholesale on every sync and persisted as a JSON array so the watch can
//! show it after a restart without the phone nearby. Lists saved by older
//! watches in the delimited encoding still load.

use crate::storage::{PreferenceStore, StorageError};
use crate::sync::codec::decode_delimited;
use crate::watch::types::WatchMedication;
use std::sync::Arc;
use tokio::sync::watch;

/// Preference key holding the saved list
pub const WATCH_MEDICATIONS_KEY: &str = "medications_data";

/// Parse a saved list: JSON first, then the legacy delimited form
fn decode_saved(raw: &str) -> Vec<WatchMedication> {
    match serde_json::from_str::<Vec<WatchMedication>>(raw) {
        Ok(list) => list,
        Err(_) => decode_delimited(raw),
    }
}

pub struct WatchMedicationStore {
    tx: watch::Sender<Vec<WatchMedication>>,
    prefs: Option<Arc<dyn PreferenceStore>>,
}

impl WatchMedicationStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { tx, prefs: None }
    }

    /// Create a store persisted through `prefs`, loading the saved list
    pub fn with_preferences(prefs: Arc<dyn PreferenceStore>) -> Self {
        let initial = match prefs.get_string(WATCH_MEDICATIONS_KEY) {
            Ok(Some(raw)) => decode_saved(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read watch medications, starting empty");
                Vec::new()
            }
        };
        tracing::info!(count = initial.len(), "Loaded watch medications");

        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            prefs: Some(prefs),
        }
    }

    /// Replace the whole list
    pub fn replace(&self, medications: Vec<WatchMedication>) {
        let count = medications.len();
        self.tx.send_replace(medications);

        if let Some(prefs) = &self.prefs {
            let saved = serde_json::to_string(&*self.tx.borrow())
                .map_err(StorageError::from)
                .and_then(|encoded| prefs.put_string(WATCH_MEDICATIONS_KEY, &encoded));
            if let Err(e) = saved {
                tracing::warn!(error = %e, "Failed to persist watch medications");
            }
        }
        tracing::debug!(count, "Watch medications replaced");
    }

    pub fn list(&self) -> Vec<WatchMedication> {
        self.tx.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<WatchMedication> {
        self.tx.borrow().iter().find(|m| m.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<WatchMedication>> {
        self.tx.subscribe()
    }
}

impl Default for WatchMedicationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFilePreferences, MemoryPreferences};
    use tempfile::tempdir;

    #[test]
    fn test_replace_is_wholesale() {
        let store = WatchMedicationStore::new();
        store.replace(vec![
            WatchMedication::new("1", "A", "1mg", "No time", "Daily"),
            WatchMedication::new("2", "B", "2mg", "No time", "Daily"),
        ]);
        store.replace(vec![WatchMedication::new("3", "C", "3mg", "9:00 AM", "Sat")]);

        assert_eq!(store.len(), 1);
        assert!(store.get("1").is_none());
        assert_eq!(store.get("3").unwrap().frequency, "Sat");
    }

    #[test]
    fn test_separators_survive_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watch.json");
        let saved = vec![
            WatchMedication::new("1", "Co-amoxiclav, forte", "625mg", "8:00 AM", "Daily"),
            WatchMedication::new("2", "Aspirin", "81|162mg", "No time", "Mon Wed"),
        ];

        {
            let prefs = Arc::new(JsonFilePreferences::open(&path).unwrap());
            let store = WatchMedicationStore::with_preferences(prefs);
            store.replace(saved.clone());
        }

        let prefs = Arc::new(JsonFilePreferences::open(&path).unwrap());
        let store = WatchMedicationStore::with_preferences(prefs);
        assert_eq!(store.list(), saved);
    }

    #[test]
    fn test_loads_legacy_delimited() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs
            .put_string(WATCH_MEDICATIONS_KEY, "1,Aspirin,81mg,8:00 AM,Daily")
            .unwrap();

        let store = WatchMedicationStore::with_preferences(prefs);
        assert_eq!(store.list()[0].name, "Aspirin");
        assert_eq!(store.list()[0].time, "8:00 AM");
    }

    #[test]
    fn test_load_skips_malformed() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs
            .put_string(WATCH_MEDICATIONS_KEY, "1,A,1mg,No time,Daily|garbage")
            .unwrap();

        let store = WatchMedicationStore::with_preferences(prefs);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_subscribe() {
        let store = WatchMedicationStore::new();
        let mut rx = store.subscribe();
        store.replace(vec![WatchMedication::new("1", "A", "1mg", "No time", "Daily")]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
