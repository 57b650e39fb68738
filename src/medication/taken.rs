//! Taken-Dose Tracker
//!
//! Records which dose instances the user has marked as administered. A dose
//! instance is the exact triple (medication id, scheduled time, date); there
//! is no fuzzy matching on time.

use crate::storage::{PreferenceStore, StorageError};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Preference key holding the JSON-encoded records
pub const TAKEN_RECORDS_KEY: &str = "taken_records";

/// Identity of one dose instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TakenKey {
    pub medication_id: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

impl TakenKey {
    pub fn new(medication_id: impl Into<String>, time: NaiveTime, date: NaiveDate) -> Self {
        Self {
            medication_id: medication_id.into(),
            time,
            date,
        }
    }
}

/// A persisted taken/not-taken assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenRecord {
    #[serde(flatten)]
    pub key: TakenKey,
    pub taken: bool,
}

/// Display state of a dose instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Taken,
    Upcoming,
}

impl std::fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoseStatus::Taken => write!(f, "Taken"),
            DoseStatus::Upcoming => write!(f, "Upcoming"),
        }
    }
}

/// Tracks taken doses, observable and optionally persisted
pub struct TakenDoseTracker {
    tx: watch::Sender<BTreeMap<TakenKey, bool>>,
    prefs: Option<Arc<dyn PreferenceStore>>,
}

impl TakenDoseTracker {
    /// Create an empty, memory-only tracker
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BTreeMap::new());
        Self { tx, prefs: None }
    }

    /// Create a tracker persisted through `prefs`, loading saved records
    pub fn with_preferences(prefs: Arc<dyn PreferenceStore>) -> Self {
        let initial = Self::load(prefs.as_ref());
        tracing::info!(records = initial.len(), "Loaded taken records");

        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            prefs: Some(prefs),
        }
    }

    fn load(prefs: &dyn PreferenceStore) -> BTreeMap<TakenKey, bool> {
        let raw = match prefs.get_string(TAKEN_RECORDS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read taken records, starting empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<Vec<TakenRecord>>(&raw) {
            Ok(records) => records.into_iter().map(|r| (r.key, r.taken)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored taken records are malformed, starting empty");
                BTreeMap::new()
            }
        }
    }

    fn persist(&self) {
        let Some(prefs) = &self.prefs else {
            return;
        };

        let records = self.records();
        let result = serde_json::to_string(&records)
            .map_err(StorageError::from)
            .and_then(|json| prefs.put_string(TAKEN_RECORDS_KEY, &json));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist taken records");
        }
    }

    fn set(&self, key: TakenKey, taken: bool) {
        let changed = self.tx.send_if_modified(|map| {
            let previous = map.insert(key.clone(), taken);
            previous != Some(taken)
        });

        if changed {
            tracing::debug!(
                medication_id = %key.medication_id,
                time = %key.time,
                date = %key.date,
                taken,
                "Dose status changed"
            );
            self.persist();
        }
    }

    /// Mark a dose instance as administered. Idempotent.
    pub fn mark_taken(&self, medication_id: &str, time: NaiveTime, date: NaiveDate) {
        self.set(TakenKey::new(medication_id, time, date), true);
    }

    /// Mark a dose instance as not administered. Idempotent.
    pub fn mark_not_taken(&self, medication_id: &str, time: NaiveTime, date: NaiveDate) {
        self.set(TakenKey::new(medication_id, time, date), false);
    }

    /// Flip the state of a dose instance, returning the new state
    pub fn toggle(&self, medication_id: &str, time: NaiveTime, date: NaiveDate) -> bool {
        let now_taken = !self.is_taken(medication_id, time, date);
        self.set(TakenKey::new(medication_id, time, date), now_taken);
        now_taken
    }

    /// Whether this exact dose instance is marked taken
    pub fn is_taken(&self, medication_id: &str, time: NaiveTime, date: NaiveDate) -> bool {
        let key = TakenKey::new(medication_id, time, date);
        self.tx.borrow().get(&key).copied().unwrap_or(false)
    }

    pub fn status(&self, medication_id: &str, time: NaiveTime, date: NaiveDate) -> DoseStatus {
        if self.is_taken(medication_id, time, date) {
            DoseStatus::Taken
        } else {
            DoseStatus::Upcoming
        }
    }

    /// Number of doses marked taken on `date`
    pub fn taken_count_on(&self, date: NaiveDate) -> usize {
        self.tx
            .borrow()
            .iter()
            .filter(|(key, taken)| key.date == date && **taken)
            .count()
    }

    /// All records, sorted by key
    pub fn records(&self) -> Vec<TakenRecord> {
        self.tx
            .borrow()
            .iter()
            .map(|(key, taken)| TakenRecord {
                key: key.clone(),
                taken: *taken,
            })
            .collect()
    }

    /// Observe the record map
    pub fn subscribe(&self) -> watch::Receiver<BTreeMap<TakenKey, bool>> {
        self.tx.subscribe()
    }
}

impl Default for TakenDoseTracker {
    fn default() -> Self {
        Self::new()
    }
}
