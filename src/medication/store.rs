//! Medication Store
//!
//! Owns the phone's medication list. Every mutation publishes a fresh
//! snapshot on a `watch` channel; the sync channel and any UI observe that
//! channel instead of polling.

use crate::medication::error::{MedicationError, MedicationResult};
use crate::medication::schedule::{doses_on, ScheduledDose};
use crate::medication::types::Medication;
use crate::storage::PreferenceStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::watch;

/// Preference key holding the JSON-encoded list
pub const MEDICATIONS_KEY: &str = "medications";

/// Observable, optionally persisted list of medications
pub struct MedicationStore {
    /// Current list; the sender doubles as the state holder
    tx: watch::Sender<Vec<Medication>>,
    /// Where the list is persisted, if anywhere
    prefs: Option<Arc<dyn PreferenceStore>>,
}

impl MedicationStore {
    /// Create an empty, memory-only store
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { tx, prefs: None }
    }

    /// Create a store persisted through `prefs`, loading any saved list
    pub fn with_preferences(prefs: Arc<dyn PreferenceStore>) -> Self {
        let initial = Self::load(prefs.as_ref());
        tracing::info!(count = initial.len(), "Loaded medications");

        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            prefs: Some(prefs),
        }
    }

    fn load(prefs: &dyn PreferenceStore) -> Vec<Medication> {
        let raw = match prefs.get_string(MEDICATIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read medications, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Medication>>(&raw) {
            Ok(meds) => meds,
            Err(e) => {
                tracing::warn!(error = %e, "Stored medications are malformed, starting empty");
                Vec::new()
            }
        }
    }

    fn persist(&self, medications: &[Medication]) {
        let Some(prefs) = &self.prefs else {
            return;
        };

        let result = serde_json::to_string(medications)
            .map_err(crate::storage::StorageError::from)
            .and_then(|json| prefs.put_string(MEDICATIONS_KEY, &json));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist medications");
        }
    }

    /// Add a new medication
    pub fn add(&self, medication: Medication) -> MedicationResult<()> {
        medication.validate()?;

        let mut outcome = Ok(());
        self.tx.send_if_modified(|list| {
            if list.iter().any(|m| m.id == medication.id) {
                outcome = Err(MedicationError::DuplicateId(medication.id.clone()));
                return false;
            }
            list.push(medication.clone());
            true
        });
        outcome?;

        tracing::info!(medication_id = %medication.id, name = %medication.name, "Medication added");
        self.persist(&self.tx.borrow());
        Ok(())
    }

    /// Replace the medication with the same id
    pub fn update(&self, medication: Medication) -> MedicationResult<()> {
        medication.validate()?;

        let mut outcome = Ok(());
        self.tx.send_if_modified(|list| match list.iter_mut().find(|m| m.id == medication.id) {
            Some(existing) => {
                *existing = medication.clone();
                true
            }
            None => {
                outcome = Err(MedicationError::NotFound(medication.id.clone()));
                false
            }
        });
        outcome?;

        tracing::info!(medication_id = %medication.id, "Medication updated");
        self.persist(&self.tx.borrow());
        Ok(())
    }

    /// Remove a medication by id
    ///
    /// Taken records for the medication are left untouched.
    pub fn delete(&self, id: &str) -> MedicationResult<Medication> {
        let mut removed = None;
        self.tx.send_if_modified(|list| {
            match list.iter().position(|m| m.id == id) {
                Some(idx) => {
                    removed = Some(list.remove(idx));
                    true
                }
                None => false,
            }
        });

        let removed = removed.ok_or_else(|| MedicationError::NotFound(id.to_string()))?;

        tracing::info!(medication_id = %id, "Medication deleted");
        self.persist(&self.tx.borrow());
        Ok(removed)
    }

    /// Get a medication by id
    pub fn get(&self, id: &str) -> Option<Medication> {
        self.tx.borrow().iter().find(|m| m.id == id).cloned()
    }

    /// Snapshot of all medications in insertion order
    pub fn list(&self) -> Vec<Medication> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Doses due on `date`, sorted by time
    pub fn scheduled_for(&self, date: NaiveDate) -> Vec<ScheduledDose> {
        doses_on(&self.tx.borrow(), date)
    }

    /// Observe the list; the receiver sees a new snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<Medication>> {
        self.tx.subscribe()
    }
}

impl Default for MedicationStore {
    fn default() -> Self {
        Self::new()
    }
}
