//! Watch-side medication record
//!
//! A lossy, display-only projection of the phone's `Medication`.

use crate::medication::Medication;
use serde::{Deserialize, Serialize};

/// Placeholder shown when a medication has no dose times
pub const NO_TIME: &str = "No time";

/// Reduced medication as the watch knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchMedication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    /// First dose time as "h:mm a" (e.g. "8:00 AM") or "No time"
    pub time: String,
    /// "Daily" or space-separated day labels (e.g. "Mon Wed")
    pub frequency: String,
}

impl WatchMedication {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dosage: impl Into<String>,
        time: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dosage: dosage.into(),
            time: time.into(),
            frequency: frequency.into(),
        }
    }

    /// Project a phone medication for display on the watch
    pub fn from_medication(medication: &Medication) -> Self {
        let time = medication
            .first_time()
            .map(|t| t.format("%-I:%M %p").to_string())
            .unwrap_or_else(|| NO_TIME.to_string());

        Self {
            id: medication.id.clone(),
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            time,
            frequency: medication.frequency.labels(" "),
        }
    }
}

impl From<&Medication> for WatchMedication {
    fn from(medication: &Medication) -> Self {
        Self::from_medication(medication)
    }
}
