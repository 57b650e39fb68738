//! Medication tracking
//!
//! - **types**: `Medication`, `Frequency`, `Weekday`, `MedicationType`
//! - **schedule**: "is this medication due on that date"
//! - **store**: the phone's observable medication list
//! - **taken**: which dose instances were marked administered
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, NaiveTime};
//! use timelycare::medication::*;
//!
//! let store = MedicationStore::new();
//! let tracker = TakenDoseTracker::new();
//!
//! let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
//! let med = Medication::new("Amoxicillin", "500mg")
//!     .between(
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//!     )
//!     .at(eight);
//! let id = med.id.clone();
//! store.add(med).unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
//! assert_eq!(store.scheduled_for(day).len(), 1);
//!
//! tracker.mark_taken(&id, eight, day);
//! assert!(tracker.is_taken(&id, eight, day));
//! ```

pub mod error;
pub mod schedule;
pub mod store;
pub mod taken;
pub mod types;

pub use error::{MedicationError, MedicationResult};
pub use schedule::{doses_on, is_scheduled, try_is_scheduled, ScheduledDose};
pub use store::MedicationStore;
pub use taken::{DoseStatus, TakenDoseTracker, TakenKey, TakenRecord};
pub use types::{Frequency, Medication, MedicationType, Weekday};
