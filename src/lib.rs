//! # TimelyCare
//!
//! Medication tracking for a phone with a companion watch.
//!
//! ## Features
//!
//! - **Scheduling**: which medications are due on a given day
//! - **Dose tracking**: per-dose taken flags that survive restarts
//! - **Watch sync**: best-effort push of the medication list to the watch
//! - **Vitals**: reading categories and deterministic synthetic history
//!
//! ## Modules
//!
//! - [`storage`]: Key-value preference backends
//! - [`medication`]: Medication model, store, schedule and taken tracker
//! - [`sync`]: Wire codecs, data layer, push channel and watch listener
//! - [`watch`]: Watch-side medication list and settings
//! - [`vitals`]: Heart rate, blood pressure and glucose
//! - [`state`]: Phone and watch composition roots
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timelycare::{Config, InProcessDataLayer, Medication, PhoneState, WatchState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let layer = Arc::new(InProcessDataLayer::default());
//!
//!     let watch = WatchState::build(&config);
//!     let _listener = watch.listen(layer.subscribe());
//!     let phone = PhoneState::build(&config, layer.clone());
//!
//!     // Every change is pushed to the watch in the background
//!     phone.medications.add(Medication::new("Amoxicillin", "500mg"))?;
//!
//!     let today = chrono::Local::now().date_naive();
//!     println!("{} doses today", phone.medications.scheduled_for(today).len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;
pub mod medication;
pub mod state;
pub mod storage;
pub mod sync;
pub mod vitals;
pub mod watch;

// Re-export top-level types for convenience
pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use storage::{
    JsonFilePreferences, MemoryPreferences, PrefValue, PreferenceStore, PrefsBackend,
    SqlitePreferences, StorageConfig, StorageError, StorageResult,
};

pub use medication::{
    is_scheduled, DoseStatus, Frequency, Medication, MedicationError, MedicationResult,
    MedicationStore, MedicationType, ScheduledDose, TakenDoseTracker, Weekday,
};

pub use sync::{
    CodecError, DataLayer, InProcessDataLayer, SyncConfig, SyncOutcome, TransportError,
    WatchDataListener, WatchSyncChannel, WireFormat,
};

pub use watch::{AppSettings, SettingsRepository, WatchMedication, WatchMedicationStore};

pub use vitals::{backfill, Synthesize};

pub use state::{PhoneState, WatchState};
