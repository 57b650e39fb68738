//! Watch side
//!
//! - **types**: `WatchMedication`, the reduced display record
//! - **store**: the list last received from the phone
//! - **settings**: display settings and enabled complications

pub mod settings;
pub mod store;
pub mod types;

pub use settings::{
    AccentColor, AppSettings, ComplicationFeature, SettingsRepository, TextSize, WatchType,
};
pub use store::{WatchMedicationStore, WATCH_MEDICATIONS_KEY};
pub use types::{WatchMedication, NO_TIME};
