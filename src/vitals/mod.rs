//! Vitals
//!
//! - **types**: readings, categories, daily aggregates
//! - **synthetic**: deterministic history derived from a template day
//! - **samples**: template days

pub mod samples;
pub mod synthetic;
pub mod types;

pub use synthetic::{backfill, epoch_day, Synthesize};
pub use types::{
    BloodPressureCategory, BloodPressureReading, DailyBloodPressure, DailyGlucose,
    DailyHeartRate, GlucoseCategory, GlucoseReading, HeartRateReading, HeartRateZone,
};
