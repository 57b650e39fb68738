//! Representative "today" readings used as synthesis templates

use crate::vitals::types::{
    BloodPressureReading, DailyBloodPressure, DailyGlucose, DailyHeartRate, GlucoseReading,
    HeartRateReading,
};
use chrono::NaiveDate;

pub fn heart_rate_day(date: NaiveDate) -> DailyHeartRate {
    let readings = [
        (64, "6:00 AM"),
        (72, "9:00 AM"),
        (81, "12:00 PM"),
        (88, "3:00 PM"),
        (76, "6:00 PM"),
        (68, "9:00 PM"),
    ]
    .into_iter()
    .map(|(bpm, label)| HeartRateReading::new(bpm, label))
    .collect();

    DailyHeartRate::from_readings(date, readings).unwrap_or_else(|| DailyHeartRate::empty(date))
}

pub fn blood_pressure_day(date: NaiveDate) -> DailyBloodPressure {
    let readings = [
        (118, 76, 68, "7:00 AM"),
        (124, 80, 72, "1:00 PM"),
        (131, 84, 78, "7:00 PM"),
    ]
    .into_iter()
    .map(|(sys, dia, pulse, label)| BloodPressureReading::new(sys, dia, pulse, label))
    .collect();

    DailyBloodPressure::from_readings(date, readings)
        .unwrap_or_else(|| DailyBloodPressure::empty(date))
}

pub fn glucose_day(date: NaiveDate) -> DailyGlucose {
    let readings = [
        (92, "Fasting"),
        (138, "After breakfast"),
        (115, "Before dinner"),
        (146, "After dinner"),
    ]
    .into_iter()
    .map(|(value, label)| GlucoseReading::new(value, label))
    .collect();

    DailyGlucose::from_readings(date, readings).unwrap_or_else(|| DailyGlucose::empty(date))
}
