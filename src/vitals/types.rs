//! Vitals readings, categories and daily aggregates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First element with the greatest key; `Iterator::max_by_key` keeps the last
fn first_max_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    items.iter().fold(None, |best, item| match best {
        Some(b) if key(item) <= key(b) => Some(b),
        _ => Some(item),
    })
}

/// Integer mean, truncated toward zero
fn mean(values: impl Iterator<Item = u32>) -> u32 {
    let (sum, n) = values.fold((0u64, 0u64), |(s, n), v| (s + v as u64, n + 1));
    if n == 0 {
        0
    } else {
        (sum / n) as u32
    }
}

// ═══════════════════════════════════════════
// Heart rate
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateZone {
    Normal,
    Elevated,
    High,
}

impl HeartRateZone {
    pub fn from_bpm(bpm: u32) -> Self {
        match bpm {
            0..=70 => HeartRateZone::Normal,
            71..=85 => HeartRateZone::Elevated,
            _ => HeartRateZone::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateReading {
    pub bpm: u32,
    /// Time-of-day label, e.g. "8:00 AM"
    pub label: String,
    pub zone: HeartRateZone,
}

impl HeartRateReading {
    pub fn new(bpm: u32, label: impl Into<String>) -> Self {
        Self {
            bpm,
            label: label.into(),
            zone: HeartRateZone::from_bpm(bpm),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHeartRate {
    pub date: NaiveDate,
    pub readings: Vec<HeartRateReading>,
    pub current: u32,
    pub average: u32,
    pub min: u32,
    pub max: u32,
}

impl DailyHeartRate {
    pub fn from_readings(date: NaiveDate, readings: Vec<HeartRateReading>) -> Option<Self> {
        let current = readings.last()?.bpm;
        let average = mean(readings.iter().map(|r| r.bpm));
        let min = readings.iter().map(|r| r.bpm).min()?;
        let max = readings.iter().map(|r| r.bpm).max()?;

        Some(Self {
            date,
            readings,
            current,
            average,
            min,
            max,
        })
    }

    /// A day with no readings and zeroed aggregates
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            readings: Vec::new(),
            current: 0,
            average: 0,
            min: 0,
            max: 0,
        }
    }
}

// ═══════════════════════════════════════════
// Blood pressure
// ═══════════════════════════════════════════

/// ACC/AHA blood pressure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureCategory {
    Normal,
    Elevated,
    Stage1,
    Stage2,
    Crisis,
}

impl BloodPressureCategory {
    pub fn classify(systolic: u32, diastolic: u32) -> Self {
        if systolic > 180 || diastolic > 120 {
            BloodPressureCategory::Crisis
        } else if systolic >= 140 || diastolic >= 90 {
            BloodPressureCategory::Stage2
        } else if systolic >= 130 || diastolic >= 80 {
            BloodPressureCategory::Stage1
        } else if systolic >= 120 {
            BloodPressureCategory::Elevated
        } else {
            BloodPressureCategory::Normal
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Stage1 => "Hypertension Stage 1",
            BloodPressureCategory::Stage2 => "Hypertension Stage 2",
            BloodPressureCategory::Crisis => "Hypertensive Crisis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: u32,
    pub label: String,
}

impl BloodPressureReading {
    pub fn new(systolic: u32, diastolic: u32, pulse: u32, label: impl Into<String>) -> Self {
        Self {
            systolic,
            diastolic,
            pulse,
            label: label.into(),
        }
    }

    pub fn category(&self) -> BloodPressureCategory {
        BloodPressureCategory::classify(self.systolic, self.diastolic)
    }

    fn load(&self) -> u32 {
        self.systolic + self.diastolic
    }
}

impl std::fmt::Display for BloodPressureReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBloodPressure {
    pub date: NaiveDate,
    pub readings: Vec<BloodPressureReading>,
    pub current: BloodPressureReading,
    /// Component-wise mean, labelled "Average"
    pub average: BloodPressureReading,
    pub lowest: BloodPressureReading,
    pub highest: BloodPressureReading,
}

impl DailyBloodPressure {
    pub fn from_readings(date: NaiveDate, readings: Vec<BloodPressureReading>) -> Option<Self> {
        let current = readings.last()?.clone();
        // Ties resolve to the earliest reading for both extremes
        let lowest = readings.iter().min_by_key(|r| r.load())?.clone();
        let highest = first_max_by_key(&readings, |r| r.load())?.clone();
        let average = BloodPressureReading::new(
            mean(readings.iter().map(|r| r.systolic)),
            mean(readings.iter().map(|r| r.diastolic)),
            mean(readings.iter().map(|r| r.pulse)),
            "Average",
        );

        Some(Self {
            date,
            readings,
            current,
            average,
            lowest,
            highest,
        })
    }

    /// A day with no readings; every aggregate is a blank 0/0 reading
    pub fn empty(date: NaiveDate) -> Self {
        let blank = BloodPressureReading::new(0, 0, 0, "");
        Self {
            date,
            readings: Vec::new(),
            current: blank.clone(),
            average: blank.clone(),
            lowest: blank.clone(),
            highest: blank,
        }
    }
}

// ═══════════════════════════════════════════
// Glucose
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseCategory {
    Low,
    Normal,
    High,
}

impl GlucoseCategory {
    /// Classify a value in mg/dL
    pub fn from_value(value: u32) -> Self {
        match value {
            0..=69 => GlucoseCategory::Low,
            70..=140 => GlucoseCategory::Normal,
            _ => GlucoseCategory::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlucoseReading {
    /// mg/dL
    pub value: u32,
    pub label: String,
    pub category: GlucoseCategory,
}

impl GlucoseReading {
    pub fn new(value: u32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            category: GlucoseCategory::from_value(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGlucose {
    pub date: NaiveDate,
    pub readings: Vec<GlucoseReading>,
    pub current: GlucoseReading,
    pub average: GlucoseReading,
    pub min: GlucoseReading,
    pub max: GlucoseReading,
}

impl DailyGlucose {
    pub fn from_readings(date: NaiveDate, readings: Vec<GlucoseReading>) -> Option<Self> {
        let current = readings.last()?.clone();
        let min = readings.iter().min_by_key(|r| r.value)?.clone();
        let max = first_max_by_key(&readings, |r| r.value)?.clone();
        let average = GlucoseReading::new(mean(readings.iter().map(|r| r.value)), "Average");

        Some(Self {
            date,
            readings,
            current,
            average,
            min,
            max,
        })
    }

    pub fn empty(date: NaiveDate) -> Self {
        let blank = GlucoseReading::new(0, "");
        Self {
            date,
            readings: Vec::new(),
            current: blank.clone(),
            average: blank.clone(),
            min: blank.clone(),
            max: blank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_heart_rate_zones() {
        assert_eq!(HeartRateZone::from_bpm(70), HeartRateZone::Normal);
        assert_eq!(HeartRateZone::from_bpm(71), HeartRateZone::Elevated);
        assert_eq!(HeartRateZone::from_bpm(85), HeartRateZone::Elevated);
        assert_eq!(HeartRateZone::from_bpm(86), HeartRateZone::High);
    }

    #[test]
    fn test_daily_heart_rate() {
        let readings = vec![
            HeartRateReading::new(62, "6:00 AM"),
            HeartRateReading::new(88, "12:00 PM"),
            HeartRateReading::new(75, "6:00 PM"),
        ];
        let daily = DailyHeartRate::from_readings(day(), readings).unwrap();

        assert_eq!(daily.current, 75);
        assert_eq!(daily.average, 75);
        assert_eq!(daily.min, 62);
        assert_eq!(daily.max, 88);
        assert!(DailyHeartRate::from_readings(day(), Vec::new()).is_none());
    }

    #[test]
    fn test_average_truncates() {
        let readings = vec![HeartRateReading::new(70, "a"), HeartRateReading::new(71, "b")];
        assert_eq!(DailyHeartRate::from_readings(day(), readings).unwrap().average, 70);
    }

    #[test]
    fn test_blood_pressure_categories() {
        assert_eq!(BloodPressureCategory::classify(115, 75), BloodPressureCategory::Normal);
        assert_eq!(BloodPressureCategory::classify(125, 78), BloodPressureCategory::Elevated);
        assert_eq!(BloodPressureCategory::classify(118, 82), BloodPressureCategory::Stage1);
        assert_eq!(BloodPressureCategory::classify(135, 70), BloodPressureCategory::Stage1);
        assert_eq!(BloodPressureCategory::classify(142, 85), BloodPressureCategory::Stage2);
        assert_eq!(BloodPressureCategory::classify(185, 100), BloodPressureCategory::Crisis);
        assert_eq!(BloodPressureCategory::classify(150, 121), BloodPressureCategory::Crisis);
    }

    #[test]
    fn test_daily_blood_pressure() {
        let readings = vec![
            BloodPressureReading::new(120, 80, 70, "Morning"),
            BloodPressureReading::new(110, 70, 65, "Noon"),
            BloodPressureReading::new(131, 85, 80, "Evening"),
        ];
        let daily = DailyBloodPressure::from_readings(day(), readings).unwrap();

        assert_eq!(daily.current.label, "Evening");
        assert_eq!(daily.lowest.label, "Noon");
        assert_eq!(daily.highest.label, "Evening");
        assert_eq!(daily.average.to_string(), "120/78");
        assert_eq!(daily.average.pulse, 71);
        assert_eq!(daily.average.label, "Average");
    }

    #[test]
    fn test_extremes_keep_first_on_tie() {
        let readings = vec![
            BloodPressureReading::new(130, 80, 70, "first"),
            BloodPressureReading::new(120, 90, 72, "second"),
            BloodPressureReading::new(100, 60, 60, "low"),
            BloodPressureReading::new(90, 70, 60, "low again"),
        ];
        let daily = DailyBloodPressure::from_readings(day(), readings).unwrap();
        assert_eq!(daily.highest.label, "first");
        assert_eq!(daily.lowest.label, "low");

        let readings = vec![
            GlucoseReading::new(150, "lunch"),
            GlucoseReading::new(150, "dinner"),
            GlucoseReading::new(90, "fasting"),
        ];
        let daily = DailyGlucose::from_readings(day(), readings).unwrap();
        assert_eq!(daily.max.label, "lunch");
    }

    #[test]
    fn test_empty_days() {
        let hr = DailyHeartRate::empty(day());
        assert!(hr.readings.is_empty());
        assert_eq!((hr.current, hr.average, hr.min, hr.max), (0, 0, 0, 0));

        let bp = DailyBloodPressure::empty(day());
        assert_eq!(bp.highest.to_string(), "0/0");
        assert_eq!(DailyGlucose::empty(day()).average.value, 0);
    }

    #[test]
    fn test_glucose() {
        assert_eq!(GlucoseCategory::from_value(69), GlucoseCategory::Low);
        assert_eq!(GlucoseCategory::from_value(140), GlucoseCategory::Normal);
        assert_eq!(GlucoseCategory::from_value(141), GlucoseCategory::High);

        let readings = vec![
            GlucoseReading::new(95, "Fasting"),
            GlucoseReading::new(150, "After lunch"),
            GlucoseReading::new(110, "Bedtime"),
        ];
        let daily = DailyGlucose::from_readings(day(), readings).unwrap();
        assert_eq!(daily.min.value, 95);
        assert_eq!(daily.max.category, GlucoseCategory::High);
        assert_eq!(daily.average.value, 118);
        assert_eq!(daily.current.label, "Bedtime");
    }
}
