//! Synthetic vitals history
//!
//! There is no historical sensor source, so past days are derived from a
//! template day. Each reading is nudged by a bounded random delta and
//! clamped to a plausible range. The generator is seeded with the target
//! date's epoch day, so a given date always produces the same values.
//!
//! Output of this module is presentational filler, never a measurement.

use crate::vitals::types::{
    BloodPressureReading, DailyBloodPressure, DailyGlucose, DailyHeartRate, GlucoseReading,
    HeartRateReading,
};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Days since 1970-01-01, negative before it
pub fn epoch_day(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - UNIX_EPOCH_DAYS_FROM_CE
}

/// Generator for `date`
pub fn rng_for(date: NaiveDate) -> StdRng {
    StdRng::seed_from_u64(epoch_day(date) as u64)
}

fn perturb(rng: &mut StdRng, value: u32, spread: i64, min: i64, max: i64) -> u32 {
    let delta = rng.gen_range(-spread..=spread);
    (value as i64 + delta).clamp(min, max) as u32
}

/// A daily aggregate that can be synthesized from a template day
pub trait Synthesize: Sized {
    /// Derive a plausible day for `target` from `self`
    fn synthesize(&self, target: NaiveDate) -> Self;
}

impl Synthesize for DailyHeartRate {
    fn synthesize(&self, target: NaiveDate) -> Self {
        let mut rng = rng_for(target);
        let readings: Vec<HeartRateReading> = self
            .readings
            .iter()
            .map(|r| HeartRateReading::new(perturb(&mut rng, r.bpm, 6, 55, 110), r.label.clone()))
            .collect();

        DailyHeartRate::from_readings(target, readings).unwrap_or_else(|| Self::empty(target))
    }
}

impl Synthesize for DailyBloodPressure {
    fn synthesize(&self, target: NaiveDate) -> Self {
        let mut rng = rng_for(target);
        let readings: Vec<BloodPressureReading> = self
            .readings
            .iter()
            .map(|r| {
                // Draw order is fixed: systolic, diastolic, pulse
                let systolic = perturb(&mut rng, r.systolic, 6, 105, 145);
                let diastolic = perturb(&mut rng, r.diastolic, 4, 65, 95);
                let pulse = perturb(&mut rng, r.pulse, 6, 60, 110);
                BloodPressureReading::new(systolic, diastolic, pulse, r.label.clone())
            })
            .collect();

        DailyBloodPressure::from_readings(target, readings).unwrap_or_else(|| Self::empty(target))
    }
}

impl Synthesize for DailyGlucose {
    fn synthesize(&self, target: NaiveDate) -> Self {
        let mut rng = rng_for(target);
        let readings: Vec<GlucoseReading> = self
            .readings
            .iter()
            .map(|r| GlucoseReading::new(perturb(&mut rng, r.value, 12, 70, 160), r.label.clone()))
            .collect();

        DailyGlucose::from_readings(target, readings).unwrap_or_else(|| Self::empty(target))
    }
}

/// Synthesize the `days` days before `today`, newest first
pub fn backfill<T: Synthesize>(template: &T, today: NaiveDate, days: u32) -> Vec<T> {
    (1..=days as i64)
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .map(|date| template.synthesize(date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::types::{BloodPressureCategory, HeartRateZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn heart_template() -> DailyHeartRate {
        DailyHeartRate::from_readings(
            date(2024, 3, 10),
            vec![
                HeartRateReading::new(58, "6:00 AM"),
                HeartRateReading::new(72, "10:00 AM"),
                HeartRateReading::new(95, "2:00 PM"),
                HeartRateReading::new(108, "6:00 PM"),
            ],
        )
        .unwrap()
    }

    fn bp_template() -> DailyBloodPressure {
        DailyBloodPressure::from_readings(
            date(2024, 3, 10),
            vec![
                BloodPressureReading::new(118, 76, 68, "Morning"),
                BloodPressureReading::new(128, 84, 74, "Afternoon"),
                BloodPressureReading::new(142, 92, 88, "Evening"),
            ],
        )
        .unwrap()
    }

    fn glucose_template() -> DailyGlucose {
        DailyGlucose::from_readings(
            date(2024, 3, 10),
            vec![
                GlucoseReading::new(72, "Fasting"),
                GlucoseReading::new(135, "After breakfast"),
                GlucoseReading::new(155, "After dinner"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_epoch_day() {
        assert_eq!(epoch_day(date(1970, 1, 1)), 0);
        assert_eq!(epoch_day(date(1970, 1, 2)), 1);
        assert_eq!(epoch_day(date(2024, 1, 1)), 19_723);
        assert_eq!(epoch_day(date(1969, 12, 31)), -1);
    }

    #[test]
    fn test_deterministic() {
        let target = date(2024, 3, 5);
        assert_eq!(heart_template().synthesize(target), heart_template().synthesize(target));
        assert_eq!(bp_template().synthesize(target), bp_template().synthesize(target));
        assert_eq!(
            glucose_template().synthesize(target),
            glucose_template().synthesize(target)
        );
    }

    #[test]
    fn test_heart_rate_bounds_and_aggregates() {
        let template = heart_template();
        for offset in 0..60 {
            let target = date(2024, 1, 1) + Duration::days(offset);
            let day = template.synthesize(target);

            assert_eq!(day.date, target);
            assert_eq!(day.readings.len(), template.readings.len());
            for (new, old) in day.readings.iter().zip(&template.readings) {
                assert!((55..=110).contains(&new.bpm));
                assert!((new.bpm as i64 - old.bpm as i64).abs() <= 6);
                assert_eq!(new.zone, HeartRateZone::from_bpm(new.bpm));
                assert_eq!(new.label, old.label);
            }
            assert_eq!(day.current, day.readings.last().unwrap().bpm);
            assert_eq!(day.min, day.readings.iter().map(|r| r.bpm).min().unwrap());
            assert_eq!(day.max, day.readings.iter().map(|r| r.bpm).max().unwrap());
        }
    }

    #[test]
    fn test_blood_pressure_bounds() {
        let template = bp_template();
        for offset in 0..60 {
            let day = template.synthesize(date(2024, 1, 1) + Duration::days(offset));
            for r in &day.readings {
                assert!((105..=145).contains(&r.systolic));
                assert!((65..=95).contains(&r.diastolic));
                assert!((60..=110).contains(&r.pulse));
                assert!(r.category() <= BloodPressureCategory::Stage2);
            }
            let loads: Vec<u32> = day.readings.iter().map(|r| r.systolic + r.diastolic).collect();
            assert_eq!(
                day.lowest.systolic + day.lowest.diastolic,
                *loads.iter().min().unwrap()
            );
        }
    }

    #[test]
    fn test_glucose_bounds() {
        let template = glucose_template();
        for offset in 0..60 {
            let day = template.synthesize(date(2024, 1, 1) + Duration::days(offset));
            for (new, old) in day.readings.iter().zip(&template.readings) {
                assert!((70..=160).contains(&new.value));
                assert!((new.value as i64 - old.value as i64).abs() <= 12);
            }
        }
    }

    #[test]
    fn test_empty_template() {
        let mut template = heart_template();
        template.readings.clear();
        let day = template.synthesize(date(2024, 2, 2));
        assert_eq!(day, DailyHeartRate::empty(date(2024, 2, 2)));
        assert_eq!((day.current, day.average, day.min, day.max), (0, 0, 0, 0));

        let mut template = bp_template();
        template.readings.clear();
        let day = template.synthesize(date(2024, 2, 2));
        assert_eq!(day, DailyBloodPressure::empty(date(2024, 2, 2)));
        assert_eq!(day.highest.systolic, 0);

        let mut template = glucose_template();
        template.readings.clear();
        assert_eq!(template.synthesize(date(2024, 2, 2)).max.value, 0);
    }

    #[test]
    fn test_backfill_newest_first() {
        let today = date(2024, 3, 10);
        let week = backfill(&heart_template(), today, 7);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2024, 3, 9));
        assert_eq!(week[6].date, date(2024, 3, 3));
        assert_eq!(week[2], heart_template().synthesize(date(2024, 3, 7)));
        assert!(backfill(&heart_template(), today, 0).is_empty());
    }
}
