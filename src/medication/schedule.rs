//! Schedule evaluation
//!
//! Decides whether a medication is due on a calendar date. Every failure
//! path resolves to "not scheduled".

use crate::medication::error::MedicationResult;
use crate::medication::types::{Frequency, Medication, Weekday};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Whether `medication` has doses due on `date`
pub fn is_scheduled(medication: &Medication, date: NaiveDate) -> bool {
    match try_is_scheduled(medication, date) {
        Ok(scheduled) => scheduled,
        Err(e) => {
            tracing::debug!(
                medication_id = %medication.id,
                date = %date,
                error = %e,
                "Treating malformed medication as not scheduled"
            );
            false
        }
    }
}

/// Fallible form of [`is_scheduled`]; malformed records are errors
pub fn try_is_scheduled(medication: &Medication, date: NaiveDate) -> MedicationResult<bool> {
    medication.validate()?;

    if let Some(start) = medication.start_date {
        if date < start {
            return Ok(false);
        }
    }
    if let Some(end) = medication.end_date {
        if date > end {
            return Ok(false);
        }
    }

    Ok(match &medication.frequency {
        Frequency::Daily => true,
        Frequency::SpecificDays(days) => days.contains(&Weekday::from_chrono(date.weekday())),
    })
}

/// One dose instance due on a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledDose {
    pub medication_id: String,
    pub name: String,
    pub dosage: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

/// Expand the medications due on `date` into individual doses
///
/// Sorted by time, then name. Medications with no times contribute nothing.
pub fn doses_on(medications: &[Medication], date: NaiveDate) -> Vec<ScheduledDose> {
    let mut doses: Vec<ScheduledDose> = medications
        .iter()
        .filter(|m| is_scheduled(m, date))
        .flat_map(|m| {
            m.times.iter().map(move |time| ScheduledDose {
                medication_id: m.id.clone(),
                name: m.name.clone(),
                dosage: m.dosage.clone(),
                time: *time,
                date,
            })
        })
        .collect();

    doses.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.name.cmp(&b.name)));
    doses
}
