//! Core medication types
//!
//! - `Medication`: one prescribed medication and its dosing rule
//! - `Frequency`: which days a dose is due
//! - `Weekday`: the domain's own 7-value weekday
//! - `MedicationType`: form of the medication

use crate::medication::error::{MedicationError, MedicationResult};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Day of the week, Monday first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in display order
    pub fn all() -> &'static [Weekday] {
        &[
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ]
    }

    /// Map the calendar weekday onto the domain weekday
    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    /// Three-letter label used in frequency display strings
    pub fn short_label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }

    /// Parse a three-letter label
    pub fn from_short_label(label: &str) -> Option<Self> {
        Weekday::all()
            .iter()
            .copied()
            .find(|d| d.short_label() == label.trim())
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_label())
    }
}

/// Rule deciding which calendar dates a dose is due
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "days", rename_all = "snake_case")]
pub enum Frequency {
    /// Every day in the medication's date range
    Daily,
    /// Only on the listed weekdays. An empty set is never due.
    SpecificDays(BTreeSet<Weekday>),
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

impl Frequency {
    /// Build a specific-days rule from a list of weekdays
    pub fn on(days: &[Weekday]) -> Self {
        Frequency::SpecificDays(days.iter().copied().collect())
    }

    /// Display string: "Daily" or e.g. "Mon, Wed"
    ///
    /// All seven days selected displays as "Daily".
    pub fn display(&self) -> String {
        self.labels(", ")
    }

    /// Same as `display` but with a caller-chosen separator
    pub fn labels(&self, separator: &str) -> String {
        match self {
            Frequency::Daily => "Daily".to_string(),
            Frequency::SpecificDays(days) if days.len() == Weekday::all().len() => {
                "Daily".to_string()
            }
            Frequency::SpecificDays(days) => days
                .iter()
                .map(|d| d.short_label())
                .collect::<Vec<_>>()
                .join(separator),
        }
    }

    /// Parse a display string back into a rule
    ///
    /// Unknown tokens are ignored; nothing recognised falls back to `Daily`.
    pub fn parse_display(s: &str) -> Self {
        if s.trim() == "Daily" {
            return Frequency::Daily;
        }

        let days: BTreeSet<Weekday> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .filter_map(Weekday::from_short_label)
            .collect();

        if days.is_empty() {
            Frequency::Daily
        } else {
            Frequency::SpecificDays(days)
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Form in which a medication is administered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MedicationType {
    #[default]
    Pill,
    Tablet,
    Capsule,
    Liquid,
    Injection,
    Other,
}

impl MedicationType {
    /// Get all types for iteration
    pub fn all() -> &'static [MedicationType] {
        &[
            MedicationType::Pill,
            MedicationType::Tablet,
            MedicationType::Capsule,
            MedicationType::Liquid,
            MedicationType::Injection,
            MedicationType::Other,
        ]
    }

    /// Parse free text, case-insensitive. Unknown names map to `Other`.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pill" => MedicationType::Pill,
            "tablet" => MedicationType::Tablet,
            "capsule" => MedicationType::Capsule,
            "liquid" | "syrup" => MedicationType::Liquid,
            "injection" | "shot" => MedicationType::Injection,
            _ => MedicationType::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MedicationType::Pill => "Pill",
            MedicationType::Tablet => "Tablet",
            MedicationType::Capsule => "Capsule",
            MedicationType::Liquid => "Liquid",
            MedicationType::Injection => "Injection",
            MedicationType::Other => "Other",
        }
    }
}

impl std::fmt::Display for MedicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A medication and its dosing schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Opaque stable identifier
    pub id: String,
    /// Display name (e.g. "Amoxicillin")
    pub name: String,
    /// Dosage as entered (e.g. "500mg")
    pub dosage: String,
    #[serde(default)]
    pub medication_type: MedicationType,
    #[serde(default)]
    pub frequency: Frequency,
    /// First day doses are due (inclusive)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day doses are due (inclusive)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Times of day doses are due, ascending and distinct
    #[serde(default)]
    pub times: BTreeSet<NaiveTime>,
    #[serde(default)]
    pub instructions: String,
}

impl Medication {
    /// Create a daily medication with a fresh id and no times yet
    pub fn new(name: impl Into<String>, dosage: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            dosage: dosage.into(),
            medication_type: MedicationType::default(),
            frequency: Frequency::Daily,
            start_date: None,
            end_date: None,
            times: BTreeSet::new(),
            instructions: String::new(),
        }
    }

    /// Builder method: set the id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method: set the medication type
    pub fn kind(mut self, medication_type: MedicationType) -> Self {
        self.medication_type = medication_type;
        self
    }

    /// Builder method: set the frequency rule
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Builder method: set the inclusive date range
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Builder method: add a dose time
    pub fn at(mut self, time: NaiveTime) -> Self {
        self.times.insert(time);
        self
    }

    /// Builder method: set instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Earliest dose time of the day, if any
    pub fn first_time(&self) -> Option<NaiveTime> {
        self.times.iter().next().copied()
    }

    /// Check the record invariants
    pub fn validate(&self) -> MedicationResult<()> {
        if self.id.trim().is_empty() {
            return Err(MedicationError::Invalid("id must not be blank".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(MedicationError::Invalid("name must not be blank".to_string()));
        }
        if self.dosage.trim().is_empty() {
            return Err(MedicationError::Invalid(format!(
                "dosage of {} must not be blank",
                self.name
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(MedicationError::Invalid(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_mapping_is_total() {
        let chrono_days = [
            chrono::Weekday::Mon,
            chrono::Weekday::Tue,
            chrono::Weekday::Wed,
            chrono::Weekday::Thu,
            chrono::Weekday::Fri,
            chrono::Weekday::Sat,
            chrono::Weekday::Sun,
        ];
        let mapped: Vec<Weekday> = chrono_days.iter().map(|d| Weekday::from_chrono(*d)).collect();
        assert_eq!(mapped, Weekday::all());
    }

    #[test]
    fn test_frequency_display() {
        assert_eq!(Frequency::Daily.display(), "Daily");
        assert_eq!(
            Frequency::on(&[Weekday::Wednesday, Weekday::Monday]).display(),
            "Mon, Wed"
        );
        assert_eq!(Frequency::on(Weekday::all()).display(), "Daily");
        assert_eq!(Frequency::on(&[]).display(), "");
    }

    #[test]
    fn test_frequency_parse_display() {
        assert_eq!(Frequency::parse_display("Daily"), Frequency::Daily);
        assert_eq!(
            Frequency::parse_display("Mon, Wed"),
            Frequency::on(&[Weekday::Monday, Weekday::Wednesday])
        );
        assert_eq!(
            Frequency::parse_display("Tue Fri"),
            Frequency::on(&[Weekday::Tuesday, Weekday::Friday])
        );
        assert_eq!(Frequency::parse_display("whenever"), Frequency::Daily);
    }

    #[test]
    fn test_frequency_serde_shape() {
        let json = serde_json::to_string(&Frequency::on(&[Weekday::Monday])).unwrap();
        assert_eq!(json, r#"{"type":"specific_days","days":["MONDAY"]}"#);

        let json = serde_json::to_string(&Frequency::Daily).unwrap();
        assert_eq!(json, r#"{"type":"daily"}"#);
    }

    #[test]
    fn test_medication_type_from_name() {
        assert_eq!(MedicationType::from_name("Capsule"), MedicationType::Capsule);
        assert_eq!(MedicationType::from_name(" TABLET "), MedicationType::Tablet);
        assert_eq!(MedicationType::from_name("patch"), MedicationType::Other);
    }

    #[test]
    fn test_medication_builder_keeps_times_sorted() {
        let med = Medication::new("Metformin", "850mg")
            .at(NaiveTime::from_hms_opt(20, 0, 0).unwrap())
            .at(NaiveTime::from_hms_opt(8, 0, 0).unwrap())
            .at(NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        assert_eq!(med.times.len(), 2);
        assert_eq!(med.first_time(), NaiveTime::from_hms_opt(8, 0, 0));
        assert!(!med.id.is_empty());
    }

    #[test]
    fn test_validate() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let med = Medication::new("Aspirin", "81mg").between(start, end);
        assert!(matches!(med.validate(), Err(MedicationError::Invalid(_))));

        let med = Medication::new("  ", "81mg");
        assert!(med.validate().is_err());

        let med = Medication::new("Aspirin", "");
        assert!(med.validate().is_err());

        let med = Medication::new("Aspirin", "81mg").between(end, start);
        assert!(med.validate().is_ok());
    }
}
