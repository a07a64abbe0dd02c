//! Prescription models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patient::Patient;
use super::validation::{ValidationError, ValidationResult};

/// Dosing frequency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Frequency {
    #[serde(rename = "OD")]
    OnceDaily,
    #[default]
    #[serde(rename = "BD")]
    TwiceDaily,
    #[serde(rename = "TDS")]
    ThriceDaily,
    #[serde(rename = "QID")]
    FourTimesDaily,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::OnceDaily,
        Frequency::TwiceDaily,
        Frequency::ThriceDaily,
        Frequency::FourTimesDaily,
    ];

    /// Prescription shorthand (OD, BD, TDS, QID).
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::OnceDaily => "OD",
            Frequency::TwiceDaily => "BD",
            Frequency::ThriceDaily => "TDS",
            Frequency::FourTimesDaily => "QID",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Frequency::OnceDaily => "Once Daily",
            Frequency::TwiceDaily => "Twice Daily",
            Frequency::ThriceDaily => "Three Times Daily",
            Frequency::FourTimesDaily => "Four Times Daily",
        }
    }

    pub fn doses_per_day(&self) -> u32 {
        match self {
            Frequency::OnceDaily => 1,
            Frequency::TwiceDaily => 2,
            Frequency::ThriceDaily => 3,
            Frequency::FourTimesDaily => 4,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    /// Accepts the shorthand or the long description, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Frequency::ALL
            .into_iter()
            .find(|f| f.code().eq_ignore_ascii_case(wanted) || f.description().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "frequency",
                value: s.to_string(),
            })
    }
}

/// When a dose is taken relative to meals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Timing {
    #[serde(rename = "Before Food")]
    BeforeFood,
    #[default]
    #[serde(rename = "After Food")]
    AfterFood,
    #[serde(rename = "Empty Stomach")]
    EmptyStomach,
    #[serde(rename = "With Food")]
    WithFood,
}

impl Timing {
    pub const ALL: [Timing; 4] = [
        Timing::BeforeFood,
        Timing::AfterFood,
        Timing::EmptyStomach,
        Timing::WithFood,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timing::BeforeFood => "Before Food",
            Timing::AfterFood => "After Food",
            Timing::EmptyStomach => "Empty Stomach",
            Timing::WithFood => "With Food",
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timing {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Timing::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "timing",
                value: s.to_string(),
            })
    }
}

/// Default course length, in days, for a newly added medicine line.
pub const DEFAULT_DURATION_DAYS: &str = "5";

/// Default follow-up interval in days.
pub const DEFAULT_FOLLOW_UP_DAYS: u32 = 7;

/// A single medicine line on a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineLine {
    /// Local line ID, unique only within its prescription
    pub id: String,
    /// Catalog brand name or free text
    pub medicine: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: Frequency,
    /// Course length in days, kept as text the way the form captures it
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub timing: Timing,
}

impl MedicineLine {
    /// New line with the form defaults (BD, 5 days, after food).
    pub fn new(medicine: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            medicine: medicine.into(),
            dosage: String::new(),
            frequency: Frequency::default(),
            duration: DEFAULT_DURATION_DAYS.to_string(),
            timing: Timing::default(),
        }
    }

    /// Parsed course length, if the text holds a day count.
    pub fn duration_days(&self) -> Option<u32> {
        self.duration.trim().parse().ok()
    }

    /// Total doses over the course, when the duration parses and the count
    /// fits in a `u32`.
    pub fn total_doses(&self) -> Option<u32> {
        self.duration_days()
            .and_then(|days| days.checked_mul(self.frequency.doses_per_day()))
    }

    /// One-line summary as used in prescription history.
    pub fn summary(&self) -> String {
        [self.medicine.as_str(), self.dosage.as_str(), self.frequency.code()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single editable field of a medicine line.
#[derive(Debug, Clone, PartialEq)]
pub enum MedicineField {
    Medicine(String),
    Dosage(String),
    Frequency(Frequency),
    Duration(String),
    Timing(Timing),
}

impl MedicineLine {
    pub fn set(&mut self, field: MedicineField) {
        match field {
            MedicineField::Medicine(value) => self.medicine = value,
            MedicineField::Dosage(value) => self.dosage = value,
            MedicineField::Frequency(value) => self.frequency = value,
            MedicineField::Duration(value) => self.duration = value,
            MedicineField::Timing(value) => self.timing = value,
        }
    }
}

/// A stored prescription. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default)]
    pub id: String,
    /// Soft reference; may not resolve after the patient is deleted
    pub patient_id: String,
    /// Patient name at the time of writing
    pub patient_name: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub medicines: Vec<MedicineLine>,
    #[serde(default)]
    pub advice: String,
    #[serde(default = "default_follow_up")]
    pub follow_up_days: u32,
    #[serde(default)]
    pub doctor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_follow_up() -> u32 {
    DEFAULT_FOLLOW_UP_DAYS
}

/// Prescription input, before the log assigns identity and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub patient_id: String,
    pub patient_name: String,
    pub diagnosis: String,
    pub medicines: Vec<MedicineLine>,
    pub advice: String,
    pub follow_up_days: u32,
    pub doctor_name: Option<String>,
}

impl NewPrescription {
    /// Start a prescription for a patient, snapshotting their name.
    pub fn for_patient(patient: &Patient, diagnosis: impl Into<String>) -> Self {
        Self {
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            diagnosis: diagnosis.into(),
            medicines: Vec::new(),
            advice: String::new(),
            follow_up_days: DEFAULT_FOLLOW_UP_DAYS,
            doctor_name: None,
        }
    }

    /// Save-time checks: a diagnosis and at least one medicine.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.patient_id.trim().is_empty() {
            return Err(ValidationError::NoPatientSelected);
        }
        if self.diagnosis.trim().is_empty() {
            return Err(ValidationError::MissingField("diagnosis"));
        }
        if self.medicines.is_empty() {
            return Err(ValidationError::NoMedicines);
        }
        Ok(())
    }

    pub fn into_prescription(self, now: DateTime<Utc>) -> Prescription {
        Prescription {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            diagnosis: self.diagnosis,
            medicines: self.medicines,
            advice: self.advice,
            follow_up_days: self.follow_up_days,
            doctor_name: self.doctor_name,
            created_at: now,
        }
    }
}
