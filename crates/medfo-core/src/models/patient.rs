//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::validation::{ValidationError, ValidationResult};

/// Patient gender as captured on the registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ValidationError::UnknownValue {
                field: "gender",
                value: s.to_string(),
            }),
        }
    }
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "bloodGroup",
                value: s.to_string(),
            })
    }
}

/// Older documents store an unselected blood group as `""`.
fn lenient_blood_group<'de, D>(deserializer: D) -> Result<Option<BloodGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Generated record ID, also the document key
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Age in years
    pub age: u32,
    #[serde(default)]
    pub gender: Gender,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Weight in kg
    #[serde(default)]
    pub weight: Option<f64>,
    /// Height in cm
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_blood_group")]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input: a patient without identity or timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub blood_group: Option<BloodGroup>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
}

impl NewPatient {
    /// Create registration input with the mandatory fields.
    pub fn new(name: impl Into<String>, age: u32, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            phone: phone.into(),
            ..Default::default()
        }
    }

    /// Check mandatory fields and measurement ranges.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_core_fields(&self.name, self.age, &self.phone, self.weight, self.height)
    }

    /// Materialize into a stored record with a fresh ID and matching timestamps.
    pub fn into_patient(self, now: DateTime<Utc>) -> Patient {
        Patient {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            age: self.age,
            gender: self.gender,
            phone: self.phone.trim().to_string(),
            email: non_blank(self.email),
            weight: self.weight,
            height: self.height,
            blood_group: self.blood_group,
            allergies: self.allergies,
            chronic_conditions: self.chronic_conditions,
            emergency_contact: non_blank(self.emergency_contact),
            address: non_blank(self.address),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial patient update.
///
/// `None` keeps the stored value. Optional fields take `Some(None)` to clear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub weight: Option<Option<f64>>,
    pub height: Option<Option<f64>>,
    pub blood_group: Option<Option<BloodGroup>>,
    pub allergies: Option<Vec<String>>,
    pub chronic_conditions: Option<Vec<String>>,
    pub emergency_contact: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

impl PatientUpdate {
    /// Whether the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        *self == PatientUpdate::default()
    }
}

/// Body mass index category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// BMI rounded to one decimal, with its category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

impl Bmi {
    /// Compute from weight in kg and height in cm.
    pub fn from_measurements(weight_kg: f64, height_cm: f64) -> Option<Self> {
        if weight_kg <= 0.0 || height_cm <= 0.0 {
            return None;
        }
        let height_m = height_cm / 100.0;
        let value = (weight_kg / (height_m * height_m) * 10.0).round() / 10.0;
        Some(Self {
            value,
            category: BmiCategory::from_bmi(value),
        })
    }
}

impl Patient {
    /// Apply a partial update. Timestamps are left to the caller.
    pub fn apply_update(&mut self, update: PatientUpdate) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(phone) = update.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(email) = update.email {
            self.email = non_blank(email);
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(blood_group) = update.blood_group {
            self.blood_group = blood_group;
        }
        if let Some(allergies) = update.allergies {
            self.allergies = allergies;
        }
        if let Some(conditions) = update.chronic_conditions {
            self.chronic_conditions = conditions;
        }
        if let Some(contact) = update.emergency_contact {
            self.emergency_contact = non_blank(contact);
        }
        if let Some(address) = update.address {
            self.address = non_blank(address);
        }
    }

    /// Re-check the registration invariants on a stored record.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_core_fields(&self.name, self.age, &self.phone, self.weight, self.height)
    }

    pub fn bmi(&self) -> Option<Bmi> {
        Bmi::from_measurements(self.weight?, self.height?)
    }

    pub fn has_allergies(&self) -> bool {
        !self.allergies.is_empty()
    }

    pub fn has_chronic_conditions(&self) -> bool {
        !self.chronic_conditions.is_empty()
    }

    /// Warning to surface when this patient is selected for prescribing.
    pub fn allergy_alert(&self) -> Option<String> {
        if !self.has_allergies() {
            return None;
        }
        Some(format!(
            "ALLERGY ALERT: {} is allergic to: {}",
            self.name,
            self.allergies.join(", ")
        ))
    }
}

/// Split comma-separated form text into trimmed, non-empty entries.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_core_fields(
    name: &str,
    age: u32,
    phone: &str,
    weight: Option<f64>,
    height: Option<f64>,
) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if age == 0 {
        return Err(ValidationError::NotPositive("age"));
    }
    if phone.trim().is_empty() {
        return Err(ValidationError::MissingField("phone"));
    }
    if weight.is_some_and(|w| !(w > 0.0)) {
        return Err(ValidationError::NotPositive("weight"));
    }
    if height.is_some_and(|h| !(h > 0.0)) {
        return Err(ValidationError::NotPositive("height"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Patient {
        NewPatient::new("Asha Rao", 34, "9876543210").into_patient(Utc::now())
    }

    #[test]
    fn test_new_patient() {
        let patient = sample();
        assert_eq!(patient.name, "Asha Rao");
        assert_eq!(patient.created_at, patient.updated_at);
        assert!(patient.allergies.is_empty());
        assert_eq!(patient.id.len(), 36); // UUID format
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(NewPatient::new("Asha", 34, "98765").validate().is_ok());
        assert_eq!(
            NewPatient::new("  ", 34, "98765").validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            NewPatient::new("Asha", 0, "98765").validate(),
            Err(ValidationError::NotPositive("age"))
        );
        assert_eq!(
            NewPatient::new("Asha", 34, "").validate(),
            Err(ValidationError::MissingField("phone"))
        );

        let mut input = NewPatient::new("Asha", 34, "98765");
        input.weight = Some(-2.0);
        assert_eq!(input.validate(), Err(ValidationError::NotPositive("weight")));
    }

    #[test]
    fn test_bmi_categories() {
        let normal = Bmi::from_measurements(70.0, 175.0).unwrap();
        assert_eq!(normal.value, 22.9);
        assert_eq!(normal.category, BmiCategory::Normal);

        let obese = Bmi::from_measurements(90.0, 160.0).unwrap();
        assert_eq!(obese.value, 35.2);
        assert_eq!(obese.category, BmiCategory::Obese);

        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(29.9), BmiCategory::Overweight);
        assert!(Bmi::from_measurements(70.0, 0.0).is_none());
    }

    #[test]
    fn test_bmi_requires_both_measurements() {
        let mut patient = sample();
        patient.weight = Some(70.0);
        assert!(patient.bmi().is_none());
        patient.height = Some(175.0);
        assert_eq!(patient.bmi().unwrap().value, 22.9);
    }

    #[test]
    fn test_apply_update_keeps_unspecified_fields() {
        let mut patient = sample();
        patient.email = Some("asha@example.com".into());
        patient.allergies = vec!["Penicillin".into()];

        patient.apply_update(PatientUpdate {
            age: Some(35),
            email: Some(None),
            ..Default::default()
        });

        assert_eq!(patient.age, 35);
        assert_eq!(patient.email, None);
        assert_eq!(patient.name, "Asha Rao");
        assert_eq!(patient.allergies, vec!["Penicillin".to_string()]);
    }

    #[test]
    fn test_allergy_alert() {
        let mut patient = sample();
        assert!(patient.allergy_alert().is_none());
        patient.allergies = vec!["Penicillin".into(), "Sulfa".into()];
        assert_eq!(
            patient.allergy_alert().unwrap(),
            "ALLERGY ALERT: Asha Rao is allergic to: Penicillin, Sulfa"
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" Penicillin, ,Sulfa ,"),
            vec!["Penicillin".to_string(), "Sulfa".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_blood_group_parsing() {
        assert_eq!("ab-".parse::<BloodGroup>().unwrap(), BloodGroup::AbNegative);
        assert!("C+".parse::<BloodGroup>().is_err());
        assert_eq!(
            serde_json::to_string(&BloodGroup::OPositive).unwrap(),
            "\"O+\""
        );
    }

    #[test]
    fn test_legacy_document_defaults() {
        let json = r#"{
            "id": "p1", "name": "Ravi", "age": 40, "gender": "Male",
            "phone": "12345", "bloodGroup": "",
            "createdAt": "2025-01-01T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z"
        }"#;
        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.blood_group, None);
        assert!(patient.allergies.is_empty());
        assert!(patient.chronic_conditions.is_empty());
        assert_eq!(patient.email, None);
    }
}
