//! Medfo Core Library
//!
//! Patient records, prescription history and the medicine catalog behind a
//! prescription-writing front end.
//!
//! # Architecture
//!
//! ```text
//!   Front end (forms, lists)                     medfo-llm
//!          │                                         │
//!          ▼                                         ▼
//!   ClinicSession ──────────── merge ────────  DraftPrescription
//!     │         │                                (never saved)
//!     ▼         ▼
//! PatientDirectory   PrescriptionLog
//!     │                   │
//!     ▼                   ▼
//! PatientRepository  PrescriptionRepository
//!     └───────┬───────────┘
//!             ▼
//!   Database (SQLite document store)
//! ```
//!
//! # Core Principle
//!
//! **AI output is a draft.** Nothing generated is persisted until a doctor
//! saves the form, and allergy avoidance is only ever an instruction to the
//! model, never a guarantee.
//!
//! # Modules
//!
//! - [`db`]: SQLite document store and repository traits
//! - [`models`]: Domain types (Patient, Prescription, MedicineLine, drafts)
//! - [`directory`]: Patient CRUD and search
//! - [`prescription_log`]: Append-only prescription history
//! - [`catalog`]: Static medicine catalog and diagnosis templates
//! - [`session`]: Selected patient and prescription form state

pub mod catalog;
pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod models;
pub mod prescription_log;
pub mod session;

// Re-export commonly used types
pub use config::CoreConfig;
pub use db::{Database, DbError, PatientRepository, PrescriptionRepository};
pub use directory::{DirectoryError, PatientDirectory, PatientFilter, PatientQuery};
pub use models::{
    Bmi, BmiCategory, BloodGroup, DraftMedicine, DraftPrescription, Frequency, Gender,
    MedicineLine, NewPatient, NewPrescription, Patient, PatientUpdate, Prescription, Timing,
    ValidationError,
};
pub use prescription_log::PrescriptionLog;
pub use session::{ClinicSession, PrescriptionForm};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedfoError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<DbError> for MedfoError {
    fn from(e: DbError) -> Self {
        MedfoError::DatabaseError(e.to_string())
    }
}

impl From<ValidationError> for MedfoError {
    fn from(e: ValidationError) -> Self {
        MedfoError::InvalidInput(e.to_string())
    }
}

impl From<DirectoryError> for MedfoError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Validation(v) => v.into(),
            DirectoryError::Database(d) => d.into(),
        }
    }
}

impl From<serde_json::Error> for MedfoError {
    fn from(e: serde_json::Error) -> Self {
        MedfoError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedfoError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedfoError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<MedfoCore>, MedfoError> {
    logging::init_logging(&CoreConfig::from_env());
    let db = Database::open(&path)?;
    Ok(Arc::new(MedfoCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Open the database named by `MEDFO_DB_PATH` (default `medfo.db`).
#[uniffi::export]
pub fn open_default_database() -> Result<Arc<MedfoCore>, MedfoError> {
    let config = CoreConfig::from_env();
    logging::init_logging(&config);
    let db = Database::open(&config.database_path)?;
    Ok(Arc::new(MedfoCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<MedfoCore>, MedfoError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(MedfoCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MedfoCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl MedfoCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn create_patient(&self, input: FfiPatientInput) -> Result<FfiPatient, MedfoError> {
        let input = NewPatient::try_from(input)?;
        let db = self.db.lock()?;
        let patient = PatientDirectory::new(&*db).create(input)?;
        Ok(patient.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, MedfoError> {
        let db = self.db.lock()?;
        let patient = PatientDirectory::new(&*db).get_by_id(&id)?;
        Ok(patient.map(Into::into))
    }

    /// All patients, newest first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, MedfoError> {
        let db = self.db.lock()?;
        let patients = PatientDirectory::new(&*db).list()?;
        Ok(patients.into_iter().map(Into::into).collect())
    }

    /// Search patients by name or phone.
    pub fn search_patients(&self, term: String) -> Result<Vec<FfiPatient>, MedfoError> {
        let db = self.db.lock()?;
        let patients = PatientDirectory::new(&*db).search(&term)?;
        Ok(patients.into_iter().map(Into::into).collect())
    }

    /// Save the edit form over an existing patient.
    pub fn update_patient(
        &self,
        id: String,
        input: FfiPatientInput,
    ) -> Result<FfiPatient, MedfoError> {
        let update = NewPatient::try_from(input)?.into_full_update();
        let db = self.db.lock()?;
        PatientDirectory::new(&*db)
            .update(&id, update)?
            .map(Into::into)
            .ok_or(MedfoError::NotFound(id))
    }

    /// Delete a patient. Returns false if the patient was already gone.
    pub fn delete_patient(&self, id: String) -> Result<bool, MedfoError> {
        let db = self.db.lock()?;
        Ok(PatientDirectory::new(&*db).delete(&id)?)
    }

    /// BMI for a stored patient, when weight and height are recorded.
    pub fn patient_bmi(&self, id: String) -> Result<Option<FfiBmi>, MedfoError> {
        let db = self.db.lock()?;
        let patient = PatientDirectory::new(&*db)
            .get_by_id(&id)?
            .ok_or(MedfoError::NotFound(id))?;
        Ok(patient.bmi().map(Into::into))
    }

    // =========================================================================
    // Prescription Operations
    // =========================================================================

    /// Validate and save a prescription.
    pub fn create_prescription(
        &self,
        input: FfiPrescriptionInput,
    ) -> Result<FfiPrescription, MedfoError> {
        let input = NewPrescription::try_from(input)?;
        input.validate()?;
        let db = self.db.lock()?;
        let saved = PrescriptionLog::new(&*db).create(input)?;
        Ok(saved.into())
    }

    /// A patient's prescriptions, newest first.
    pub fn list_prescriptions(&self, patient_id: String) -> Result<Vec<FfiPrescription>, MedfoError> {
        let db = self.db.lock()?;
        let list = PrescriptionLog::new(&*db).list_by_patient(&patient_id)?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub fn get_prescription(&self, id: String) -> Result<Option<FfiPrescription>, MedfoError> {
        let db = self.db.lock()?;
        let rx = PrescriptionLog::new(&*db).get_by_id(&id)?;
        Ok(rx.map(Into::into))
    }

    /// Export a prescription as its stored JSON document.
    pub fn export_prescription_json(&self, id: String) -> Result<String, MedfoError> {
        let db = self.db.lock()?;
        let rx = PrescriptionLog::new(&*db)
            .get_by_id(&id)?
            .ok_or(MedfoError::NotFound(id))?;
        Ok(serde_json::to_string_pretty(&rx)?)
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Search the medicine catalog by brand or generic name.
    pub fn search_catalog(&self, query: String) -> Vec<FfiCatalogMedicine> {
        catalog::search_medicines(&query)
            .into_iter()
            .map(|m| (*m).into())
            .collect()
    }

    pub fn diagnosis_templates(&self) -> Vec<FfiDiagnosisTemplate> {
        catalog::diagnosis_templates()
            .iter()
            .map(|t| (*t).into())
            .collect()
    }
}

impl NewPatient {
    /// Turn a complete edit form into an update that overwrites every field.
    pub fn into_full_update(self) -> PatientUpdate {
        PatientUpdate {
            name: Some(self.name),
            age: Some(self.age),
            gender: Some(self.gender),
            phone: Some(self.phone),
            email: Some(self.email),
            weight: Some(self.weight),
            height: Some(self.height),
            blood_group: Some(self.blood_group),
            allergies: Some(self.allergies),
            chronic_conditions: Some(self.chronic_conditions),
            emergency_contact: Some(self.emergency_contact),
            address: Some(self.address),
        }
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub blood_group: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender.to_string(),
            phone: patient.phone,
            email: patient.email,
            weight: patient.weight,
            height: patient.height,
            blood_group: patient.blood_group.map(|g| g.to_string()),
            allergies: patient.allergies,
            chronic_conditions: patient.chronic_conditions,
            emergency_contact: patient.emergency_contact,
            address: patient.address,
            created_at: patient.created_at.to_rfc3339(),
            updated_at: patient.updated_at.to_rfc3339(),
        }
    }
}

/// FFI-safe registration/edit form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientInput {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    /// Empty string means not selected
    pub blood_group: Option<String>,
    /// Comma-separated, as typed into the form
    pub allergies: String,
    /// Comma-separated, as typed into the form
    pub chronic_conditions: String,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<FfiPatientInput> for NewPatient {
    type Error = ValidationError;

    fn try_from(input: FfiPatientInput) -> Result<Self, Self::Error> {
        let blood_group = match input.blood_group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse()?),
        };
        Ok(NewPatient {
            name: input.name,
            age: input.age,
            gender: input.gender.parse()?,
            phone: input.phone,
            email: input.email,
            weight: input.weight,
            height: input.height,
            blood_group,
            allergies: models::split_list(&input.allergies),
            chronic_conditions: models::split_list(&input.chronic_conditions),
            emergency_contact: input.emergency_contact,
            address: input.address,
        })
    }
}

/// FFI-safe BMI.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBmi {
    pub value: f64,
    pub category: String,
}

impl From<Bmi> for FfiBmi {
    fn from(bmi: Bmi) -> Self {
        Self {
            value: bmi.value,
            category: bmi.category.as_str().to_string(),
        }
    }
}

/// FFI-safe medicine line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineLine {
    pub id: String,
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub timing: String,
}

impl From<MedicineLine> for FfiMedicineLine {
    fn from(line: MedicineLine) -> Self {
        Self {
            id: line.id,
            medicine: line.medicine,
            dosage: line.dosage,
            frequency: line.frequency.code().to_string(),
            duration: line.duration,
            timing: line.timing.label().to_string(),
        }
    }
}

impl TryFrom<FfiMedicineLine> for MedicineLine {
    type Error = ValidationError;

    fn try_from(line: FfiMedicineLine) -> Result<Self, Self::Error> {
        let mut parsed = MedicineLine::new(line.medicine);
        if !line.id.is_empty() {
            parsed.id = line.id;
        }
        parsed.dosage = line.dosage;
        parsed.frequency = line.frequency.parse()?;
        parsed.duration = line.duration;
        parsed.timing = line.timing.parse()?;
        Ok(parsed)
    }
}

/// FFI-safe prescription input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescriptionInput {
    pub patient_id: String,
    pub patient_name: String,
    pub diagnosis: String,
    pub medicines: Vec<FfiMedicineLine>,
    pub advice: String,
    pub follow_up_days: u32,
    pub doctor_name: Option<String>,
}

impl TryFrom<FfiPrescriptionInput> for NewPrescription {
    type Error = ValidationError;

    fn try_from(input: FfiPrescriptionInput) -> Result<Self, Self::Error> {
        Ok(NewPrescription {
            patient_id: input.patient_id,
            patient_name: input.patient_name,
            diagnosis: input.diagnosis,
            medicines: input
                .medicines
                .into_iter()
                .map(MedicineLine::try_from)
                .collect::<Result<_, _>>()?,
            advice: input.advice,
            follow_up_days: input.follow_up_days,
            doctor_name: input.doctor_name,
        })
    }
}

/// FFI-safe stored prescription.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescription {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub diagnosis: String,
    pub medicines: Vec<FfiMedicineLine>,
    pub advice: String,
    pub follow_up_days: u32,
    pub doctor_name: Option<String>,
    pub created_at: String,
}

impl From<Prescription> for FfiPrescription {
    fn from(rx: Prescription) -> Self {
        Self {
            id: rx.id,
            patient_id: rx.patient_id,
            patient_name: rx.patient_name,
            diagnosis: rx.diagnosis,
            medicines: rx.medicines.into_iter().map(Into::into).collect(),
            advice: rx.advice,
            follow_up_days: rx.follow_up_days,
            doctor_name: rx.doctor_name,
            created_at: rx.created_at.to_rfc3339(),
        }
    }
}

/// FFI-safe catalog medicine.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCatalogMedicine {
    pub id: String,
    pub brand_name: String,
    pub generic_name: String,
    pub strength: String,
    pub form: String,
    pub category: String,
    pub price: u32,
    pub common_dosage: String,
}

impl From<models::CatalogMedicine> for FfiCatalogMedicine {
    fn from(m: models::CatalogMedicine) -> Self {
        Self {
            id: m.id.to_string(),
            brand_name: m.brand_name.to_string(),
            generic_name: m.generic_name.to_string(),
            strength: m.strength.to_string(),
            form: m.form.to_string(),
            category: m.category.to_string(),
            price: m.price,
            common_dosage: m.common_dosage.to_string(),
        }
    }
}

/// FFI-safe diagnosis template.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiagnosisTemplate {
    pub id: String,
    pub name: String,
    pub medicines: Vec<String>,
    pub advice: Vec<String>,
}

impl From<models::DiagnosisTemplate> for FfiDiagnosisTemplate {
    fn from(t: models::DiagnosisTemplate) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.to_string(),
            medicines: t.medicines.iter().map(|s| s.to_string()).collect(),
            advice: t.advice.iter().map(|s| s.to_string()).collect(),
        }
    }
}
