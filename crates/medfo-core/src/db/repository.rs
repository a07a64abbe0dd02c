//! Repository interfaces over the two record collections.
//!
//! Business logic depends on these traits, not on [`Database`](super::Database),
//! so the backing store can be swapped.

use super::DbResult;
use crate::models::{Patient, Prescription};

/// Persistence for patient records.
pub trait PatientRepository {
    fn insert_patient(&self, patient: &Patient) -> DbResult<()>;

    fn get_patient(&self, id: &str) -> DbResult<Option<Patient>>;

    /// All patients, newest first.
    fn list_patients(&self) -> DbResult<Vec<Patient>>;

    /// Overwrite a stored patient. Returns false if no record has this ID.
    fn replace_patient(&self, patient: &Patient) -> DbResult<bool>;

    /// Remove a patient. Returns whether a record existed.
    fn delete_patient(&self, id: &str) -> DbResult<bool>;
}

/// Persistence for prescriptions. Append-only: there is no update or delete.
pub trait PrescriptionRepository {
    fn insert_prescription(&self, prescription: &Prescription) -> DbResult<()>;

    fn get_prescription(&self, id: &str) -> DbResult<Option<Prescription>>;

    /// Prescriptions for one patient, newest first.
    fn list_prescriptions_for_patient(&self, patient_id: &str) -> DbResult<Vec<Prescription>>;
}
