//! Prescription log: append-only prescription history per patient.
//!
//! The log stores what it is given. Save-time checks (diagnosis present, at
//! least one medicine) belong to the caller, see
//! [`NewPrescription::validate`](crate::models::NewPrescription::validate).

use tracing::info;

use crate::db::{DbResult, PrescriptionRepository};
use crate::models::{now, NewPrescription, Prescription};

/// Number of past prescriptions handed to the AI drafter.
pub const HISTORY_WINDOW: usize = 5;

pub struct PrescriptionLog<'a, R: PrescriptionRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: PrescriptionRepository + ?Sized> PrescriptionLog<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Append a prescription, assigning its ID and creation time.
    pub fn create(&self, input: NewPrescription) -> DbResult<Prescription> {
        let prescription = input.into_prescription(now());
        self.repo.insert_prescription(&prescription)?;
        info!(
            prescription_id = %prescription.id,
            patient_id = %prescription.patient_id,
            medicines = prescription.medicines.len(),
            "saved prescription"
        );
        Ok(prescription)
    }

    /// A patient's prescriptions, newest first.
    pub fn list_by_patient(&self, patient_id: &str) -> DbResult<Vec<Prescription>> {
        self.repo.list_prescriptions_for_patient(patient_id)
    }

    pub fn get_by_id(&self, id: &str) -> DbResult<Option<Prescription>> {
        self.repo.get_prescription(id)
    }

    /// The newest `limit` prescriptions for a patient.
    pub fn recent_for_patient(&self, patient_id: &str, limit: usize) -> DbResult<Vec<Prescription>> {
        let mut history = self.list_by_patient(patient_id)?;
        history.truncate(limit);
        Ok(history)
    }
}
