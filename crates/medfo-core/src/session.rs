//! Clinic session state: the loaded patient list, the selected patient and
//! the prescription being written.
//!
//! The session holds snapshots. Nothing here is live: changes made elsewhere
//! show up only after [`ClinicSession::reload_patients`].

use tracing::{debug, warn};

use crate::catalog;
use crate::db::{PatientRepository, PrescriptionRepository};
use crate::directory::{filter_patients, PatientDirectory, PatientQuery};
use crate::models::{
    DraftPrescription, MedicineField, MedicineLine, NewPrescription, Patient, Prescription,
    ValidationError, DEFAULT_FOLLOW_UP_DAYS,
};
use crate::prescription_log::PrescriptionLog;
use crate::MedfoError;

/// The editable prescription form.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionForm {
    pub diagnosis: String,
    pub medicines: Vec<MedicineLine>,
    pub advice: String,
    pub follow_up_days: u32,
    pub doctor_name: Option<String>,
}

impl Default for PrescriptionForm {
    fn default() -> Self {
        Self {
            diagnosis: String::new(),
            medicines: Vec::new(),
            advice: String::new(),
            follow_up_days: DEFAULT_FOLLOW_UP_DAYS,
            doctor_name: None,
        }
    }
}

impl PrescriptionForm {
    fn to_new_prescription(&self, patient: &Patient) -> NewPrescription {
        let mut rx = NewPrescription::for_patient(patient, self.diagnosis.trim());
        rx.medicines = self.medicines.clone();
        rx.advice = self.advice.clone();
        rx.follow_up_days = self.follow_up_days;
        rx.doctor_name = self.doctor_name.clone();
        rx
    }
}

#[derive(Debug, Default)]
pub struct ClinicSession {
    patients: Vec<Patient>,
    selected: Option<Patient>,
    form: PrescriptionForm,
}

impl ClinicSession {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Patients
    // =========================================================================

    /// Replace the snapshot with a fresh list. On failure the old snapshot stays.
    pub fn reload_patients<R>(&mut self, directory: &PatientDirectory<'_, R>) -> Result<&[Patient], MedfoError>
    where
        R: PatientRepository + ?Sized,
    {
        self.patients = directory.list()?;
        Ok(&self.patients)
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn visible_patients(&self, query: &PatientQuery) -> Vec<&Patient> {
        filter_patients(&self.patients, query)
    }

    /// Select a patient for prescribing. Returns the allergy alert, if any.
    pub fn select_patient(&mut self, patient: Patient) -> Option<String> {
        let alert = patient.allergy_alert();
        self.selected = Some(patient);
        alert
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Put a newly registered or edited patient into the snapshot.
    pub fn apply_patient_update(&mut self, patient: Patient) {
        match self.patients.iter_mut().find(|p| p.id == patient.id) {
            Some(existing) => *existing = patient.clone(),
            None => self.patients.insert(0, patient.clone()),
        }
        if self.selected.as_ref().is_some_and(|s| s.id == patient.id) {
            self.selected = Some(patient);
        }
    }

    /// Delete through the directory, then drop the patient from the
    /// snapshot and the selection. A failed delete leaves state untouched.
    pub fn delete_patient<R>(
        &mut self,
        directory: &PatientDirectory<'_, R>,
        patient_id: &str,
    ) -> Result<bool, MedfoError>
    where
        R: PatientRepository + ?Sized,
    {
        let removed = directory.delete(patient_id).map_err(|e| {
            warn!(patient_id, error = %e, "patient delete failed");
            MedfoError::from(e)
        })?;

        self.patients.retain(|p| p.id != patient_id);
        if self.selected.as_ref().is_some_and(|s| s.id == patient_id) {
            self.selected = None;
        }
        Ok(removed)
    }

    // =========================================================================
    // Prescription form
    // =========================================================================

    pub fn form(&self) -> &PrescriptionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PrescriptionForm {
        &mut self.form
    }

    /// Append a medicine line with the default dosing. Returns its line ID.
    pub fn add_medicine(&mut self, name: &str) -> String {
        let line = MedicineLine::new(name);
        let id = line.id.clone();
        self.form.medicines.push(line);
        id
    }

    pub fn remove_medicine(&mut self, line_id: &str) -> bool {
        let before = self.form.medicines.len();
        self.form.medicines.retain(|m| m.id != line_id);
        self.form.medicines.len() != before
    }

    pub fn update_medicine(&mut self, line_id: &str, field: MedicineField) -> bool {
        match self.form.medicines.iter_mut().find(|m| m.id == line_id) {
            Some(line) => {
                line.set(field);
                true
            }
            None => false,
        }
    }

    /// Fill diagnosis and advice from a template and append its medicines.
    pub fn load_template(&mut self, template_id: &str) -> bool {
        let Some(template) = catalog::template_by_id(template_id) else {
            return false;
        };
        let fill = catalog::apply_template(template);
        self.form.diagnosis = fill.diagnosis;
        self.form.advice = fill.advice;
        self.form.medicines.extend(fill.medicines);
        true
    }

    /// Merge an AI draft into the form without saving it.
    ///
    /// Non-empty draft fields replace the form's, draft medicines are
    /// appended. A degraded draft changes nothing and returns false.
    pub fn merge_draft(&mut self, draft: &DraftPrescription) -> bool {
        if draft.is_degraded() {
            debug!("ignoring degraded draft");
            return false;
        }
        if !draft.diagnosis.trim().is_empty() {
            self.form.diagnosis = draft.diagnosis.trim().to_string();
        }
        if !draft.advice.trim().is_empty() {
            self.form.advice = draft.advice.trim().to_string();
        }
        self.form.follow_up_days = draft.follow_up_days;
        self.form.medicines.extend(draft.medicine_lines());
        true
    }

    pub fn reset_form(&mut self) {
        self.form = PrescriptionForm::default();
    }

    /// Validate the form and append it to the log for the selected patient.
    ///
    /// Nothing is written if validation fails. The form is cleared only
    /// after a successful save.
    pub fn save_prescription<R>(&mut self, log: &PrescriptionLog<'_, R>) -> Result<Prescription, MedfoError>
    where
        R: PrescriptionRepository + ?Sized,
    {
        let patient = self
            .selected
            .as_ref()
            .ok_or(ValidationError::NoPatientSelected)?;
        let input = self.form.to_new_prescription(patient);
        input.validate()?;

        let saved = log.create(input)?;
        self.reset_form();
        Ok(saved)
    }
}
