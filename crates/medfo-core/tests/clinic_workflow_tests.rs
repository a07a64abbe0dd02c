//! End-to-end clinic workflow against a file-backed database.

use anyhow::Result;

use medfo_core::db::Database;
use medfo_core::models::{BloodGroup, MedicineField, NewPatient, PatientUpdate};
use medfo_core::{ClinicSession, PatientDirectory, PrescriptionLog};

#[test]
fn test_records_survive_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("clinic.db");

    let (patient_id, prescription_id) = {
        let db = Database::open(&path)?;
        let directory = PatientDirectory::new(&db);
        let log = PrescriptionLog::new(&db);

        let mut input = NewPatient::new("Asha Rao", 34, "9876543210");
        input.blood_group = Some(BloodGroup::OPositive);
        input.allergies = vec!["Penicillin".into()];
        let patient = directory.create(input)?;

        let mut session = ClinicSession::new();
        session.reload_patients(&directory)?;
        let alert = session.select_patient(patient.clone());
        assert_eq!(
            alert.as_deref(),
            Some("ALLERGY ALERT: Asha Rao is allergic to: Penicillin")
        );

        assert!(session.load_template("1"));
        let line_id = session.add_medicine("Pan 40");
        assert!(session.update_medicine(&line_id, MedicineField::Dosage("40mg".into())));
        let saved = session.save_prescription(&log)?;
        assert!(session.form().medicines.is_empty());

        (patient.id, saved.id)
    };

    let db = Database::open(&path)?;
    let directory = PatientDirectory::new(&db);
    let log = PrescriptionLog::new(&db);

    let patient = directory.get_by_id(&patient_id)?.expect("patient persisted");
    assert_eq!(patient.blood_group, Some(BloodGroup::OPositive));

    let history = log.list_by_patient(&patient_id)?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, prescription_id);
    assert_eq!(history[0].patient_name, "Asha Rao");
    assert!(history[0].medicines.iter().any(|m| m.medicine == "Pan 40"));

    Ok(())
}

#[test]
fn test_prescriptions_outlive_their_patient() -> Result<()> {
    let db = Database::open_in_memory()?;
    let directory = PatientDirectory::new(&db);
    let log = PrescriptionLog::new(&db);

    let patient = directory.create(NewPatient::new("Ravi Kumar", 52, "9123400000"))?;
    let mut session = ClinicSession::new();
    session.select_patient(patient.clone());
    session.add_medicine("Dolo 650");
    session.form_mut().diagnosis = "Viral Fever".into();
    session.save_prescription(&log)?;

    assert!(directory.delete(&patient.id)?);
    let history = log.list_by_patient(&patient.id)?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].patient_name, "Ravi Kumar");

    Ok(())
}

#[test]
fn test_history_is_newest_first() -> Result<()> {
    let db = Database::open_in_memory()?;
    let directory = PatientDirectory::new(&db);
    let log = PrescriptionLog::new(&db);
    let patient = directory.create(NewPatient::new("Meena", 28, "8000012345"))?;

    let mut session = ClinicSession::new();
    session.select_patient(patient.clone());
    for diagnosis in ["first", "second", "third"] {
        session.form_mut().diagnosis = diagnosis.into();
        session.add_medicine("Crocin");
        session.save_prescription(&log)?;
    }

    let diagnoses: Vec<_> = log
        .list_by_patient(&patient.id)?
        .into_iter()
        .map(|rx| rx.diagnosis)
        .collect();
    assert_eq!(diagnoses, vec!["third", "second", "first"]);

    Ok(())
}

#[test]
fn test_edit_form_update_clears_optional_fields() -> Result<()> {
    let db = Database::open_in_memory()?;
    let directory = PatientDirectory::new(&db);

    let mut input = NewPatient::new("Asha", 34, "98765");
    input.email = Some("asha@clinic.in".into());
    let patient = directory.create(input)?;

    let updated = directory
        .update(
            &patient.id,
            PatientUpdate {
                email: Some(None),
                ..Default::default()
            },
        )?
        .expect("patient exists");
    assert_eq!(updated.email, None);
    assert_eq!(directory.get_by_id(&patient.id)?, Some(updated));

    Ok(())
}
