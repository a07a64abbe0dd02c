//! Patient directory: registration, lookup, search, edit and removal.
//!
//! Every operation is a round trip to the repository. Search loads the full
//! list and filters it in memory.

use thiserror::Error;
use tracing::{debug, info};

use crate::db::{DbError, PatientRepository};
use crate::models::{now, NewPatient, Patient, PatientUpdate, ValidationError};

/// Directory errors.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Invalid patient: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Patient CRUD over any [`PatientRepository`].
pub struct PatientDirectory<'a, R: PatientRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: PatientRepository + ?Sized> PatientDirectory<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Register a patient. Validation runs before the store is touched.
    pub fn create(&self, input: NewPatient) -> DirectoryResult<Patient> {
        input.validate()?;
        let patient = input.into_patient(now());
        self.repo.insert_patient(&patient)?;
        info!(patient_id = %patient.id, "registered patient");
        Ok(patient)
    }

    /// All patients, newest first.
    pub fn list(&self) -> DirectoryResult<Vec<Patient>> {
        Ok(self.repo.list_patients()?)
    }

    pub fn get_by_id(&self, id: &str) -> DirectoryResult<Option<Patient>> {
        Ok(self.repo.get_patient(id)?)
    }

    /// Fetch the full list and keep patients whose name contains `term`
    /// (ignoring case) or whose phone contains it verbatim.
    pub fn search(&self, term: &str) -> DirectoryResult<Vec<Patient>> {
        let all = self.list()?;
        let matches = search_patients(&all, term);
        debug!(term, total = all.len(), matched = matches.len(), "patient search");
        Ok(matches)
    }

    /// Merge `update` into the stored record.
    ///
    /// Returns `None` when no patient has this ID. `created_at` is never
    /// touched and `updated_at` never moves backwards.
    pub fn update(&self, id: &str, update: PatientUpdate) -> DirectoryResult<Option<Patient>> {
        let Some(mut patient) = self.repo.get_patient(id)? else {
            debug!(patient_id = id, "update skipped, patient not found");
            return Ok(None);
        };

        patient.apply_update(update);
        patient.validate()?;
        patient.updated_at = now().max(patient.updated_at);

        if !self.repo.replace_patient(&patient)? {
            return Ok(None);
        }
        info!(patient_id = id, "updated patient");
        Ok(Some(patient))
    }

    /// Remove a patient. Idempotent: returns whether a record was removed.
    ///
    /// Prescriptions referencing the patient are kept.
    pub fn delete(&self, id: &str) -> DirectoryResult<bool> {
        let removed = self.repo.delete_patient(id)?;
        if removed {
            info!(patient_id = id, "deleted patient");
        } else {
            debug!(patient_id = id, "delete of absent patient");
        }
        Ok(removed)
    }
}

/// Name (case-insensitive) or phone (verbatim) substring match.
pub fn matches_search(patient: &Patient, term: &str) -> bool {
    patient.name.to_lowercase().contains(&term.to_lowercase()) || patient.phone.contains(term)
}

/// Filter an already-loaded list. A blank term keeps everything; any other
/// term is matched as typed, surrounding spaces included.
pub fn search_patients(patients: &[Patient], term: &str) -> Vec<Patient> {
    let blank = term.trim().is_empty();
    patients
        .iter()
        .filter(|p| blank || matches_search(p, term))
        .cloned()
        .collect()
}

/// Narrowing applied by the patient list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatientFilter {
    #[default]
    All,
    WithAllergies,
    WithChronicConditions,
}

/// Patient list query: free text over name, phone and email plus a filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatientQuery {
    pub text: String,
    pub filter: PatientFilter,
}

impl PatientQuery {
    pub fn matches(&self, patient: &Patient) -> bool {
        let text = self.text.as_str();
        let text_match = text.trim().is_empty()
            || matches_search(patient, text)
            || patient
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&text.to_lowercase()));

        let filter_match = match self.filter {
            PatientFilter::All => true,
            PatientFilter::WithAllergies => patient.has_allergies(),
            PatientFilter::WithChronicConditions => patient.has_chronic_conditions(),
        };

        text_match && filter_match
    }
}

/// Apply a [`PatientQuery`] to an already-loaded list.
pub fn filter_patients<'p>(patients: &'p [Patient], query: &PatientQuery) -> Vec<&'p Patient> {
    patients.iter().filter(|p| query.matches(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_then_get() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);

        let mut input = NewPatient::new("Asha Rao", 34, "9876543210");
        input.allergies = vec!["Penicillin".into()];
        let created = directory.create(input.clone()).unwrap();

        let fetched = directory.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.allergies, input.allergies);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[test]
    fn test_create_rejects_invalid_without_writing() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);

        let result = directory.create(NewPatient::new("Asha", 34, ""));
        assert!(matches!(
            result,
            Err(DirectoryError::Validation(ValidationError::MissingField("phone")))
        ));
        assert!(directory.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_preserves_unspecified_fields() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);

        let mut input = NewPatient::new("Asha Rao", 34, "9876543210");
        input.chronic_conditions = vec!["Diabetes".into()];
        let created = directory.create(input).unwrap();

        let updated = directory
            .update(
                &created.id,
                PatientUpdate {
                    weight: Some(Some(64.0)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.weight, Some(64.0));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.chronic_conditions, created.chronic_conditions);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = directory.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_update_rejects_invalid_merge() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);
        let created = directory.create(NewPatient::new("Asha", 34, "98765")).unwrap();

        let result = directory.update(
            &created.id,
            PatientUpdate {
                age: Some(0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(DirectoryError::Validation(_))));

        let stored = directory.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(stored.age, 34);
    }

    #[test]
    fn test_update_missing_patient() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);
        let result = directory.update("ghost", PatientUpdate::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);
        let created = directory.create(NewPatient::new("Asha", 34, "98765")).unwrap();

        assert!(directory.delete(&created.id).unwrap());
        assert!(!directory.delete(&created.id).unwrap());
        assert!(directory.get_by_id(&created.id).unwrap().is_none());
    }

    #[test]
    fn test_search_name_and_phone() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);
        directory.create(NewPatient::new("Asha Rao", 34, "9876543210")).unwrap();
        directory.create(NewPatient::new("Ravi Kumar", 52, "9123400000")).unwrap();
        directory.create(NewPatient::new("Meena", 28, "8000012345")).unwrap();

        let by_name: Vec<_> = directory
            .search("RAO")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(by_name, vec!["Asha Rao"]);

        let by_phone: Vec<_> = directory
            .search("12345")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(by_phone, vec!["Meena"]);

        assert_eq!(directory.search("").unwrap().len(), 3);
        assert_eq!(directory.search("  ").unwrap().len(), 3);
        assert!(directory.search("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_search_term_is_not_trimmed() {
        let db = setup_db();
        let directory = PatientDirectory::new(&db);
        directory.create(NewPatient::new("Asha Rao", 34, "9876543210")).unwrap();
        directory.create(NewPatient::new("Ravi", 52, "12345")).unwrap();

        assert!(directory.search("Rao ").unwrap().is_empty());
        assert!(directory.search(" 12345").unwrap().is_empty());

        let found: Vec<_> = directory
            .search("Asha ")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(found, vec!["Asha Rao"]);

        let query = PatientQuery {
            text: "Rao ".into(),
            filter: PatientFilter::All,
        };
        let all = directory.list().unwrap();
        assert!(filter_patients(&all, &query).is_empty());
    }

    #[test]
    fn test_patient_query_filters() {
        let now = now();
        let mut allergic = NewPatient::new("Asha", 34, "111").into_patient(now);
        allergic.allergies = vec!["Sulfa".into()];
        allergic.email = Some("asha@clinic.in".into());
        let mut chronic = NewPatient::new("Ravi", 52, "222").into_patient(now);
        chronic.chronic_conditions = vec!["Hypertension".into()];
        let plain = NewPatient::new("Meena", 28, "333").into_patient(now);
        let patients = vec![allergic, chronic, plain];

        let query = PatientQuery {
            filter: PatientFilter::WithAllergies,
            ..Default::default()
        };
        let names: Vec<_> = filter_patients(&patients, &query)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Asha"]);

        let query = PatientQuery {
            text: "CLINIC.IN".into(),
            filter: PatientFilter::All,
        };
        assert_eq!(filter_patients(&patients, &query).len(), 1);

        let query = PatientQuery {
            text: "ravi".into(),
            filter: PatientFilter::WithAllergies,
        };
        assert!(filter_patients(&patients, &query).is_empty());

        let query = PatientQuery {
            filter: PatientFilter::WithChronicConditions,
            ..Default::default()
        };
        assert_eq!(filter_patients(&patients, &query)[0].name, "Ravi");
    }
}
