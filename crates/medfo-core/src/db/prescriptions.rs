//! Prescription collection operations.

use rusqlite::{params, OptionalExtension};

use super::{sort_key, Database, DbResult, PrescriptionRepository};
use crate::models::Prescription;

fn decode(id: String, document: String) -> DbResult<Prescription> {
    let mut prescription: Prescription = serde_json::from_str(&document)?;
    prescription.id = id;
    Ok(prescription)
}

impl PrescriptionRepository for Database {
    fn insert_prescription(&self, prescription: &Prescription) -> DbResult<()> {
        let document = serde_json::to_string(prescription)?;
        self.conn.execute(
            r#"
            INSERT INTO prescriptions (id, patient_id, document, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                prescription.id,
                prescription.patient_id,
                document,
                sort_key(&prescription.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_prescription(&self, id: &str) -> DbResult<Option<Prescription>> {
        self.conn
            .query_row(
                "SELECT id, document FROM prescriptions WHERE id = ?",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .map(|(id, document)| decode(id, document))
            .transpose()
    }

    fn list_prescriptions_for_patient(&self, patient_id: &str) -> DbResult<Vec<Prescription>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, document
            FROM prescriptions
            WHERE patient_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut prescriptions = Vec::new();
        for row in rows {
            let (id, document) = row?;
            prescriptions.push(decode(id, document)?);
        }
        Ok(prescriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now, MedicineLine, NewPatient, NewPrescription};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn prescription_for(patient_id: &str, diagnosis: &str) -> Prescription {
        let patient = NewPatient::new("Asha", 34, "98765").into_patient(now());
        let mut rx = NewPrescription::for_patient(&patient, diagnosis);
        rx.patient_id = patient_id.to_string();
        rx.medicines.push(MedicineLine::new("Dolo 650"));
        rx.into_prescription(now())
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let rx = prescription_for("p1", "Viral Fever");
        db.insert_prescription(&rx).unwrap();

        let retrieved = db.get_prescription(&rx.id).unwrap().unwrap();
        assert_eq!(retrieved, rx);
        assert!(db.get_prescription("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_filters_by_patient() {
        let db = setup_db();
        db.insert_prescription(&prescription_for("p1", "Fever")).unwrap();
        db.insert_prescription(&prescription_for("p2", "Gastritis")).unwrap();
        db.insert_prescription(&prescription_for("p1", "URTI")).unwrap();

        let list = db.list_prescriptions_for_patient("p1").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|rx| rx.patient_id == "p1"));
        // Newest first
        assert_eq!(list[0].diagnosis, "URTI");
        assert_eq!(list[1].diagnosis, "Fever");
    }

    #[test]
    fn test_list_unknown_patient_is_empty() {
        let db = setup_db();
        assert!(db.list_prescriptions_for_patient("nobody").unwrap().is_empty());
    }
}
