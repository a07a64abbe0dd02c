//! Patient collection operations.

use rusqlite::{params, OptionalExtension};

use super::{sort_key, Database, DbResult, PatientRepository};
use crate::models::Patient;

/// Decode a stored document, trusting the row ID over any ID in the JSON.
fn decode(id: String, document: String) -> DbResult<Patient> {
    let mut patient: Patient = serde_json::from_str(&document)?;
    patient.id = id;
    Ok(patient)
}

impl PatientRepository for Database {
    fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let document = serde_json::to_string(patient)?;
        self.conn.execute(
            r#"
            INSERT INTO patients (id, document, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                patient.id,
                document,
                sort_key(&patient.created_at),
                sort_key(&patient.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                "SELECT id, document FROM patients WHERE id = ?",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .map(|(id, document)| decode(id, document))
            .transpose()
    }

    fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, document
            FROM patients
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut patients = Vec::new();
        for row in rows {
            let (id, document) = row?;
            patients.push(decode(id, document)?);
        }
        Ok(patients)
    }

    fn replace_patient(&self, patient: &Patient) -> DbResult<bool> {
        let document = serde_json::to_string(patient)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                document = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
            params![patient.id, document, sort_key(&patient.updated_at)],
        )?;
        Ok(rows_affected > 0)
    }

    fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
