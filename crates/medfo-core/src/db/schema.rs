//! SQLite schema definition.
//!
//! Each collection stores whole records as JSON documents. The indexed
//! columns duplicate the few fields queries filter and sort on.

/// Complete database schema for medfo.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL,                      -- JSON Patient record
    created_at TEXT NOT NULL,                    -- RFC 3339, microseconds, UTC
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_created ON patients(created_at);

-- ============================================================================
-- Prescriptions (Append-Only)
-- ============================================================================

-- patient_id is a soft reference: no foreign key, deleting a patient
-- leaves their prescriptions in place.
CREATE TABLE IF NOT EXISTS prescriptions (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    document TEXT NOT NULL,                      -- JSON Prescription record
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_patient ON prescriptions(patient_id, created_at);

CREATE TRIGGER IF NOT EXISTS prescriptions_no_update BEFORE UPDATE ON prescriptions
BEGIN
    SELECT RAISE(ABORT, 'Prescriptions are immutable');
END;
"#;
