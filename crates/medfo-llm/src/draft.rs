//! Prescription drafting: request → prompt → generation → draft.
//!
//! Allergy avoidance is an instruction in the prompt, nothing more. The
//! returned draft may still name a medicine the patient is allergic to and
//! must be reviewed before it is saved.

use tracing::{debug, info, warn};

use medfo_core::db::PrescriptionRepository;
use medfo_core::models::{DraftPrescription, Patient, Prescription, ValidationError};
use medfo_core::prescription_log::{PrescriptionLog, HISTORY_WINDOW};

use crate::client::{GenerationResult, TextGenerator};
use crate::config::SamplingConfig;
use crate::extraction::{parse_ai_response, parse_medicine_suggestions};
use crate::prompts::{build_prescription_prompt, build_suggestion_prompt};

/// Everything the model is told about a visit.
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub symptoms: String,
    pub diagnosis_hint: Option<String>,
    pub patient: Patient,
    /// Newest first. Only the first few reach the prompt.
    pub previous_prescriptions: Vec<Prescription>,
}

impl DraftRequest {
    pub fn new(patient: Patient, symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            diagnosis_hint: None,
            patient,
            previous_prescriptions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symptoms.trim().is_empty() {
            return Err(ValidationError::MissingField("symptoms"));
        }
        Ok(())
    }

    /// The hint, if it has any text.
    pub fn diagnosis_hint(&self) -> Option<&str> {
        self.diagnosis_hint
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
    }
}

/// Drafts prescriptions with any [`TextGenerator`].
pub struct DraftGenerator<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> DraftGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a draft.
    ///
    /// Blank symptoms are rejected before any request is sent. Endpoint
    /// failures propagate; a reply that cannot be parsed yields
    /// [`DraftPrescription::degraded`].
    pub fn generate(&self, request: &DraftRequest) -> GenerationResult<DraftPrescription> {
        request.validate()?;

        let mut request = request.clone();
        request.previous_prescriptions.truncate(HISTORY_WINDOW);
        let prompt = build_prescription_prompt(&request);

        let reply = self
            .generator
            .generate(&prompt, &SamplingConfig::prescription())
            .inspect_err(|e| warn!(patient_id = %request.patient.id, error = %e, "draft generation failed"))?;

        let draft = parse_ai_response(&reply);
        info!(
            patient_id = %request.patient.id,
            medicines = draft.medicines.len(),
            degraded = draft.is_degraded(),
            "generated prescription draft"
        );
        Ok(draft)
    }

    /// Load the patient's recent prescriptions, then generate.
    pub fn generate_for_patient<R>(
        &self,
        repo: &R,
        patient: &Patient,
        symptoms: &str,
        diagnosis_hint: Option<&str>,
    ) -> GenerationResult<DraftPrescription>
    where
        R: PrescriptionRepository + ?Sized,
    {
        let mut request = DraftRequest::new(patient.clone(), symptoms);
        request.diagnosis_hint = diagnosis_hint.map(str::to_string);
        request.validate()?;

        request.previous_prescriptions =
            PrescriptionLog::new(repo).recent_for_patient(&patient.id, HISTORY_WINDOW)?;
        debug!(
            patient_id = %patient.id,
            history = request.previous_prescriptions.len(),
            "loaded prescription history for draft"
        );

        self.generate(&request)
    }

    /// Suggest brand names for the symptoms. Best effort: any failure gives
    /// an empty list.
    pub fn suggest_medicines(&self, symptoms: &str) -> Vec<String> {
        if symptoms.trim().is_empty() {
            return Vec::new();
        }
        let prompt = build_suggestion_prompt(symptoms);
        match self
            .generator
            .generate(&prompt, &SamplingConfig::suggestions())
        {
            Ok(reply) => parse_medicine_suggestions(&reply),
            Err(e) => {
                warn!(error = %e, "medicine suggestion request failed");
                Vec::new()
            }
        }
    }
}
