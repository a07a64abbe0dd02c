//! Prompts for prescription drafting.
//!
//! Rendering is deterministic: the same request always yields the same text.

use std::fmt::Write;

use medfo_core::models::Prescription;

use crate::draft::DraftRequest;

/// Prior prescriptions shown to the model.
pub const PROMPT_HISTORY_LIMIT: usize = 3;

/// Instructions, safety rules and output format appended to every draft prompt.
pub const PRESCRIPTION_INSTRUCTIONS: &str = r#"**INSTRUCTIONS:**
1. Provide a clear diagnosis if not already specified
2. Recommend appropriate medicines with:
   - Medicine name (prefer Indian brands like Dolo, Crocin, Azithral, etc.)
   - Dosage (e.g., 650mg, 500mg)
   - Frequency (OD/BD/TDS/QID)
   - Duration (in days)
   - Timing (Before Food/After Food/With Food)
3. Consider patient's age, weight, allergies, and chronic conditions
4. Provide lifestyle advice and precautions
5. Suggest follow-up duration in days

**IMPORTANT SAFETY RULES:**
- NEVER prescribe medicines the patient is allergic to
- Adjust dosages for age and weight
- Consider drug interactions with chronic conditions
- Follow Indian medical guidelines

**OUTPUT FORMAT (JSON):**
{
  "diagnosis": "Clear diagnosis here",
  "medicines": [
    {
      "medicine": "Medicine Brand Name",
      "dosage": "650mg",
      "frequency": "BD",
      "duration": "5",
      "timing": "After Food"
    }
  ],
  "advice": "Detailed advice including diet, rest, precautions, warning signs",
  "followUpDays": 7
}

Provide ONLY the JSON output, no additional text."#;

/// Render the draft prompt for a validated request.
pub fn build_prescription_prompt(request: &DraftRequest) -> String {
    let patient = &request.patient;
    let mut prompt = String::from(
        "You are an experienced medical doctor. Generate a detailed prescription based on the following information:\n\n",
    );

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "**PATIENT INFORMATION:**");
    let _ = writeln!(prompt, "- Name: {}", patient.name);
    let _ = writeln!(prompt, "- Age: {} years", patient.age);
    let _ = writeln!(prompt, "- Gender: {}", patient.gender);
    let _ = writeln!(
        prompt,
        "- Blood Group: {}",
        patient
            .blood_group
            .map(|g| g.as_str())
            .unwrap_or("Not specified")
    );
    if let Some(weight) = patient.weight {
        let _ = writeln!(prompt, "- Weight: {weight} kg");
    }
    if let Some(height) = patient.height {
        let _ = writeln!(prompt, "- Height: {height} cm");
    }

    let _ = writeln!(prompt, "\n**MEDICAL HISTORY:**");
    if patient.has_allergies() {
        let _ = writeln!(
            prompt,
            "- Allergies: {} ⚠️ AVOID THESE",
            patient.allergies.join(", ")
        );
    } else {
        let _ = writeln!(prompt, "- No known allergies");
    }
    if patient.has_chronic_conditions() {
        let _ = writeln!(
            prompt,
            "- Chronic Conditions: {}",
            patient.chronic_conditions.join(", ")
        );
    } else {
        let _ = writeln!(prompt, "- No chronic conditions");
    }

    let _ = writeln!(prompt, "\n**CURRENT SYMPTOMS:**\n{}", request.symptoms.trim());

    if let Some(hint) = request.diagnosis_hint() {
        let _ = writeln!(prompt, "\n**DIAGNOSIS:** {hint}");
    }

    if !request.previous_prescriptions.is_empty() {
        let _ = writeln!(
            prompt,
            "\n**PREVIOUS PRESCRIPTIONS (Learn from doctor's patterns):**"
        );
        for (i, rx) in request
            .previous_prescriptions
            .iter()
            .take(PROMPT_HISTORY_LIMIT)
            .enumerate()
        {
            let _ = writeln!(prompt, "{}. Diagnosis: {}", i + 1, rx.diagnosis);
            let _ = writeln!(prompt, "   Medicines: {}", medicine_summary(rx));
        }
    }

    prompt.push('\n');
    prompt.push_str(PRESCRIPTION_INSTRUCTIONS);
    prompt
}

/// "Dolo 650 650mg TDS, Pan 40 40mg OD"
fn medicine_summary(rx: &Prescription) -> String {
    rx.medicines
        .iter()
        .map(|m| m.summary())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt asking for a short list of brand names.
pub fn build_suggestion_prompt(symptoms: &str) -> String {
    format!(
        "Based on these symptoms: \"{}\", suggest 5 commonly prescribed Indian medicines (brand names only). Return as JSON array of strings.",
        symptoms.trim()
    )
}
