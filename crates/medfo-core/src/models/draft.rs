//! AI-generated prescription drafts.
//!
//! A draft is never a record: it is merged into the editable form and only
//! becomes a [`Prescription`](super::Prescription) once a doctor saves it.

use serde::{Deserialize, Serialize};

use super::prescription::{MedicineLine, DEFAULT_DURATION_DAYS, DEFAULT_FOLLOW_UP_DAYS};

/// Advice text carried by a draft that could not be generated.
pub const DEGRADED_ADVICE: &str =
    "AI prescription generation failed. Please create prescription manually.";

/// A medicine suggestion as the model wrote it. All fields are free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DraftMedicine {
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub timing: String,
}

impl DraftMedicine {
    /// Convert to an editable line, falling back to form defaults for
    /// frequency, timing and duration the model got wrong.
    pub fn to_line(&self) -> MedicineLine {
        let mut line = MedicineLine::new(self.medicine.trim());
        line.dosage = self.dosage.trim().to_string();
        line.frequency = self.frequency.parse().unwrap_or_default();
        line.timing = self.timing.parse().unwrap_or_default();
        line.duration = leading_day_count(&self.duration)
            .unwrap_or_else(|| DEFAULT_DURATION_DAYS.to_string());
        line
    }
}

/// Pull "5" out of "5", "5 days" or " 5d ".
fn leading_day_count(text: &str) -> Option<String> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(days) if days > 0 => Some(days.to_string()),
        _ => None,
    }
}

/// Structured prescription proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftPrescription {
    pub diagnosis: String,
    pub medicines: Vec<DraftMedicine>,
    pub advice: String,
    pub follow_up_days: u32,
    /// Set only by [`DraftPrescription::degraded`]. Never serialized.
    #[serde(skip)]
    pub degraded: bool,
}

impl Default for DraftPrescription {
    fn default() -> Self {
        Self {
            diagnosis: String::new(),
            medicines: Vec::new(),
            advice: String::new(),
            follow_up_days: DEFAULT_FOLLOW_UP_DAYS,
            degraded: false,
        }
    }
}

impl DraftPrescription {
    /// The draft returned when the model's reply is unusable.
    pub fn degraded() -> Self {
        Self {
            advice: DEGRADED_ADVICE.to_string(),
            degraded: true,
            ..Default::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn medicine_lines(&self) -> Vec<MedicineLine> {
        self.medicines
            .iter()
            .filter(|m| !m.medicine.trim().is_empty())
            .map(DraftMedicine::to_line)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Timing};

    #[test]
    fn test_degraded_draft() {
        let draft = DraftPrescription::degraded();
        assert!(draft.diagnosis.is_empty());
        assert!(draft.medicines.is_empty());
        assert_eq!(draft.follow_up_days, 7);
        assert!(!draft.advice.is_empty());
        assert!(draft.is_degraded());
        assert!(!DraftPrescription::default().is_degraded());
    }

    #[test]
    fn test_fallback_advice_text_alone_is_not_degraded() {
        let draft = DraftPrescription {
            advice: DEGRADED_ADVICE.to_string(),
            ..Default::default()
        };
        assert!(!draft.is_degraded());

        let json = serde_json::to_value(DraftPrescription::degraded()).unwrap();
        assert!(json.get("degraded").is_none());
    }

    #[test]
    fn test_to_line_parses_known_values() {
        let draft = DraftMedicine {
            medicine: "Dolo 650".into(),
            dosage: "650mg".into(),
            frequency: "TDS".into(),
            duration: "3 days".into(),
            timing: "With Food".into(),
        };
        let line = draft.to_line();
        assert_eq!(line.frequency, Frequency::ThriceDaily);
        assert_eq!(line.timing, Timing::WithFood);
        assert_eq!(line.duration, "3");
    }

    #[test]
    fn test_to_line_falls_back_to_defaults() {
        let draft = DraftMedicine {
            medicine: "Pan 40".into(),
            frequency: "every morning".into(),
            duration: "a week".into(),
            timing: "bedtime".into(),
            ..Default::default()
        };
        let line = draft.to_line();
        assert_eq!(line.frequency, Frequency::TwiceDaily);
        assert_eq!(line.timing, Timing::AfterFood);
        assert_eq!(line.duration, "5");
    }

    #[test]
    fn test_medicine_lines_skip_unnamed() {
        let draft = DraftPrescription {
            medicines: vec![
                DraftMedicine::default(),
                DraftMedicine {
                    medicine: "Crocin".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let lines = draft.medicine_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].medicine, "Crocin");
    }
}
