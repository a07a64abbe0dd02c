//! Draft extraction from model replies.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use medfo_core::models::{DraftMedicine, DraftPrescription, DEFAULT_FOLLOW_UP_DAYS};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Remove a surrounding markdown code fence (```` ```json ```` or bare
/// ```` ``` ````) and trim.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a reply into a draft, or return the degraded draft.
///
/// Never fails. Missing fields take form defaults.
pub fn parse_ai_response(text: &str) -> DraftPrescription {
    match parse_draft_json(text) {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, reply_chars = text.len(), "unusable model reply, returning degraded draft");
            debug!(reply = text, "raw model reply");
            DraftPrescription::degraded()
        }
    }
}

/// Strict half of [`parse_ai_response`]: fails when no JSON object can be
/// recovered from the reply.
pub fn parse_draft_json(text: &str) -> ExtractionResult<DraftPrescription> {
    let object = extract_object(strip_code_fence(text))?;

    Ok(DraftPrescription {
        diagnosis: text_field(&object, "diagnosis"),
        medicines: object
            .get("medicines")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(draft_medicine).collect())
            .unwrap_or_default(),
        advice: advice_field(&object),
        follow_up_days: follow_up_days(object.get("followUpDays")),
        degraded: false,
    })
}

/// The reply as a JSON object, falling back to the outermost braces when the
/// model wrapped it in prose.
fn extract_object(text: &str) -> ExtractionResult<Map<String, Value>> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(first_error) => {
            let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
                return Err(first_error.into());
            };
            if end <= start {
                return Err(first_error.into());
            }
            serde_json::from_str(&text[start..=end])?
        }
    };

    match value {
        Value::Object(object) => Ok(object),
        other => Err(ExtractionError::InvalidFormat(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// String or number field as text; anything else is empty.
fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Advice is usually a string; a list of lines is joined.
fn advice_field(object: &Map<String, Value>) -> String {
    match object.get("advice") {
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => text_field(object, "advice"),
    }
}

fn draft_medicine(value: &Value) -> Option<DraftMedicine> {
    let object = value.as_object()?;
    Some(DraftMedicine {
        medicine: text_field(object, "medicine"),
        dosage: text_field(object, "dosage"),
        frequency: text_field(object, "frequency"),
        duration: text_field(object, "duration"),
        timing: text_field(object, "timing"),
    })
}

/// Positive whole days, from a number or numeric string. Anything else is
/// the default.
fn follow_up_days(value: Option<&Value>) -> u32 {
    let days = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f.round() as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    days.filter(|d| *d > 0)
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or(DEFAULT_FOLLOW_UP_DAYS)
}

/// Parse a JSON array of brand names. Empty on any failure.
pub fn parse_medicine_suggestions(text: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<Value>>(strip_code_fence(text)) {
        Ok(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            warn!(error = %e, "unusable suggestion reply");
            Vec::new()
        }
    }
}
