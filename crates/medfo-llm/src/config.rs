//! Endpoint and sampling configuration.

use std::env;

use serde::Serialize;

use crate::client::GenerationError;

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub max_output_tokens: u32,
}

impl SamplingConfig {
    /// Full prescription drafts.
    pub fn prescription() -> Self {
        Self {
            temperature: 0.7,
            top_k: Some(40),
            top_p: Some(0.95),
            max_output_tokens: 2048,
        }
    }

    /// Short brand-name suggestion lists.
    pub fn suggestions() -> Self {
        Self {
            temperature: 0.5,
            top_k: None,
            top_p: None,
            max_output_tokens: 256,
        }
    }
}

/// Where and how to reach the hosted model.
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

// Keep the key out of debug logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `GEMINI_API_KEY` (required), `GEMINI_API_URL` and
    /// `GEMINI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GenerationError> {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = set("GEMINI_API_KEY")
            .ok_or_else(|| GenerationError::Configuration("GEMINI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key.trim());
        if let Some(url) = set("GEMINI_API_URL") {
            config.api_url = url.trim().to_string();
        }
        if let Some(timeout) = set("GEMINI_TIMEOUT_SECS") {
            config.timeout_secs = match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(GenerationError::Configuration(format!(
                        "GEMINI_TIMEOUT_SECS must be a positive integer, got {timeout:?}"
                    )))
                }
            };
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let result = GeminiConfig::from_lookup(|_| None);
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::from_lookup(|key| {
            (key == "GEMINI_API_KEY").then(|| "secret".to_string())
        })
        .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_overrides_and_bad_timeout() {
        let config = GeminiConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("k".into()),
            "GEMINI_API_URL" => Some("http://localhost:9000/generate".into()),
            "GEMINI_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:9000/generate");
        assert_eq!(config.timeout_secs, 5);

        let result = GeminiConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("k".into()),
            "GEMINI_TIMEOUT_SECS" => Some("soon".into()),
            _ => None,
        });
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }

    #[test]
    fn test_sampling_serializes_camel_case() {
        let json = serde_json::to_value(SamplingConfig::prescription()).unwrap();
        assert_eq!(json["topK"], 40);
        assert_eq!(json["maxOutputTokens"], 2048);

        let json = serde_json::to_value(SamplingConfig::suggestions()).unwrap();
        assert!(json.get("topK").is_none());
        assert_eq!(json["maxOutputTokens"], 256);
    }
}
