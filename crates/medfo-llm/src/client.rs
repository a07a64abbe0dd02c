//! Hosted text generation over HTTPS.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use medfo_core::db::DbError;
use medfo_core::models::ValidationError;

use crate::config::{GeminiConfig, SamplingConfig};

/// Failures that stop a draft from being generated at all.
///
/// A reply that arrives but cannot be parsed is not an error: it becomes a
/// degraded draft.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Cannot reach generation endpoint: {0}")]
    Transport(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not load prescription history: {0}")]
    History(#[from] DbError),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Anything that turns a prompt into reply text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> GenerationResult<String>;
}

/// Request body for `generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: &'a SamplingConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response body from `generateContent`. Every level is optional so a
/// short envelope is reported as malformed instead of failing to decode.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReplyPart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn reply_text(self) -> GenerationResult<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                GenerationError::MalformedEnvelope("no candidates[0].content.parts[0].text".into())
            })
    }
}

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> GenerationResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Client configured from `GEMINI_*` environment variables.
    pub fn from_env() -> GenerationResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> GenerationResult<String> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: sampling,
        };

        debug!(
            prompt_chars = prompt.len(),
            max_output_tokens = sampling.max_output_tokens,
            "sending generation request"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.config.timeout_secs)
                } else {
                    // Strip the URL: it carries the key.
                    GenerationError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "generation endpoint returned an error");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::MalformedEnvelope(e.without_url().to_string()))?;

        parsed.reply_text()
    }
}

/// Mock generator for testing: returns a fixed reply and records prompts.
pub struct MockGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with a transport error.
    pub fn unreachable() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str, _sampling: &SamplingConfig) -> GenerationResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply
            .clone()
            .ok_or_else(|| GenerationError::Transport("connection refused".into()))
    }
}
