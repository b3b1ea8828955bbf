//! External text generation used to write agent prompts.
//!
//! The [`TextGenerator`] trait is the seam between the prompt synthesizer and
//! a hosted model. [`gemini::GeminiGenerator`] is the shipped implementation.

pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use gemini::GeminiGenerator;

/// Errors from a text generation backend. They never leave the prompt
/// synthesizer, which falls back to its template instead.
#[derive(Debug, Error)]
pub enum TextGenError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {model} failed: {source}")]
    Transport {
        model: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Model {model} returned HTTP {status}: {body}")]
    Status {
        model: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {model}: {source}")]
    Decode {
        model: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response from {0} has no candidates")]
    NoCandidates(String),
}

/// One piece of a multi-part model response.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    /// Non-text part. Contributes its `text` member when it has one,
    /// otherwise its JSON rendering.
    Structured(Value),
}

impl Fragment {
    fn as_text(&self) -> String {
        match self {
            Fragment::Text(text) => text.clone(),
            Fragment::Structured(value) => match value.get("text").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => value.to_string(),
            },
        }
    }
}

/// Raw generator output.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedText {
    Text(String),
    Fragments(Vec<Fragment>),
}

impl GeneratedText {
    /// Single trimmed string; fragments are joined with newlines.
    pub fn flatten(&self) -> String {
        match self {
            GeneratedText::Text(text) => text.trim().to_string(),
            GeneratedText::Fragments(parts) => parts
                .iter()
                .map(Fragment::as_text)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
        }
    }
}

/// A hosted model that turns an instruction into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short name for log messages.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<GeneratedText, TextGenError>;
}
