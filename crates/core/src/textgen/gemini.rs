//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use ak_protocol::TextGenerationConfig;

use super::{Fragment, GeneratedText, TextGenError, TextGenerator};

pub struct GeminiGenerator {
    http_client: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiGenerator {
    pub fn new(config: &TextGenerationConfig, api_key: String) -> Result<Self, TextGenError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(TextGenError::Client)?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Value>,
}

fn to_fragment(part: Value) -> Fragment {
    if let Some(object) = part.as_object() {
        if object.len() == 1 {
            if let Some(Value::String(text)) = object.get("text") {
                return Fragment::Text(text.clone());
            }
        }
    }
    Fragment::Structured(part)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedText, TextGenError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        tracing::debug!(model = %self.model, "Requesting prompt generation");
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| TextGenError::Transport {
                model: self.model.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(TextGenError::Status {
                model: self.model.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let decoded: GenerateResponse =
            response.json().await.map_err(|source| TextGenError::Decode {
                model: self.model.clone(),
                source,
            })?;

        let parts = decoded
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| TextGenError::NoCandidates(self.model.clone()))?
            .content
            .map(|content| content.parts)
            .unwrap_or_default();

        let fragments: Vec<Fragment> = parts.into_iter().map(to_fragment).collect();
        if let [Fragment::Text(text)] = fragments.as_slice() {
            return Ok(GeneratedText::Text(text.clone()));
        }
        Ok(GeneratedText::Fragments(fragments))
    }
}
