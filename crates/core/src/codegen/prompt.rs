//! Prompt text for new agents.
//!
//! A configured [`TextGenerator`] writes the prompt when it can. Every
//! failure (no generator, transport error, timeout, empty output) falls back
//! to a fixed Markdown template, so synthesis itself never fails.

use std::sync::Arc;
use std::time::Duration;

use crate::config::models::AppConfig;
use crate::textgen::{GeminiGenerator, TextGenerator};

use super::naming::display_name;
use super::templates::{render_template, PROMPT_GENERATION};

pub struct PromptSynthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl PromptSynthesizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Synthesizer that always uses the built-in template.
    pub fn template_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    /// Gemini-backed synthesizer when text generation is enabled and an API
    /// key was found, template-only otherwise.
    pub fn from_config(config: &AppConfig) -> Self {
        let settings = &config.generator.text_generation;
        let timeout = Duration::from_secs(settings.timeout_secs);

        if !settings.enabled {
            tracing::debug!("Text generation disabled in configuration");
            return Self::new(None, timeout);
        }
        let Some(api_key) = config.api_key.clone() else {
            tracing::debug!(env = %settings.api_key_env, "No API key set, prompts use the template");
            return Self::new(None, timeout);
        };

        match GeminiGenerator::new(settings, api_key) {
            Ok(generator) => Self::new(Some(Arc::new(generator)), timeout),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to create text generator");
                Self::new(None, timeout)
            }
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Prompt Markdown for `agent_name`.
    pub async fn create_agent_prompt_content(
        &self,
        agent_name: &str,
        purpose: &str,
        instructions: Option<&str>,
    ) -> String {
        if let Some(generated) = self.try_generate(agent_name, purpose, instructions).await {
            return generated;
        }
        fallback_prompt(agent_name, purpose, instructions)
    }

    async fn try_generate(
        &self,
        agent_name: &str,
        purpose: &str,
        instructions: Option<&str>,
    ) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let display = display_name(agent_name);
        let instructions = instructions
            .filter(|text| !text.is_empty())
            .unwrap_or("None provided");

        let request = match render_template(
            PROMPT_GENERATION,
            &[
                ("display_name", display.as_str()),
                ("purpose", purpose),
                ("instructions", instructions),
            ],
        ) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(agent = agent_name, error = %err, "Falling back to template");
                return None;
            }
        };

        match tokio::time::timeout(self.timeout, generator.generate(request.trim_end())).await {
            Ok(Ok(output)) => {
                let text = output.flatten();
                if text.is_empty() {
                    tracing::warn!(
                        agent = agent_name,
                        generator = generator.name(),
                        "Generator returned an empty response, falling back to template"
                    );
                    return None;
                }
                tracing::info!(agent = agent_name, generator = generator.name(), "Generated prompt");
                Some(text)
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    agent = agent_name,
                    error = %err,
                    "Failed to generate prompt, falling back to template"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    agent = agent_name,
                    timeout_secs = self.timeout.as_secs(),
                    "Prompt generation timed out, falling back to template"
                );
                None
            }
        }
    }
}

/// The deterministic prompt used when no generated text is available.
pub fn fallback_prompt(agent_name: &str, purpose: &str, instructions: Option<&str>) -> String {
    let display = display_name(agent_name);
    let mut prompt = format!("# {display}\n\n");
    prompt.push_str(&format!("You are **{display}**, {purpose}.\n\n"));

    if let Some(instructions) = instructions.filter(|text| !text.is_empty()) {
        prompt.push_str("## Instructions\n\n");
        prompt.push_str(&format!("{instructions}\n\n"));
    }

    prompt.push_str("## Guidelines\n\n");
    prompt.push_str("- Be helpful and professional\n");
    prompt.push_str("- Use the available tools to accomplish your tasks\n");
    prompt.push_str("- You can use handoff tool to route users to other agents if needed\n\n");

    prompt.push_str("## Tool Instructions\n");
    prompt.push_str(
        "- Call `get_agent_list` to get list of agents MANDATORILY before calling `handoff`\n",
    );
    prompt
}
