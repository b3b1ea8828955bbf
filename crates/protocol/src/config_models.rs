//! Configuration models for `agent-kit.toml`.
//!
//! Every key is optional. A missing file yields [`GeneratorConfig::default`].

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Project-wide generator settings.
///
/// # Example
///
/// ```toml
/// # agent-kit.toml
/// configs_dir = "agent_configs"
/// tools_file = "src/my_app/tools.py"
/// registration_function = "register_concierge_tools"
///
/// [text_generation]
/// model = "gemini-2.0-flash"
/// timeout_secs = 20
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Project root. Relative values resolve against the `--root`
    /// directory, wherever the configuration file itself lives.
    pub project_root: Option<String>,

    /// Directory holding one sub-directory per domain.
    pub configs_dir: String,

    /// Python file holding `@tool` definitions and the registration call.
    pub tools_file: String,

    /// Name of the registration function. When unset, any
    /// `register_<name>_tools` function is accepted.
    pub registration_function: Option<String>,

    /// Call inside the registration function that receives the tool list.
    pub registration_call: String,

    /// Prefix of the generated schemas' `$id`.
    pub schema_id_prefix: String,

    /// Tools provided by the runtime in addition to the built-in set.
    pub extra_standard_tools: Vec<String>,

    pub text_generation: TextGenerationConfig,

    pub logging: LoggingConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            configs_dir: "agent_configs".to_string(),
            tools_file: "src/tools.py".to_string(),
            registration_function: None,
            registration_call: "register_usecase_tools".to_string(),
            schema_id_prefix: "jarvis".to_string(),
            extra_standard_tools: Vec::new(),
            text_generation: TextGenerationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Settings for LLM-backed prompt generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct TextGenerationConfig {
    /// Set to `false` to always use the built-in prompt template.
    pub enabled: bool,

    /// Model name. Overridden by the `LLM_MODEL` environment variable.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    pub base_url: String,

    pub temperature: f32,

    /// Upper bound for one generation call, in seconds.
    pub timeout_secs: u64,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Log output settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error). `RUST_LOG` refines it.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}
