//! Configuration file loader for `agent-kit.toml`.
//!
//! Every key is optional. Environment overrides are applied after the file:
//! - `LLM_MODEL` replaces `text_generation.model`
//! - the variable named by `text_generation.api_key_env` supplies the API key

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use ak_protocol::GeneratorConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "agent-kit.toml";

/// Environment variable that overrides the configured model.
pub const MODEL_ENV: &str = "LLM_MODEL";

/// Loads configuration for the project rooted at `root`.
///
/// # Arguments
///
/// * `root` - Project root (the CLI's `--root`)
/// * `explicit` - Configuration file to use instead of `<root>/agent-kit.toml`
///
/// # Returns
///
/// An `AppConfig` with defaults for anything the file leaves out. A missing
/// `agent-kit.toml` at the root is not an error; a missing explicit file is.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has wrongly typed keys
/// - A path setting is empty
pub async fn load_config(root: &Path, explicit: Option<&Path>) -> ConfigResult<AppConfig> {
    let config_path = match explicit {
        Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_FILENAME)).filter(|path| path.is_file()),
    };

    let mut generator = match &config_path {
        Some(path) => load_generator_config(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(path) = &config_path {
        validate(&generator, path)?;
    }

    if let Some(model) = non_empty_env(MODEL_ENV) {
        tracing::debug!(model = %model, "Model overridden from environment");
        generator.text_generation.model = model;
    }
    let api_key = non_empty_env(&generator.text_generation.api_key_env);

    let project_root = resolve_project_root(root, generator.project_root.as_deref());

    Ok(AppConfig {
        project_root,
        generator,
        api_key,
    })
}

/// Parses one `agent-kit.toml`.
fn load_generator_config(path: &Path) -> ConfigResult<GeneratorConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let config: GeneratorConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(config)
}

fn validate(config: &GeneratorConfig, path: &Path) -> ConfigResult<()> {
    let required = [
        ("configs_dir", &config.configs_dir),
        ("tools_file", &config.tools_file),
        ("registration_call", &config.registration_call),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!("'{key}' must not be empty"),
            });
        }
    }
    Ok(())
}

fn resolve_project_root(root: &Path, configured: Option<&str>) -> PathBuf {
    match configured {
        Some(value) if !value.trim().is_empty() => root.join(value),
        _ => root.to_path_buf(),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
