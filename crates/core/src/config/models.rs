//! The resolved application configuration.

use ak_protocol::GeneratorConfig;
use std::path::PathBuf;

use crate::codegen::layout::ProjectLayout;
use crate::codegen::tool_catalog::RegistrationSyntax;

/// Settings the generator runs with, built once at start-up.
///
/// # Example
///
/// ```rust,no_run
/// use ak_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("."), None).await?;
/// println!("Writing agents under {}", config.layout().configs_dir().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory all configured paths resolve against.
    pub project_root: PathBuf,

    /// Values from `agent-kit.toml` (or defaults), after env overrides.
    pub generator: GeneratorConfig,

    /// Text generation credential read from the variable named by
    /// `text_generation.api_key_env`.
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Defaults rooted at `project_root`, without a credential.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            generator: GeneratorConfig::default(),
            api_key: None,
        }
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(
            &self.project_root,
            &self.generator.configs_dir,
            &self.generator.tools_file,
        )
    }

    pub fn registration_syntax(&self) -> RegistrationSyntax {
        RegistrationSyntax {
            function: self.generator.registration_function.clone(),
            call: self.generator.registration_call.clone(),
        }
    }
}
