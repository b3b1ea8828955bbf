//! Configuration loading and management.
//!
//! This module loads the optional `agent-kit.toml` at the project root and
//! applies environment overrides, producing the [`models::AppConfig`] that
//! is passed to the generator.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, CONFIG_FILENAME};
pub use models::AppConfig;
