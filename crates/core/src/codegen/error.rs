//! Error types for agent generation.

use std::path::PathBuf;
use thiserror::Error;

use super::naming::NameKind;

/// Result type for generation operations.
pub type CodegenResult<T> = Result<T, CodegenError>;

/// A request that cannot be carried out as given. Reported before any
/// file is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} name cannot be empty")]
    EmptyName(NameKind),

    #[error(
        "{kind} name '{name}' must be lowercase, start with a letter, and contain only letters, numbers, hyphens, and underscores"
    )]
    InvalidName { kind: NameKind, name: String },

    #[error("Agent '{agent}' already exists in domain '{domain}'")]
    AgentExists { agent: String, domain: String },

    #[error("Agent purpose cannot be empty")]
    EmptyPurpose,

    #[error("Prompt content cannot be empty")]
    EmptyPrompt,

    #[error("Agent must have at least one tool")]
    NoTools,
}

/// Errors that can occur while generating or reading agent artifacts.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The domain skeleton could not be created.
    #[error("Failed to create domain structure at {path:?}: {source}")]
    DomainStructure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The domain has no `agents.yaml` to append to.
    #[error("agents.yaml does not exist for domain '{0}'")]
    RegistryMissing(String),

    #[error("Failed to read {path:?}: {source}")]
    RegistryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    RegistryParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to add agent to agents.yaml at {path:?}: {source}")]
    RegistryWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write prompt file {path:?}: {source}")]
    PromptWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write schema file {path:?}: {source}")]
    SchemaWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write services file {path:?}: {source}")]
    ServicesWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Agent '{agent}' is not registered in domain '{domain}'")]
    AgentNotFound { agent: String, domain: String },

    #[error("No output schema configured for agent '{0}'")]
    SchemaNotConfigured(String),

    #[error("Failed to read schema file {path:?}: {source}")]
    SchemaRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse schema file {path:?}: {source}")]
    SchemaParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A required template file was not found in embedded assets.
    #[error("Template file not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to acquire lock {path:?}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An existing prompt prefix leaves no room for another number.
    #[error("No prompt number left in domain '{0}'")]
    PromptNumberOverflow(String),
}
