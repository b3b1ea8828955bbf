//! Agent configuration generation.
//!
//! Everything that turns an agent request into files on disk lives here:
//! name validation, the project layout, the `agents.yaml` entry builder,
//! output schemas, service files, prompt synthesis and tool stubs.
//!
//! # Example
//!
//! ```no_run
//! use ak_core::codegen::{AgentBuilder, PromptSynthesizer};
//! use ak_core::config::AppConfig;
//! use ak_protocol::AgentConfigRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = AgentBuilder::new(&AppConfig::new("."))
//!     .with_synthesizer(PromptSynthesizer::template_only());
//!
//! let request = AgentConfigRequest::new(
//!     "concierge",
//!     "joke_agent",
//!     "# Joke Agent\n\nTell jokes.",
//!     vec!["tell_joke".to_string(), "handoff".to_string()],
//! );
//! let report = builder.create_agent_config(request).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod layout;
pub mod lock;
pub mod naming;
pub mod prompt;
pub mod registry;
pub mod schema;
pub mod services;
pub mod templates;
pub mod tool_catalog;
pub mod tools;
pub mod writer;

pub use builder::{parse_tool_list, AgentBuilder};
pub use error::{CodegenError, CodegenResult, ValidationError};
pub use layout::ProjectLayout;
pub use naming::{validate_agent_name, validate_domain_name, NameKind};
pub use prompt::PromptSynthesizer;
pub use tools::{ToolResolver, STANDARD_TOOLS};
