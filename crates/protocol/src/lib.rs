//! # ak-protocol
//!
//! Shared data models for agent-kit.
//!
//! This crate defines the structures exchanged between the generator core
//! and its callers:
//! - Agent creation requests
//! - The `agents.yaml` registration model
//! - Creation reports and tool resolution results
//! - The `agent-kit.toml` configuration model
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent definitions and output-schema fields
//! - [`registry_models`]: Parsed `agents.yaml` contents
//! - [`report_models`]: Results returned after generation
//! - [`config_models`]: Configuration file structure
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, indexmap, uuid and chrono
//! - TypeScript generation: all types derive `TS` for chat front-ends
//! - Independent compilation: no dependencies on other agent-kit crates

pub mod agent_models;
pub mod config_models;
pub mod registry_models;
pub mod report_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use registry_models::*;
pub use report_models::*;
