//! # ak-core
//!
//! Core generator for agent-kit.
//!
//! This crate provides:
//! - Configuration loading from `agent-kit.toml`
//! - Validation of agent and domain names
//! - Synthesis of prompts, registration entries, schemas and service files
//! - Tool stub generation in the shared tool file
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`codegen`]: Agent creation and file synthesis
//! - [`textgen`]: Text generation backends used for prompts
//! - [`logging`]: Tracing subscriber setup

pub mod codegen;
pub mod config;
pub mod logging;
pub mod textgen;
