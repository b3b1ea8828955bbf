//! Registration models for `agent_configs/<domain>/agents.yaml`.
//!
//! The generator writes registration entries as text (see the YAML entry
//! builder in `ak-core`). These types are used to read the file back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The parsed contents of a domain's `agents.yaml`.
///
/// # Example
///
/// ```yaml
/// agents:
///   joke_agent:
///     prompt: "00-joke-agent"
///     batch_enabled: false
///     is_default: true
///     tools:
///       - "tell_joke"
///       - "handoff"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct AgentsFile {
    /// Agents keyed by name, in file order. An empty `agents:` key is
    /// accepted and yields no agents.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agents: IndexMap<String, AgentRegistration>,
}

impl AgentsFile {
    /// Names of all agents flagged `is_default: true`.
    pub fn default_agents(&self) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|(_, registration)| registration.is_default)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// One agent's registration block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentRegistration {
    /// Prompt file stem without extension (e.g. "03-joke-agent").
    pub prompt: String,

    #[serde(default)]
    pub batch_enabled: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,

    /// Schema filename under `schemas/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<String>,

    #[serde(default)]
    pub tools: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, AgentRegistration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let agents = Option::<IndexMap<String, AgentRegistration>>::deserialize(deserializer)?;
    Ok(agents.unwrap_or_default())
}
