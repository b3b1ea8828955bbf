//! Agent creation requests.
//!
//! These are the inputs of the generator: either a purpose-driven
//! [`AgentDefinition`] (the prompt is synthesised) or an
//! [`AgentConfigRequest`] that already carries the prompt text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One output-schema field as supplied by a caller.
///
/// Callers may give a bare type name or a full JSON-Schema property
/// descriptor. Anything else is tolerated and treated as a string field.
///
/// # Example
///
/// ```json
/// {
///   "summary": "string",
///   "score": { "type": "integer", "required": true }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(untagged)]
pub enum FieldSpec {
    /// Shorthand: `"string"`, `"integer"`, ...
    Type(String),

    /// A complete property descriptor (`type`, `required`, `description`, ...).
    Descriptor(
        #[ts(type = "Record<string, unknown>")] serde_json::Map<String, serde_json::Value>,
    ),

    /// Any other JSON value.
    Other(#[ts(type = "unknown")] serde_json::Value),
}

/// Ordered field map used for output schemas.
pub type SchemaFields = IndexMap<String, FieldSpec>;

/// Purpose-driven description of a new agent.
///
/// The prompt is generated from `purpose` and `instructions`.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct AgentDefinition {
    /// Domain the agent belongs to (e.g. "concierge").
    pub domain: String,

    /// Agent identifier (e.g. "joke_agent").
    pub agent_name: String,

    /// What the agent is for; becomes the role sentence of the prompt.
    pub purpose: String,

    /// Tool names the agent may call. Must not be empty.
    pub tools: Vec<String>,

    /// Extra instructions appended to the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(default)]
    pub batch_enabled: bool,

    #[serde(default)]
    pub is_default: bool,

    /// Output schema fields, passed through to the configuration request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema_fields: Option<SchemaFields>,
}

/// A fully specified agent configuration with its prompt text.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct AgentConfigRequest {
    pub domain: String,
    pub agent_name: String,

    /// Markdown prompt written to `prompts/NN-agent-name.md`.
    pub prompt_content: String,

    pub tools: Vec<String>,

    #[serde(default)]
    pub batch_enabled: bool,

    #[serde(default)]
    pub is_default: bool,

    /// When present, a JSON schema is written and referenced from the
    /// registration entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema_fields: Option<SchemaFields>,
}

impl AgentConfigRequest {
    /// Build a request without output schema and with both flags off.
    pub fn new(
        domain: impl Into<String>,
        agent_name: impl Into<String>,
        prompt_content: impl Into<String>,
        tools: Vec<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            agent_name: agent_name.into(),
            prompt_content: prompt_content.into(),
            tools,
            batch_enabled: false,
            is_default: false,
            output_schema_fields: None,
        }
    }

    pub fn with_batch_enabled(mut self, batch_enabled: bool) -> Self {
        self.batch_enabled = batch_enabled;
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn with_schema_fields(mut self, fields: SchemaFields) -> Self {
        self.output_schema_fields = Some(fields);
        self
    }
}
