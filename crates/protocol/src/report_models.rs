//! Results reported back to callers after generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

/// Outcome of resolving an agent's tool list against the tool file.
///
/// Every requested tool lands in exactly one of the two lists. Tools that
/// could not be generated are reported as `existing`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct ToolResolution {
    /// Tools for which a stub was generated during this call.
    pub created: Vec<String>,

    /// Tools that were already available (or could not be generated).
    pub existing: Vec<String>,
}

/// Kind of artifact written for an agent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The domain's `agents.yaml`, updated in place.
    Registry,
    Prompt,
    Service,
    Schema,
}

/// A file touched by the generator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct GeneratedFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub kind: ArtifactKind,
}

impl fmt::Display for GeneratedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ArtifactKind::Registry => write!(f, "{} (updated)", self.path),
            _ => f.write_str(&self.path),
        }
    }
}

/// Summary of a successful agent creation.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct CreationReport {
    #[ts(type = "string")]
    pub request_id: Uuid,

    pub domain: String,
    pub agent_name: String,
    pub prompt_number: u32,
    pub batch_enabled: bool,
    pub is_default: bool,
    pub tools: Vec<String>,

    /// Tools generated as stubs while creating this agent.
    pub created_tools: Vec<String>,

    /// Files written, in write-report order: registry, prompt, service, schema.
    pub files: Vec<GeneratedFile>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl CreationReport {
    /// Zero-padded prompt number as used in file names ("03").
    pub fn prompt_label(&self) -> String {
        format!("{:02}", self.prompt_number)
    }
}

impl fmt::Display for CreationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Successfully created agent '{}' in domain '{}'.",
            self.agent_name, self.domain
        )?;
        write!(f, "Files created:")?;
        for file in &self.files {
            write!(f, "\n  - {file}")?;
        }
        Ok(())
    }
}
