//! `agents.yaml` entries: composing, appending, duplicate detection and
//! read-back.
//!
//! Entries are produced as text so hand-written comments and layout in the
//! existing file survive an append. Reading goes through `serde_yaml`.

use ak_protocol::AgentsFile;
use regex::Regex;
use std::fs;
use std::path::Path;

use super::error::{CodegenError, CodegenResult};
use super::layout::prompt_reference;

const FALLBACK_HEADER: &str = "# Agent configuration\n\nagents:\n";

/// Registration entry for one agent, indented to sit under `agents:`.
///
/// ```
/// use ak_core::codegen::registry::create_agent_yaml_entry;
///
/// let entry = create_agent_yaml_entry("joke_agent", 3, &["handoff".to_string()], false, false, None);
/// assert!(entry.starts_with("  joke_agent:\n    prompt: \"03-joke-agent\"\n"));
/// ```
pub fn create_agent_yaml_entry(
    agent_name: &str,
    prompt_number: u32,
    tools: &[String],
    batch_enabled: bool,
    is_default: bool,
    output_schema: Option<&str>,
) -> String {
    let mut yaml = format!("  {agent_name}:\n");
    yaml.push_str(&format!(
        "    prompt: \"{}\"\n",
        prompt_reference(prompt_number, agent_name)
    ));
    yaml.push_str(&format!("    batch_enabled: {batch_enabled}\n"));
    if is_default {
        yaml.push_str("    is_default: true\n");
    }
    if let Some(schema) = output_schema.filter(|s| !s.is_empty()) {
        yaml.push_str(&format!("    output_schema: {}\n", quoted(schema)));
    }
    yaml.push_str("    tools:\n");
    for tool in tools {
        yaml.push_str(&format!("      - {}\n", quoted(tool)));
    }
    yaml
}

/// Double-quoted YAML scalar.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether `agent_name` is already registered in `content`.
///
/// Parsed files are checked by the keys under `agents:`. Files that do not
/// parse, or whose `agents:` is not a mapping, fall back to a line match on
/// `name:`, `"name":` or `'name':` at any indentation.
pub fn agent_exists(content: &str, agent_name: &str) -> bool {
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(serde_yaml::Value::Null) => false,
        Ok(document) => match document.get("agents") {
            None | Some(serde_yaml::Value::Null) => false,
            Some(serde_yaml::Value::Mapping(agents)) => agents
                .keys()
                .any(|key| key.as_str() == Some(agent_name)),
            Some(_) => textual_key_match(content, agent_name),
        },
        Err(err) => {
            tracing::debug!(error = %err, "agents.yaml does not parse, using textual duplicate check");
            textual_key_match(content, agent_name)
        }
    }
}

fn textual_key_match(content: &str, agent_name: &str) -> bool {
    let name = regex::escape(agent_name);
    let pattern = format!(r#"(?m)^\s*(?:{name}|"{name}"|'{name}')\s*:"#);
    Regex::new(&pattern)
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

/// Append `entry` to `content`, adding an `agents:` header when the file
/// has none.
pub fn append_entry(content: &str, entry: &str) -> String {
    let has_agents_key = content.lines().any(|line| line.starts_with("agents:"));
    let base = if has_agents_key {
        content.to_string()
    } else {
        format!("{FALLBACK_HEADER}{content}")
    };
    format!("{}\n{entry}\n", base.trim_end())
}

pub fn parse_agents_file(content: &str, path: &Path) -> CodegenResult<AgentsFile> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| CodegenError::RegistryParse {
            path: path.to_path_buf(),
            source,
        })?;
    if document.is_null() {
        return Ok(AgentsFile::default());
    }
    serde_yaml::from_value(document).map_err(|source| CodegenError::RegistryParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a domain's `agents.yaml`.
pub fn load_agents_file(path: &Path) -> CodegenResult<AgentsFile> {
    let content = fs::read_to_string(path).map_err(|source| CodegenError::RegistryRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_agents_file(&content, path)
}
