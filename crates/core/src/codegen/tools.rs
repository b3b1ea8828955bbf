//! Makes sure every tool an agent lists exists in the shared tool file.
//!
//! Missing tools get a generated stub. Resolution never fails: a tool that
//! cannot be generated is logged and reported as existing, so agent creation
//! can proceed.

use ak_protocol::ToolResolution;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::lock::LockRegistry;
use super::naming::{is_python_identifier, title_case};
use super::templates::{render_template, TOOL_STUB};
use super::tool_catalog::{CatalogError, RegistrationSyntax, ToolCatalog};
use super::writer::write_atomic;

/// Tools supplied by the agent runtime. Never generated.
pub const STANDARD_TOOLS: [&str; 11] = [
    "handoff",
    "get_agent_list",
    "get_context_tool",
    "set_context_tool",
    "update_context_tool",
    "clear_context_tool",
    "read_file_tool",
    "write_file_tool",
    "list_files_tool",
    "output_format_converter_tool",
    "validate_email",
];

/// Source of a generated tool stub.
pub fn generate_tool_code(tool_name: &str) -> Result<String, CatalogError> {
    let title = title_case(&tool_name.replace('_', " "));
    render_template(TOOL_STUB, &[("name", tool_name), ("title", &title)])
        .map_err(|_| CatalogError::TemplateNotFound(TOOL_STUB.to_string()))
}

pub struct ToolResolver {
    tools_file: PathBuf,
    syntax: RegistrationSyntax,
    standard: HashSet<String>,
    locks: Option<Arc<LockRegistry>>,
}

impl ToolResolver {
    pub fn new(tools_file: impl Into<PathBuf>, syntax: RegistrationSyntax) -> Self {
        Self {
            tools_file: tools_file.into(),
            syntax,
            standard: STANDARD_TOOLS.iter().map(|name| name.to_string()).collect(),
            locks: None,
        }
    }

    /// Treat `names` as runtime-provided in addition to [`STANDARD_TOOLS`].
    pub fn with_extra_standard_tools(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.standard.extend(names);
        self
    }

    /// Serialize tool-file updates through `locks`.
    pub fn with_locks(mut self, locks: Arc<LockRegistry>) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn is_standard(&self, name: &str) -> bool {
        self.standard.contains(name)
    }

    /// Split `tools` into generated and already available ones, generating
    /// stubs for the missing ones. The tool file is written at most once.
    pub async fn ensure_tools_exist(&self, tools: &[String]) -> ToolResolution {
        let mut resolution = ToolResolution::default();
        let mut pending = Vec::new();

        for tool in tools {
            if self.is_standard(tool) {
                resolution.existing.push(tool.clone());
            } else if !is_python_identifier(tool) {
                tracing::warn!(
                    tool = %tool,
                    "Tool name is not a valid Python identifier, not generating it"
                );
                resolution.existing.push(tool.clone());
            } else {
                pending.push(tool.clone());
            }
        }
        if pending.is_empty() {
            return resolution;
        }

        let _guard = match &self.locks {
            Some(locks) => match locks.lock_tools().await {
                Ok(guard) => Some(guard),
                Err(err) => {
                    tracing::warn!(error = %err, "Could not lock tools file, skipping tool generation");
                    resolution.existing.extend(pending);
                    return resolution;
                }
            },
            None => None,
        };

        let mut catalog = match self.load_catalog() {
            Ok(catalog) => catalog,
            Err(err) => {
                for tool in &pending {
                    tracing::warn!(tool = %tool, error = %err, "Failed to auto-generate tool");
                }
                resolution.existing.extend(pending);
                return resolution;
            }
        };

        let mut created = Vec::new();
        for tool in pending {
            if catalog.has_tool(&tool) {
                resolution.existing.push(tool);
                continue;
            }
            let added = generate_tool_code(&tool).and_then(|code| catalog.add_tool(&tool, &code));
            match added {
                Ok(()) => created.push(tool),
                Err(err) => {
                    tracing::warn!(tool = %tool, error = %err, "Failed to auto-generate tool");
                    resolution.existing.push(tool);
                }
            }
        }

        if created.is_empty() {
            return resolution;
        }

        match write_atomic(&self.tools_file, &catalog.render()) {
            Ok(()) => {
                for tool in &created {
                    tracing::info!(tool = %tool, path = %self.tools_file.display(), "Auto-generated tool");
                }
                resolution.created = created;
            }
            Err(source) => {
                let err = CatalogError::Write {
                    path: self.tools_file.clone(),
                    source,
                };
                tracing::warn!(error = %err, "Failed to auto-generate tools");
                resolution.existing.extend(created);
            }
        }
        resolution
    }

    fn load_catalog(&self) -> Result<ToolCatalog, CatalogError> {
        if !self.tools_file.is_file() {
            return Err(CatalogError::MissingFile(self.tools_file.clone()));
        }
        let source = fs::read_to_string(&self.tools_file).map_err(|source| CatalogError::Read {
            path: self.tools_file.clone(),
            source,
        })?;
        Ok(ToolCatalog::parse(&source, self.syntax.clone()))
    }
}
