//! Agent creation: validation, staging and writing of all artifacts.
//!
//! Checks that need no lock run first, so a rejected request touches no
//! files. The domain lock is then held from the duplicate re-check to the
//! last write, so prompt numbers and duplicate checks cannot race. All file contents are
//! rendered before the first write; if any write fails, the files written by
//! the call are rolled back and `agents.yaml` is restored.

use ak_protocol::{
    AgentConfigRequest, AgentDefinition, AgentsFile, ArtifactKind, CreationReport, GeneratedFile,
    ToolResolution,
};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::models::AppConfig;

use super::error::{CodegenError, CodegenResult, ValidationError};
use super::layout::{schema_filename, ProjectLayout};
use super::lock::LockRegistry;
use super::naming::{validate_agent_name, validate_domain_name};
use super::prompt::PromptSynthesizer;
use super::registry::{agent_exists, append_entry, create_agent_yaml_entry, load_agents_file, parse_agents_file};
use super::schema::{create_output_schema, render_schema};
use super::services::create_services_file_content;
use super::tools::ToolResolver;
use super::writer::{write_atomic, WriteSet};

/// Split a comma-separated tool string into trimmed, non-empty names.
///
/// ```
/// use ak_core::codegen::builder::parse_tool_list;
///
/// assert_eq!(parse_tool_list("a, b,,c "), vec!["a", "b", "c"]);
/// ```
pub fn parse_tool_list(tools: &str) -> Vec<String> {
    tools
        .split(',')
        .map(str::trim)
        .filter(|tool| !tool.is_empty())
        .map(str::to_string)
        .collect()
}

/// Prompt and tool list checks. Touches no files.
fn check_content(request: &AgentConfigRequest) -> CodegenResult<()> {
    if request.prompt_content.trim().is_empty() {
        return Err(ValidationError::EmptyPrompt.into());
    }
    if request.tools.is_empty() {
        return Err(ValidationError::NoTools.into());
    }
    if !request.tools.iter().any(|tool| tool == "handoff") {
        tracing::warn!(
            agent = %request.agent_name,
            "Agent '{}' does not have 'handoff' tool - recommended for multi-agent systems",
            request.agent_name
        );
    }
    Ok(())
}

/// One file to be written by a creation call.
struct StagedFile {
    path: PathBuf,
    contents: String,
    kind: ArtifactKind,
}

fn write_error(kind: ArtifactKind, path: PathBuf, source: std::io::Error) -> CodegenError {
    match kind {
        ArtifactKind::Registry => CodegenError::RegistryWrite { path, source },
        ArtifactKind::Prompt => CodegenError::PromptWrite { path, source },
        ArtifactKind::Service => CodegenError::ServicesWrite { path, source },
        ArtifactKind::Schema => CodegenError::SchemaWrite { path, source },
    }
}

/// Creates agents inside one project.
pub struct AgentBuilder {
    layout: ProjectLayout,
    schema_id_prefix: String,
    resolver: ToolResolver,
    synthesizer: PromptSynthesizer,
    locks: Arc<LockRegistry>,
}

impl AgentBuilder {
    pub fn new(config: &AppConfig) -> Self {
        let layout = config.layout();
        let locks = Arc::new(LockRegistry::new(layout.locks_dir()));
        let resolver = ToolResolver::new(layout.tools_file(), config.registration_syntax())
            .with_extra_standard_tools(config.generator.extra_standard_tools.iter().cloned())
            .with_locks(Arc::clone(&locks));

        Self {
            layout,
            schema_id_prefix: config.generator.schema_id_prefix.clone(),
            resolver,
            synthesizer: PromptSynthesizer::from_config(config),
            locks,
        }
    }

    /// Replace the prompt synthesizer.
    pub fn with_synthesizer(mut self, synthesizer: PromptSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn synthesizer(&self) -> &PromptSynthesizer {
        &self.synthesizer
    }

    /// Create an agent from its purpose. The prompt is synthesized after the
    /// names and purpose pass validation.
    pub async fn create_agent(&self, definition: AgentDefinition) -> CodegenResult<CreationReport> {
        validate_domain_name(&definition.domain)?;
        validate_agent_name(&definition.agent_name)?;
        if definition.purpose.trim().is_empty() {
            return Err(ValidationError::EmptyPurpose.into());
        }

        let prompt_content = self
            .synthesizer
            .create_agent_prompt_content(
                &definition.agent_name,
                &definition.purpose,
                definition.instructions.as_deref(),
            )
            .await;

        let mut request = AgentConfigRequest::new(
            definition.domain,
            definition.agent_name,
            prompt_content,
            definition.tools,
        )
        .with_batch_enabled(definition.batch_enabled)
        .with_default(definition.is_default);
        request.output_schema_fields = definition.output_schema_fields;

        self.create_agent_config(request).await
    }

    /// Validate a request without creating the agent. Missing tools are
    /// still generated.
    pub async fn validate_agent_config(
        &self,
        request: &AgentConfigRequest,
    ) -> CodegenResult<ToolResolution> {
        validate_domain_name(&request.domain)?;
        validate_agent_name(&request.agent_name)?;
        self.check_not_registered(request)?;
        check_content(request)?;
        Ok(self.resolve_tools(request).await)
    }

    /// Create every artifact for `request`.
    pub async fn create_agent_config(
        &self,
        request: AgentConfigRequest,
    ) -> CodegenResult<CreationReport> {
        validate_domain_name(&request.domain)?;
        validate_agent_name(&request.agent_name)?;
        self.check_not_registered(&request)?;
        check_content(&request)?;

        let _domain_lock = self.locks.lock_domain(&request.domain).await?;
        // Re-checked under the lock.
        self.check_not_registered(&request)?;
        let resolution = self.resolve_tools(&request).await;

        let domain = request.domain.as_str();
        let agent = request.agent_name.as_str();

        self.layout.ensure_domain_structure(domain)?;
        let prompt_number = self.layout.next_prompt_number(domain)?;

        let agents_yaml = self.layout.agents_yaml(domain);
        let registry_content =
            fs::read_to_string(&agents_yaml).map_err(|source| CodegenError::RegistryRead {
                path: agents_yaml.clone(),
                source,
            })?;
        if request.is_default {
            self.warn_on_existing_default(&registry_content, &agents_yaml, domain, agent);
        }

        let mut staged = Vec::with_capacity(4);

        let schema_file = match &request.output_schema_fields {
            Some(fields) => {
                let schema =
                    create_output_schema(agent, Some(fields), &self.schema_id_prefix);
                let path = self.layout.schema_path(domain, agent);
                let contents = render_schema(&schema).map_err(|err| CodegenError::SchemaWrite {
                    path: path.clone(),
                    source: std::io::Error::other(err),
                })?;
                staged.push(StagedFile {
                    path,
                    contents,
                    kind: ArtifactKind::Schema,
                });
                Some(schema_filename(agent))
            }
            None => None,
        };

        let entry = create_agent_yaml_entry(
            agent,
            prompt_number,
            &request.tools,
            request.batch_enabled,
            request.is_default,
            schema_file.as_deref(),
        );
        staged.push(StagedFile {
            path: agents_yaml,
            contents: append_entry(&registry_content, &entry),
            kind: ArtifactKind::Registry,
        });
        staged.push(StagedFile {
            path: self.layout.prompt_path(domain, prompt_number, agent),
            contents: request.prompt_content.clone(),
            kind: ArtifactKind::Prompt,
        });
        staged.push(StagedFile {
            path: self.layout.services_path(domain, agent),
            contents: create_services_file_content(domain, agent, request.batch_enabled)?,
            kind: ArtifactKind::Service,
        });

        let mut writes = WriteSet::new();
        for file in &staged {
            if let Err(source) = writes.write(&file.path, &file.contents) {
                tracing::warn!(
                    domain,
                    agent,
                    path = %file.path.display(),
                    error = %source,
                    "Write failed, rolling back"
                );
                writes.rollback();
                return Err(write_error(file.kind, file.path.clone(), source));
            }
            tracing::debug!(domain, agent, path = %file.path.display(), "Wrote artifact");
        }

        let report_order = [
            ArtifactKind::Registry,
            ArtifactKind::Prompt,
            ArtifactKind::Service,
            ArtifactKind::Schema,
        ];
        let files = report_order
            .iter()
            .filter_map(|kind| staged.iter().find(|file| file.kind == *kind))
            .map(|file| GeneratedFile {
                path: self.layout.relative(&file.path),
                kind: file.kind,
            })
            .collect();

        tracing::info!(domain, agent, prompt_number, "Created agent");
        Ok(CreationReport {
            request_id: Uuid::new_v4(),
            domain: request.domain,
            agent_name: request.agent_name,
            prompt_number,
            batch_enabled: request.batch_enabled,
            is_default: request.is_default,
            tools: request.tools,
            created_tools: resolution.created,
            files,
            created_at: Utc::now(),
        })
    }

    fn check_not_registered(&self, request: &AgentConfigRequest) -> CodegenResult<()> {
        let agents_yaml = self.layout.agents_yaml(&request.domain);
        if !agents_yaml.is_file() {
            return Ok(());
        }
        let content =
            fs::read_to_string(&agents_yaml).map_err(|source| CodegenError::RegistryRead {
                path: agents_yaml.clone(),
                source,
            })?;
        if agent_exists(&content, &request.agent_name) {
            return Err(ValidationError::AgentExists {
                agent: request.agent_name.clone(),
                domain: request.domain.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Generates missing tools in the tool file.
    async fn resolve_tools(&self, request: &AgentConfigRequest) -> ToolResolution {
        let resolution = self.resolver.ensure_tools_exist(&request.tools).await;
        if !resolution.created.is_empty() {
            tracing::info!(
                agent = %request.agent_name,
                "Auto-generated {} missing tools: {}",
                resolution.created.len(),
                resolution.created.join(", ")
            );
        }
        resolution
    }

    fn warn_on_existing_default(&self, content: &str, path: &Path, domain: &str, agent: &str) {
        match parse_agents_file(content, path) {
            Ok(file) => {
                let defaults = file.default_agents();
                if !defaults.is_empty() {
                    tracing::warn!(
                        domain,
                        agent,
                        existing = %defaults.join(", "),
                        "Domain already has a default agent"
                    );
                }
            }
            Err(err) => tracing::debug!(domain, error = %err, "Skipping default-agent check"),
        }
    }

    /// Next prompt number for `domain`.
    pub fn prompt_number(&self, domain: &str) -> CodegenResult<u32> {
        validate_domain_name(domain)?;
        self.layout.next_prompt_number(domain)
    }

    pub fn ensure_domain_structure(&self, domain: &str) -> CodegenResult<()> {
        validate_domain_name(domain)?;
        self.layout.ensure_domain_structure(domain)
    }

    /// Write (or overwrite) the service file for an agent.
    pub fn write_services_file(
        &self,
        domain: &str,
        agent_name: &str,
        batch_enabled: bool,
    ) -> CodegenResult<PathBuf> {
        validate_domain_name(domain)?;
        validate_agent_name(agent_name)?;

        let path = self.layout.services_path(domain, agent_name);
        let content = create_services_file_content(domain, agent_name, batch_enabled)?;
        write_atomic(&path, &content).map_err(|source| CodegenError::ServicesWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!(domain, agent = agent_name, path = %path.display(), "Wrote services file");
        Ok(path)
    }

    /// Parsed `agents.yaml` of `domain`.
    pub fn list_agents(&self, domain: &str) -> CodegenResult<AgentsFile> {
        validate_domain_name(domain)?;
        let path = self.layout.agents_yaml(domain);
        if !path.is_file() {
            return Err(CodegenError::RegistryMissing(domain.to_string()));
        }
        load_agents_file(&path)
    }

    /// The output schema referenced by an agent's registration.
    pub fn schema_for_agent(&self, domain: &str, agent_name: &str) -> CodegenResult<Value> {
        validate_agent_name(agent_name)?;
        let agents = self.list_agents(domain)?;
        let registration =
            agents
                .agents
                .get(agent_name)
                .ok_or_else(|| CodegenError::AgentNotFound {
                    agent: agent_name.to_string(),
                    domain: domain.to_string(),
                })?;
        let file = registration
            .output_schema
            .as_deref()
            .ok_or_else(|| CodegenError::SchemaNotConfigured(agent_name.to_string()))?;

        let path = self.layout.schemas_dir(domain).join(file);
        let content = fs::read_to_string(&path).map_err(|source| CodegenError::SchemaRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CodegenError::SchemaParse { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn builder(root: &Path) -> AgentBuilder {
        AgentBuilder::new(&AppConfig::new(root)).with_synthesizer(PromptSynthesizer::template_only())
    }

    fn request(agent: &str) -> AgentConfigRequest {
        AgentConfigRequest::new("test-domain", agent, "# Prompt", vec!["handoff".to_string()])
    }

    #[test]
    fn test_parse_tool_list() {
        assert_eq!(parse_tool_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_tool_list(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_invalid_names_write_nothing() {
        let dir = tempdir().expect("Failed to create temp dir");
        let builder = builder(dir.path());

        let mut bad = request("Bad Agent");
        let err = builder.create_agent_config(bad.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            CodegenError::Validation(ValidationError::InvalidName { .. })
        ));

        bad.agent_name = "ok".to_string();
        bad.domain = "Bad Domain".to_string();
        assert!(builder.create_agent_config(bad).await.is_err());
        assert!(!dir.path().join("agent_configs").exists(), "nothing written");
    }

    #[tokio::test]
    async fn test_empty_prompt_and_tools_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let builder = builder(dir.path());

        let mut empty_prompt = request("a");
        empty_prompt.prompt_content = "  \n".to_string();
        assert_eq!(
            builder.validate_agent_config(&empty_prompt).await.unwrap_err().to_string(),
            "Validation failed: Prompt content cannot be empty"
        );

        let mut no_tools = request("a");
        no_tools.tools.clear();
        assert_eq!(
            builder.validate_agent_config(&no_tools).await.unwrap_err().to_string(),
            "Validation failed: Agent must have at least one tool"
        );
    }

    #[tokio::test]
    async fn test_empty_purpose_rejected_before_generation() {
        let dir = tempdir().expect("Failed to create temp dir");
        let definition = AgentDefinition {
            domain: "test-domain".to_string(),
            agent_name: "a".to_string(),
            purpose: " ".to_string(),
            tools: vec!["handoff".to_string()],
            instructions: None,
            batch_enabled: false,
            is_default: false,
            output_schema_fields: None,
        };
        let err = builder(dir.path()).create_agent(definition).await.unwrap_err();
        assert!(matches!(err, CodegenError::Validation(ValidationError::EmptyPurpose)));
    }

    #[tokio::test]
    async fn test_list_agents_requires_registry() {
        let dir = tempdir().expect("Failed to create temp dir");
        let builder = builder(dir.path());

        assert!(matches!(
            builder.list_agents("sales").unwrap_err(),
            CodegenError::RegistryMissing(_)
        ));
        builder.ensure_domain_structure("sales").unwrap();
        assert!(builder.list_agents("sales").unwrap().agents.is_empty());
        assert_eq!(builder.prompt_number("sales").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_schema_for_agent_without_schema() {
        let dir = tempdir().expect("Failed to create temp dir");
        let builder = builder(dir.path());
        builder.create_agent_config(request("plain")).await.unwrap();

        assert!(matches!(
            builder.schema_for_agent("test-domain", "plain").unwrap_err(),
            CodegenError::SchemaNotConfigured(_)
        ));
        assert!(matches!(
            builder.schema_for_agent("test-domain", "ghost").unwrap_err(),
            CodegenError::AgentNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_write_services_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = builder(dir.path())
            .write_services_file("sales", "lead_scorer", true)
            .unwrap();
        assert_eq!(path, dir.path().join("agent_configs/sales/lead_scorer.py"));
        assert!(fs::read_to_string(path).unwrap().contains("def lead_scorer_batch("));
    }
}
