//! Where generated artifacts live inside the target project.
//!
//! ```text
//! <project_root>/
//! ├── .agent-kit/locks/
//! ├── <tools_file>
//! └── <configs_dir>/
//!     └── <domain>/
//!         ├── agents.yaml
//!         ├── <agent_name>.py
//!         ├── prompts/NN-agent-stem.md
//!         └── schemas/agent-stem-output.json
//! ```

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use super::error::{CodegenError, CodegenResult};
use super::naming::{file_stem, title_case};

pub const AGENTS_YAML_FILENAME: &str = "agents.yaml";
const PROMPTS_DIR: &str = "prompts";
const SCHEMAS_DIR: &str = "schemas";
const LOCKS_DIR: &str = ".agent-kit/locks";

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PROMPT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-").expect("constant regex pattern is valid"));

/// Resolved paths of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    project_root: PathBuf,
    configs_dir: PathBuf,
    tools_file: PathBuf,
}

impl ProjectLayout {
    /// `configs_dir` and `tools_file` are relative to `project_root` unless absolute.
    pub fn new(
        project_root: impl Into<PathBuf>,
        configs_dir: impl AsRef<Path>,
        tools_file: impl AsRef<Path>,
    ) -> Self {
        let project_root = project_root.into();
        Self {
            configs_dir: project_root.join(configs_dir),
            tools_file: project_root.join(tools_file),
            project_root,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn configs_dir(&self) -> &Path {
        &self.configs_dir
    }

    pub fn tools_file(&self) -> &Path {
        &self.tools_file
    }

    /// Outside `configs_dir`, which holds only domains.
    pub fn locks_dir(&self) -> PathBuf {
        self.project_root.join(LOCKS_DIR)
    }

    pub fn domain_path(&self, domain: &str) -> PathBuf {
        self.configs_dir.join(domain)
    }

    pub fn prompts_dir(&self, domain: &str) -> PathBuf {
        self.domain_path(domain).join(PROMPTS_DIR)
    }

    pub fn schemas_dir(&self, domain: &str) -> PathBuf {
        self.domain_path(domain).join(SCHEMAS_DIR)
    }

    pub fn agents_yaml(&self, domain: &str) -> PathBuf {
        self.domain_path(domain).join(AGENTS_YAML_FILENAME)
    }

    pub fn prompt_path(&self, domain: &str, number: u32, agent_name: &str) -> PathBuf {
        self.prompts_dir(domain)
            .join(format!("{}.md", prompt_reference(number, agent_name)))
    }

    pub fn schema_path(&self, domain: &str, agent_name: &str) -> PathBuf {
        self.schemas_dir(domain).join(schema_filename(agent_name))
    }

    pub fn services_path(&self, domain: &str, agent_name: &str) -> PathBuf {
        self.domain_path(domain).join(format!("{agent_name}.py"))
    }

    /// `path` relative to the project root, with `/` separators. Paths
    /// outside the root are returned unchanged.
    pub fn relative(&self, path: &Path) -> String {
        let shown = path.strip_prefix(&self.project_root).unwrap_or(path);
        shown
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Create the domain directory, `prompts/`, `schemas/` and a seeded
    /// `agents.yaml`. Existing files are left untouched.
    pub fn ensure_domain_structure(&self, domain: &str) -> CodegenResult<()> {
        for dir in [self.prompts_dir(domain), self.schemas_dir(domain)] {
            fs::create_dir_all(&dir)
                .map_err(|source| CodegenError::DomainStructure { path: dir, source })?;
        }

        let agents_yaml = self.agents_yaml(domain);
        if !agents_yaml.exists() {
            fs::write(&agents_yaml, registry_header(domain)).map_err(|source| {
                CodegenError::DomainStructure {
                    path: agents_yaml.clone(),
                    source,
                }
            })?;
            tracing::debug!(domain, path = %agents_yaml.display(), "Seeded agents.yaml");
        }
        Ok(())
    }

    /// Next free prompt number: highest existing `NN-` prefix plus one, or 0.
    pub fn next_prompt_number(&self, domain: &str) -> CodegenResult<u32> {
        let prompts_dir = self.prompts_dir(domain);
        if !prompts_dir.is_dir() {
            return Ok(0);
        }

        let mut highest: Option<u32> = None;
        for entry in WalkDir::new(&prompts_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !name.ends_with(".md") {
                continue;
            }
            let Some(caps) = PROMPT_NUMBER.captures(name) else {
                continue;
            };
            let number = caps[1]
                .parse::<u32>()
                .map_err(|_| CodegenError::PromptNumberOverflow(domain.to_string()))?;
            highest = highest.max(Some(number));
        }

        match highest {
            None => Ok(0),
            Some(highest) => highest
                .checked_add(1)
                .ok_or_else(|| CodegenError::PromptNumberOverflow(domain.to_string())),
        }
    }
}

/// Contents of a freshly seeded `agents.yaml`.
pub fn registry_header(domain: &str) -> String {
    format!(
        "# {} agent configuration\n# Defines agents for the {domain} domain\n\nagents:\n",
        title_case(domain)
    )
}

/// `"03-joke-agent"`: the prompt reference stored in `agents.yaml`.
pub fn prompt_reference(number: u32, agent_name: &str) -> String {
    format!("{number:02}-{}", file_stem(agent_name))
}

/// `"joke-agent-output.json"`.
pub fn schema_filename(agent_name: &str) -> String {
    format!("{}-output.json", file_stem(agent_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn layout(root: &Path) -> ProjectLayout {
        ProjectLayout::new(root, "agent_configs", "src/tools.py")
    }

    #[test]
    fn test_paths() {
        let layout = layout(Path::new("/work"));
        assert_eq!(
            layout.domain_path("sales"),
            PathBuf::from("/work/agent_configs/sales")
        );
        assert_eq!(
            layout.prompt_path("sales", 3, "lead_scorer"),
            PathBuf::from("/work/agent_configs/sales/prompts/03-lead-scorer.md")
        );
        assert_eq!(
            layout.schema_path("sales", "lead_scorer"),
            PathBuf::from("/work/agent_configs/sales/schemas/lead-scorer-output.json")
        );
        assert_eq!(
            layout.services_path("sales", "lead_scorer"),
            PathBuf::from("/work/agent_configs/sales/lead_scorer.py")
        );
        assert_eq!(layout.tools_file(), Path::new("/work/src/tools.py"));
        assert_eq!(layout.locks_dir(), PathBuf::from("/work/.agent-kit/locks"));
        assert_eq!(
            layout.relative(&layout.agents_yaml("sales")),
            "agent_configs/sales/agents.yaml"
        );
    }

    #[test]
    fn test_prompt_reference_widens_past_99() {
        assert_eq!(prompt_reference(0, "a"), "00-a");
        assert_eq!(prompt_reference(123, "b_c"), "123-b-c");
    }

    #[test]
    fn test_ensure_domain_structure_is_idempotent() {
        let dir = tempdir().expect("Failed to create temp dir");
        let layout = layout(dir.path());

        layout.ensure_domain_structure("test-domain").expect("first call");
        let yaml = layout.agents_yaml("test-domain");
        assert_eq!(
            fs::read_to_string(&yaml).unwrap(),
            "# Test-Domain agent configuration\n# Defines agents for the test-domain domain\n\nagents:\n"
        );

        fs::write(&yaml, "agents:\n  kept:\n").unwrap();
        layout.ensure_domain_structure("test-domain").expect("second call");
        assert_eq!(fs::read_to_string(&yaml).unwrap(), "agents:\n  kept:\n");
        assert!(layout.prompts_dir("test-domain").is_dir());
        assert!(layout.schemas_dir("test-domain").is_dir());
    }

    #[test]
    fn test_ensure_domain_structure_reports_blocked_path() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("agent_configs"), "not a directory").unwrap();

        let err = layout(dir.path())
            .ensure_domain_structure("sales")
            .unwrap_err();
        assert!(matches!(err, CodegenError::DomainStructure { .. }));
    }

    #[test]
    fn test_next_prompt_number() {
        let dir = tempdir().expect("Failed to create temp dir");
        let layout = layout(dir.path());
        assert_eq!(layout.next_prompt_number("sales").unwrap(), 0, "missing dir starts at 0");

        let prompts = layout.prompts_dir("sales");
        fs::create_dir_all(&prompts).unwrap();
        assert_eq!(layout.next_prompt_number("sales").unwrap(), 0, "empty dir starts at 0");

        for name in ["00-welcome.md", "02-lead-scorer.md", "notes.md", "07-draft.txt"] {
            fs::write(prompts.join(name), "x").unwrap();
        }
        fs::create_dir(prompts.join("09-archive.md")).unwrap();

        assert_eq!(layout.next_prompt_number("sales").unwrap(), 3);
    }

    #[test]
    fn test_next_prompt_number_out_of_range() {
        let dir = tempdir().expect("Failed to create temp dir");
        let layout = layout(dir.path());
        let prompts = layout.prompts_dir("sales");
        fs::create_dir_all(&prompts).unwrap();

        fs::write(prompts.join("4294967294-last.md"), "x").unwrap();
        assert_eq!(layout.next_prompt_number("sales").unwrap(), u32::MAX);

        fs::write(prompts.join("4294967295-full.md"), "x").unwrap();
        assert!(matches!(
            layout.next_prompt_number("sales").unwrap_err(),
            CodegenError::PromptNumberOverflow(ref domain) if domain == "sales"
        ));

        fs::remove_file(prompts.join("4294967295-full.md")).unwrap();
        fs::write(prompts.join("99999999999-huge.md"), "x").unwrap();
        assert!(matches!(
            layout.next_prompt_number("sales").unwrap_err(),
            CodegenError::PromptNumberOverflow(_)
        ));
    }
}
