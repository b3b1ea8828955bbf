//! Sample projects for integration tests.

use ak_core::codegen::{AgentBuilder, PromptSynthesizer};
use ak_core::config::AppConfig;
use ak_protocol::AgentConfigRequest;
use tempfile::TempDir;

/// A tool file with one custom tool and the registration call.
#[allow(dead_code)]
pub const TOOLS_PY: &str = r#"from autobots_devtools_shared_lib.dynagent import ToolRuntime, register_usecase_tools
from langchain.tools import tool


@tool
def tell_joke(runtime: ToolRuntime[None, Dynagent], topic: str) -> str:
    """Tell a joke about a topic."""
    return f"A joke about {topic}"


def register_concierge_tools() -> None:
    """Register all concierge tools."""
    register_usecase_tools(
        [
            tell_joke,
        ]
    )
"#;

#[allow(dead_code)]
pub const CONCIERGE_AGENTS_YAML: &str = r#"# Concierge agent configuration
# Defines agents for the concierge domain

agents:
  joke_agent:
    prompt: "00-joke-agent"
    batch_enabled: false
    is_default: true
    tools:
      - "tell_joke"
      - "handoff"
"#;

/// Create a temporary project with:
/// - `src/tools.py` holding `tell_joke`
/// - `agent_configs/concierge/` with `joke_agent` registered as prompt 00
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join("src"))?;
    std::fs::write(root.join("src/tools.py"), TOOLS_PY)?;

    let concierge = root.join("agent_configs/concierge");
    std::fs::create_dir_all(concierge.join("prompts"))?;
    std::fs::create_dir_all(concierge.join("schemas"))?;
    std::fs::write(concierge.join("agents.yaml"), CONCIERGE_AGENTS_YAML)?;
    std::fs::write(
        concierge.join("prompts/00-joke-agent.md"),
        "# Joke Agent\n\nTell jokes.\n",
    )?;

    Ok(temp_dir)
}

/// Builder over `project` that never calls a text generation backend.
#[allow(dead_code)]
pub fn template_builder(project: &TempDir) -> AgentBuilder {
    AgentBuilder::new(&AppConfig::new(project.path()))
        .with_synthesizer(PromptSynthesizer::template_only())
}

#[allow(dead_code)]
pub fn tools(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[allow(dead_code)]
pub fn request(domain: &str, agent: &str, tool_names: &[&str]) -> AgentConfigRequest {
    AgentConfigRequest::new(
        domain,
        agent,
        format!("# {agent}\n\nYou are a test agent.\n"),
        tools(tool_names),
    )
}
