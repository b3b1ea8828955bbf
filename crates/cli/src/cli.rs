//! Command-line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agent-kit")]
#[command(about = "Generate agent configurations: prompts, registrations, schemas and services")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root all configured paths resolve against
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/agent-kit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check an agent or domain name
    ValidateName {
        name: String,

        #[arg(long, value_enum, default_value = "agent")]
        kind: NameKindArg,
    },

    /// Validate an agent configuration without creating it
    ///
    /// Missing custom tools are still generated in the tool file.
    Validate(ConfigArgs),

    /// Print the next prompt number of a domain
    PromptNumber { domain: String },

    /// Create a domain's directories and agents.yaml
    InitDomain { domain: String },

    /// Synthesize a prompt from a purpose and print it
    Prompt {
        #[arg(long)]
        agent: String,

        #[arg(long)]
        purpose: String,

        #[arg(long)]
        instructions: Option<String>,
    },

    /// Print the agents.yaml entry for an agent
    YamlEntry {
        #[arg(long)]
        agent: String,

        /// Prompt number used in the prompt reference
        #[arg(long)]
        number: u32,

        /// Comma-separated tool names
        #[arg(long)]
        tools: String,

        #[arg(long)]
        batch: bool,

        #[arg(long = "default")]
        is_default: bool,

        /// Schema filename to reference
        #[arg(long)]
        schema: Option<String>,
    },

    /// Print the output schema for an agent
    SchemaPreview {
        #[arg(long)]
        agent: String,

        /// Field map as JSON, e.g. '{"summary": "string"}'
        #[arg(long)]
        fields: Option<String>,
    },

    /// Create an agent from its purpose
    Create {
        #[arg(long)]
        domain: String,

        #[arg(long)]
        agent: String,

        #[arg(long)]
        purpose: String,

        /// Comma-separated tool names
        #[arg(long)]
        tools: String,

        #[arg(long)]
        instructions: Option<String>,

        #[arg(long)]
        batch: bool,

        #[arg(long = "default")]
        is_default: bool,

        /// Output schema fields as JSON
        #[arg(long)]
        schema_fields: Option<String>,
    },

    /// Create an agent from a ready prompt
    CreateConfig(ConfigArgs),

    /// Write (or overwrite) an agent's service file
    Services {
        #[arg(long)]
        domain: String,

        #[arg(long)]
        agent: String,

        #[arg(long)]
        batch: bool,
    },

    /// List the agents registered in a domain
    List { domain: String },

    /// Print the output schema of a registered agent
    Schema { domain: String, agent: String },
}

/// A full agent configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long)]
    pub domain: String,

    #[arg(long)]
    pub agent: String,

    /// Prompt text
    #[arg(long, conflicts_with = "prompt_file", required_unless_present = "prompt_file")]
    pub prompt: Option<String>,

    /// File holding the prompt text
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Comma-separated tool names
    #[arg(long)]
    pub tools: String,

    #[arg(long)]
    pub batch: bool,

    #[arg(long = "default")]
    pub is_default: bool,

    /// Output schema fields as JSON
    #[arg(long)]
    pub schema_fields: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKindArg {
    Agent,
    Domain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["agent-kit", "list", "sales", "--root", "/tmp/p", "--json"])
            .unwrap();
        assert_eq!(cli.root, PathBuf::from("/tmp/p"));
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::List { ref domain } if domain == "sales"));
    }

    #[test]
    fn test_root_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["agent-kit", "prompt-number", "sales"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_create_config_requires_a_prompt() {
        let missing = Cli::try_parse_from([
            "agent-kit",
            "create-config",
            "--domain",
            "sales",
            "--agent",
            "a",
            "--tools",
            "handoff",
        ]);
        assert!(missing.is_err());

        let both = Cli::try_parse_from([
            "agent-kit",
            "create-config",
            "--domain",
            "sales",
            "--agent",
            "a",
            "--tools",
            "handoff",
            "--prompt",
            "x",
            "--prompt-file",
            "p.md",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn test_validate_name_kind() {
        let cli =
            Cli::try_parse_from(["agent-kit", "validate-name", "sales", "--kind", "domain"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::ValidateName { kind: NameKindArg::Domain, .. }
        ));
    }
}
