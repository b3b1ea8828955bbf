//! Command handlers.

use ak_core::codegen::layout::schema_filename;
use ak_core::codegen::registry::create_agent_yaml_entry;
use ak_core::codegen::schema::{create_output_schema, render_schema};
use ak_core::codegen::{
    parse_tool_list, validate_agent_name, validate_domain_name, AgentBuilder, PromptSynthesizer,
};
use ak_core::config::AppConfig;
use ak_protocol::{AgentConfigRequest, AgentDefinition, AgentsFile, CreationReport, SchemaFields, ToolResolution};
use color_eyre::eyre::{Result, WrapErr};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::fs;

use crate::cli::{Commands, ConfigArgs, NameKindArg};

pub async fn run(command: Commands, config: AppConfig, json: bool) -> Result<()> {
    match command {
        Commands::ValidateName { name, kind } => validate_name(&name, kind, json),
        Commands::Validate(args) => {
            let builder = AgentBuilder::new(&config);
            let request = config_request(args)?;
            let resolution = builder.validate_agent_config(&request).await?;
            print_resolution(&request, &resolution, json)
        }
        Commands::PromptNumber { domain } => {
            let number = AgentBuilder::new(&config).prompt_number(&domain)?;
            if json {
                print_json(&json!({ "domain": domain, "prompt_number": number }))
            } else {
                println!("{number:02}");
                Ok(())
            }
        }
        Commands::InitDomain { domain } => {
            let builder = AgentBuilder::new(&config);
            builder.ensure_domain_structure(&domain)?;
            let path = builder.layout().relative(&builder.layout().domain_path(&domain));
            if json {
                print_json(&json!({ "domain": domain, "path": path }))
            } else {
                println!("{} Domain '{}' ready at {}", "✓".green(), domain.bold(), path);
                Ok(())
            }
        }
        Commands::Prompt {
            agent,
            purpose,
            instructions,
        } => {
            validate_agent_name(&agent)?;
            let prompt = PromptSynthesizer::from_config(&config)
                .create_agent_prompt_content(&agent, &purpose, instructions.as_deref())
                .await;
            if json {
                print_json(&json!({ "agent_name": agent, "prompt": prompt }))
            } else {
                println!("{prompt}");
                Ok(())
            }
        }
        Commands::YamlEntry {
            agent,
            number,
            tools,
            batch,
            is_default,
            schema,
        } => {
            validate_agent_name(&agent)?;
            let entry = create_agent_yaml_entry(
                &agent,
                number,
                &parse_tool_list(&tools),
                batch,
                is_default,
                schema.as_deref(),
            );
            if json {
                print_json(&json!({ "agent_name": agent, "entry": entry }))
            } else {
                print!("{entry}");
                Ok(())
            }
        }
        Commands::SchemaPreview { agent, fields } => {
            validate_agent_name(&agent)?;
            let fields = fields.as_deref().map(parse_fields).transpose()?;
            let schema = create_output_schema(
                &agent,
                fields.as_ref(),
                &config.generator.schema_id_prefix,
            );
            if !json {
                eprintln!("{}", format!("# {}", schema_filename(&agent)).dimmed());
            }
            print!("{}", render_schema(&schema)?);
            Ok(())
        }
        Commands::Create {
            domain,
            agent,
            purpose,
            tools,
            instructions,
            batch,
            is_default,
            schema_fields,
        } => {
            let definition = AgentDefinition {
                domain,
                agent_name: agent,
                purpose,
                tools: parse_tool_list(&tools),
                instructions,
                batch_enabled: batch,
                is_default,
                output_schema_fields: schema_fields.as_deref().map(parse_fields).transpose()?,
            };
            let report = AgentBuilder::new(&config).create_agent(definition).await?;
            print_report(&report, json)
        }
        Commands::CreateConfig(args) => {
            let request = config_request(args)?;
            let report = AgentBuilder::new(&config)
                .create_agent_config(request)
                .await?;
            print_report(&report, json)
        }
        Commands::Services {
            domain,
            agent,
            batch,
        } => {
            let builder = AgentBuilder::new(&config);
            let path = builder.write_services_file(&domain, &agent, batch)?;
            let shown = builder.layout().relative(&path);
            if json {
                print_json(&json!({ "domain": domain, "agent_name": agent, "path": shown }))
            } else {
                println!("{} Wrote {}", "✓".green(), shown);
                Ok(())
            }
        }
        Commands::List { domain } => {
            let agents = AgentBuilder::new(&config).list_agents(&domain)?;
            if json {
                print_json(&agents)
            } else {
                print_agents(&domain, &agents);
                Ok(())
            }
        }
        Commands::Schema { domain, agent } => {
            let schema = AgentBuilder::new(&config).schema_for_agent(&domain, &agent)?;
            print!("{}", render_schema(&schema)?);
            Ok(())
        }
    }
}

fn validate_name(name: &str, kind: NameKindArg, json: bool) -> Result<()> {
    let (label, result) = match kind {
        NameKindArg::Agent => ("agent", validate_agent_name(name)),
        NameKindArg::Domain => ("domain", validate_domain_name(name)),
    };
    result?;
    if json {
        print_json(&json!({ "name": name, "kind": label, "valid": true }))
    } else {
        println!("{} '{}' is a valid {} name", "✓".green(), name, label);
        Ok(())
    }
}

fn config_request(args: ConfigArgs) -> Result<AgentConfigRequest> {
    let prompt = match (args.prompt, args.prompt_file) {
        (Some(prompt), _) => prompt,
        (None, Some(path)) => fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read prompt file {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut request =
        AgentConfigRequest::new(args.domain, args.agent, prompt, parse_tool_list(&args.tools))
            .with_batch_enabled(args.batch)
            .with_default(args.is_default);
    if let Some(fields) = args.schema_fields.as_deref() {
        request = request.with_schema_fields(parse_fields(fields)?);
    }
    Ok(request)
}

fn parse_fields(text: &str) -> Result<SchemaFields> {
    serde_json::from_str(text).wrap_err("Schema fields must be a JSON object")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_report(report: &CreationReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    println!("{} {}", "✓".green(), report);
    if !report.created_tools.is_empty() {
        println!(
            "{} Generated tool stubs: {}",
            "!".yellow(),
            report.created_tools.join(", ").yellow()
        );
    }
    Ok(())
}

fn print_resolution(
    request: &AgentConfigRequest,
    resolution: &ToolResolution,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(resolution);
    }
    println!(
        "{} Configuration for '{}' in domain '{}' is valid",
        "✓".green(),
        request.agent_name,
        request.domain
    );
    if !resolution.created.is_empty() {
        println!("  Generated tools: {}", resolution.created.join(", ").yellow());
    }
    if !resolution.existing.is_empty() {
        println!("  Existing tools:  {}", resolution.existing.join(", "));
    }
    Ok(())
}

fn print_agents(domain: &str, agents: &AgentsFile) {
    if agents.agents.is_empty() {
        println!("No agents registered in domain '{domain}'.");
        return;
    }
    println!("Agents in domain '{}':", domain.bold());
    for (name, registration) in &agents.agents {
        let mut flags = Vec::new();
        if registration.is_default {
            flags.push("default".green().to_string());
        }
        if registration.batch_enabled {
            flags.push("batch".cyan().to_string());
        }
        if registration.output_schema.is_some() {
            flags.push("schema".magenta().to_string());
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  {}{} {}", name.bold(), flags, registration.prompt.dimmed());
        println!("    tools: {}", registration.tools.join(", "));
    }
}
