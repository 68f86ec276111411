//! CLI entry point for Flowsmith.
//!
//! This binary provides the `flowsmith` command: workflow creation from a
//! description, catalogue and pattern inspection, offline validation, and
//! direct operations against the n8n server.

mod cli;
mod config;
mod helpers;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};

use flowsmith_adapters::{LazyN8nClient, N8nClient};
use flowsmith_agent::{
    CreateOptions, LlmClient, LlmGenerator, Orchestrator, ResultStore, TemplateGenerator,
    WorkflowGenerator,
};
use flowsmith_catalog::{NodeCatalog, NodeCategory, PatternMatcher, check_description, required_categories};
use flowsmith_workflow::validate;

use crate::cli::{CategoryArg, Cli, Commands};
use crate::config::FlowsmithConfig;
use crate::helpers::{
    init_tracing, print_connection_report, print_corrections, print_examples, print_failure,
    print_nodes, print_report, print_suggestion,
};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_tracing(if cli.verbose { "debug" } else { "info" });

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = || FlowsmithConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Create {
            ref description,
            complexity,
            activate,
            mock,
        } => {
            cmd_create(
                &config()?,
                description,
                CreateOptions {
                    complexity,
                    auto_activate: activate,
                },
                mock,
            )
            .await
        }
        Commands::Examples => {
            print_examples();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Nodes { category, json } => cmd_nodes(category, json),
        Commands::Suggest { ref description } => {
            cmd_suggest(description);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate {
            ref file,
            ref output,
        } => cmd_validate(file, output.as_deref()),
        Commands::Status => cmd_status(&config()?).await,
        Commands::List => cmd_list(&config()?).await,
        Commands::Activate { ref id } => cmd_activate(&config()?, id).await,
        Commands::Execute { ref id, ref data } => {
            cmd_execute(&config()?, id, data.as_deref()).await
        }
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// An n8n client authenticated with the configured credentials.
async fn connect(config: &FlowsmithConfig) -> Result<N8nClient> {
    let mut client = N8nClient::with_timeout(&config.n8n.base_url, config.n8n_timeout())
        .context("failed to build n8n client")?;
    client
        .authenticate(&config.n8n_credentials())
        .await
        .with_context(|| format!("failed to authenticate with n8n at {}", config.n8n.base_url))?;
    Ok(client)
}

fn generator(
    config: &FlowsmithConfig,
    catalog: Arc<NodeCatalog>,
    force_template: bool,
) -> Result<Arc<dyn WorkflowGenerator>> {
    if force_template {
        info!("template mode requested");
        return Ok(Arc::new(TemplateGenerator::new(catalog)));
    }
    match config.llm_client_config()? {
        Some(llm) => {
            let client = LlmClient::new(llm).context("failed to build LLM client")?;
            let mut generator = LlmGenerator::new(client, catalog);
            if let Some(temperature) = config.llm.temperature {
                generator = generator.with_temperature(temperature);
            }
            Ok(Arc::new(generator))
        }
        None => {
            warn!("no LLM API key configured, falling back to template generation");
            Ok(Arc::new(TemplateGenerator::new(catalog)))
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn cmd_create(
    config: &FlowsmithConfig,
    description: &str,
    options: CreateOptions,
    mock: bool,
) -> Result<ExitCode> {
    let check = check_description(description);
    if !check.valid {
        bail!("{}", check.message);
    }

    let catalog = Arc::new(NodeCatalog::builtin());
    let generator = generator(config, catalog.clone(), mock)?;
    // Connects when the workflow is created, so server problems are
    // reported as a creation failure.
    let remote = LazyN8nClient::new(
        &config.n8n.base_url,
        config.n8n_timeout(),
        config.n8n_credentials(),
    );

    println!("Description: {description}");
    println!("Complexity:  {}", options.complexity.as_str());
    println!("Activate:    {}", if options.auto_activate { "yes" } else { "no" });
    println!("Generator:   {}", generator.name());

    let mut orchestrator = Orchestrator::new(catalog, generator, Arc::new(remote));
    if config.results.enabled {
        orchestrator = orchestrator.with_store(ResultStore::new(&config.results.dir));
    }

    match orchestrator.create_from_description(description, options).await {
        Ok(report) => {
            print_report(&report, &config.n8n.base_url);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            print_failure(&failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_nodes(category: Option<CategoryArg>, json: bool) -> Result<ExitCode> {
    let catalog = NodeCatalog::builtin();
    let nodes: Vec<_> = match category {
        Some(CategoryArg::Trigger) => catalog.by_category(NodeCategory::Trigger),
        Some(CategoryArg::Regular) => catalog.by_category(NodeCategory::Regular),
        None => catalog.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else {
        print_nodes(nodes);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_suggest(description: &str) {
    let matcher = PatternMatcher::builtin();
    let categories = required_categories(description);
    let labels: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    print_suggestion(
        matcher.suggest(description),
        &labels,
        &check_description(description),
    );
}

fn cmd_validate(file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not JSON", file.display()))?;

    let validated = validate(&raw, &NodeCatalog::builtin());
    if validated.is_clean() {
        println!("{}: no corrections needed", file.display());
    } else {
        print_corrections(&validated.corrections);
    }

    if let Some(output) = output {
        let body = serde_json::to_string_pretty(&validated.document)?;
        std::fs::write(output, body)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("normalized workflow written to {}", output.display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_status(config: &FlowsmithConfig) -> Result<ExitCode> {
    let mut client = N8nClient::with_timeout(&config.n8n.base_url, config.n8n_timeout())
        .context("failed to build n8n client")?;
    let credentials = config.n8n_credentials();
    if credentials.is_usable() {
        if let Err(e) = client.authenticate(&credentials).await {
            warn!(error = %e, "authentication failed, checking unauthenticated access only");
        }
    } else {
        warn!("no n8n credentials configured");
    }

    let report = client.test_connection().await;
    print_connection_report(&report);
    Ok(if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn cmd_list(config: &FlowsmithConfig) -> Result<ExitCode> {
    let client = connect(config).await?;
    let workflows = client.list_workflows().await?;
    if workflows.is_empty() {
        println!("no workflows");
    }
    for wf in &workflows {
        println!(
            "{:<20} {:<8} {}",
            wf.id,
            if wf.active { "active" } else { "inactive" },
            wf.name
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_activate(config: &FlowsmithConfig, id: &str) -> Result<ExitCode> {
    let client = connect(config).await?;
    client
        .activate_workflow(id)
        .await
        .with_context(|| format!("failed to activate workflow {id}"))?;
    println!("workflow {id} activated: {}", client.workflow_url(id));
    Ok(ExitCode::SUCCESS)
}

async fn cmd_execute(config: &FlowsmithConfig, id: &str, data: Option<&str>) -> Result<ExitCode> {
    let data = data
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--data is not valid JSON")?;
    let client = connect(config).await?;
    let execution = client
        .execute_workflow(id, data)
        .await
        .with_context(|| format!("failed to execute workflow {id}"))?;
    println!("{}", serde_json::to_string_pretty(&execution)?);
    Ok(ExitCode::SUCCESS)
}
