//! Shared helper functions used across CLI subcommands.
//!
//! Tracing initialization and terminal output.

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use flowsmith_adapters::{CheckStatus, ConnectionReport};
use flowsmith_agent::{ActivationOutcome, CreationReport, PipelineFailure};
use flowsmith_catalog::{DescriptionCheck, NodeDescriptor, WorkflowPattern};
use flowsmith_workflow::{Correction, WorkflowDocument};

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Examples
// ---------------------------------------------------------------------------

/// An example description with the workflow shape it typically produces.
pub struct Example {
    pub description: &'static str,
    pub complexity: &'static str,
    pub result: &'static str,
}

pub const EXAMPLES: &[Example] = &[
    Example {
        description: "При получении webhook отправить уведомление в Slack с информацией о событии",
        complexity: "simple",
        result: "Webhook -> Set -> Slack",
    },
    Example {
        description: "Каждый час получать данные о погоде через API и сохранять в Google Sheets",
        complexity: "medium",
        result: "Schedule Trigger -> HTTP Request -> Google Sheets",
    },
    Example {
        description: "При получении webhook с заказом, если сумма больше 1000, уведомить в Slack, иначе отправить письмо",
        complexity: "complex",
        result: "Webhook -> IF -> Slack / Gmail",
    },
];

pub const TIPS: &[&str] = &[
    "name the trigger (webhook, schedule, email)",
    "describe the actions (fetch, transform, send)",
    "state the destination (Slack, Google Sheets, email)",
    "keep the wording plain; one process per description",
];

pub fn print_examples() {
    println!("Example descriptions");
    println!("====================");
    for (i, example) in EXAMPLES.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, example.description);
        println!("   complexity: {}", example.complexity);
        println!("   result:     {}", example.result);
    }
    println!();
    println!("Tips:");
    for tip in TIPS {
        println!("  - {tip}");
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Public URL of the first node when it is a webhook trigger.
pub fn webhook_url(base_url: &str, document: &WorkflowDocument) -> Option<String> {
    let first = document.nodes.first()?;
    if !first.node_type.contains("webhook") {
        return None;
    }
    let path = first
        .parameters
        .get("path")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .unwrap_or("webhook");
    Some(format!(
        "{}/webhook/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

pub fn print_report(report: &CreationReport, base_url: &str) {
    let wf = &report.workflow;
    println!();
    println!("Workflow created");
    println!("  name:        {}", wf.name);
    println!("  id:          {}", wf.id);
    println!("  url:         {}", wf.url);
    println!("  nodes:       {}", wf.nodes_count);
    println!("  connections: {}", wf.connections_count);
    println!("  active:      {}", if wf.active { "yes" } else { "no" });
    println!("  generator:   {}", report.generator);
    if let Some(pattern) = &report.pattern {
        println!("  pattern:     {pattern}");
    }
    if let Some(ActivationOutcome::Failed { kind, message }) = &report.activation {
        println!("  activation failed ({kind}): {message}");
    }
    if !report.corrections.is_empty() {
        println!();
        print_corrections(&report.corrections);
    }
    if let Some(url) = webhook_url(base_url, &report.generated) {
        println!();
        println!("Webhook URL: {url}");
    }
    if let Some(path) = &report.saved_to {
        println!("Report saved to {}", path.display());
    }
}

pub fn print_failure(failure: &PipelineFailure) {
    eprintln!();
    eprintln!("Error: {}", failure.message);
    eprintln!("  stage: {}", failure.stage);
    eprintln!("  kind:  {}", failure.kind);
    if let Some(doc) = &failure.generated {
        eprintln!(
            "  generated workflow `{}` ({} nodes) was not stored",
            doc.name,
            doc.nodes.len()
        );
    }
}

pub fn print_corrections(corrections: &[Correction]) {
    println!("Corrections ({}):", corrections.len());
    for correction in corrections {
        println!("  - {correction}");
    }
}

// ---------------------------------------------------------------------------
// Catalogue and analysis
// ---------------------------------------------------------------------------

pub fn print_nodes<'a>(nodes: impl IntoIterator<Item = &'a NodeDescriptor>) {
    for node in nodes {
        println!("{:<32} {:<8} {}", node.id, node.category.as_str(), node.display_name);
        println!("{:<41} {}", "", node.description);
    }
}

pub fn print_suggestion(
    pattern: Option<&WorkflowPattern>,
    categories: &[&str],
    check: &DescriptionCheck,
) {
    match pattern {
        Some(p) => {
            println!("Pattern:    {} ({})", p.id, p.description);
            println!("Nodes:      {}", p.nodes.join(" -> "));
        }
        None => println!("Pattern:    none matched"),
    }
    println!(
        "Categories: {}",
        if categories.is_empty() {
            "none detected".to_owned()
        } else {
            categories.join(", ")
        }
    );
    println!(
        "Check:      {} - {}",
        if check.valid { "ok" } else { "invalid" },
        check.message
    );
    for suggestion in &check.suggestions {
        println!("  - {suggestion}");
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

pub fn print_connection_report(report: &ConnectionReport) {
    println!("n8n server: {}", report.base_url);
    println!(
        "auth:       {}",
        report.auth_scheme.as_deref().unwrap_or("none")
    );
    for check in &report.checks {
        let mark = match check.status {
            CheckStatus::Passed => "ok  ",
            CheckStatus::Failed => "FAIL",
            CheckStatus::Skipped => "skip",
        };
        println!("  [{mark}] {:<20} {}", check.name, check.detail);
    }
}
