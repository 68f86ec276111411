//! CLI argument definitions for Flowsmith.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use flowsmith_agent::Complexity;

/// Flowsmith -- n8n workflows from plain-language descriptions.
#[derive(Parser)]
#[command(
    name = "flowsmith",
    version,
    about = "Flowsmith -- n8n workflows from plain-language descriptions",
    long_about = "Generates n8n workflows from a free-text process description with an LLM \
                  (or offline templates), validates them against a node catalogue and \
                  creates them on an n8n server."
)]
pub struct Cli {
    /// Configuration file (defaults to config/default.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a workflow from a description and create it on the server.
    Create {
        /// The process to automate, in plain language.
        description: String,

        /// Requested complexity: simple, medium or complex (Russian labels
        /// are accepted too).
        #[arg(long, short, default_value = "medium")]
        complexity: Complexity,

        /// Activate the workflow after creating it.
        #[arg(long, short)]
        activate: bool,

        /// Render a built-in template instead of calling the LLM.
        #[arg(long, short)]
        mock: bool,
    },

    /// Show example descriptions and tips for writing them.
    Examples,

    /// List the node catalogue.
    Nodes {
        /// Only show nodes of this category.
        #[arg(long)]
        category: Option<CategoryArg>,

        /// Print the catalogue as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the pattern and node categories a description maps to.
    Suggest {
        description: String,
    },

    /// Validate and normalize a workflow JSON file.
    Validate {
        /// Workflow JSON to check.
        file: PathBuf,

        /// Write the normalized workflow here.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Check connectivity and authentication against the n8n server.
    Status,

    /// List workflows stored on the server.
    List,

    /// Activate a stored workflow.
    Activate {
        id: String,
    },

    /// Execute a stored workflow.
    Execute {
        id: String,

        /// JSON input passed to the workflow.
        #[arg(long)]
        data: Option<String>,
    },
}

/// Node category filter for `nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Trigger,
    Regular,
}
