use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use convoy_core::workspace_manager::WorkspaceManager;

mod commands;

/// Convoy - run a command across every package in a workspace
#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "Run a command across workspace packages in dependency order")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command in every package directory
    Run {
        /// The command to run
        command: String,
        /// Arguments passed through to the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Dependency exemptions: "*" or a comma-separated list of names
        #[arg(long)]
        exempt: Option<String>,
        /// Concurrent child-process budget per wave
        #[arg(long)]
        concurrency: Option<usize>,
        /// Explicit manifest paths, bypassing discovery
        #[arg(long = "manifest")]
        manifests: Vec<PathBuf>,
    },
    /// Show the execution waves without running anything
    Plan {
        /// Dependency exemptions: "*" or a comma-separated list of names
        #[arg(long)]
        exempt: Option<String>,
    },
    /// List packages in the workspace
    List,
    /// Show the package dependency graph
    Graph,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::Run {
            command,
            args,
            exempt,
            concurrency,
            manifests,
        } => {
            let manager = build_manager(cli.workspace, &manifests)?;
            commands::run::execute(&manager, &command, &args, exempt, concurrency).await
        }
        Commands::Plan { exempt } => {
            let manager = build_manager(cli.workspace, &[])?;
            commands::plan::execute(&manager, exempt.as_deref())
        }
        Commands::List => {
            let manager = build_manager(cli.workspace, &[])?;
            commands::list::execute(&manager)
        }
        Commands::Graph => {
            let manager = build_manager(cli.workspace, &[])?;
            commands::graph::execute(&manager)
        }
    }
}

fn build_manager(workspace: PathBuf, manifests: &[PathBuf]) -> Result<WorkspaceManager> {
    let manager = if manifests.is_empty() {
        WorkspaceManager::new(workspace)
    } else {
        WorkspaceManager::from_manifest_paths(workspace, manifests)
    };

    manager.map_err(|e| anyhow::anyhow!("Failed to initialize workspace: {}", e))
}
