use anyhow::Result;
use colored::*;
use convoy_core::execution::CommandFailure;
use convoy_core::workspace_manager::{RunOptions, WorkspaceManager};

pub async fn execute(
    manager: &WorkspaceManager,
    command: &str,
    args: &[String],
    exempt: Option<String>,
    concurrency: Option<usize>,
) -> Result<()> {
    println!("{} {}", "Running".bold(), command.cyan());
    println!();

    let options = RunOptions {
        exempt,
        concurrency,
    };
    let report = manager
        .run_command(command, args, &options)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if report.is_success() {
        println!();
        println!(
            "{} {}",
            "✓".green().bold(),
            "All packages completed successfully!".green().bold()
        );
        return Ok(());
    }

    println!();
    println!(
        "{} {}",
        "✗".red().bold(),
        format!("{} package(s) failed", report.failures.len())
            .red()
            .bold()
    );

    for failed in &report.failures {
        println!();
        println!(
            "{} {} {}",
            "Package:".bold(),
            failed.package,
            format!("({})", failed.package_dir.display()).bright_black()
        );
        match &failed.failure {
            CommandFailure::Exit {
                stdout,
                stderr,
                code,
            } => {
                println!("{} {}", "Exit code:".bold(), code);
                if !stdout.is_empty() {
                    println!("{}", "--- stdout ---".bright_black());
                    println!("{}", stdout.trim_end());
                }
                if !stderr.is_empty() {
                    println!("{}", "--- stderr ---".bright_black());
                    println!("{}", stderr.trim_end());
                }
            }
            CommandFailure::Spawn(err) => {
                println!("{} {}", "Spawn error:".bold(), err);
            }
        }
    }

    anyhow::bail!("{} package(s) failed", report.failures.len())
}
