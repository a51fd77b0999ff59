//! Wave dispatch with bounded concurrency.

use std::path::PathBuf;

use colored::*;
use tokio::task::JoinSet;

use crate::colors::get_package_color;
use crate::execution::command::{run_shell_command, CommandFailure};
use crate::manifest::Package;

/// Default child-process budget: half the logical CPUs, never fewer than two.
pub fn default_concurrency() -> usize {
    ((num_cpus::get() as f64 / 2.0).round() as usize).max(2)
}

/// One package whose command failed, with everything captured about why.
#[derive(Debug)]
pub struct FailedPackage {
    pub package: String,
    pub package_dir: PathBuf,
    pub failure: CommandFailure,
}

/// Run one wave of ready packages.
///
/// The wave is split into consecutive chunks of at most `limit` packages;
/// each chunk is spawned concurrently and fully settled before the next
/// chunk starts. A failing package is logged and recorded but never cancels
/// its siblings or later chunks, and no failure escapes this function.
pub async fn dispatch_wave(
    wave: &[Package],
    command: &str,
    args: &[String],
    limit: usize,
    failures: &mut Vec<FailedPackage>,
) {
    for chunk in wave.chunks(limit.max(1)) {
        let mut join_set = JoinSet::new();

        for package in chunk.iter().cloned() {
            let command = command.to_string();
            let args = args.to_vec();
            join_set.spawn(async move {
                let result = run_shell_command(&command, &args, &package.package_dir).await;
                (package, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((package, Ok(_))) => {
                    let color = get_package_color(&package.name);
                    println!(
                        "{} {}",
                        "✓".green().bold(),
                        format!("Completed for {}", package.name).color(color)
                    );
                }
                Ok((package, Err(failure))) => {
                    log_failure(&package, &failure);
                    failures.push(FailedPackage {
                        package: package.name,
                        package_dir: package.package_dir,
                        failure,
                    });
                }
                Err(join_error) => {
                    // A panicked task carries no package to attribute the
                    // failure to; surface it and keep settling the chunk.
                    eprintln!(
                        "{} {}",
                        "✗".red().bold(),
                        format!("Command task failed to complete: {}", join_error)
                    );
                }
            }
        }
    }
}

fn log_failure(package: &Package, failure: &CommandFailure) {
    let color = get_package_color(&package.name);
    println!(
        "{} {}",
        "✗".red().bold(),
        format!("Failed in {}", package.name).color(color)
    );
    match failure {
        CommandFailure::Exit {
            stdout,
            stderr,
            code,
        } => {
            println!("  {} {}", "exit code:".bright_black(), code);
            if !stdout.is_empty() {
                println!("{}", stdout.trim_end().dimmed());
            }
            if !stderr.is_empty() {
                println!("{}", stderr.trim_end().red());
            }
        }
        CommandFailure::Spawn(err) => {
            println!("  {} {}", "spawn error:".bright_black(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::{Duration, Instant};

    fn make_packages(root: &Path, names: &[&str]) -> Vec<Package> {
        names
            .iter()
            .map(|name| {
                let package_dir = root.join(name);
                std::fs::create_dir_all(&package_dir).unwrap();
                Package {
                    name: name.to_string(),
                    manifest_path: package_dir.join("package.json"),
                    package_dir,
                    dependencies: Vec::new(),
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn failures_are_recorded_without_cancelling_siblings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wave = make_packages(temp_dir.path(), &["a", "b", "c"]);
        // Fail only in b.
        std::fs::write(temp_dir.path().join("b/fail"), "").unwrap();

        let mut failures = Vec::new();
        dispatch_wave(
            &wave,
            "touch ran.txt && [ ! -f fail ]",
            &[],
            2,
            &mut failures,
        )
        .await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].package, "b");
        for name in ["a", "b", "c"] {
            assert!(
                temp_dir.path().join(name).join("ran.txt").exists(),
                "{name} should have run"
            );
        }
    }

    #[tokio::test]
    async fn spawn_errors_travel_the_failure_channel() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut wave = make_packages(temp_dir.path(), &["a"]);
        wave[0].package_dir = temp_dir.path().join("missing");

        let mut failures = Vec::new();
        dispatch_wave(&wave, "true", &[], 2, &mut failures).await;

        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].failure, CommandFailure::Spawn(_)));
    }

    #[tokio::test]
    async fn chunks_are_a_barrier() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wave = make_packages(temp_dir.path(), &["a", "b"]);

        let mut failures = Vec::new();
        let start = Instant::now();
        dispatch_wave(&wave, "sleep 0.2", &[], 1, &mut failures).await;
        let elapsed = start.elapsed();

        // limit 1 forces the two sleeps into consecutive chunks.
        assert!(failures.is_empty());
        assert!(elapsed >= Duration::from_millis(350), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn a_chunk_runs_concurrently() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wave = make_packages(temp_dir.path(), &["a", "b"]);

        let mut failures = Vec::new();
        let start = Instant::now();
        dispatch_wave(&wave, "sleep 0.2", &[], 2, &mut failures).await;
        let elapsed = start.elapsed();

        assert!(failures.is_empty());
        assert!(elapsed < Duration::from_millis(390), "elapsed {elapsed:?}");
    }
}
