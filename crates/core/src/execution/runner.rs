//! Dependency-ordered command runner.
//!
//! Drives rounds of "ready frontier -> dispatch -> retire" until every
//! package has run or no progress is possible. A wave is a barrier: nothing
//! from a later round starts before every package of the current round has
//! settled, so a package can never start while one of its dependencies is
//! still mid-flight.

use std::collections::HashSet;

use colored::*;

use crate::execution::batch::{dispatch_wave, FailedPackage};
use crate::execution::dependencies::{
    build_wait_map, ready_frontier, residual_sets, retire_wave, Exemptions,
};
use crate::manifest::Package;
use crate::types::{ConvoyError, ConvoyResult};

/// Settings for one run. The concurrency budget is fixed for the whole run.
#[derive(Debug)]
pub struct RunnerConfig {
    pub exemptions: Exemptions,
    pub concurrency: usize,
}

/// Outcome of a run that drained the workspace.
#[derive(Debug)]
pub struct RunReport {
    /// Package names per wave, in dispatch order.
    pub waves: Vec<Vec<String>>,
    /// Per-package failures, in settle order. Empty means full success.
    pub failures: Vec<FailedPackage>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs one command across a package universe in dependency order.
pub struct CommandRunner<'a> {
    packages: &'a [Package],
    config: RunnerConfig,
}

impl<'a> CommandRunner<'a> {
    pub fn new(packages: &'a [Package], config: RunnerConfig) -> Self {
        Self { packages, config }
    }

    /// Run `command args...` in every package directory.
    ///
    /// Per-package failures are collected and never stop the run; a failed
    /// package's dependents still execute in later waves. Only a dependency
    /// deadlock aborts, and it aborts before any package of the stuck set
    /// has been dispatched.
    pub async fn run(&self, command: &str, args: &[String]) -> ConvoyResult<RunReport> {
        let mut waits = build_wait_map(self.packages, &self.config.exemptions);
        let mut remaining: Vec<Package> = self.packages.to_vec();
        let mut failures = Vec::new();
        let mut waves: Vec<Vec<String>> = Vec::new();

        while !remaining.is_empty() {
            let frontier = ready_frontier(&remaining, waits.as_ref());

            if frontier.is_empty() {
                let residual = match waits.as_ref() {
                    Some(waits) => residual_sets(&remaining, waits),
                    // Unreachable: without a wait map every package is ready.
                    None => Vec::new(),
                };
                return Err(ConvoyError::Deadlock { residual });
            }

            println!(
                "{} {}",
                format!("── Wave {} ──", waves.len() + 1).bold(),
                frontier.join(", ").cyan()
            );

            let frontier_set: HashSet<&str> = frontier.iter().map(String::as_str).collect();
            let wave_packages: Vec<Package> = remaining
                .iter()
                .filter(|p| frontier_set.contains(p.name.as_str()))
                .cloned()
                .collect();

            dispatch_wave(
                &wave_packages,
                command,
                args,
                self.config.concurrency,
                &mut failures,
            )
            .await;

            if let Some(waits) = waits.as_mut() {
                retire_wave(waits, &frontier);
            }
            remaining.retain(|p| !frontier_set.contains(p.name.as_str()));
            waves.push(frontier);
        }

        Ok(RunReport { waves, failures })
    }
}
