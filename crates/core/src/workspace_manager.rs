//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`], the primary entry point
//! for callers. It encapsulates config loading, manifest discovery, package
//! loading, and command fan-out, so the CLI layer only handles presentation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use convoy_core::workspace_manager::{RunOptions, WorkspaceManager};
//! use std::path::PathBuf;
//!
//! # async fn example() -> convoy_core::types::ConvoyResult<()> {
//! let manager = WorkspaceManager::new(PathBuf::from("."))?;
//!
//! let listing = manager.list_packages();
//! let report = manager
//!     .run_command("npm", &["test".to_string()], &RunOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::colors::get_package_color;
use crate::configs::workspace::{parse_workspace_config, WorkspaceConfig};
use crate::execution::batch::default_concurrency;
use crate::execution::dependencies::{compute_waves, Exemptions};
use crate::execution::runner::{CommandRunner, RunReport, RunnerConfig};
use crate::results::{
    DependencyGraphResult, ExecutionPlanResult, PackageInfo, PackageListResult,
};
use crate::types::{ConvoyError, ConvoyResult};
use crate::workspace::{
    build_dependency_graph, discover_manifest_paths, load_packages, Workspace,
};

/// High-level workspace manager that encapsulates all workspace operations
pub struct WorkspaceManager {
    pub workspace: Workspace,
    pub config: WorkspaceConfig,
}

/// Options for [`WorkspaceManager::run_command`].
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Exemption spec; falls back to the workspace config when absent.
    pub exempt: Option<String>,
    /// Wave concurrency; half the logical CPUs (at least two) when absent.
    pub concurrency: Option<usize>,
}

impl WorkspaceManager {
    /// Initialize by discovering manifests under the workspace root.
    pub fn new(workspace_root: PathBuf) -> ConvoyResult<Self> {
        let config = Self::load_workspace_config(&workspace_root)?;
        let includes = config.includes.clone().unwrap_or_default();
        let excludes = config.excludes.clone().unwrap_or_default();
        let manifest_paths = discover_manifest_paths(&workspace_root, &includes, &excludes)?;
        Self::build(workspace_root, &manifest_paths, config)
    }

    /// Initialize from an already-resolved list of manifest paths, bypassing
    /// discovery.
    pub fn from_manifest_paths(
        workspace_root: PathBuf,
        manifest_paths: &[PathBuf],
    ) -> ConvoyResult<Self> {
        let config = Self::load_workspace_config(&workspace_root)?;
        Self::build(workspace_root, manifest_paths, config)
    }

    fn build(
        workspace_root: PathBuf,
        manifest_paths: &[PathBuf],
        config: WorkspaceConfig,
    ) -> ConvoyResult<Self> {
        let packages = load_packages(manifest_paths)?;
        let mut workspace = Workspace {
            root: workspace_root,
            packages,
            dep_graph: None,
            dependency_cycles: Vec::new(),
        };
        build_dependency_graph(&mut workspace);

        Ok(Self { workspace, config })
    }

    /// List all packages in the workspace
    pub fn list_packages(&self) -> PackageListResult {
        let packages = self
            .workspace
            .packages
            .iter()
            .map(|p| PackageInfo {
                name: p.name.clone(),
                path: p.package_dir.clone(),
                dependencies: p.dependencies.clone(),
            })
            .collect();

        PackageListResult {
            packages,
            package_colors: self.package_colors(),
        }
    }

    /// Compute the wave decomposition without executing anything.
    pub fn execution_plan(&self, exempt: Option<&str>) -> ConvoyResult<ExecutionPlanResult> {
        let exemptions = self.resolve_exemptions(exempt);
        let waves = compute_waves(&self.workspace.packages, &exemptions)?;

        Ok(ExecutionPlanResult {
            waves,
            package_colors: self.package_colors(),
        })
    }

    /// Run a command in every package directory, in dependency order.
    pub async fn run_command(
        &self,
        command: &str,
        args: &[String],
        options: &RunOptions,
    ) -> ConvoyResult<RunReport> {
        if self.workspace.packages.is_empty() {
            return Err(ConvoyError::Workspace(
                "No packages found in workspace".to_string(),
            ));
        }

        let config = RunnerConfig {
            exemptions: self.resolve_exemptions(options.exempt.as_deref()),
            concurrency: options.concurrency.unwrap_or_else(default_concurrency),
        };

        CommandRunner::new(&self.workspace.packages, config)
            .run(command, args)
            .await
    }

    /// Get dependency graph information
    pub fn dependency_graph(&self) -> DependencyGraphResult {
        DependencyGraphResult {
            graph: self.workspace.dep_graph.clone(),
            cycles: self.workspace.dependency_cycles.clone(),
        }
    }

    /// Resolve the exemption spec: explicit value first, then the workspace
    /// config default.
    fn resolve_exemptions(&self, exempt: Option<&str>) -> Exemptions {
        Exemptions::parse(exempt.or(self.config.exempt.as_deref()))
    }

    fn load_workspace_config(workspace_root: &Path) -> ConvoyResult<WorkspaceConfig> {
        let config_path = workspace_root.join(".convoy").join("workspace.yml");
        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            ConvoyError::Config(format!(
                "Failed to read workspace config {}: {}",
                config_path.display(),
                e
            ))
        })?;

        parse_workspace_config(&content).map_err(|e| {
            ConvoyError::Config(format!(
                "Failed to parse workspace config {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    fn package_colors(&self) -> HashMap<String, colored::Color> {
        self.workspace
            .packages
            .iter()
            .map(|p| (p.name.clone(), get_package_color(&p.name)))
            .collect()
    }
}
