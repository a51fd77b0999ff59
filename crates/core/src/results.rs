//! Result types for workspace operations
//!
//! This module contains the output structures returned by workspace manager
//! operations, consumed by the CLI for presentation.

use std::collections::HashMap;
use std::path::PathBuf;

use colored::Color;

/// A discovered package as shown by `convoy list`.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub name: String,
    pub path: PathBuf,
    /// Runtime dependency names as declared in the manifest.
    pub dependencies: Vec<String>,
}

/// Result of listing packages in the workspace
#[derive(Debug)]
pub struct PackageListResult {
    pub packages: Vec<PackageInfo>,
    pub package_colors: HashMap<String, Color>,
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: Option<petgraph::Graph<String, ()>>,
    pub cycles: Vec<Vec<String>>,
}

/// Wave decomposition produced by `convoy plan`.
#[derive(Debug)]
pub struct ExecutionPlanResult {
    pub waves: Vec<Vec<String>>,
    pub package_colors: HashMap<String, Color>,
}
