use globset::{Glob, GlobSet, GlobSetBuilder};
use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::manifest::{load_package, Package};
use crate::types::{ConvoyError, ConvoyResult};

/// Workspace state for one run: the loaded packages plus the diagnostic
/// dependency graph shown by `convoy graph`.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub packages: Vec<Package>,
    pub dep_graph: Option<petgraph::Graph<String, ()>>,
    pub dependency_cycles: Vec<Vec<String>>,
}

const DEFAULT_INCLUDE_GLOBS: &[&str] = &["**/package.json"];
const DEFAULT_EXCLUDE_GLOBS: &[&str] = &["**/node_modules/**", "**/.git/**", "**/target/**"];

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_default()
}

/// Walk the workspace and collect every manifest path matching the include
/// globs. Returns the paths sorted, so discovery order is stable between
/// runs.
pub fn discover_manifest_paths(
    root: &Path,
    include_globs: &[String],
    exclude_globs: &[String],
) -> ConvoyResult<Vec<PathBuf>> {
    let includes = if include_globs.is_empty() {
        DEFAULT_INCLUDE_GLOBS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    } else {
        include_globs.to_vec()
    };

    let mut excludes = DEFAULT_EXCLUDE_GLOBS
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    excludes.extend(exclude_globs.iter().cloned());

    let include_set = build_glob_set(&includes);
    let exclude_set = build_glob_set(&excludes);

    let mut manifest_paths = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current_dir) = queue.pop_front() {
        if let Ok(entries) = std::fs::read_dir(&current_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                let relative_path = path.strip_prefix(root).unwrap_or(&path);

                if exclude_set.is_match(relative_path) {
                    continue;
                }

                if path.is_dir() {
                    queue.push_back(path);
                } else if path.is_file() && include_set.is_match(relative_path) {
                    manifest_paths.push(path);
                }
            }
        }
    }

    manifest_paths.sort();
    Ok(manifest_paths)
}

/// Load every discovered manifest into a package list.
///
/// Package names must be unique across the workspace; a duplicate makes the
/// whole run ambiguous and is rejected up front.
pub fn load_packages(manifest_paths: &[PathBuf]) -> ConvoyResult<Vec<Package>> {
    let mut packages = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for path in manifest_paths {
        let package = load_package(path)?;
        if let Some(previous) = seen.insert(package.name.clone(), path.clone()) {
            return Err(ConvoyError::Workspace(format!(
                "Duplicate package name '{}' declared by {} and {}",
                package.name,
                previous.display(),
                path.display()
            )));
        }
        packages.push(package);
    }

    Ok(packages)
}

/// Build the diagnostic dependency graph from the loaded packages.
///
/// Edges point package -> dependency (the dependency completes first).
/// Dependencies on names outside the workspace are ignored, as is a package
/// listing itself.
pub fn build_dependency_graph(workspace: &mut Workspace) {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    for package in &workspace.packages {
        let node_index = graph.add_node(package.name.clone());
        node_indices.insert(package.name.clone(), node_index);
    }

    for package in &workspace.packages {
        let from_node = node_indices[&package.name];
        for dep in &package.dependencies {
            if dep == &package.name {
                continue;
            }
            if let Some(&to_node) = node_indices.get(dep) {
                graph.add_edge(from_node, to_node, ());
            }
        }
    }

    // Strongly connected components of size > 1 are cycles; a lone node is
    // only a cycle if it has a self-edge, which construction already forbids.
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                None
            }
        })
        .collect();

    cycles.sort();

    workspace.dependency_cycles = cycles;
    workspace.dep_graph = Some(graph);
}
