//! Reading `package.json` manifests.
//!
//! Only the package name and the runtime `dependencies` table are read.
//! `devDependencies`, `peerDependencies` and `optionalDependencies` do not
//! participate in ordering and are deliberately left unparsed.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{ConvoyError, ConvoyResult};

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
}

/// A package discovered from a manifest. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub manifest_path: PathBuf,
    pub package_dir: PathBuf,
    /// Runtime dependency names exactly as declared, sorted. Names that do
    /// not belong to the workspace are filtered out later, when the wait map
    /// is built.
    pub dependencies: Vec<String>,
}

/// Load and parse a single manifest.
///
/// Any unreadable or malformed manifest is fatal: manifests are loaded once
/// before scheduling, and no ordering decision can be trusted without the
/// full set.
pub fn load_package(manifest_path: &Path) -> ConvoyResult<Package> {
    let contents = std::fs::read_to_string(manifest_path).map_err(|e| {
        ConvoyError::Manifest(format!(
            "Failed to read manifest {}: {}",
            manifest_path.display(),
            e
        ))
    })?;

    parse_package(manifest_path, &contents)
}

pub fn parse_package(manifest_path: &Path, contents: &str) -> ConvoyResult<Package> {
    let manifest: PackageManifest = serde_json::from_str(contents).map_err(|e| {
        ConvoyError::Manifest(format!(
            "Failed to parse manifest {}: {}",
            manifest_path.display(),
            e
        ))
    })?;

    let package_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            ConvoyError::Manifest(format!(
                "Manifest {} has no parent directory",
                manifest_path.display()
            ))
        })?;

    // Fall back to the directory name when the manifest has no name field.
    let name = manifest
        .name
        .or_else(|| {
            package_dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.to_string())
        })
        .ok_or_else(|| {
            ConvoyError::Manifest(format!(
                "Manifest {} has neither a name field nor a usable directory name",
                manifest_path.display()
            ))
        })?;

    let mut dependencies: Vec<String> = manifest.dependencies.keys().cloned().collect();
    dependencies.sort_unstable();

    Ok(Package {
        name,
        manifest_path: manifest_path.to_path_buf(),
        package_dir,
        dependencies,
    })
}
