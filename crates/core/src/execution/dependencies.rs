//! Dependency ordering for command fan-out.
//!
//! The scheduler works off a wait map: package name -> the set of
//! in-workspace runtime dependencies that have not completed yet. Packages
//! with an empty set form the ready frontier; completed packages are struck
//! from every other set. An empty frontier with packages remaining is a
//! deadlock.

use std::collections::{HashMap, HashSet};

use crate::manifest::Package;
use crate::types::{ConvoyError, ConvoyResult};

/// Which packages are exempt from dependency ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exemptions {
    /// Full dependency checking.
    None,
    /// The `*` sentinel: no ordering at all, everything runs in one wave.
    All,
    /// The named packages never block their dependents.
    Named(HashSet<String>),
}

impl Exemptions {
    /// Parse an exemption spec: absent, the `*` sentinel, or a
    /// comma-separated list of package names.
    pub fn parse(spec: Option<&str>) -> Self {
        match spec {
            None => Exemptions::None,
            Some("*") => Exemptions::All,
            Some(list) => {
                let names: HashSet<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    Exemptions::None
                } else {
                    Exemptions::Named(names)
                }
            }
        }
    }

    fn is_exempt(&self, name: &str) -> bool {
        match self {
            Exemptions::None => false,
            Exemptions::All => true,
            Exemptions::Named(names) => names.contains(name),
        }
    }
}

/// Package name -> unresolved in-workspace dependency names.
pub type WaitMap = HashMap<String, HashSet<String>>;

/// Build the wait map for a run, or `None` when ordering is disabled
/// entirely.
///
/// Every package gets an entry. A dependency only lands in an unresolved set
/// when it names another workspace package that is not exempted; a package
/// listing itself is ignored. Pure function of the manifest contents.
pub fn build_wait_map(packages: &[Package], exemptions: &Exemptions) -> Option<WaitMap> {
    if matches!(exemptions, Exemptions::All) {
        return None;
    }

    let universe: HashSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();
    let mut waits = WaitMap::with_capacity(packages.len());

    for package in packages {
        let blockers: HashSet<String> = package
            .dependencies
            .iter()
            .filter(|dep| dep.as_str() != package.name)
            .filter(|dep| universe.contains(dep.as_str()))
            .filter(|dep| !exemptions.is_exempt(dep))
            .cloned()
            .collect();
        waits.insert(package.name.clone(), blockers);
    }

    Some(waits)
}

/// Names of the remaining packages whose unresolved set is empty, in input
/// order. Without a wait map every remaining package is ready.
pub fn ready_frontier(remaining: &[Package], waits: Option<&WaitMap>) -> Vec<String> {
    match waits {
        None => remaining.iter().map(|p| p.name.clone()).collect(),
        Some(waits) => remaining
            .iter()
            .filter(|p| waits.get(&p.name).map_or(true, HashSet::is_empty))
            .map(|p| p.name.clone())
            .collect(),
    }
}

/// Strike a completed wave from the wait map: drop each package's own entry
/// and remove it from every other unresolved set.
pub fn retire_wave(waits: &mut WaitMap, wave: &[String]) {
    for name in wave {
        waits.remove(name);
    }
    for unresolved in waits.values_mut() {
        for name in wave {
            unresolved.remove(name);
        }
    }
}

/// Snapshot the unresolved sets of the remaining packages, sorted by package
/// name so the fatal report is stable.
pub fn residual_sets(remaining: &[Package], waits: &WaitMap) -> Vec<(String, Vec<String>)> {
    let mut residual: Vec<(String, Vec<String>)> = remaining
        .iter()
        .map(|p| {
            let mut deps: Vec<String> = waits
                .get(&p.name)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            deps.sort_unstable();
            (p.name.clone(), deps)
        })
        .collect();
    residual.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    residual
}

/// Compute the full wave decomposition without executing anything.
///
/// Used by `convoy plan` and by tests that only care about ordering; the
/// runner drives the same frontier/retire primitives round by round.
pub fn compute_waves(
    packages: &[Package],
    exemptions: &Exemptions,
) -> ConvoyResult<Vec<Vec<String>>> {
    let mut waits = build_wait_map(packages, exemptions);
    let mut remaining: Vec<Package> = packages.to_vec();
    let mut waves = Vec::new();

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

        if let Some(waits) = waits.as_mut() {
            retire_wave(waits, &frontier);
        }

        let frontier_set: HashSet<&str> = frontier.iter().map(String::as_str).collect();
        remaining.retain(|p| !frontier_set.contains(p.name.as_str()));
        waves.push(frontier);
    }

    Ok(waves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn package(name: &str, deps: &[&str]) -> Package {
        Package {
            name: name.to_string(),
            manifest_path: PathBuf::from(format!("/ws/{}/package.json", name)),
            package_dir: PathBuf::from(format!("/ws/{}", name)),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn parses_exemption_specs() {
        assert_eq!(Exemptions::parse(None), Exemptions::None);
        assert_eq!(Exemptions::parse(Some("*")), Exemptions::All);

        let named = Exemptions::parse(Some("a, b,"));
        let expected: HashSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        assert_eq!(named, Exemptions::Named(expected));
    }

    #[test]
    fn wait_map_restricts_to_workspace_and_skips_self_references() {
        let packages = vec![
            package("a", &["a", "left-pad"]),
            package("b", &["a", "lodash"]),
        ];

        let waits = build_wait_map(&packages, &Exemptions::None).unwrap();

        assert!(waits["a"].is_empty());
        assert_eq!(
            waits["b"],
            ["a".to_string()].into_iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn exempted_packages_never_block_dependents() {
        let packages = vec![package("a", &[]), package("b", &["a"])];
        let exemptions = Exemptions::parse(Some("a"));

        let waits = build_wait_map(&packages, &exemptions).unwrap();

        assert!(waits["b"].is_empty());
    }

    #[test]
    fn wait_map_is_deterministic_for_identical_manifests() {
        let packages = vec![
            package("a", &["c"]),
            package("b", &["a", "c"]),
            package("c", &[]),
        ];

        let first = build_wait_map(&packages, &Exemptions::None).unwrap();
        let second = build_wait_map(&packages, &Exemptions::None).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn independent_packages_share_the_first_wave() {
        let packages = vec![package("a", &[]), package("b", &["a"]), package("c", &[])];

        let waves = compute_waves(&packages, &Exemptions::None).unwrap();

        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0], vec!["a".to_string(), "c".to_string()]);
        assert_eq!(waves[1], vec!["b".to_string()]);
    }

    #[test]
    fn every_wave_index_exceeds_those_of_its_dependencies() {
        let packages = vec![
            package("app", &["lib", "util"]),
            package("lib", &["base"]),
            package("util", &["base"]),
            package("base", &[]),
        ];

        let waves = compute_waves(&packages, &Exemptions::None).unwrap();

        let wave_of = |name: &str| {
            waves
                .iter()
                .position(|wave| wave.iter().any(|n| n == name))
                .unwrap()
        };
        for pkg in &packages {
            for dep in &pkg.dependencies {
                assert!(wave_of(&pkg.name) > wave_of(dep));
            }
        }
    }

    #[test]
    fn two_node_cycle_deadlocks_with_exact_residual() {
        let packages = vec![package("a", &["b"]), package("b", &["a"])];

        let err = compute_waves(&packages, &Exemptions::None).expect_err("cycle should deadlock");

        match err {
            ConvoyError::Deadlock { residual } => {
                assert_eq!(
                    residual,
                    vec![
                        ("a".to_string(), vec!["b".to_string()]),
                        ("b".to_string(), vec!["a".to_string()]),
                    ]
                );
            }
            other => panic!("expected deadlock, got {other}"),
        }
    }

    #[test]
    fn acyclic_part_runs_before_a_later_deadlock() {
        let packages = vec![
            package("ok", &[]),
            package("a", &["b", "ok"]),
            package("b", &["a"]),
        ];

        let err = compute_waves(&packages, &Exemptions::None).expect_err("cycle should deadlock");

        match err {
            ConvoyError::Deadlock { residual } => {
                // `ok` completed; only the cycle is reported.
                assert_eq!(residual.len(), 2);
                assert_eq!(residual[0], ("a".to_string(), vec!["b".to_string()]));
                assert_eq!(residual[1], ("b".to_string(), vec!["a".to_string()]));
            }
            other => panic!("expected deadlock, got {other}"),
        }
    }

    #[test]
    fn exempt_all_is_a_single_wave_even_with_cycles() {
        let packages = vec![
            package("a", &["b"]),
            package("b", &["a"]),
            package("c", &["a"]),
        ];

        let waves = compute_waves(&packages, &Exemptions::All).unwrap();

        assert_eq!(waves.len(), 1);
        assert_eq!(
            waves[0],
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
