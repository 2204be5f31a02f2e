use crate::override_tracking::domain::appendix::Appendix;
use crate::override_tracking::domain::override_source::ResolvedOverrides;
use std::collections::{BTreeMap, BTreeSet};

/// The three independent liveness signals, combined by OR.
///
/// Each predicate is testable alone: dependency-set presence, OverridePaths
/// protection, and installed-tree confirmation. `installed` is `None` when
/// the oracle failed this run, in which case liveness falls back to the
/// first two signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivenessSignals<'a> {
    /// Union of dependency names across every scanned manifest.
    pub all_deps: Option<&'a BTreeSet<String>>,
    /// Per-path appendices protecting packages tracked for members that
    /// could not be located this run.
    pub override_paths: Option<&'a BTreeMap<String, Appendix>>,
    /// Flat reachability reported by the installed dependency tree.
    pub installed: Option<&'a BTreeSet<String>>,
}

impl LivenessSignals<'_> {
    pub fn in_dependency_sets(&self, package: &str) -> bool {
        self.all_deps.is_some_and(|deps| deps.contains(package))
    }

    pub fn protected_by_paths(&self, package: &str) -> bool {
        self.override_paths.is_some_and(|paths| {
            paths
                .values()
                .any(|appendix| appendix.references_package(package))
        })
    }

    pub fn in_installed_tree(&self, package: &str) -> bool {
        self.installed.is_some_and(|tree| tree.contains(package))
    }

    pub fn is_live(&self, package: &str) -> bool {
        self.in_dependency_sets(package)
            || self.protected_by_paths(package)
            || self.in_installed_tree(package)
    }
}

/// What a sweep removed, for reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Top-level override packages removed from the override map.
    pub removed_overrides: Vec<String>,
    /// Appendix keys removed alongside them.
    pub removed_keys: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.removed_overrides.is_empty() && self.removed_keys.is_empty()
    }
}

/// GarbageCollector service - mark-and-sweeps override entries no longer
/// referenced anywhere.
pub struct GarbageCollector;

impl GarbageCollector {
    /// Sweeps dead overrides out of the active map and the appendix.
    ///
    /// Only packages in `missing_in_root` (override packages absent from the
    /// root manifest's own dependency sets) are candidates; everything else
    /// is trivially live. Nested overrides are swept by the parent package's
    /// liveness, not the nested key's own presence.
    pub fn sweep(
        overrides: &mut ResolvedOverrides,
        appendix: &mut Appendix,
        signals: &LivenessSignals<'_>,
        missing_in_root: &BTreeSet<String>,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        for package in missing_in_root {
            if signals.is_live(package) {
                continue;
            }
            let governed = overrides.governed_keys(package);
            if overrides.targets.remove(package).is_some() {
                report.removed_overrides.push(package.clone());
            }
            for key in governed {
                if appendix.remove(&key).is_some() {
                    report.removed_keys.push(key);
                }
            }
        }

        // Appendix entries whose dependents emptied out and whose override
        // is gone are dead too.
        let orphaned: Vec<String> = appendix
            .iter()
            .filter(|(key, item)| {
                item.is_dead()
                    && !overrides
                        .targets
                        .keys()
                        .any(|pkg| overrides.governed_keys(pkg).iter().any(|k| k == *key))
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in orphaned {
            appendix.remove(&key);
            report.removed_keys.push(key);
        }

        report
    }
}
