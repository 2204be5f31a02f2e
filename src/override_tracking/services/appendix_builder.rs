use crate::override_tracking::domain::appendix::{
    key_for, Appendix, AppendixItem, NESTED_NOTE, TRANSITIVE_NOTE,
};
use crate::override_tracking::domain::manifest::PackageJson;
use crate::override_tracking::domain::override_source::{OverrideTarget, ResolvedOverrides};
use crate::override_tracking::domain::semver_range;
use crate::override_tracking::services::security_merger::{ReasonSources, SecurityLedgerMerger};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Shared inputs for building one manifest's partial appendix.
///
/// The same context is reused across the root and every workspace member in
/// a run, so freshly created ledgers are identical no matter which member
/// creates them first - a prerequisite for order-independent merging.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub overrides: &'a ResolvedOverrides,
    /// The appendix persisted by the previous run; ledgers found here are
    /// carried over verbatim.
    pub baseline: &'a Appendix,
    pub reasons: &'a ReasonSources<'a>,
    /// Flat installed reachability from the dependency-tree oracle, when it
    /// was available this run.
    pub installed: Option<&'a BTreeSet<String>>,
    pub now: DateTime<Utc>,
}

/// AppendixBuilder service - computes which declared overrides are active
/// for one manifest.
///
/// Pure domain logic: all I/O (manifest reads, the tree oracle call) happens
/// before this point.
pub struct AppendixBuilder;

impl AppendixBuilder {
    /// Builds the partial appendix for one manifest.
    ///
    /// Simple overrides produce an entry when the package appears in the
    /// manifest's merged dependency sets and the pin changes what the
    /// declared range would resolve to, or when the package is reachable
    /// only transitively. Nested overrides produce one entry per inner pin
    /// when the parent package is present. Overrides matching nothing are
    /// silently ignored; garbage collection deals with them later.
    pub fn build(ctx: &BuildContext<'_>, manifest: &PackageJson) -> Appendix {
        let mut appendix = Appendix::new();
        let deps = manifest.merged_dependencies();
        let consumer = manifest.package_label();

        for (package, target) in &ctx.overrides.targets {
            match target {
                OverrideTarget::Version(pin) => {
                    if let Some(declared) = deps.get(package) {
                        if semver_range::changes_resolution(declared, pin) {
                            Self::upsert(
                                ctx,
                                &mut appendix,
                                &key_for(package, pin),
                                package,
                                consumer,
                                format!("{}@{}", package, declared),
                            );
                        }
                    } else if ctx
                        .installed
                        .is_some_and(|installed| installed.contains(package))
                    {
                        Self::upsert(
                            ctx,
                            &mut appendix,
                            &key_for(package, pin),
                            package,
                            consumer,
                            format!("{}@{} {}", package, pin, TRANSITIVE_NOTE),
                        );
                    }
                }
                OverrideTarget::Nested(children) => {
                    // The parent must be a declared dependency for its
                    // nested pins to apply.
                    if !deps.contains_key(package) {
                        continue;
                    }
                    for (child, version) in children {
                        Self::upsert(
                            ctx,
                            &mut appendix,
                            &key_for(child, version),
                            child,
                            consumer,
                            format!("{}@{} {}", child, version, NESTED_NOTE),
                        );
                    }
                }
            }
        }

        appendix
    }

    fn upsert(
        ctx: &BuildContext<'_>,
        appendix: &mut Appendix,
        key: &str,
        package: &str,
        consumer: &str,
        dependent_value: String,
    ) {
        let mut item = ctx
            .baseline
            .get(key)
            .cloned()
            .unwrap_or_default();
        item.dependents.insert(consumer.to_string(), dependent_value);
        match item.ledger.as_mut() {
            // A carried-over ledger keeps its addedDate but can still gain a
            // reason or security metadata it was missing.
            Some(ledger) => {
                SecurityLedgerMerger::augment_ledger(ledger, package, ctx.now, ctx.reasons)
            }
            None => {
                item.ledger = Some(SecurityLedgerMerger::new_ledger(package, ctx.now, ctx.reasons))
            }
        }

        match appendix.0.get_mut(key) {
            Some(existing) => existing.merge_from(item),
            None => appendix.insert(key.to_string(), item),
        }
    }
}
