//! Option resolution for a run.
//!
//! Options arrive from two places: command-line flags and the manifest's
//! `pastoralist` object. CLI-supplied values override config-file-supplied
//! values; the merge happens in exactly one place so the precedence rule is
//! easy to audit and test.

use crate::override_tracking::domain::manifest::{DepPaths, TrackingConfig};
use std::collections::BTreeMap;

/// Options a user may supply on the command line. `None`/empty means "not
/// supplied", letting the manifest config fill the gap.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dep_paths: Vec<String>,
    pub reason: Option<String>,
    pub check_security: Option<bool>,
    pub provider: Option<String>,
}

/// The fully resolved options the pipeline runs with.
#[derive(Debug, Clone, Default)]
pub struct EffectiveOptions {
    pub dep_paths: Option<DepPaths>,
    pub security_enabled: bool,
    pub provider: Option<String>,
    pub explicit_reason: Option<String>,
    /// Manual reasons from `pastoralist.security.overrideReasons`.
    pub manual_reasons: BTreeMap<String, String>,
}

/// Merges CLI flags with the manifest's tracking config. CLI wins.
pub fn resolve_options(cli: &CliOverrides, config: Option<&TrackingConfig>) -> EffectiveOptions {
    let security = config.and_then(|c| c.security.as_ref());

    let dep_paths = if cli.dep_paths.is_empty() {
        config.and_then(|c| c.dep_paths.clone())
    } else if cli.dep_paths.len() == 1 && cli.dep_paths[0] == DepPaths::WORKSPACE_SENTINEL {
        Some(DepPaths::Sentinel(DepPaths::WORKSPACE_SENTINEL.to_string()))
    } else {
        Some(DepPaths::Patterns(cli.dep_paths.clone()))
    };

    let security_enabled = cli
        .check_security
        .or_else(|| security.and_then(|s| s.enabled))
        .unwrap_or(false);

    let provider = cli
        .provider
        .clone()
        .or_else(|| security.and_then(|s| s.provider.clone()));

    let manual_reasons = security
        .and_then(|s| s.override_reasons.clone())
        .unwrap_or_default();

    EffectiveOptions {
        dep_paths,
        security_enabled,
        provider,
        explicit_reason: cli.reason.clone(),
        manual_reasons,
    }
}
