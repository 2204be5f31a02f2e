use crate::override_tracking::domain::appendix::{base_package, Appendix, Ledger};
use crate::override_tracking::domain::override_source::ResolvedOverrides;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One vulnerability record supplied by a security provider for an
/// overridden package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityOverrideDetail {
    pub package_name: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cve: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The ordered reason lookups evaluated when an appendix entry is created
/// or a reason-less ledger is revisited.
///
/// Priority: explicit reason parameter > security record keyed by package
/// name > manual-reason map keyed by package name > none. Each level is a
/// fallible lookup; the first match wins and never overwrites a reason that
/// is already recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasonSources<'a> {
    pub explicit: Option<&'a str>,
    pub security: Option<&'a BTreeMap<String, SecurityOverrideDetail>>,
    pub manual: Option<&'a BTreeMap<String, String>>,
}

/// Which lookup level produced the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum ReasonMatch<'a> {
    Explicit(&'a str),
    Security(&'a SecurityOverrideDetail),
    Manual(&'a str),
}

impl<'a> ReasonSources<'a> {
    /// Resolves the reason for a package, first match wins.
    pub fn resolve(&self, package: &str) -> Option<ReasonMatch<'a>> {
        if let Some(reason) = self.explicit {
            return Some(ReasonMatch::Explicit(reason));
        }
        if let Some(detail) = self.security.and_then(|map| map.get(package)) {
            return Some(ReasonMatch::Security(detail));
        }
        if let Some(reason) = self.manual.and_then(|map| map.get(package)) {
            return Some(ReasonMatch::Manual(reason.as_str()));
        }
        None
    }

    /// Whether any level would produce a reason for this package.
    pub fn has_reason(&self, package: &str) -> bool {
        self.resolve(package).is_some()
    }
}

/// SecurityLedgerMerger - creates ledgers for new appendix entries and
/// computes reason-prompt candidates.
pub struct SecurityLedgerMerger;

impl SecurityLedgerMerger {
    /// Builds a fresh ledger for a newly created appendix entry.
    ///
    /// The reason follows the `ReasonSources` priority. When a security
    /// record matched, `securityChecked`/`securityCheckDate` are set and the
    /// remaining ledger fields are copied only if present on the source
    /// record - never defaulted.
    pub fn new_ledger(package: &str, now: DateTime<Utc>, sources: &ReasonSources<'_>) -> Ledger {
        match sources.resolve(package) {
            Some(ReasonMatch::Explicit(reason)) => Ledger::new(now, Some(reason.to_string())),
            Some(ReasonMatch::Security(detail)) => {
                let mut ledger = Ledger::new(now, Some(detail.reason.clone()));
                ledger.security_checked = Some(true);
                ledger.security_check_date = Some(now);
                ledger.security_provider = detail.provider.clone();
                ledger.cve = detail.cve.clone();
                ledger.severity = detail.severity.clone();
                ledger.description = detail.description.clone();
                ledger.url = detail.url.clone();
                ledger
            }
            Some(ReasonMatch::Manual(reason)) => Ledger::new(now, Some(reason.to_string())),
            None => Ledger::new(now, None),
        }
    }

    /// Fills the gaps in a carried-over ledger without rewriting history.
    ///
    /// A missing reason is resolved through the `ReasonSources` priority;
    /// when a security record matches, `securityChecked` metadata is added
    /// to a ledger that has never been checked. `addedDate` and every field
    /// already holding a value stay untouched, so re-running with `--reason`
    /// documents a previously reason-less override instead of dropping the
    /// flag on the floor.
    pub fn augment_ledger(
        ledger: &mut Ledger,
        package: &str,
        now: DateTime<Utc>,
        sources: &ReasonSources<'_>,
    ) {
        if ledger.reason.is_none() {
            ledger.reason = match sources.resolve(package) {
                Some(ReasonMatch::Explicit(reason)) => Some(reason.to_string()),
                Some(ReasonMatch::Security(detail)) => Some(detail.reason.clone()),
                Some(ReasonMatch::Manual(reason)) => Some(reason.to_string()),
                None => None,
            };
        }

        let Some(detail) = sources.security.and_then(|map| map.get(package)) else {
            return;
        };
        if ledger.security_checked != Some(true) {
            ledger.security_checked = Some(true);
            ledger.security_check_date = Some(now);
        }
        if ledger.security_provider.is_none() {
            ledger.security_provider = detail.provider.clone();
        }
        if ledger.cve.is_none() {
            ledger.cve = detail.cve.clone();
        }
        if ledger.severity.is_none() {
            ledger.severity = detail.severity.clone();
        }
        if ledger.description.is_none() {
            ledger.description = detail.description.clone();
        }
        if ledger.url.is_none() {
            ledger.url = detail.url.clone();
        }
    }

    /// Override package names lacking both an existing ledger reason and a
    /// resolvable reason - candidates for an interactive reason prompt.
    ///
    /// Nested sub-packages are flattened into the same candidate list as
    /// top-level packages; the result is deduplicated and sorted.
    pub fn prompt_candidates(
        overrides: &ResolvedOverrides,
        appendix: &Appendix,
        sources: &ReasonSources<'_>,
    ) -> Vec<String> {
        let reasoned: BTreeSet<&str> = appendix
            .iter()
            .filter(|(_, item)| {
                item.ledger
                    .as_ref()
                    .is_some_and(|ledger| ledger.reason.is_some())
            })
            .map(|(key, _)| base_package(key))
            .collect();

        overrides
            .flattened_package_names()
            .into_iter()
            .filter(|package| !reasoned.contains(package.as_str()))
            .filter(|package| !sources.has_reason(package))
            .collect()
    }
}
