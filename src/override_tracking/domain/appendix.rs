use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation appended to a dependent value when the overridden package is
/// reachable only through the installed tree, not a declared dependency.
pub const TRANSITIVE_NOTE: &str = "(transitive dependency)";

/// Annotation appended to a dependent value when the entry is governed by a
/// parent package's nested override.
pub const NESTED_NOTE: &str = "(nested override)";

/// The persisted ledger mapping each active override key (`pkg@version`) to
/// its consumers and metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Appendix(pub BTreeMap<String, AppendixItem>);

impl Appendix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&AppendixItem> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AppendixItem)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn insert(&mut self, key: String, item: AppendixItem) {
        self.0.insert(key, item);
    }

    pub fn remove(&mut self, key: &str) -> Option<AppendixItem> {
        self.0.remove(key)
    }

    /// Unions another appendix into this one with the item merge rule:
    /// dependents maps are unioned (same-consumer entries overwrite), the
    /// existing ledger is carried verbatim when present, patches are
    /// deduplicated. Commutative and associative over partials produced in
    /// the same run, so parallel workspace scanning order never changes the
    /// result.
    pub fn merge(&mut self, other: Appendix) {
        for (key, item) in other.0 {
            match self.0.get_mut(&key) {
                Some(existing) => existing.merge_from(item),
                None => {
                    self.0.insert(key, item);
                }
            }
        }
    }

    /// True when any key's base package matches `package`.
    pub fn references_package(&self, package: &str) -> bool {
        self.0.iter().any(|(key, item)| {
            base_package(key) == package
                || item.dependents.contains_key(package)
                || item
                    .dependents
                    .values()
                    .any(|v| v.starts_with(&format!("{}@", package)))
        })
    }
}

/// One tracked override: who needs it, why it exists, and any attached
/// source patches. An item with no dependents is dead and removable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppendixItem {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependents: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<Ledger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patches: Option<Vec<String>>,
}

impl AppendixItem {
    pub fn is_dead(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Merges another item into this one. Dependents are unioned with
    /// same-consumer overwrite; the ledger already present wins so
    /// `addedDate`/`reason` stay immutable across runs; patches are unioned
    /// without duplicates.
    pub fn merge_from(&mut self, other: AppendixItem) {
        self.dependents.extend(other.dependents);
        if self.ledger.is_none() {
            self.ledger = other.ledger;
        }
        if let Some(incoming) = other.patches {
            let patches = self.patches.get_or_insert_with(Vec::new);
            for patch in incoming {
                if !patches.contains(&patch) {
                    patches.push(patch);
                }
            }
        }
    }

    /// Appends a patch filename, creating the array if absent. Duplicates
    /// are ignored.
    pub fn attach_patch(&mut self, filename: &str) {
        let patches = self.patches.get_or_insert_with(Vec::new);
        if !patches.iter().any(|p| p == filename) {
            patches.push(filename.to_string());
        }
    }
}

/// Audit metadata for one appendix entry. `added_date` and `reason` are set
/// once at entry creation and never rewritten on later runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub added_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_check_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cve: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Ledger {
    pub fn new(added_date: DateTime<Utc>, reason: Option<String>) -> Self {
        Self {
            added_date,
            reason,
            security_checked: None,
            security_check_date: None,
            security_provider: None,
            cve: None,
            severity: None,
            description: None,
            url: None,
        }
    }
}

/// Builds the canonical appendix key for a package/version pair.
pub fn key_for(package: &str, version: &str) -> String {
    format!("{}@{}", package, version)
}

/// Extracts the base package name from an appendix key, handling scoped
/// names (`@scope/pkg@1.0.0`).
pub fn base_package(key: &str) -> &str {
    match key.rfind('@') {
        Some(0) | None => key,
        Some(idx) => &key[..idx],
    }
}
