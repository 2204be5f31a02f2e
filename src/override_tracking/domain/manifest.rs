use crate::override_tracking::domain::appendix::Appendix;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Name used for the root manifest when it declares no `name` field.
pub const ROOT_LABEL: &str = "root";

/// Parsed `package.json` manifest.
///
/// Only the fields the pipeline reads are typed; everything else round-trips
/// untouched through the flattened `rest` map so a write never loses user
/// data (scripts, engines, custom fields, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_dependencies: Option<BTreeMap<String, String>>,
    /// yarn-style override field. Raw JSON: entries the resolver cannot
    /// express are preserved here verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Map<String, Value>>,
    /// npm-style override field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnpm: Option<PnpmSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<Workspaces>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pastoralist: Option<TrackingConfig>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl PackageJson {
    /// Returns the manifest's package name, or `"root"` when unnamed.
    pub fn package_label(&self) -> &str {
        self.name.as_deref().unwrap_or(ROOT_LABEL)
    }

    /// Union of `dependencies`, `devDependencies` and `peerDependencies`.
    ///
    /// When the same package appears in more than one set, the production
    /// `dependencies` range wins.
    pub fn merged_dependencies(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for set in [&self.peer_dependencies, &self.dev_dependencies, &self.dependencies]
            .into_iter()
            .flatten()
        {
            for (name, range) in set {
                merged.insert(name.clone(), range.clone());
            }
        }
        merged
    }

    /// All dependency names declared in this manifest.
    pub fn dependency_names(&self) -> BTreeSet<String> {
        self.merged_dependencies().into_keys().collect()
    }

    /// Removes an override entry from the raw manifest field backing the
    /// given source. Empty fields collapse to `None` so they disappear from
    /// the serialized output.
    pub fn remove_override(&mut self, field: super::override_source::OverrideField, package: &str) {
        use super::override_source::OverrideField;
        match field {
            OverrideField::Resolutions => {
                if let Some(map) = self.resolutions.as_mut() {
                    map.remove(package);
                    if map.is_empty() {
                        self.resolutions = None;
                    }
                }
            }
            OverrideField::Overrides => {
                if let Some(map) = self.overrides.as_mut() {
                    map.remove(package);
                    if map.is_empty() {
                        self.overrides = None;
                    }
                }
            }
            OverrideField::PnpmOverrides => {
                if let Some(pnpm) = self.pnpm.as_mut() {
                    if let Some(map) = pnpm.overrides.as_mut() {
                        map.remove(package);
                        if map.is_empty() {
                            pnpm.overrides = None;
                        }
                    }
                    if pnpm.overrides.is_none() && pnpm.rest.is_empty() {
                        self.pnpm = None;
                    }
                }
            }
        }
    }

    /// Workspace glob patterns declared by this manifest, if any.
    pub fn workspace_patterns(&self) -> Option<Vec<String>> {
        self.workspaces.as_ref().map(|w| w.patterns().to_vec())
    }
}

/// The `pnpm` section of a manifest. Only `overrides` is interpreted;
/// other pnpm settings pass through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PnpmSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// The `workspaces` field: either a bare pattern array or the object form
/// npm also accepts (`{"packages": [...]}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Workspaces {
    Patterns(Vec<String>),
    Config {
        packages: Vec<String>,
        #[serde(flatten)]
        rest: Map<String, Value>,
    },
}

impl Workspaces {
    pub fn patterns(&self) -> &[String] {
        match self {
            Workspaces::Patterns(patterns) => patterns,
            Workspaces::Config { packages, .. } => packages,
        }
    }
}

/// The private `pastoralist` object persisted inside `package.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    #[serde(default, skip_serializing_if = "Appendix::is_empty")]
    pub appendix: Appendix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_paths: Option<DepPaths>,
    /// Per-workspace-member appendices, keyed by member manifest path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_paths: Option<BTreeMap<String, Appendix>>,
    /// Same shape as `override_paths`; written by projects whose active
    /// source is yarn `resolutions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_paths: Option<BTreeMap<String, Appendix>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecuritySettings>,
}

impl TrackingConfig {
    /// Whether the config carries nothing worth persisting.
    pub fn is_empty(&self) -> bool {
        self.appendix.is_empty()
            && self.dep_paths.is_none()
            && self.override_paths.is_none()
            && self.resolution_paths.is_none()
            && self.security.is_none()
    }

    /// The tracked per-path appendices regardless of which field family the
    /// project uses.
    pub fn tracked_paths(&self) -> Option<&BTreeMap<String, Appendix>> {
        self.override_paths
            .as_ref()
            .or(self.resolution_paths.as_ref())
    }
}

/// `pastoralist.depPaths`: the sentinel `"workspace"` or an explicit glob
/// array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DepPaths {
    Patterns(Vec<String>),
    Sentinel(String),
}

impl DepPaths {
    pub const WORKSPACE_SENTINEL: &'static str = "workspace";

    /// True when member discovery should use the root manifest's
    /// `workspaces` patterns.
    pub fn is_workspace_sentinel(&self) -> bool {
        matches!(self, DepPaths::Sentinel(s) if s == Self::WORKSPACE_SENTINEL)
    }

    /// Explicit glob patterns, treating a non-sentinel string as a single
    /// pattern.
    pub fn patterns(&self) -> Vec<String> {
        match self {
            DepPaths::Patterns(patterns) => patterns.clone(),
            DepPaths::Sentinel(s) if s == Self::WORKSPACE_SENTINEL => vec![],
            DepPaths::Sentinel(s) => vec![s.clone()],
        }
    }
}

/// `pastoralist.security`: provider selection and the manual-reason map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Manual reasons keyed by package name; lowest reason priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reasons: Option<BTreeMap<String, String>>,
}
