use crate::override_tracking::domain::manifest::PackageJson;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which manifest field the active override map came from.
///
/// Exactly one field is authoritative per run; when several are populated
/// the priority order `resolutions` > `overrides` > `pnpm.overrides` decides
/// deterministically. Lower-priority fields are ignored, not merged - a
/// documented policy, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideField {
    Resolutions,
    Overrides,
    PnpmOverrides,
}

impl fmt::Display for OverrideField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideField::Resolutions => write!(f, "resolutions"),
            OverrideField::Overrides => write!(f, "overrides"),
            OverrideField::PnpmOverrides => write!(f, "pnpm.overrides"),
        }
    }
}

/// Target of one override directive: a simple pin, or a nested map pinning
/// a transitive dependency of the named parent package.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideTarget {
    Version(String),
    Nested(BTreeMap<String, String>),
}

/// The single authoritative override map resolved from a manifest, tagged
/// with the field it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOverrides {
    pub field: OverrideField,
    pub targets: BTreeMap<String, OverrideTarget>,
}

impl ResolvedOverrides {
    /// Resolves the authoritative override map from a manifest.
    ///
    /// Returns `None` when no override field is populated. Entries the data
    /// model cannot express (nesting deeper than one level, arrays,
    /// non-string leaves) are excluded from the active map but left
    /// untouched on disk.
    pub fn from_manifest(manifest: &PackageJson) -> Option<Self> {
        let candidates: [(OverrideField, Option<&Map<String, Value>>); 3] = [
            (OverrideField::Resolutions, manifest.resolutions.as_ref()),
            (OverrideField::Overrides, manifest.overrides.as_ref()),
            (
                OverrideField::PnpmOverrides,
                manifest.pnpm.as_ref().and_then(|p| p.overrides.as_ref()),
            ),
        ];

        for (field, raw) in candidates {
            if let Some(raw) = raw {
                if !raw.is_empty() {
                    return Some(Self {
                        field,
                        targets: Self::convert(raw),
                    });
                }
            }
        }
        None
    }

    fn convert(raw: &Map<String, Value>) -> BTreeMap<String, OverrideTarget> {
        let mut targets = BTreeMap::new();
        for (name, value) in raw {
            match value {
                Value::String(version) => {
                    targets.insert(name.clone(), OverrideTarget::Version(version.clone()));
                }
                Value::Object(children) => {
                    let mut nested = BTreeMap::new();
                    let mut expressible = true;
                    for (child, child_value) in children {
                        match child_value {
                            Value::String(version) => {
                                nested.insert(child.clone(), version.clone());
                            }
                            // Deeper nesting or non-string leaf: the whole
                            // entry is out of the active map.
                            _ => {
                                expressible = false;
                                break;
                            }
                        }
                    }
                    if expressible && !nested.is_empty() {
                        targets.insert(name.clone(), OverrideTarget::Nested(nested));
                    }
                }
                _ => {}
            }
        }
        targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn get(&self, package: &str) -> Option<&OverrideTarget> {
        self.targets.get(package)
    }

    /// Top-level override package names.
    pub fn package_names(&self) -> BTreeSet<String> {
        self.targets.keys().cloned().collect()
    }

    /// All governed package names with nested sub-packages flattened into
    /// the same list as top-level packages.
    pub fn flattened_package_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for (name, target) in &self.targets {
            names.insert(name.clone());
            if let OverrideTarget::Nested(children) = target {
                names.extend(children.keys().cloned());
            }
        }
        names
    }

    /// Appendix keys governed by the given top-level override package:
    /// `pkg@pin` for simple pins, `child@version` per child for nested maps.
    pub fn governed_keys(&self, package: &str) -> Vec<String> {
        match self.targets.get(package) {
            Some(OverrideTarget::Version(pin)) => {
                vec![super::appendix::key_for(package, pin)]
            }
            Some(OverrideTarget::Nested(children)) => children
                .iter()
                .map(|(child, version)| super::appendix::key_for(child, version))
                .collect(),
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_from(json: &str) -> PackageJson {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolutions_win_over_overrides() {
        let manifest = manifest_from(
            r#"{
                "resolutions": {"lodash": "4.17.21"},
                "overrides": {"react": "18.2.0"},
                "pnpm": {"overrides": {"pg": "8.13.1"}}
            }"#,
        );
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        assert_eq!(resolved.field, OverrideField::Resolutions);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.get("lodash").is_some());
        assert!(resolved.get("react").is_none());
    }

    #[test]
    fn test_overrides_win_over_pnpm() {
        let manifest = manifest_from(
            r#"{
                "overrides": {"react": "18.2.0"},
                "pnpm": {"overrides": {"pg": "8.13.1"}}
            }"#,
        );
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        assert_eq!(resolved.field, OverrideField::Overrides);
    }

    #[test]
    fn test_pnpm_overrides_used_last() {
        let manifest = manifest_from(r#"{"pnpm": {"overrides": {"pg": "8.13.1"}}}"#);
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        assert_eq!(resolved.field, OverrideField::PnpmOverrides);
    }

    #[test]
    fn test_empty_higher_priority_field_is_skipped() {
        let manifest = manifest_from(
            r#"{"resolutions": {}, "overrides": {"react": "18.2.0"}}"#,
        );
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        assert_eq!(resolved.field, OverrideField::Overrides);
    }

    #[test]
    fn test_no_override_field_returns_none() {
        let manifest = manifest_from(r#"{"name": "app"}"#);
        assert!(ResolvedOverrides::from_manifest(&manifest).is_none());
    }

    #[test]
    fn test_nested_override_parsed() {
        let manifest = manifest_from(r#"{"overrides": {"pg": {"pg-types": "^4.0.1"}}}"#);
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        match resolved.get("pg").unwrap() {
            OverrideTarget::Nested(children) => {
                assert_eq!(children.get("pg-types").unwrap(), "^4.0.1");
            }
            other => panic!("expected nested target, got {:?}", other),
        }
    }

    #[test]
    fn test_inexpressible_entries_excluded() {
        let manifest = manifest_from(
            r#"{
                "overrides": {
                    "lodash": "4.17.21",
                    "deep": {"a": {"b": "1.0.0"}},
                    "weird": ["not", "supported"],
                    "numeric": 42
                }
            }"#,
        );
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(resolved.get("lodash").is_some());
        assert!(resolved.get("deep").is_none());
        assert!(resolved.get("weird").is_none());
        assert!(resolved.get("numeric").is_none());
        // The raw field is left untouched on disk.
        assert_eq!(manifest.overrides.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_flattened_package_names_include_nested_children() {
        let manifest = manifest_from(
            r#"{"overrides": {"lodash": "4.17.21", "pg": {"pg-types": "^4.0.1"}}}"#,
        );
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        let names = resolved.flattened_package_names();
        assert!(names.contains("lodash"));
        assert!(names.contains("pg"));
        assert!(names.contains("pg-types"));
    }

    #[test]
    fn test_governed_keys() {
        let manifest = manifest_from(
            r#"{"overrides": {"lodash": "4.17.21", "pg": {"pg-types": "^4.0.1"}}}"#,
        );
        let resolved = ResolvedOverrides::from_manifest(&manifest).unwrap();
        assert_eq!(resolved.governed_keys("lodash"), vec!["lodash@4.17.21"]);
        assert_eq!(resolved.governed_keys("pg"), vec!["pg-types@^4.0.1"]);
        assert!(resolved.governed_keys("absent").is_empty());
    }

    #[test]
    fn test_field_display() {
        assert_eq!(OverrideField::Resolutions.to_string(), "resolutions");
        assert_eq!(OverrideField::Overrides.to_string(), "overrides");
        assert_eq!(OverrideField::PnpmOverrides.to_string(), "pnpm.overrides");
    }
}
