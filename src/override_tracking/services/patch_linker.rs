use crate::override_tracking::domain::appendix::{base_package, Appendix};
use std::collections::BTreeSet;

/// Outcome of one patch-linking pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchLinkReport {
    /// Number of patch files attached to appendix items.
    pub linked: usize,
    /// Patch files whose inferred package is absent from the dependency
    /// closure. Informational only; patches are never auto-deleted.
    pub unused: Vec<String>,
}

/// PatchLinker service - associates on-disk patch files with appendix
/// entries.
pub struct PatchLinker;

impl PatchLinker {
    /// Parses a patch filename into `(package, version)`.
    ///
    /// Supported shapes: `<pkg>+<version>.patch` and
    /// `@<scope>+<pkg>+<version>.patch` (reconstructed as `@scope/pkg`).
    /// Anything else is malformed and yields `None`.
    pub fn parse_patch_package(filename: &str) -> Option<(String, String)> {
        let stem = filename.strip_suffix(".patch")?;
        let parts: Vec<&str> = stem.split('+').collect();
        match parts.as_slice() {
            [package, version] if !package.starts_with('@') => {
                if package.is_empty() || version.is_empty() {
                    return None;
                }
                Some((package.to_string(), version.to_string()))
            }
            [scope, package, version] if scope.starts_with('@') => {
                if scope.len() < 2 || package.is_empty() || version.is_empty() {
                    return None;
                }
                Some((format!("{}/{}", scope, package), version.to_string()))
            }
            _ => None,
        }
    }

    /// Links patch files to matching appendix items and reports patches
    /// with no corresponding dependency. Malformed filenames are skipped
    /// silently.
    pub fn link(
        patch_files: &[String],
        appendix: &mut Appendix,
        all_deps: &BTreeSet<String>,
    ) -> PatchLinkReport {
        let mut report = PatchLinkReport::default();

        for filename in patch_files {
            let Some((package, _version)) = Self::parse_patch_package(filename) else {
                continue;
            };

            let mut attached = false;
            for (key, item) in appendix.0.iter_mut() {
                if base_package(key) == package {
                    item.attach_patch(filename);
                    attached = true;
                }
            }
            if attached {
                report.linked += 1;
            }

            if !all_deps.contains(&package) {
                report.unused.push(filename.clone());
            }
        }

        report
    }
}
