use crate::ports::outbound::WorkspaceFinder;
use crate::shared::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never descended into during member discovery.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// GlobWorkspaceFinder adapter resolving workspace glob patterns against the
/// project directory.
///
/// Accepts both directory patterns (`packages/*`, as written in the
/// `workspaces` field) and explicit manifest patterns
/// (`packages/*/package.json`, as written in `depPaths`); directory patterns
/// get `/package.json` appended. The root manifest itself is never a member.
pub struct GlobWorkspaceFinder;

impl GlobWorkspaceFinder {
    pub fn new() -> Self {
        Self
    }

    fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let manifest_pattern = if pattern.ends_with("package.json") {
                pattern.clone()
            } else {
                format!("{}/package.json", pattern.trim_end_matches('/'))
            };
            let glob = Glob::new(&manifest_pattern)
                .map_err(|e| anyhow::anyhow!("Invalid workspace pattern \"{}\": {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

impl Default for GlobWorkspaceFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceFinder for GlobWorkspaceFinder {
    fn find_members(&self, root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
        let glob_set = Self::build_glob_set(patterns)?;
        let mut members = Vec::new();

        let walker = WalkDir::new(root).follow_links(false).into_iter();
        for entry in walker.filter_entry(|e| {
            e.file_name()
                .to_str()
                .map(|name| !SKIPPED_DIRS.contains(&name))
                .unwrap_or(true)
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable subtrees are skipped, not fatal.
                Err(_) => continue,
            };
            if !entry.file_type().is_file() || entry.file_name() != "package.json" {
                continue;
            }
            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            // The root manifest is the pipeline's input, not a member.
            if relative == Path::new("package.json") {
                continue;
            }
            if glob_set.is_match(relative) {
                members.push(entry.path().to_path_buf());
            }
        }

        members.sort();
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_members(members: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("package.json"), "{}").unwrap();
        for member in members {
            let dir = temp_dir.path().join(member);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("package.json"), "{}").unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_directory_pattern_finds_members() {
        let project = project_with_members(&["packages/web", "packages/api"]);
        let finder = GlobWorkspaceFinder::new();

        let members = finder
            .find_members(project.path(), &["packages/*".to_string()])
            .unwrap();

        assert_eq!(members.len(), 2);
        assert!(members[0].ends_with("packages/api/package.json"));
        assert!(members[1].ends_with("packages/web/package.json"));
    }

    #[test]
    fn test_explicit_manifest_pattern() {
        let project = project_with_members(&["apps/cli"]);
        let finder = GlobWorkspaceFinder::new();

        let members = finder
            .find_members(project.path(), &["apps/*/package.json".to_string()])
            .unwrap();

        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_root_manifest_excluded() {
        let project = project_with_members(&[]);
        let finder = GlobWorkspaceFinder::new();

        let members = finder
            .find_members(project.path(), &["**".to_string()])
            .unwrap();

        assert!(members.is_empty());
    }

    #[test]
    fn test_node_modules_never_scanned() {
        let project = project_with_members(&["packages/web"]);
        let vendored = project.path().join("packages/web/node_modules/lodash");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join("package.json"), "{}").unwrap();
        let finder = GlobWorkspaceFinder::new();

        let members = finder
            .find_members(project.path(), &["packages/**".to_string()])
            .unwrap();

        assert_eq!(members.len(), 1);
        assert!(members[0].ends_with("packages/web/package.json"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let project = project_with_members(&[]);
        let finder = GlobWorkspaceFinder::new();

        let result = finder.find_members(project.path(), &["packages/[".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_matches_returns_empty() {
        let project = project_with_members(&["packages/web"]);
        let finder = GlobWorkspaceFinder::new();

        let members = finder
            .find_members(project.path(), &["apps/*".to_string()])
            .unwrap();
        assert!(members.is_empty());
    }
}
