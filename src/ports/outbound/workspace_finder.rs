use crate::shared::Result;
use std::path::{Path, PathBuf};

/// WorkspaceFinder port for discovering workspace-member manifests.
///
/// Globbing is an external concern; implementations resolve patterns like
/// `packages/*` against the project root and return member `package.json`
/// paths, excluding the root manifest itself.
pub trait WorkspaceFinder {
    fn find_members(&self, root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>>;
}
