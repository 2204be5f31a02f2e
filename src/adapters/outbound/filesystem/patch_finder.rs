use crate::ports::outbound::PatchFinder;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Directory conventionally produced by `patch-package` and pnpm's
/// `patchedDependencies` workflow.
const PATCHES_DIR: &str = "patches";

/// DirectoryPatchFinder adapter enumerating `*.patch` files in the
/// project's `patches/` directory.
///
/// A missing directory is the common case and yields an empty list.
pub struct DirectoryPatchFinder;

impl DirectoryPatchFinder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectoryPatchFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchFinder for DirectoryPatchFinder {
    fn find_patch_files(&self, project_path: &Path) -> Result<Vec<String>> {
        let patches_dir = project_path.join(PATCHES_DIR);
        if !patches_dir.is_dir() {
            return Ok(vec![]);
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&patches_dir)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", patches_dir.display(), e))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".patch") {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
