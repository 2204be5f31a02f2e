use crate::shared::Result;
use std::path::Path;

/// PatchFinder port for enumerating on-disk patch files.
///
/// Returns bare filenames (`lodash+4.17.21.patch`), not paths; the patch
/// linker only needs the name to infer the package.
pub trait PatchFinder {
    fn find_patch_files(&self, project_path: &Path) -> Result<Vec<String>>;
}
