use crate::override_tracking::domain::PackageJson;
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// ManifestStore port for reading and writing `package.json` manifests.
///
/// The core performs no file I/O directly; this port abstracts both
/// directions. Writes are single-shot: the pipeline calls `write_manifest`
/// at most once per run, after all computation.
#[async_trait]
pub trait ManifestStore {
    /// Reads and parses a manifest file.
    ///
    /// # Errors
    /// Returns an error if the file does not exist, cannot be read, or is
    /// not valid JSON.
    async fn read_manifest(&self, path: &Path) -> Result<PackageJson>;

    /// Writes a manifest file, replacing its contents.
    async fn write_manifest(&self, path: &Path, manifest: &PackageJson) -> Result<()>;
}
