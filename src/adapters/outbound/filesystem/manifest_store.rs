use crate::override_tracking::domain::PackageJson;
use crate::ports::outbound::ManifestStore;
use crate::shared::error::PastoralistError;
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

/// Maximum manifest size (10 MB). A `package.json` larger than this is not
/// a manifest.
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// FileSystemManifestStore adapter for reading and writing `package.json`
/// files on disk.
///
/// Reads go through security checks (no symlinks, regular files only, size
/// cap). Writes serialize with two-space indentation and a trailing newline
/// to match what package managers themselves produce.
pub struct FileSystemManifestStore;

impl FileSystemManifestStore {
    pub fn new() -> Self {
        Self
    }

    /// Safely read a file with security checks:
    /// - Reject symbolic links
    /// - Check file size limits
    /// - Validate file is a regular file
    async fn safe_read_file(&self, path: &Path) -> Result<String> {
        let metadata = fs::symlink_metadata(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read manifest metadata: {}", e))?;

        if metadata.is_symlink() {
            return Err(PastoralistError::SecurityError {
                path: path.to_path_buf(),
                reason: "file is a symbolic link".to_string(),
                hint: "Replace the symlink with a regular package.json file".to_string(),
            }
            .into());
        }

        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }

        let file_size = metadata.len();
        if file_size > MAX_FILE_SIZE {
            return Err(PastoralistError::SecurityError {
                path: path.to_path_buf(),
                reason: format!(
                    "file is too large ({} bytes, maximum is {} bytes)",
                    file_size, MAX_FILE_SIZE
                ),
                hint: "Verify that this is really a package.json manifest".to_string(),
            }
            .into());
        }

        fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
    }
}

impl Default for FileSystemManifestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManifestStore for FileSystemManifestStore {
    async fn read_manifest(&self, path: &Path) -> Result<PackageJson> {
        if !path.exists() {
            return Err(PastoralistError::ManifestNotFound {
                path: path.to_path_buf(),
                suggestion: format!(
                    "package.json does not exist at \"{}\".\n   \
                     Please run in the root directory of a Node.js project, or specify the correct path with the --path option.",
                    path.display()
                ),
            }
            .into());
        }

        let content = self.safe_read_file(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            PastoralistError::ManifestParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
            .into()
        })
    }

    async fn write_manifest(&self, path: &Path, manifest: &PackageJson) -> Result<()> {
        let mut content = serde_json::to_string_pretty(manifest).map_err(|e| {
            PastoralistError::FileWriteError {
                path: path.to_path_buf(),
                details: format!("serialization failed: {}", e),
            }
        })?;
        content.push('\n');

        fs::write(path, content).await.map_err(|e| {
            PastoralistError::FileWriteError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
            .into()
        })
    }
}
