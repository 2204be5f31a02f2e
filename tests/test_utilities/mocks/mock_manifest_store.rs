use async_trait::async_trait;
use pastoralist::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock ManifestStore backed by an in-memory map of JSON strings; records
/// every write for assertions.
#[derive(Default, Clone)]
pub struct MockManifestStore {
    manifests: HashMap<PathBuf, String>,
    writes: Arc<Mutex<Vec<(PathBuf, PackageJson)>>>,
}

impl MockManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, path: &str, json: &str) -> Self {
        self.manifests.insert(PathBuf::from(path), json.to_string());
        self
    }

    pub fn written_manifests(&self) -> Vec<(PathBuf, PackageJson)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl ManifestStore for MockManifestStore {
    async fn read_manifest(&self, path: &Path) -> Result<PackageJson> {
        let json = self
            .manifests
            .get(path)
            .ok_or_else(|| anyhow::anyhow!("no manifest at {}", path.display()))?;
        Ok(serde_json::from_str(json)?)
    }

    async fn write_manifest(&self, path: &Path, manifest: &PackageJson) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), manifest.clone()));
        Ok(())
    }
}
