use crate::override_tracking::domain::PackageJson;
use crate::ports::outbound::{DependencyTreeOracle, ManifestStore, ProgressReporter};
use crate::shared::Result;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Per-invocation memoization context.
///
/// Holds the parsed-manifest cache and the installed-tree memo. A fresh
/// `RunCache` is constructed inside every pipeline execution and threaded
/// through explicitly, so the engine stays reentrant: nothing leaks between
/// invocations.
#[derive(Default)]
pub struct RunCache {
    manifests: DashMap<PathBuf, Arc<PackageJson>>,
    installed: OnceCell<Option<Arc<BTreeSet<String>>>>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a manifest through the cache. Concurrent readers of distinct
    /// paths never block each other; a repeated path is parsed once.
    pub async fn manifest<MS: ManifestStore>(
        &self,
        store: &MS,
        path: &Path,
    ) -> Result<Arc<PackageJson>> {
        if let Some(cached) = self.manifests.get(path) {
            return Ok(cached.clone());
        }
        let manifest = Arc::new(store.read_manifest(path).await?);
        self.manifests
            .insert(path.to_path_buf(), manifest.clone());
        Ok(manifest)
    }

    /// The flat installed reachability set, queried from the oracle at most
    /// once per run.
    ///
    /// Oracle failure is not fatal: it is logged at debug level and `None`
    /// is memoized, so liveness decisions fall back to the remaining
    /// signals without retrying the external process.
    pub async fn installed<DT, PR>(
        &self,
        oracle: &DT,
        project_path: &Path,
        reporter: &PR,
    ) -> Option<Arc<BTreeSet<String>>>
    where
        DT: DependencyTreeOracle,
        PR: ProgressReporter,
    {
        self.installed
            .get_or_init(|| async {
                match oracle.installed_packages(project_path).await {
                    Ok(tree) => Some(Arc::new(tree)),
                    Err(e) => {
                        reporter.report_debug(&format!(
                            "Dependency tree oracle unavailable, falling back to declared dependencies: {}",
                            e
                        ));
                        None
                    }
                }
            })
            .await
            .clone()
    }

    #[cfg(test)]
    pub fn manifest_cache_size(&self) -> usize {
        self.manifests.len()
    }
}
