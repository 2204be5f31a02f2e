use crate::application::run_cache::RunCache;
use crate::override_tracking::domain::{Appendix, AppendixItem};
use crate::override_tracking::services::{AppendixBuilder, BuildContext};
use crate::ports::outbound::{ManifestStore, ProgressReporter};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Aggregated result of scanning every workspace member.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceScan {
    /// Union of all partial appendices.
    pub appendix: Appendix,
    /// Union of every dependency name seen across members.
    pub all_deps: BTreeSet<String>,
    /// Per-member appendices keyed by member manifest path, including
    /// retained entries for members that could not be located this run.
    pub tracked_paths: BTreeMap<String, Appendix>,
}

/// ScanWorkspacesUseCase - runs the appendix builder across every workspace
/// member and merges the partial results.
///
/// Members are processed independently and concurrently; the union-merge is
/// commutative and associative, so execution order never changes the
/// result. A member that fails to read or parse is skipped with a log line
/// and never aborts the aggregate.
pub struct ScanWorkspacesUseCase<'a, MS, PR> {
    manifest_store: &'a MS,
    progress_reporter: &'a PR,
}

impl<'a, MS, PR> ScanWorkspacesUseCase<'a, MS, PR>
where
    MS: ManifestStore,
    PR: ProgressReporter,
{
    pub fn new(manifest_store: &'a MS, progress_reporter: &'a PR) -> Self {
        Self {
            manifest_store,
            progress_reporter,
        }
    }

    /// Scans the given member manifests against the root's resolved
    /// override map.
    ///
    /// `previous_paths` carries the per-path appendices persisted by the
    /// last run; a tracked path whose member cannot be located or yields no
    /// matches this run keeps its previous entry, so tracking survives runs
    /// where a member is temporarily missing.
    pub async fn scan(
        &self,
        cache: &RunCache,
        root: &Path,
        members: &[PathBuf],
        ctx: &BuildContext<'_>,
        previous_paths: Option<&BTreeMap<String, Appendix>>,
    ) -> WorkspaceScan {
        let reads = members
            .iter()
            .map(|path| self.cache_read(cache, path));
        let manifests = futures::future::join_all(reads).await;

        let mut scan = WorkspaceScan::default();
        if let Some(previous) = previous_paths {
            scan.tracked_paths = previous.clone();
        }

        for (path, outcome) in members.iter().zip(manifests) {
            let key = Self::path_key(root, path);
            match outcome {
                Ok(manifest) => {
                    scan.all_deps.extend(manifest.dependency_names());
                    let partial = AppendixBuilder::build(ctx, &manifest);
                    if !partial.is_empty() {
                        // The per-path entry records only this member's own
                        // dependents; baseline dependents from other
                        // consumers stay out of it.
                        scan.tracked_paths
                            .insert(key, Self::member_view(&partial, manifest.package_label()));
                        scan.appendix.merge(partial);
                    }
                    // An empty partial leaves any previously tracked entry
                    // for this path in place.
                }
                Err(e) => {
                    self.progress_reporter.report_error(&format!(
                        "⚠️  Warning: Skipping workspace member {}: {}",
                        path.display(),
                        e
                    ));
                }
            }
        }

        scan
    }

    async fn cache_read(
        &self,
        cache: &RunCache,
        path: &Path,
    ) -> crate::shared::Result<std::sync::Arc<crate::override_tracking::domain::PackageJson>> {
        cache.manifest(self.manifest_store, path).await
    }

    /// Restricts a partial appendix to the dependents contributed by one
    /// consumer. Ledgers and patches carry over; entries the consumer does
    /// not use are dropped.
    fn member_view(partial: &Appendix, consumer: &str) -> Appendix {
        let mut view = Appendix::new();
        for (key, item) in partial.iter() {
            if let Some(value) = item.dependents.get(consumer) {
                let mut own = AppendixItem::default();
                own.dependents.insert(consumer.to_string(), value.clone());
                own.ledger = item.ledger.clone();
                own.patches = item.patches.clone();
                view.insert(key.clone(), own);
            }
        }
        view
    }

    fn path_key(root: &Path, path: &Path) -> String {
        path.strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}
