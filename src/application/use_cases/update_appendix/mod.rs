use crate::application::dto::{UpdateRequest, UpdateResponse};
use crate::application::run_cache::RunCache;
use crate::application::use_cases::ScanWorkspacesUseCase;
use crate::config::{self, EffectiveOptions};
use crate::override_tracking::domain::{
    Appendix, OverrideField, PackageJson, ResolvedOverrides, TrackingConfig,
};
use crate::override_tracking::domain::override_source::OverrideTarget;
use crate::override_tracking::services::{
    AppendixBuilder, BuildContext, GarbageCollector, LivenessSignals, PatchLinker, ReasonSources,
    SecurityLedgerMerger, SecurityOverrideDetail,
};
use crate::ports::outbound::{
    DependencyTreeOracle, ManifestStore, PackageQuery, PatchFinder, ProgressReporter,
    SecurityProvider, WorkspaceFinder,
};
use crate::shared::error::PastoralistError;
use crate::shared::Result;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// UpdateAppendixUseCase - the one-pipeline-per-invocation core.
///
/// Orchestrates: override resolution, security metadata fetch, appendix
/// building across the root and workspace members, garbage collection,
/// patch linking, and the single manifest write. All infrastructure is
/// injected through generic ports.
///
/// # Type Parameters
/// * `MS` - ManifestStore implementation
/// * `WF` - WorkspaceFinder implementation
/// * `DT` - DependencyTreeOracle implementation
/// * `SP` - SecurityProvider implementation (optional)
/// * `PR` - ProgressReporter implementation
pub struct UpdateAppendixUseCase<MS, WF, DT, SP, PR> {
    manifest_store: MS,
    workspace_finder: WF,
    dependency_tree: DT,
    security_provider: Option<SP>,
    patch_finder: Box<dyn PatchFinder>,
    progress_reporter: PR,
}

impl<MS, WF, DT, SP, PR> UpdateAppendixUseCase<MS, WF, DT, SP, PR>
where
    MS: ManifestStore,
    WF: WorkspaceFinder,
    DT: DependencyTreeOracle,
    SP: SecurityProvider,
    PR: ProgressReporter,
{
    /// Creates a new UpdateAppendixUseCase with injected dependencies
    pub fn new(
        manifest_store: MS,
        workspace_finder: WF,
        dependency_tree: DT,
        security_provider: Option<SP>,
        patch_finder: Box<dyn PatchFinder>,
        progress_reporter: PR,
    ) -> Self {
        Self {
            manifest_store,
            workspace_finder,
            dependency_tree,
            security_provider,
            patch_finder,
            progress_reporter,
        }
    }

    /// Executes the appendix update pipeline.
    ///
    /// Exactly one manifest write happens per run, after all reads and
    /// computation; dry-run mode short-circuits the write while still
    /// returning the full reconstructed result.
    pub async fn execute(&self, request: UpdateRequest) -> Result<UpdateResponse> {
        let cache = RunCache::new();
        let manifest_path = request.project_path.join("package.json");

        // An unreadable root manifest degrades to an empty result, never a
        // crash: nothing is tracked, nothing is written.
        let root_manifest = match cache.manifest(&self.manifest_store, &manifest_path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                self.progress_reporter
                    .report_error(&format!("⚠️  Warning: Could not load manifest: {}", e));
                return Ok(UpdateResponse::default());
            }
        };

        let options = config::resolve_options(&request.cli, root_manifest.pastoralist.as_ref());
        let previous_config = root_manifest.pastoralist.clone().unwrap_or_default();

        let Some(mut overrides) = ResolvedOverrides::from_manifest(&root_manifest) else {
            return self
                .finish_without_overrides(&request, &manifest_path, &root_manifest)
                .await;
        };
        self.progress_reporter.report(&format!(
            "🔍 Resolved {} override(s) from \"{}\"",
            overrides.len(),
            overrides.field
        ));

        // Security metadata is fetched before any entry is created so new
        // ledgers can carry it; failures never block appendix building.
        let security_details = self.fetch_security_details(&overrides, &options).await?;
        let reasons = ReasonSources {
            explicit: options.explicit_reason.as_deref(),
            security: Some(&security_details),
            manual: Some(&options.manual_reasons),
        };

        // One oracle call per run, memoized, awaited before any liveness
        // decision or transitive annotation.
        let installed = cache
            .installed(&self.dependency_tree, &request.project_path, &self.progress_reporter)
            .await;

        let ctx = BuildContext {
            overrides: &overrides,
            baseline: &previous_config.appendix,
            reasons: &reasons,
            installed: installed.as_deref(),
            now: Utc::now(),
        };

        let mut appendix = AppendixBuilder::build(&ctx, &root_manifest);
        let mut all_deps = root_manifest.dependency_names();

        // Workspace members, when configured.
        let members = self.discover_members(&request.project_path, &root_manifest, &options);
        let previous_paths = previous_config.tracked_paths();
        let tracked_paths = if members.is_empty() {
            previous_paths.cloned().unwrap_or_default()
        } else {
            self.progress_reporter
                .report(&format!("📦 Scanning {} workspace member(s)", members.len()));
            let scanner = ScanWorkspacesUseCase::new(&self.manifest_store, &self.progress_reporter);
            let scan = scanner
                .scan(&cache, &request.project_path, &members, &ctx, previous_paths)
                .await;
            appendix.merge(scan.appendix);
            all_deps.extend(scan.all_deps);
            scan.tracked_paths
        };

        // Mark and sweep.
        let missing_in_root: BTreeSet<String> = overrides
            .package_names()
            .into_iter()
            .filter(|package| !all_deps.contains(package))
            .collect();
        let signals = LivenessSignals {
            all_deps: Some(&all_deps),
            override_paths: (!tracked_paths.is_empty()).then_some(&tracked_paths),
            installed: installed.as_deref(),
        };
        let swept =
            GarbageCollector::sweep(&mut overrides, &mut appendix, &signals, &missing_in_root);
        for removed in &swept.removed_overrides {
            self.progress_reporter
                .report(&format!("🗑️  Removed unused override: {}", removed));
        }

        // Patch linking, informational only.
        let patch_files = match self.patch_finder.find_patch_files(&request.project_path) {
            Ok(files) => files,
            Err(e) => {
                self.progress_reporter
                    .report_debug(&format!("Patch scan skipped: {}", e));
                vec![]
            }
        };
        let patches = PatchLinker::link(&patch_files, &mut appendix, &all_deps);
        for unused in &patches.unused {
            self.progress_reporter.report(&format!(
                "ℹ️  Patch file {} matches no tracked dependency",
                unused
            ));
        }

        let reason_prompt_candidates =
            SecurityLedgerMerger::prompt_candidates(&overrides, &appendix, &reasons);

        // Compose and (maybe) write the updated manifest - the run's only
        // write.
        let updated = self.compose_manifest(
            &root_manifest,
            &overrides,
            &swept.removed_overrides,
            &appendix,
            &tracked_paths,
            &previous_config,
        );
        let wrote = self
            .write_if_changed(&request, &manifest_path, &root_manifest, &updated)
            .await?;

        self.progress_reporter.report_completion(&format!(
            "✅ Appendix up to date: {} entr{} tracked",
            appendix.len(),
            if appendix.len() == 1 { "y" } else { "ies" }
        ));

        Ok(UpdateResponse {
            appendix,
            tracked_paths,
            swept,
            patches,
            reason_prompt_candidates,
            override_field: Some(overrides.field.to_string()),
            wrote,
        })
    }

    /// No override field populated: any previously tracked state is stale
    /// and gets cleared, but user config (depPaths, security) survives.
    async fn finish_without_overrides(
        &self,
        request: &UpdateRequest,
        manifest_path: &Path,
        root_manifest: &PackageJson,
    ) -> Result<UpdateResponse> {
        self.progress_reporter
            .report("🔍 No overrides or resolutions declared");

        let mut updated = root_manifest.clone();
        if let Some(config) = updated.pastoralist.as_mut() {
            config.appendix = Appendix::new();
            config.override_paths = None;
            config.resolution_paths = None;
            if config.is_empty() {
                updated.pastoralist = None;
            }
        }
        let wrote = self
            .write_if_changed(request, manifest_path, root_manifest, &updated)
            .await?;

        Ok(UpdateResponse {
            wrote,
            ..UpdateResponse::default()
        })
    }

    /// Fetches vulnerability records for every overridden package when a
    /// security check is enabled and a provider is wired in. Requesting a
    /// provider name the wired-in provider does not answer to is a hard
    /// error; a lookup failure degrades to "no security metadata" with a
    /// warning.
    async fn fetch_security_details(
        &self,
        overrides: &ResolvedOverrides,
        options: &EffectiveOptions,
    ) -> Result<BTreeMap<String, SecurityOverrideDetail>> {
        if !options.security_enabled {
            return Ok(BTreeMap::new());
        }
        let Some(provider) = &self.security_provider else {
            self.progress_reporter.report_error(
                "⚠️  Warning: Security check requested but no provider is configured",
            );
            return Ok(BTreeMap::new());
        };
        if let Some(requested) = options.provider.as_deref() {
            if requested != provider.provider_name() {
                return Err(PastoralistError::UnknownSecurityProvider {
                    requested: requested.to_string(),
                    supported: provider.provider_name().to_string(),
                }
                .into());
            }
        }

        let queries: Vec<PackageQuery> = overrides
            .targets
            .iter()
            .flat_map(|(package, target)| match target {
                OverrideTarget::Version(pin) => {
                    vec![PackageQuery::new(package.clone(), pin.clone())]
                }
                OverrideTarget::Nested(children) => children
                    .iter()
                    .map(|(child, version)| PackageQuery::new(child.clone(), version.clone()))
                    .collect(),
            })
            .collect();

        self.progress_reporter.report(&format!(
            "🔐 Checking {} package(s) against {}",
            queries.len(),
            provider.provider_name()
        ));
        match provider.fetch_override_details(queries).await {
            Ok(details) => Ok(details
                .into_iter()
                .map(|detail| (detail.package_name.clone(), detail))
                .collect()),
            Err(e) => {
                self.progress_reporter
                    .report_error(&format!("⚠️  Warning: Security check failed: {}", e));
                Ok(BTreeMap::new())
            }
        }
    }

    /// Resolves workspace member manifest paths from the effective
    /// depPaths option. Discovery failures degrade to an empty member list.
    fn discover_members(
        &self,
        root: &Path,
        root_manifest: &PackageJson,
        options: &EffectiveOptions,
    ) -> Vec<PathBuf> {
        let Some(dep_paths) = &options.dep_paths else {
            return vec![];
        };
        let patterns = if dep_paths.is_workspace_sentinel() {
            root_manifest.workspace_patterns().unwrap_or_default()
        } else {
            dep_paths.patterns()
        };
        if patterns.is_empty() {
            return vec![];
        }
        match self.workspace_finder.find_members(root, &patterns) {
            Ok(members) => members,
            Err(e) => {
                self.progress_reporter.report_error(&format!(
                    "⚠️  Warning: Workspace discovery failed: {}",
                    e
                ));
                vec![]
            }
        }
    }

    /// Builds the updated manifest: swept overrides removed from the raw
    /// field, the fresh appendix and per-path appendices stored under
    /// `pastoralist`, user config preserved.
    fn compose_manifest(
        &self,
        root_manifest: &PackageJson,
        overrides: &ResolvedOverrides,
        removed_overrides: &[String],
        appendix: &Appendix,
        tracked_paths: &BTreeMap<String, Appendix>,
        previous_config: &TrackingConfig,
    ) -> PackageJson {
        let mut updated = root_manifest.clone();
        for package in removed_overrides {
            updated.remove_override(overrides.field, package);
        }

        let mut config = TrackingConfig {
            appendix: appendix.clone(),
            dep_paths: previous_config.dep_paths.clone(),
            override_paths: None,
            resolution_paths: None,
            security: previous_config.security.clone(),
        };
        if !tracked_paths.is_empty() {
            match overrides.field {
                OverrideField::Resolutions => {
                    config.resolution_paths = Some(tracked_paths.clone());
                }
                OverrideField::Overrides | OverrideField::PnpmOverrides => {
                    config.override_paths = Some(tracked_paths.clone());
                }
            }
        }
        updated.pastoralist = (!config.is_empty()).then_some(config);
        updated
    }

    /// The single-writer gate: writes only when something changed and the
    /// run is not a dry run.
    async fn write_if_changed(
        &self,
        request: &UpdateRequest,
        manifest_path: &Path,
        original: &PackageJson,
        updated: &PackageJson,
    ) -> Result<bool> {
        if updated == original {
            return Ok(false);
        }
        if request.dry_run {
            self.progress_reporter
                .report("📝 Dry run: manifest changes computed but not written");
            return Ok(false);
        }
        self.manifest_store
            .write_manifest(manifest_path, updated)
            .await?;
        Ok(true)
    }
}
