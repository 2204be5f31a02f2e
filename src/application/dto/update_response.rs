use crate::override_tracking::domain::Appendix;
use crate::override_tracking::services::{PatchLinkReport, SweepReport};
use std::collections::BTreeMap;

/// UpdateResponse - the full reconstructed result of one pipeline run.
///
/// Returned in both normal and dry-run mode; `wrote` records whether the
/// manifest was actually rewritten.
#[derive(Debug, Clone, Default)]
pub struct UpdateResponse {
    /// The merged appendix after building, security merging, GC and patch
    /// linking.
    pub appendix: Appendix,
    /// Per-workspace-member appendices, keyed by member manifest path.
    pub tracked_paths: BTreeMap<String, Appendix>,
    /// What garbage collection removed this run.
    pub swept: SweepReport,
    /// Patch linking outcome, including unused patches.
    pub patches: PatchLinkReport,
    /// Override packages still lacking a ledger reason - candidates for an
    /// interactive prompt.
    pub reason_prompt_candidates: Vec<String>,
    /// Which override field was authoritative, as a display string.
    pub override_field: Option<String>,
    /// Whether the manifest was written.
    pub wrote: bool,
}
