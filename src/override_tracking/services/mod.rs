/// Domain services: pure business logic over the override data model.
pub mod appendix_builder;
pub mod garbage_collector;
pub mod patch_linker;
pub mod security_merger;

pub use appendix_builder::{AppendixBuilder, BuildContext};
pub use garbage_collector::{GarbageCollector, LivenessSignals, SweepReport};
pub use patch_linker::{PatchLinkReport, PatchLinker};
pub use security_merger::{ReasonMatch, ReasonSources, SecurityLedgerMerger, SecurityOverrideDetail};
