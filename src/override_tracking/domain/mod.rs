/// Domain layer: pure data model and comparison logic, no I/O.
pub mod appendix;
pub mod manifest;
pub mod override_source;
pub mod semver_range;

pub use appendix::{Appendix, AppendixItem, Ledger};
pub use manifest::{DepPaths, PackageJson, SecuritySettings, TrackingConfig, Workspaces};
pub use override_source::{OverrideField, OverrideTarget, ResolvedOverrides};
