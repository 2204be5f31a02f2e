//! pastoralist - override and resolution tracking for package.json
//!
//! This library keeps npm `overrides`, yarn `resolutions` and pnpm
//! `pnpm.overrides` accountable: every override directive gets an appendix
//! entry recording which packages depend on it and why it exists, and
//! directives nothing depends on anymore are garbage collected. All state
//! lives inside `package.json` itself, under a private `pastoralist` object.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`override_tracking`): Manifest model, appendix model
//!   and the pure services that build, merge and sweep appendices
//! - **Application Layer** (`application`): Use cases, DTOs and per-run
//!   caching
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use pastoralist::prelude::*;
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let use_case = UpdateAppendixUseCase::new(
//!     FileSystemManifestStore::new(),
//!     GlobWorkspaceFinder::new(),
//!     NpmTreeOracle::new(),
//!     Some(OsvSecurityProvider::new()?),
//!     Box::new(DirectoryPatchFinder::new()),
//!     StderrProgressReporter::new(false),
//! );
//!
//! let request = UpdateRequest::new(PathBuf::from("."), false, CliOverrides::default());
//! let response = use_case.execute(request).await?;
//! println!("{} entries tracked", response.appendix.len());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod override_tracking;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        DirectoryPatchFinder, FileSystemManifestStore, GlobWorkspaceFinder,
    };
    pub use crate::adapters::outbound::network::OsvSecurityProvider;
    pub use crate::adapters::outbound::process::NpmTreeOracle;
    pub use crate::application::dto::{UpdateRequest, UpdateResponse};
    pub use crate::application::use_cases::UpdateAppendixUseCase;
    pub use crate::config::CliOverrides;
    pub use crate::override_tracking::domain::{
        Appendix, AppendixItem, Ledger, PackageJson, ResolvedOverrides, TrackingConfig,
    };
    pub use crate::ports::outbound::{
        DependencyTreeOracle, ManifestStore, PackageQuery, PatchFinder, ProgressReporter,
        SecurityProvider, WorkspaceFinder,
    };
    pub use crate::shared::Result;
}
