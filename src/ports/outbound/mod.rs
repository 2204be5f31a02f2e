/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, process, network,
/// console, etc.).
pub mod dependency_tree;
pub mod manifest_store;
pub mod patch_finder;
pub mod progress_reporter;
pub mod security_provider;
pub mod workspace_finder;

pub use dependency_tree::DependencyTreeOracle;
pub use manifest_store::ManifestStore;
pub use patch_finder::PatchFinder;
pub use progress_reporter::ProgressReporter;
pub use security_provider::{PackageQuery, SecurityProvider};
pub use workspace_finder::WorkspaceFinder;
