/// Mock implementations for testing
mod mock_dependency_tree;
mod mock_manifest_store;
mod mock_progress_reporter;
mod mock_security_provider;
mod mock_workspace_finder;

pub use mock_dependency_tree::MockDependencyTree;
pub use mock_manifest_store::MockManifestStore;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_security_provider::MockSecurityProvider;
pub use mock_workspace_finder::MockWorkspaceFinder;
