pub mod manifest_store;
pub mod patch_finder;
pub mod workspace_finder;

pub use manifest_store::FileSystemManifestStore;
pub use patch_finder::DirectoryPatchFinder;
pub use workspace_finder::GlobWorkspaceFinder;
