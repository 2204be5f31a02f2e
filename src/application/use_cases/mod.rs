/// Application use cases - one per driving operation.
pub mod scan_workspaces;
pub mod update_appendix;

pub use scan_workspaces::{ScanWorkspacesUseCase, WorkspaceScan};
pub use update_appendix::UpdateAppendixUseCase;
