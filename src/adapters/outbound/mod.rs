/// Outbound adapters - Infrastructure implementations
///
/// These adapters implement the outbound ports, providing concrete
/// integrations with the file system, external processes, the network
/// and the console.
pub mod console;
pub mod filesystem;
pub mod network;
pub mod process;

pub use console::StderrProgressReporter;
pub use filesystem::{DirectoryPatchFinder, FileSystemManifestStore, GlobWorkspaceFinder};
pub use network::OsvSecurityProvider;
pub use process::NpmTreeOracle;
