use crate::config::CliOverrides;
use std::path::PathBuf;

/// UpdateRequest - Internal request DTO for the appendix update use case.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Path to the project directory containing package.json
    pub project_path: PathBuf,
    /// When set, the pipeline computes the full result but skips the write
    pub dry_run: bool,
    /// Raw CLI options, merged with manifest config inside the use case
    pub cli: CliOverrides,
}

impl UpdateRequest {
    pub fn new(project_path: PathBuf, dry_run: bool, cli: CliOverrides) -> Self {
        Self {
            project_path,
            dry_run,
            cli,
        }
    }
}
