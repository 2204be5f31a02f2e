use pastoralist::prelude::*;
use std::path::{Path, PathBuf};

/// Mock WorkspaceFinder returning a fixed member list regardless of the
/// patterns supplied.
#[derive(Default, Clone)]
pub struct MockWorkspaceFinder {
    members: Vec<PathBuf>,
}

impl MockWorkspaceFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, path: &str) -> Self {
        self.members.push(PathBuf::from(path));
        self
    }
}

impl WorkspaceFinder for MockWorkspaceFinder {
    fn find_members(&self, _root: &Path, _patterns: &[String]) -> Result<Vec<PathBuf>> {
        Ok(self.members.clone())
    }
}
