use async_trait::async_trait;
use pastoralist::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Mock DependencyTreeOracle with a fixed installed set, or a configured
/// failure to exercise the fallback path.
#[derive(Default, Clone)]
pub struct MockDependencyTree {
    installed: Option<BTreeSet<String>>,
}

impl MockDependencyTree {
    /// An oracle that always fails, like a project without node_modules.
    pub fn unavailable() -> Self {
        Self { installed: None }
    }

    pub fn with_installed(packages: &[&str]) -> Self {
        Self {
            installed: Some(packages.iter().map(|p| p.to_string()).collect()),
        }
    }
}

#[async_trait]
impl DependencyTreeOracle for MockDependencyTree {
    async fn installed_packages(&self, _project_path: &Path) -> Result<BTreeSet<String>> {
        match &self.installed {
            Some(tree) => Ok(tree.clone()),
            None => anyhow::bail!("npm ls unavailable"),
        }
    }
}
