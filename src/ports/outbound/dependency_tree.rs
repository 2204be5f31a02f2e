use crate::shared::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;

/// DependencyTreeOracle port wrapping the installed dependency tree.
///
/// Returns a flat reachability set: every package name reachable from the
/// project's installed tree. The call is a blocking external-process
/// invocation; the pipeline memoizes it so it runs at most once per run.
#[async_trait]
pub trait DependencyTreeOracle {
    async fn installed_packages(&self, project_path: &Path) -> Result<BTreeSet<String>>;
}
