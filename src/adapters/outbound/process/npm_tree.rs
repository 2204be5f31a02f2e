use crate::ports::outbound::DependencyTreeOracle;
use crate::shared::error::PastoralistError;
use crate::shared::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// How long `npm ls` may run before the oracle gives up.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// NpmTreeOracle adapter wrapping `npm ls --all --json`.
///
/// Flattens the returned tree into the set of every installed package name.
/// `npm ls` exits non-zero on peer-dependency problems while still printing
/// a usable tree, so the exit status is ignored as long as stdout parses.
pub struct NpmTreeOracle;

impl NpmTreeOracle {
    pub fn new() -> Self {
        Self
    }

    fn collect_names(node: &Value, names: &mut BTreeSet<String>) {
        if let Some(dependencies) = node.get("dependencies").and_then(Value::as_object) {
            for (name, child) in dependencies {
                names.insert(name.clone());
                Self::collect_names(child, names);
            }
        }
    }
}

impl Default for NpmTreeOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyTreeOracle for NpmTreeOracle {
    async fn installed_packages(&self, project_path: &Path) -> Result<BTreeSet<String>> {
        let output = tokio::time::timeout(
            COMMAND_TIMEOUT,
            Command::new("npm")
                .args(["ls", "--all", "--json"])
                .current_dir(project_path)
                .output(),
        )
        .await
        .map_err(|_| PastoralistError::DependencyTreeUnavailable {
            details: format!("npm ls timed out after {}s", COMMAND_TIMEOUT.as_secs()),
        })?
        .map_err(|e| PastoralistError::DependencyTreeUnavailable {
            details: format!("failed to spawn npm: {}", e),
        })?;

        if output.stdout.is_empty() {
            return Err(PastoralistError::DependencyTreeUnavailable {
                details: format!(
                    "npm ls produced no output (status {}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }
            .into());
        }

        let tree: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            PastoralistError::DependencyTreeUnavailable {
                details: format!("npm ls output was not valid JSON: {}", e),
            }
        })?;

        let mut names = BTreeSet::new();
        Self::collect_names(&tree, &mut names);
        Ok(names)
    }
}
