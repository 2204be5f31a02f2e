use pastoralist::adapters::outbound::console::StderrProgressReporter;
use pastoralist::adapters::outbound::filesystem::{
    DirectoryPatchFinder, FileSystemManifestStore, GlobWorkspaceFinder,
};
use pastoralist::adapters::outbound::network::OsvSecurityProvider;
use pastoralist::adapters::outbound::process::NpmTreeOracle;
use pastoralist::application::dto::UpdateRequest;
use pastoralist::application::use_cases::UpdateAppendixUseCase;
use pastoralist::cli::Args;
use pastoralist::shared::error::{ExitCode, PastoralistError};
use pastoralist::shared::Result;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

async fn run() -> Result<()> {
    let args = Args::parse_args();

    let project_dir = args.path.as_deref().unwrap_or(".");
    let project_path = PathBuf::from(project_dir);
    validate_project_path(&project_path)?;

    // Create adapters (Dependency Injection)
    let manifest_store = FileSystemManifestStore::new();
    let workspace_finder = GlobWorkspaceFinder::new();
    let dependency_tree = NpmTreeOracle::new();
    let security_provider = Some(OsvSecurityProvider::new()?);
    let patch_finder = Box::new(DirectoryPatchFinder::new());
    let progress_reporter = StderrProgressReporter::new(args.debug);

    let use_case = UpdateAppendixUseCase::new(
        manifest_store,
        workspace_finder,
        dependency_tree,
        security_provider,
        patch_finder,
        progress_reporter,
    );

    let request = UpdateRequest::new(project_path, args.dry_run, args.cli_overrides());
    let response = use_case.execute(request).await?;

    if !response.reason_prompt_candidates.is_empty() {
        eprintln!(
            "\n💡 Hint: {} override(s) have no documented reason: {}\n   \
             Re-run with --reason \"...\" or add pastoralist.security.overrideReasons to package.json.",
            response.reason_prompt_candidates.len(),
            response.reason_prompt_candidates.join(", ")
        );
    }

    Ok(())
}

fn validate_project_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PastoralistError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Directory does not exist".to_string(),
        }
        .into());
    }

    // Security check: Reject symbolic links for project paths
    let metadata =
        std::fs::symlink_metadata(path).map_err(|e| PastoralistError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read path metadata: {}", e),
        })?;

    if metadata.is_symlink() {
        return Err(PastoralistError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Security: Project path is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        }
        .into());
    }

    if !path.is_dir() {
        return Err(PastoralistError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    // Security check: Canonicalize path to prevent path traversal
    let canonical_path =
        path.canonicalize()
            .map_err(|e| PastoralistError::InvalidProjectPath {
                path: path.to_path_buf(),
                reason: format!("Failed to canonicalize path: {}", e),
            })?;

    if !canonical_path.is_dir() {
        return Err(PastoralistError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Resolved path is not a directory".to_string(),
        }
        .into());
    }

    Ok(())
}
