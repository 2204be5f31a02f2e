/// End-to-end tests for the CLI
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn project_with_manifest(json: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("package.json"), json).unwrap();
    temp_dir
}

fn pastoralist() -> Command {
    Command::cargo_bin("pastoralist").unwrap()
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        pastoralist().arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        pastoralist().arg("--version").assert().code(0);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        pastoralist().arg("--invalid-option").assert().code(2);
    }

    /// Exit code 2: --provider without --check-security
    #[test]
    fn test_exit_code_provider_without_security() {
        pastoralist().args(["--provider", "osv"]).assert().code(2);
    }

    /// Exit code 1: Application error - non-existent project path
    #[test]
    fn test_exit_code_nonexistent_path() {
        pastoralist()
            .args(["--path", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Directory does not exist"));
    }

    /// Exit code 1: Application error - path is a file, not a directory
    #[test]
    fn test_exit_code_file_not_directory() {
        pastoralist()
            .args(["--path", "Cargo.toml"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Not a directory"));
    }
}

#[test]
fn test_e2e_tracks_override_in_manifest() {
    let project = project_with_manifest(
        r#"{
            "name": "app",
            "dependencies": {"lodash": "^4.17.0"},
            "overrides": {"lodash": "4.17.21"}
        }"#,
    );

    pastoralist()
        .args(["--path", project.path().to_str().unwrap()])
        .assert()
        .code(0);

    let manifest = fs::read_to_string(project.path().join("package.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    let item = &value["pastoralist"]["appendix"]["lodash@4.17.21"];
    assert_eq!(item["dependents"]["app"], "lodash@^4.17.0");
    assert!(item["ledger"]["addedDate"].is_string());
    assert!(manifest.ends_with('\n'));
}

#[test]
fn test_e2e_dry_run_leaves_manifest_untouched() {
    let original = r#"{
            "name": "app",
            "dependencies": {"lodash": "^4.17.0"},
            "overrides": {"lodash": "4.17.21"}
        }"#;
    let project = project_with_manifest(original);

    pastoralist()
        .args(["--path", project.path().to_str().unwrap(), "--dry-run"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Dry run"));

    let manifest = fs::read_to_string(project.path().join("package.json")).unwrap();
    assert_eq!(manifest, original);
}

#[test]
fn test_e2e_manifest_without_overrides_untouched() {
    let original = r#"{"name": "app", "dependencies": {"lodash": "^4.17.0"}}"#;
    let project = project_with_manifest(original);

    pastoralist()
        .args(["--path", project.path().to_str().unwrap()])
        .assert()
        .code(0);

    let manifest = fs::read_to_string(project.path().join("package.json")).unwrap();
    assert_eq!(manifest, original);
}

#[test]
fn test_e2e_invalid_json_fails_gracefully() {
    let project = project_with_manifest("{this is not json");

    // An unreadable manifest degrades to an empty run, not a crash.
    pastoralist()
        .args(["--path", project.path().to_str().unwrap()])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Could not load manifest"));
}

#[test]
fn test_e2e_unknown_provider_rejected() {
    let project = project_with_manifest(
        r#"{
            "name": "app",
            "dependencies": {"lodash": "^4.17.0"},
            "overrides": {"lodash": "4.17.21"}
        }"#,
    );

    pastoralist()
        .args([
            "--path",
            project.path().to_str().unwrap(),
            "--check-security",
            "--provider",
            "snyk",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown security provider: snyk"));
}

#[test]
fn test_e2e_reason_recorded_in_ledger() {
    let project = project_with_manifest(
        r#"{
            "name": "app",
            "dependencies": {"lodash": "^4.17.0"},
            "overrides": {"lodash": "4.17.21"}
        }"#,
    );

    pastoralist()
        .args([
            "--path",
            project.path().to_str().unwrap(),
            "--reason",
            "pinned for CVE-2021-23337",
        ])
        .assert()
        .code(0);

    let manifest = fs::read_to_string(project.path().join("package.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(
        value["pastoralist"]["appendix"]["lodash@4.17.21"]["ledger"]["reason"],
        "pinned for CVE-2021-23337"
    );
}

#[test]
fn test_e2e_second_run_is_stable() {
    let project = project_with_manifest(
        r#"{
            "name": "app",
            "dependencies": {"lodash": "^4.17.0"},
            "overrides": {"lodash": "4.17.21"}
        }"#,
    );
    let path = project.path().to_str().unwrap().to_string();

    pastoralist().args(["--path", &path]).assert().code(0);
    let first = fs::read_to_string(project.path().join("package.json")).unwrap();

    pastoralist().args(["--path", &path]).assert().code(0);
    let second = fs::read_to_string(project.path().join("package.json")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_e2e_workspace_members_via_dep_paths() {
    let project = project_with_manifest(
        r#"{
            "name": "root",
            "overrides": {"react": "18.2.0"}
        }"#,
    );
    let member_dir = project.path().join("packages/web");
    fs::create_dir_all(&member_dir).unwrap();
    fs::write(
        member_dir.join("package.json"),
        r#"{"name": "web", "dependencies": {"react": "^18.0.0"}}"#,
    )
    .unwrap();

    pastoralist()
        .args([
            "--path",
            project.path().to_str().unwrap(),
            "--dep-paths",
            "packages/*",
        ])
        .assert()
        .code(0);

    let manifest = fs::read_to_string(project.path().join("package.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(
        value["pastoralist"]["appendix"]["react@18.2.0"]["dependents"]["web"],
        "react@^18.0.0"
    );
    assert!(value["pastoralist"]["overridePaths"]["packages/web/package.json"].is_object());
}
