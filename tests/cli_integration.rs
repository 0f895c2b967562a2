//! CLI integration tests for importkit.
//!
//! Nothing here needs a node executable: selection runs with a pinned host
//! version, and the import failures all happen before any engine is called.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the importkit binary command.
fn importkit() -> Command {
    let mut cmd = Command::cargo_bin("importkit").unwrap();
    cmd.env_remove("IMPORTKIT_NODE");
    cmd
}

/// Create a temporary directory to run commands from.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// importkit list / show
// ============================================================================

#[test]
fn test_list_shows_all_strategies() {
    importkit()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("native"))
        .stdout(predicate::str::contains("hook-transpile"))
        .stdout(predicate::str::contains("bundled-runner"))
        .stdout(predicate::str::contains("bundle-to-temp"));
}

#[test]
fn test_show_strategy() {
    importkit()
        .args(["show", "hook-transpile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy: hook-transpile"))
        .stdout(predicate::str::contains("Dependency listing: true"));
}

#[test]
fn test_show_bundle_to_temp_is_explicit_only() {
    importkit()
        .args(["show", "bundle-to-temp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Never chosen automatically"));
}

#[test]
fn test_show_unknown_strategy_fails() {
    importkit()
        .args(["show", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid strategy 'foo'"));
}

// ============================================================================
// importkit select
// ============================================================================

#[test]
fn test_select_plain_js_goes_native() {
    let tmp = temp_dir();

    importkit()
        .args(["select", "./mod.js", "--cache", "must"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("native\n");
}

#[test]
fn test_select_uncached_ts_on_old_host_uses_runner() {
    let tmp = temp_dir();

    importkit()
        .args([
            "select",
            "./mod.ts",
            "--cache",
            "never",
            "--runtime-version",
            "18.0.0",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("bundled-runner\n");
}

#[test]
fn test_select_uncached_ts_on_versionless_host_uses_hooks() {
    let tmp = temp_dir();

    importkit()
        .args([
            "select",
            "./mod.ts",
            "--cache",
            "never",
            "--runtime-version",
            "none",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("hook-transpile\n");
}

#[test]
fn test_select_uncached_ts_on_patched_host_uses_hooks() {
    let tmp = temp_dir();

    importkit()
        .args([
            "select",
            "./mod.cts",
            "--cache",
            "never",
            "--runtime-version",
            "v20.8.0",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("hook-transpile\n");
}

#[test]
fn test_select_rejects_bad_cache_value() {
    importkit()
        .args(["select", "./mod.ts", "--cache", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid cache requirement"));
}

#[test]
fn test_select_rejects_bad_runtime_version() {
    importkit()
        .args([
            "select",
            "./mod.ts",
            "--cache",
            "never",
            "--runtime-version",
            "latest",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid runtime version"));
}

// ============================================================================
// importkit import
// ============================================================================

#[test]
fn test_import_unknown_loader_fails() {
    let tmp = temp_dir();

    importkit()
        .args(["--no-color", "import", "./x.ts", "--loader", "foo"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown loader `foo`"));
}

#[test]
fn test_import_native_without_cache_fails_validation() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("x.js"), "export default 1\n").unwrap();

    importkit()
        .args([
            "--no-color",
            "import",
            "./x.js",
            "--loader",
            "native",
            "--cache",
            "never",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot satisfy cache requirement"))
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_import_dependency_listing_needs_capable_strategy() {
    let tmp = temp_dir();

    importkit()
        .args([
            "--no-color",
            "import",
            "./x.ts",
            "--loader",
            "bundled-runner",
            "--list-dependencies",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot list dependencies"));
}

#[test]
fn test_import_without_engine_fails() {
    let tmp = temp_dir();

    importkit()
        .args([
            "--no-color",
            "import",
            "./x.mjs",
            "--loader",
            "bundle-to-temp",
            "--cache",
            "any",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no engine registered"));
}

#[test]
fn test_import_rejects_non_file_parent() {
    let tmp = temp_dir();

    importkit()
        .args([
            "--no-color",
            "import",
            "./x.js",
            "--parent",
            "https://example.com/app/",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot resolve imports from"));
}

#[test]
fn test_import_force_notes_bypassed_validation() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("x.js"), "export default 1\n").unwrap();

    // Whether the import itself succeeds depends on node being installed.
    importkit()
        .args([
            "--no-color",
            "import",
            "./x.js",
            "--loader",
            "native",
            "--cache",
            "never",
            "--force",
        ])
        .current_dir(tmp.path())
        .assert()
        .stderr(predicate::str::contains(
            "note: validation bypassed: strategy `native` cannot satisfy cache requirement",
        ))
        .stderr(predicate::str::contains("--> ./x.js"));
}

#[test]
fn test_import_force_without_violation_has_no_note() {
    let tmp = temp_dir();

    importkit()
        .args([
            "--no-color",
            "import",
            "./x.mjs",
            "--loader",
            "bundle-to-temp",
            "--cache",
            "any",
            "--force",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no engine registered"))
        .stderr(predicate::str::contains("validation bypassed").not());
}
