use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use build_launcher_config::canonical_path;
use predicates::prelude::*;
use tempfile::TempDir;

fn cargo_bin() -> Command {
    Command::cargo_bin("build-launcher").expect("binary")
}

fn scratch() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_path(temp.path()).expect("canonicalize");
    (temp, root)
}

fn write_config(path: &Path, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn dry_run(root: &Path, extra: &[&str]) -> String {
    let output = cargo_bin()
        .arg("--root")
        .arg(root)
        .arg("--dry-run")
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("stdout utf8")
}

#[test]
fn unsupported_host_only_creates_directories() {
    let (_temp, root) = scratch();

    cargo_bin()
        .arg("--root")
        .arg(&root)
        .args(["--host", "Linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Building On Linux System"))
        .stdout(predicate::str::contains(format!(
            "Current Path is {}",
            root.display()
        )));

    assert!(root.join("Build").is_dir());
    assert!(root.join("Bin").is_dir());

    // Second run over the existing directories.
    cargo_bin()
        .arg("--root")
        .arg(&root)
        .args(["--host", "Linux"])
        .assert()
        .success();
}

#[test]
fn dry_run_prints_visual_studio_2022_command() {
    let (_temp, root) = scratch();

    let stdout = dry_run(&root, &["--host", "Windows", "--target", "VS2022"]);

    assert!(stdout.contains("Building On Windows System"));
    assert!(stdout.contains("cmake -G \"Visual Studio 17 2022\" -A x64"));
    assert!(!root.join("Build").exists(), "dry run must not create directories");
    assert!(!root.join("Bin").exists(), "dry run must not create directories");
}

#[test]
fn default_target_matches_explicit_vs2019() {
    let (_temp, root) = scratch();

    let implicit = dry_run(&root, &["--host", "Windows"]);
    let explicit = dry_run(&root, &["--host", "Windows", "--target", "VS2019"]);

    assert_eq!(implicit, explicit);
    assert!(implicit.contains("cmake -G \"Visual Studio 16 2019\" -A x64"));
}

#[test]
fn xcode_target_on_windows_falls_back_to_vs2019() {
    let (_temp, root) = scratch();

    for target in ["XCode", "Ninja"] {
        let stdout = dry_run(&root, &["--host", "Windows", "--target", target]);
        assert!(
            stdout.contains("cmake -G \"Visual Studio 16 2019\" -A x64"),
            "target {target}: {stdout}"
        );
    }
}

#[test]
fn darwin_generates_xcode_without_architecture() {
    let (_temp, root) = scratch();

    let stdout = dry_run(&root, &["--host", "Darwin", "--target", "VS2022"]);

    assert!(stdout.contains("cmake -G Xcode "));
    assert!(!stdout.contains("-A"));
}

#[test]
fn other_host_reports_nothing_to_run() {
    let (_temp, root) = scratch();

    let stdout = dry_run(&root, &["--host", "FreeBSD"]);

    assert!(stdout.contains("nothing to run on FreeBSD"));
}

#[test]
fn json_plan_lists_doxygen_invocation() {
    let (_temp, root) = scratch();

    let stdout = dry_run(
        &root,
        &["--host", "Windows", "--target", "Doc", "--format", "json"],
    );

    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(payload["platform"], "Windows");
    assert_eq!(payload["target"], "Doc");
    let invocation = &payload["invocation"];
    assert_eq!(
        invocation["program"],
        root.join("Tools/Doxygen/Win64/doxygen.exe")
            .to_string_lossy()
            .into_owned()
    );
    assert_eq!(invocation["args"], serde_json::json!([]));
    assert_eq!(
        invocation["working_dir"],
        root.to_string_lossy().into_owned()
    );
}

#[test]
fn project_config_supplies_default_target() {
    let (_temp, root) = scratch();
    write_config(
        &root.join(".build-launcher.toml"),
        r#"
        [launcher]
        default_target = "VS2022"
        "#,
    );

    let configured = dry_run(&root, &["--host", "Windows"]);
    assert!(configured.contains("Visual Studio 17 2022"));

    let explicit = dry_run(&root, &["--host", "Windows", "--target", "VS2019"]);
    assert!(explicit.contains("Visual Studio 16 2019"));
}

#[test]
fn invalid_config_fails_with_message() {
    let (_temp, root) = scratch();
    write_config(
        &root.join(".build-launcher.toml"),
        r#"
        [layout]
        bin_dir = "Build"
        "#,
    );

    cargo_bin()
        .arg("--root")
        .arg(&root)
        .args(["--host", "Linux"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration validation failed"))
        .stderr(predicate::str::contains("layout.bin_dir"));

    assert!(!root.join("Build").exists());
}

#[test]
fn format_requires_dry_run() {
    let (_temp, root) = scratch();

    cargo_bin()
        .arg("--root")
        .arg(&root)
        .args(["--format", "json"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_build_tool_is_tolerated_unless_strict() {
    let (_temp, root) = scratch();
    let override_path = root.join("missing-tool.toml");
    write_config(
        &override_path,
        r#"
        [cmake]
        program = "build-launcher-no-such-cmake"
        "#,
    );

    cargo_bin()
        .arg("--root")
        .arg(&root)
        .arg("--config")
        .arg(&override_path)
        .args(["--host", "Darwin"])
        .assert()
        .success();

    cargo_bin()
        .arg("--root")
        .arg(&root)
        .arg("--config")
        .arg(&override_path)
        .args(["--host", "Darwin", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "failed to start build-launcher-no-such-cmake",
        ));
}

#[test]
fn relative_config_resolves_against_working_directory() {
    let (_temp, root) = scratch();
    let project = root.join("project");
    let overrides = root.join("overrides");
    fs::create_dir(&project).expect("project dir");
    fs::create_dir(&overrides).expect("overrides dir");
    write_config(
        &overrides.join("missing-tool.toml"),
        r#"
        [cmake]
        program = "build-launcher-no-such-cmake"
        "#,
    );

    cargo_bin()
        .current_dir(&overrides)
        .arg("--root")
        .arg(&project)
        .args(["--config", "missing-tool.toml", "--host", "Darwin", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "failed to start build-launcher-no-such-cmake",
        ));

    // The same relative path is not looked up under the project root.
    cargo_bin()
        .current_dir(&project)
        .arg("--root")
        .arg(&project)
        .args(["--config", "missing-tool.toml", "--host", "Darwin", "--dry-run"])
        .assert()
        .failure()
        .code(1);
}
