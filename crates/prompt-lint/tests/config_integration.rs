//! Configuration integration tests.
//!
//! These run the compiled binary from temporary directories and assert on
//! `info --json` (the effective configuration) or on `analyze --json` (the
//! behavior the configuration produces).

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VAGUE: &str = "Write some articles about various things in technology.";

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("PROMPT_LINT_ANALYZER__STRICT_MODE")
        .env_remove("PROMPT_LINT_LOG_LEVEL");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap()])
        .args(args)
        .arg("--json")
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

/// Effective configuration as seen from `dir`.
fn info_json(dir: &Path) -> Value {
    run_json(dir, &["info"])["config"].clone()
}

/// Analyze the vague sample prompt from `dir`.
fn analyze_json(dir: &Path) -> Value {
    fs::write(dir.join("prompt.txt"), VAGUE).unwrap();
    run_json(dir, &["analyze", "prompt.txt"])
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = info_json(tmp.path());

    assert_eq!(config["log_level"], "info");
    assert!(config["config_file"].is_null());
    assert_eq!(config["analyzer"]["strict_mode"], false);
    assert_eq!(config["analyzer"]["max_input_chars"], 200_000);
}

#[test]
fn discovers_each_config_name() {
    for name in [
        ".prompt.toml",
        "prompt.toml",
        ".prompt-lint.toml",
        "prompt-lint.toml",
    ] {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(name), "[analyzer]\nstrict_mode = true\n").unwrap();

        let config = info_json(tmp.path());
        assert_eq!(config["analyzer"]["strict_mode"], true, "{name}");
        let reported = config["config_file"].as_str().unwrap();
        assert!(reported.ends_with(name), "{name}: {reported}");
    }
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("prompts").join("support");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.toml"),
        "[analyzer]\ntoken_price_per_1k = 0.01\n",
    )
    .unwrap();

    let config = info_json(&sub_dir);
    assert_eq!(config["analyzer"]["token_price_per_1k"], 0.01);
}

#[test]
fn regular_name_overrides_dotfile() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".prompt-lint.toml"), r#"log_level = "debug""#).unwrap();
    fs::write(tmp.path().join("prompt-lint.toml"), r#"log_level = "error""#).unwrap();

    assert_eq!(info_json(tmp.path())["log_level"], "error");
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.yaml"),
        "analyzer:\n  min_severity_to_report: high\n  encoding: o200k\n",
    )
    .unwrap();

    let config = info_json(tmp.path());
    assert_eq!(config["analyzer"]["min_severity_to_report"], "high");
    assert_eq!(config["analyzer"]["encoding"], "o200k");
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.json"),
        r#"{"analyzer": {"weights": {"clarity": 1.0, "efficiency": 0.0, "success": 0.0, "security": 0.0}}}"#,
    )
    .unwrap();

    let config = info_json(tmp.path());
    assert_eq!(config["analyzer"]["weights"]["clarity"], 1.0);
    assert_eq!(config["analyzer"]["weights"]["success"], 0.0);
}

#[test]
fn partial_analyzer_section_keeps_other_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt-lint.toml"),
        "[analyzer]\nenable_security = false\n",
    )
    .unwrap();

    let config = info_json(tmp.path());
    assert_eq!(config["analyzer"]["enable_security"], false);
    assert_eq!(config["analyzer"]["enable_ambiguity"], true);
    assert_eq!(config["analyzer"]["min_words"], 15);
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.toml"),
        "[analyzer]\nstrict_mode = true\n",
    )
    .unwrap();
    fs::write(
        sub_dir.join(".prompt-lint.toml"),
        "[analyzer]\nstrict_mode = false\n",
    )
    .unwrap();

    assert_eq!(info_json(&sub_dir)["analyzer"]["strict_mode"], false);
}

#[test]
fn later_extension_overrides_earlier_in_same_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".prompt-lint.toml"), r#"log_level = "debug""#).unwrap();
    fs::write(tmp.path().join(".prompt-lint.yaml"), "log_level: error\n").unwrap();

    assert_eq!(info_json(tmp.path())["log_level"], "error");
}

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.toml"),
        "[analyzer]\nmax_input_chars = 5000\n",
    )
    .unwrap();
    let explicit = tmp.path().join("override.toml");
    fs::write(&explicit, "[analyzer]\nmax_input_chars = 100\n").unwrap();

    let config = run_json(
        tmp.path(),
        &["--config", explicit.to_str().unwrap(), "info"],
    )["config"]
        .clone();
    assert_eq!(config["analyzer"]["max_input_chars"], 100);
    assert!(
        config["config_file"]
            .as_str()
            .unwrap()
            .ends_with("override.toml")
    );
}

#[test]
fn environment_overrides_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt-lint.toml"),
        "[analyzer]\nstrict_mode = false\n",
    )
    .unwrap();

    let output = cmd()
        .env("PROMPT_LINT_ANALYZER__STRICT_MODE", "true")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["analyzer"]["strict_mode"], true);
}

// =============================================================================
// Config Drives Analysis
// =============================================================================

#[test]
fn configured_severity_floor_filters_issues() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt-lint.toml"),
        "[analyzer]\nmin_severity_to_report = \"high\"\n",
    )
    .unwrap();

    let report = analyze_json(tmp.path());
    let issues = report["issues"].as_array().unwrap();
    assert!(!issues.is_empty());
    assert!(
        issues
            .iter()
            .all(|i| i["severity"] == "high" || i["severity"] == "critical")
    );
}

#[test]
fn configured_weights_change_the_score() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt-lint.toml"),
        "[analyzer.weights]\nclarity = 1.0\nefficiency = 0.0\nsuccess = 0.0\nsecurity = 0.0\n",
    )
    .unwrap();

    let report = analyze_json(tmp.path());
    assert_eq!(report["overall_quality_score"], 70.0);
    assert_eq!(report["overall_grade"], "C");
}

#[test]
fn disabled_analyzer_is_skipped() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt-lint.toml"),
        "[analyzer]\nenable_success_prediction = false\n",
    )
    .unwrap();

    let report = analyze_json(tmp.path());
    let run: Vec<&str> = report["analyzers_run"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(run, ["ambiguity", "token_waste", "security"]);
    assert_eq!(report["success"]["success_probability"], 100.0);
}

#[test]
fn out_of_range_setting_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt-lint.toml"),
        "[analyzer]\nmin_words = 50\nmax_words = 10\n",
    )
    .unwrap();
    fs::write(tmp.path().join("prompt.txt"), VAGUE).unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "analyze", "prompt.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid analyzer configuration"));
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".prompt-lint.toml"), "this is not valid toml [[[").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn wrong_type_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.toml"),
        "[analyzer]\nmin_severity_to_report = \"severe\"\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".prompt-lint.toml"),
        "unknown_field = \"ignored\"\n[analyzer]\nanother_unknown = 42\n",
    )
    .unwrap();

    assert_eq!(info_json(tmp.path())["analyzer"]["strict_mode"], false);
}

// =============================================================================
// Boundary Marker
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(
        parent.join(".prompt-lint.toml"),
        "[analyzer]\nstrict_mode = true\n",
    )
    .unwrap();

    let config = info_json(&src);
    assert_eq!(config["analyzer"]["strict_mode"], false);
    assert!(config["config_file"].is_null());
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(
        repo.join(".prompt-lint.toml"),
        "[analyzer]\nstrict_mode = true\n",
    )
    .unwrap();

    assert_eq!(info_json(&src)["analyzer"]["strict_mode"], true);
}
