//! CLI contract tests
//!
//! Runs the built binary against temporary project roots and checks the
//! report files, stdout formats, and exit codes.

use std::path::Path;
use std::process::Command;

fn depadvice_bin() -> String {
    env!("CARGO_BIN_EXE_depadvice").to_string()
}

const MODEL: &str = r#"{
  "modules": [
    {
      "path": ":app",
      "declarations": [
        {"coordinate": "com.squareup.moshi:moshi:1.8.0", "configuration": "implementation"},
        {"coordinate": "com.google.guava:guava:28.0", "configuration": "implementation"}
      ],
      "symbols": {"referenced": ["com.google.common.collect.ImmutableList"], "publicSurface": ["com.google.common.collect.ImmutableList"]}
    },
    {
      "path": ":lib:clean",
      "declarations": [{"coordinate": "com.google.guava:guava:28.0", "configuration": "implementation"}],
      "symbols": {"referenced": ["com.google.common.collect.ImmutableList"]}
    },
    {
      "path": ":samples:demo",
      "declarations": [{"coordinate": "com.squareup.moshi:moshi:1.8.0", "configuration": "api"}],
      "symbols": {"referenced": []}
    }
  ],
  "libraries": {
    "com.squareup.moshi:moshi:1.8.0": {"symbols": ["com.squareup.moshi.Moshi"]},
    "com.google.guava:guava:28.0": {"symbols": ["com.google.common.collect.ImmutableList"]}
  }
}"#;

fn setup_project(config: Option<&str>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("project.json"), MODEL).unwrap();
    if let Some(config) = config {
        std::fs::write(dir.path().join("depadvice.toml"), config).unwrap();
    }
    dir
}

fn run(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(depadvice_bin())
        .arg("--root")
        .arg(dir)
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_analyze_writes_reports() {
    let dir = setup_project(None);
    let (code, stdout, _) = run(dir.path(), &["analyze", "project.json"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Advice for :app"));
    assert!(stdout.contains("implementation(\"com.squareup.moshi:moshi:1.8.0\")"));
    assert!(stdout.contains("api(\"com.google.guava:guava:28.0\") (was implementation)"));

    let reports = dir.path().join("build/reports/dependency-analysis");
    let compact = std::fs::read_to_string(reports.join("build-health.json")).unwrap();
    assert!(!compact.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(&compact).unwrap();
    let paths: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["modulePath"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec![":app", ":samples:demo"]);

    assert!(reports.join("build-health-pretty.txt").exists());
    assert!(reports.join("modules/app.json").exists());
    assert!(reports.join("modules/lib-clean.json").exists());
}

#[test]
fn test_json_format_and_exclusions() {
    let dir = setup_project(Some("[exclude]\nmodules = [\":samples:*\"]\n"));
    let (code, stdout, _) = run(dir.path(), &["analyze", "project.json", "--format", "json"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = parsed["buildHealth"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["modulePath"], ":app");
    let kinds: Vec<&str> = entries[0]["dependencyAdvice"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["remove", "change"]);
}

#[test]
fn test_fail_on_advice_exit_code() {
    let dir = setup_project(None);
    let (code, _, stderr) = run(dir.path(), &["analyze", "project.json", "--fail-on-advice"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--fail-on-advice"));

    let clean = setup_project(Some("[exclude]\nmodules = [\":app\", \":samples:*\"]\n"));
    let (code, stdout, _) = run(clean.path(), &["analyze", "project.json", "--fail-on-advice"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No dependency advice"));
}

#[test]
fn test_chatty_announces_report_locations() {
    let dir = setup_project(None);
    let (_, _, chatty) = run(dir.path(), &["analyze", "project.json"]);
    assert!(chatty.contains("Advice report (aggregated)"));

    let (_, _, quiet) = run(dir.path(), &["--chatty", "false", "analyze", "project.json"]);
    assert!(!quiet.contains("Advice report (aggregated)"));
}

#[test]
fn test_aggregate_merges_module_reports() {
    let dir = setup_project(None);
    let (code, _, _) = run(dir.path(), &["analyze", "project.json"]);
    assert_eq!(code, 0);

    let modules = dir.path().join("build/reports/dependency-analysis/modules");
    std::fs::write(modules.join("garbage.json"), "{").unwrap();
    let (code, stdout, _) = run(
        dir.path(),
        &[
            "aggregate",
            modules.to_str().unwrap(),
            "--format",
            "json",
            "--output",
            "merged",
        ],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["buildHealth"].as_array().unwrap().len(), 2);
    assert!(dir.path().join("merged/build-health.json").exists());
}

#[test]
fn test_rerun_drops_reports_of_excluded_modules() {
    let dir = setup_project(None);
    let (code, _, _) = run(dir.path(), &["analyze", "project.json"]);
    assert_eq!(code, 0);
    let modules = dir.path().join("build/reports/dependency-analysis/modules");
    assert!(modules.join("samples-demo.json").exists());

    std::fs::write(
        dir.path().join("depadvice.toml"),
        "[exclude]\nmodules = [\":samples:*\"]\n",
    )
    .unwrap();
    let (code, _, _) = run(dir.path(), &["analyze", "project.json"]);
    assert_eq!(code, 0);
    assert!(!modules.join("samples-demo.json").exists());

    let (code, stdout, _) = run(
        dir.path(),
        &["aggregate", modules.to_str().unwrap(), "--format", "json"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let paths: Vec<&str> = parsed["buildHealth"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["modulePath"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec![":app"]);
}

#[test]
fn test_rerun_drops_report_of_failed_module() {
    let lib = |configuration: &str| {
        format!(
            r#"{{"modules": [{{"path": ":lib", "declarations": [{{"coordinate": "g:x:1", "configuration": "{configuration}"}}], "symbols": {{"referenced": []}}}}],
               "libraries": {{"g:x:1": {{"symbols": ["x.X"]}}}}}}"#
        )
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("project.json"), lib("implementation")).unwrap();
    let (code, _, _) = run(dir.path(), &["analyze", "project.json"]);
    assert_eq!(code, 0);
    let modules = dir.path().join("build/reports/dependency-analysis/modules");
    assert!(modules.join("lib.json").exists());

    std::fs::write(dir.path().join("project.json"), lib("compile")).unwrap();
    let (code, stdout, _) = run(dir.path(), &["analyze", "project.json"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Skipped modules"));

    let (code, stdout, _) = run(
        dir.path(),
        &["aggregate", modules.to_str().unwrap(), "--format", "json"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["buildHealth"].as_array().unwrap().is_empty());
}

#[test]
fn test_missing_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(dir.path(), &["analyze", "nope.json"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("depadvice.toml"));
    let content = std::fs::read_to_string(dir.path().join("depadvice.toml")).unwrap();
    assert!(content.contains("chatty = true"));
}
