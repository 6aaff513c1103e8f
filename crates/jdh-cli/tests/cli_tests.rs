//! Integration tests for all CLI commands
//!
//! Each test runs the binary inside a scratch directory with `HOME` pointed
//! at it, so no user or project config leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NOTEBOOK: &str = r#"{
 "cells": [
  {
   "cell_type": "code",
   "execution_count": null,
   "metadata": {"tags": ["figure-tools-1"]},
   "outputs": [],
   "source": ["chart.show()"]
  },
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": ["Written by LeBlanc and Wieringa."]
  },
  {
   "cell_type": "code",
   "execution_count": null,
   "metadata": {"tags": ["table-summary"]},
   "outputs": [],
   "source": []
  }
 ],
 "metadata": {},
 "nbformat": 4,
 "nbformat_minor": 5
}
"#;

/// Helper to create a CLI command running in `dir`
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jdh"));
    cmd.current_dir(dir).env("HOME", dir).env_remove("RUST_LOG");
    cmd
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let notebook = dir.path().join("article.ipynb");
    fs::write(&notebook, NOTEBOOK).unwrap();
    (dir, notebook)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============ GENERAL ============

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("annotate"))
        .stdout(predicate::str::contains("anonymize"))
        .stdout(predicate::str::contains("export-chart"));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["-q", "-v", "config", "show"])
        .assert()
        .failure();
}

#[test]
fn test_verbose_enables_debug_log() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["-v", "config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration"));
    cli(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration").not());
}

// ============ SCAN COMMAND TESTS ============

#[test]
fn test_scan_writes_stubs() {
    let (dir, notebook) = workspace();
    let output = dir.path().join("cells.json");

    cli(dir.path())
        .arg("scan")
        .arg(&notebook)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("figure-tools-1"))
        .stdout(predicate::str::contains("needs source"));

    let records = read_json(&output);
    assert_eq!(
        records,
        serde_json::json!([
            {"cell_index": 0, "tag": "figure-tools-1", "source": []},
            {"cell_index": 2, "tag": "table-summary", "source": []}
        ])
    );
}

#[test]
fn test_scan_default_output_and_reuse() {
    let (dir, notebook) = workspace();
    let output = dir.path().join("figure_cells.json");

    cli(dir.path()).arg("scan").arg(&notebook).assert().success();
    assert!(output.exists());

    fs::write(&output, r#"[{"tag": "figure-*", "source": ["Curated"]}]"#).unwrap();
    cli(dir.path())
        .arg("scan")
        .arg(&notebook)
        .assert()
        .success()
        .stderr(predicate::str::contains("Reused:"));
    assert_eq!(read_json(&output)[0]["source"][0], "Curated");

    cli(dir.path())
        .args(["scan", "--force"])
        .arg(&notebook)
        .assert()
        .success();
    assert_eq!(read_json(&output).as_array().unwrap().len(), 2);
}

#[test]
fn test_scan_custom_keyword() {
    let (dir, notebook) = workspace();
    let output = dir.path().join("cells.json");

    cli(dir.path())
        .arg("scan")
        .arg(&notebook)
        .arg("-o")
        .arg(&output)
        .args(["--keyword", "table"])
        .assert()
        .success();

    let records = read_json(&output);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["tag"], "table-summary");
}

#[test]
fn test_scan_missing_notebook() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["scan", "missing.ipynb"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

// ============ ANNOTATE COMMAND TESTS ============

#[test]
fn test_annotate_sets_jdh_metadata() {
    let (dir, notebook) = workspace();
    let descriptions = dir.path().join("desc.json");
    fs::write(
        &descriptions,
        r#"[{"tag": "figure-tools-*", "source": ["Tools used."], "type": "image"}]"#,
    )
    .unwrap();

    cli(dir.path())
        .arg("annotate")
        .arg(&notebook)
        .arg(&descriptions)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 of 2 tagged cells annotated"));

    let nb = read_json(&notebook);
    assert_eq!(
        nb["cells"][0]["metadata"]["jdh"],
        serde_json::json!({
            "module": "object",
            "object": {"source": ["Tools used."], "type": "image"}
        })
    );
    assert!(nb["cells"][2]["metadata"].get("jdh").is_none());
    assert_eq!(nb["cells"][0]["metadata"]["tags"][0], "figure-tools-1");
}

#[test]
fn test_annotate_bad_descriptions() {
    let (dir, notebook) = workspace();
    let descriptions = dir.path().join("desc.json");
    fs::write(&descriptions, "not json").unwrap();

    cli(dir.path())
        .arg("annotate")
        .arg(&notebook)
        .arg(&descriptions)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load source descriptions"));
    assert_eq!(fs::read_to_string(&notebook).unwrap(), NOTEBOOK);
}

// ============ ANONYMIZE COMMAND TESTS ============

#[test]
fn test_anonymize_default_authors() {
    let (dir, notebook) = workspace();

    cli(dir.path())
        .arg("anonymize")
        .arg(&notebook)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 cells rewritten"));

    let nb = read_json(&notebook);
    assert_eq!(nb["cells"][1]["source"][0], "Written by the authors.");
}

#[test]
fn test_anonymize_explicit_authors() {
    let (dir, notebook) = workspace();

    cli(dir.path())
        .arg("anonymize")
        .arg(&notebook)
        .args(["--author", "Wieringa"])
        .assert()
        .success();

    let nb = read_json(&notebook);
    assert_eq!(nb["cells"][1]["source"][0], "Written by LeBlanc and Author1.");
}

#[test]
fn test_anonymize_blank_author_changes_nothing() {
    let (dir, notebook) = workspace();

    cli(dir.path())
        .arg("anonymize")
        .arg(&notebook)
        .args(["--author", ""])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 cells rewritten"));

    let nb = read_json(&notebook);
    assert_eq!(nb["cells"][1]["source"][0], "Written by LeBlanc and Wieringa.");
}

#[test]
fn test_anonymize_authors_from_config() {
    let (dir, notebook) = workspace();
    fs::write(dir.path().join(".jdh.toml"), "[anonymize]\nauthors = [\"LeBlanc\"]\n").unwrap();

    cli(dir.path()).arg("anonymize").arg(&notebook).assert().success();

    let nb = read_json(&notebook);
    assert_eq!(nb["cells"][1]["source"][0], "Written by Author1 and Wieringa.");
}

// ============ PREPARE COMMAND TESTS ============

#[test]
fn test_prepare_with_curated_descriptions() {
    let (dir, notebook) = workspace();
    let descriptions = dir.path().join("figure_cells.json");
    fs::write(
        &descriptions,
        r#"[
            {"tag": "figure-*", "source": ["Figure source"]},
            {"tag": "table-summary", "source": ["Table source"], "type": "table"}
        ]"#,
    )
    .unwrap();

    cli(dir.path())
        .args(["prepare", "--anonymize"])
        .arg(&notebook)
        .assert()
        .success()
        .stderr(predicate::str::contains("Reused:"))
        .stderr(predicate::str::contains("Anonymized:"));

    let nb = read_json(&notebook);
    assert_eq!(nb["cells"][0]["metadata"]["jdh"]["object"]["source"][0], "Figure source");
    assert!(nb["cells"][0]["metadata"]["jdh"].get("module").is_none());
    assert_eq!(nb["cells"][2]["metadata"]["jdh"]["module"], "object");
    assert_eq!(nb["cells"][1]["source"][0], "Written by the authors.");
}

#[test]
fn test_prepare_fresh_scan_writes_empty_sources() {
    let (dir, notebook) = workspace();

    cli(dir.path())
        .arg("prepare")
        .arg(&notebook)
        .assert()
        .success();

    assert!(dir.path().join("figure_cells.json").exists());
    let nb = read_json(&notebook);
    assert_eq!(
        nb["cells"][0]["metadata"]["jdh"]["object"]["source"],
        serde_json::json!([])
    );
    assert_eq!(nb["cells"][1]["source"][0], "Written by LeBlanc and Wieringa.");
}

// ============ EXPORT-CHART COMMAND TESTS ============

#[test]
fn test_export_chart_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("chart.vl.json");
    fs::write(&spec, r#"{"mark": "bar"}"#).unwrap();
    let output = dir.path().join("out.xyz");

    cli(dir.path())
        .arg("export-chart")
        .arg(&spec)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("only svg and png formats are supported"));
    assert!(!output.exists());
}

#[test]
fn test_export_chart_missing_converter() {
    let dir = TempDir::new().unwrap();
    let spec = dir.path().join("chart.vl.json");
    fs::write(&spec, r#"{"mark": "bar"}"#).unwrap();
    let output = dir.path().join("out.svg");

    cli(dir.path())
        .arg("export-chart")
        .arg(&spec)
        .arg("-o")
        .arg(&output)
        .args(["--converter", "jdh-no-such-converter-binary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jdh-no-such-converter-binary"));
    assert!(!output.exists());
}

// ============ CONFIG COMMAND TESTS ============

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();

    cli(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join(".jdh.toml").exists());

    cli(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    cli(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();

    cli(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vl-convert"))
        .stdout(predicate::str::contains("figure_cells.json"));
}

#[test]
fn test_config_show_project_override() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".jdh.toml"), "[chart]\nscale = 2.5\n").unwrap();

    cli(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scale = 2.5"));
}

#[test]
fn test_explicit_config_missing() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["--config", "nope.toml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

// ============ COMPLETIONS COMMAND TESTS ============

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    cli(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jdh"));
}
