//! Integration tests for the reqcat binary and the library calls it makes.

use reqcat_bundle::pipeline;
use reqcat_core::config::Config;
use reqcat_core::context::RunContext;
use reqcat_core::export::{ExportFormat, export};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn reqcat(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reqcat"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("REQCAT_EXTENSION")
        .env_remove("REQCAT_OUTPUT")
        .env_remove("REQCAT_SEPARATOR")
        .env_remove("REQCAT_STRICT_MISSING")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn chain(root: &Path) {
    write(root, "a.txt", "require ‘b’\nA");
    write(root, "b.txt", "require ‘c’\nB");
    write(root, "c.txt", "C");
}

#[test]
fn test_build_writes_result() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());

    let out = reqcat(tmp.path(), &["build"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Bundled 3 document(s)"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("result.txt")).unwrap(),
        "C\n\nrequire ‘c’\nB\n\nrequire ‘b’\nA\n\n"
    );
}

#[test]
fn test_build_is_default_command() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "only.txt", "Only");

    let out = reqcat(tmp.path(), &[]);
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(tmp.path().join("result.txt")).unwrap(),
        "Only\n\n"
    );
}

#[test]
fn test_build_custom_output() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());

    let out = reqcat(tmp.path(), &["build", "-o", "dist/book.txt"]);
    assert!(out.status.success());
    assert!(tmp.path().join("dist/book.txt").exists());
    assert!(!tmp.path().join("result.txt").exists());
}

#[test]
fn test_build_exclude_glob() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "keep.txt", "Keep");
    write(tmp.path(), "drafts/skip.txt", "Skip");

    let out = reqcat(tmp.path(), &["build", "--exclude", "drafts/**"]);
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(tmp.path().join("result.txt")).unwrap(),
        "Keep\n\n"
    );
}

#[test]
fn test_build_cycle_fails_without_output() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "a.txt", "require ‘b’");
    write(tmp.path(), "b.txt", "require ‘a’");

    let out = reqcat(tmp.path(), &["build"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cycle"), "{}", stderr);
    assert!(!tmp.path().join("result.txt").exists());
    assert!(!tmp.path().join("result.txt.tmp").exists());
}

#[test]
fn test_build_strict_missing_fails() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "a.txt", "require ‘ghost’\nA");

    let out = reqcat(tmp.path(), &["build", "--strict"]);
    assert!(!out.status.success());
    assert!(!tmp.path().join("result.txt").exists());

    let out = reqcat(tmp.path(), &["build"]);
    assert!(out.status.success());
}

#[test]
fn test_order_prints_relative_paths() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());
    write(tmp.path(), "d.txt", "require ‘missing’\nD");

    let out = reqcat(tmp.path(), &["order"]);
    assert!(out.status.success());
    let lines: Vec<String> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec!["c.txt", "b.txt", "a.txt", "missing.txt (missing)", "d.txt"]
    );
    assert!(!tmp.path().join("result.txt").exists());
}

#[test]
fn test_order_json() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());

    let out = reqcat(tmp.path(), &["order", "--json"]);
    assert!(out.status.success());
    let paths: Vec<String> = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(paths[0].ends_with("c.txt"));
    assert!(paths[2].ends_with("a.txt"));
}

#[test]
fn test_check_reports_malformed_and_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "a.txt", "require ‘broken\nrequire ‘a’");

    let out = reqcat(tmp.path(), &["check"]);
    assert!(!out.status.success());
    let text = stdout(&out);
    assert!(text.contains("WARN:"), "{}", text);
    assert!(text.contains("ERROR: cycle: a.txt → a.txt"), "{}", text);
}

#[test]
fn test_check_clean_tree_succeeds() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());

    let out = reqcat(tmp.path(), &["check", "--json"]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["documents"], 3);
    assert_eq!(report["edges"], 2);
    assert!(report["cycles"].is_null());
}

#[test]
fn test_export_mermaid_and_unknown_format() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());

    let out = reqcat(tmp.path(), &["export", "--format", "mermaid"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("flowchart LR"));

    let out = reqcat(tmp.path(), &["export", "--format", "svg"]);
    assert!(!out.status.success());
}

#[test]
fn test_library_export_matches_plan() {
    let tmp = tempfile::tempdir().unwrap();
    chain(tmp.path());

    let config = Config::default();
    let mut ctx = RunContext::new(tmp.path(), None, Path::new("result.txt")).unwrap();
    let source = pipeline::source_for(&ctx, &config).unwrap();
    let analysis = pipeline::analyze(&mut ctx, &source, &config).unwrap();

    let dot = export(&analysis.graph, &ctx.root, ExportFormat::Dot);
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("a.txt"));
    assert_eq!(analysis.graph.edge_count(), 2);
}

#[test]
fn test_config_file_changes_extension() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        ".reqcat/config.toml",
        "[discovery]\nextension = \"md\"\n\n[output]\npath = \"book.md\"\n",
    );
    write(tmp.path(), "a.md", "require ‘b’\nA");
    write(tmp.path(), "b.md", "B");
    write(tmp.path(), "ignored.txt", "nope");

    let out = reqcat(tmp.path(), &["build"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(tmp.path().join("book.md")).unwrap(),
        "B\n\nrequire ‘b’\nA\n\n"
    );
}
