//! Integration tests for the repochunk binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DELIMITER: &str = "================================================";
const REPO_URL: &str = "https://github.com/acme/widgets";

fn repochunk_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repochunk").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("REPOCHUNK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_dump(dir: &TempDir) -> PathBuf {
    let files = [
        (
            "a.py",
            "def documented():\n    \"\"\"Returns one.\"\"\"\n    return 1\n\n\ndef bare():\n    return 2",
        ),
        ("b.md", "# Title\n\nShort paragraph."),
        ("c.yaml", "key: [unclosed"),
    ];
    let mut dump = String::new();
    for (path, content) in files {
        dump.push_str(&format!("{}\nFile: {}\n{}\n{}\n\n", DELIMITER, path, DELIMITER, content));
    }
    let path = dir.path().join("dump.txt");
    fs::write(&path, dump).unwrap();
    path
}

#[test]
fn test_chunk_writes_jsonl() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir);

    let output = repochunk_cmd(&dir)
        .arg("chunk")
        .arg(&dump)
        .arg("--repo-url")
        .arg(REPO_URL)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines.len() >= 3);
    assert!(lines
        .iter()
        .all(|l| l["metadata"]["repository_name"] == "widgets"));

    let md = lines
        .iter()
        .find(|l| l["metadata"]["file_path"] == "b.md")
        .expect("markdown chunk");
    assert_eq!(md["text"], "Short paragraph.");
    assert_eq!(md["metadata"]["Header 1"], "Title");

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Chunked:"));
    assert!(stderr.contains("Metadata issues: 1"));
}

#[test]
fn test_chunk_json_report_and_output_file() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir);
    let out = dir.path().join("chunks.jsonl");

    let output = repochunk_cmd(&dir)
        .args(["--format", "json", "chunk"])
        .arg(&dump)
        .args(["--repo-url", REPO_URL, "--collection", "docs", "--workers", "2"])
        .arg("--output")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let report: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(report["files_total"], 3);
    assert_eq!(report["files_chunked"], 3);
    assert_eq!(report["cancelled"], false);

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.lines().count() >= 3);
    assert!(written.lines().all(|l| l.contains("\"collection\":\"docs\"")));
}

#[test]
fn test_chunk_missing_dump_exit_code() {
    let dir = TempDir::new().unwrap();
    repochunk_cmd(&dir)
        .arg("chunk")
        .arg(dir.path().join("nope.txt"))
        .args(["--repo-url", REPO_URL])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Dump not found"));
}

#[test]
fn test_chunk_blank_dump_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.txt");
    fs::write(&path, "\n  \n").unwrap();

    repochunk_cmd(&dir)
        .arg("chunk")
        .arg(&path)
        .args(["--repo-url", REPO_URL])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Empty input"));
}

#[test]
fn test_files_lists_paths() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir);

    repochunk_cmd(&dir)
        .arg("files")
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.py"))
        .stdout(predicate::str::contains("b.md"))
        .stdout(predicate::str::contains("code: 2 functions, 0 classes"))
        .stdout(predicate::str::contains("markdown"));
}

#[test]
fn test_files_json() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir);

    let output = repochunk_cmd(&dir)
        .args(["files", "--format", "json"])
        .arg(&dump)
        .output()
        .unwrap();
    assert!(output.status.success());

    let files: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(
        files[0]["file_level_metadata"]["code"]["doc_coverage"],
        serde_json::json!(0.5)
    );
    assert!(files[2].get("file_level_metadata").is_none());
}

#[test]
fn test_strategies_lists_table() {
    let dir = TempDir::new().unwrap();
    repochunk_cmd(&dir)
        .arg("strategies")
        .assert()
        .success()
        .stdout(predicate::str::contains("python"))
        .stdout(predicate::str::contains("markdown"))
        .stdout(predicate::str::contains("(anything else)"));
}

#[test]
fn test_config_override_applies() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yml");
    fs::write(&config, "strategies:\n  python:\n    chunk_size: 1234\n").unwrap();

    repochunk_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("strategies")
        .assert()
        .success()
        .stdout(predicate::str::contains("size 1234"));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yml");
    fs::write(
        &config,
        "strategies:\n  text:\n    chunk_size: 10\n    chunk_overlap: 20\n",
    )
    .unwrap();

    repochunk_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("strategies")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration error"));
}
