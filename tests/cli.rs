//! Command-line tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_page(dir: &Path, title: &str, paragraphs: usize) -> PathBuf {
    let body: String = (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Clause {i}: this binding agreement covers limitation of liability and governing law.</p>"
            )
        })
        .collect();
    let path = dir.join("page.html");
    std::fs::write(
        &path,
        format!("<html><head><title>{title}</title></head><body>{body}</body></html>"),
    )
    .unwrap();
    path
}

fn lexscan(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lexscan").unwrap();
    cmd.env("LEXSCAN_CONFIG", dir.path().join("config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn detect_prints_json_verdict() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path(), "Terms of Service", 30);

    lexscan(&dir)
        .args(["-o", "json", "detect"])
        .arg(&page)
        .args(["--url", "https://acme.com/terms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_legal_document\": true"))
        .stdout(predicate::str::contains("\"document_type\": \"terms_of_service\""));
}

#[test]
fn detect_text_output_for_excluded_page() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path(), "My Post", 3);

    lexscan(&dir)
        .arg("detect")
        .arg(&page)
        .args(["--url", "https://example.com/blog/my-post"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not a legal document"))
        .stdout(predicate::str::contains("excluded"));
}

#[test]
fn extract_failure_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path(), "Terms", 1);

    lexscan(&dir)
        .args(["-o", "json", "extract"])
        .arg(&page)
        .args(["--url", "https://acme.com/terms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("insufficient_content"));
}

#[test]
fn chunks_by_index() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path(), "Terms", 30);

    lexscan(&dir)
        .arg("chunks")
        .arg(&page)
        .args(["--url", "https://acme.com/terms", "--index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chunk_0"))
        .stdout(predicate::str::contains("Clause 0: this binding agreement"));

    lexscan(&dir)
        .arg("chunks")
        .arg(&page)
        .args(["--url", "https://acme.com/terms", "--index", "99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No chunk at index 99"));
}

#[test]
fn analyze_skips_extraction_for_other_pages() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path(), "About Acme", 30);

    lexscan(&dir)
        .args(["-o", "json", "analyze"])
        .arg(&page)
        .args(["--url", "https://acme.com/about"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"extraction\": null"));
}

#[test]
fn config_reset_writes_profile_defaults() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    lexscan(&dir)
        .args(["--profile", "lax", "config", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset to lax defaults"));

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("profile = \"lax\""));
    assert!(written.contains("min_document_length = 500"));

    lexscan(&dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn missing_html_file_fails() {
    let dir = TempDir::new().unwrap();

    lexscan(&dir)
        .args(["detect", "does-not-exist.html", "--url", "https://acme.com/terms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read HTML file"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "profile = 42").unwrap();
    let page = write_page(dir.path(), "Terms", 3);

    lexscan(&dir)
        .arg("detect")
        .arg(&page)
        .args(["--url", "https://acme.com/terms"])
        .assert()
        .failure();
}
