//! Tests for CLI commands

use super::*;
use crate::error::Error;
use crate::types::LogLevel;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ROUTING: &str = r#"
- id: "0"
  min_inclusive: ""
  max_exclusive: "0D"
- id: "1"
  min_inclusive: "0D"
  max_exclusive: "40"
- id: "2"
  min_inclusive: "40"
  max_exclusive: "FF"
"#;

const FRONTIER: &str = r#"{"kind":"composite","version":1,"container_id":"coll1","continuation":[{"range":{"min":"","max":"40"},"token":"7"},{"range":{"min":"40","max":"FF"},"token":"9"}],"done":["40"]}"#;

async fn run(args: &[&str]) -> crate::error::Result<Value> {
    let cli = Cli::parse_from(std::iter::once("feedrange").chain(args.iter().copied()));
    Runner::new(cli).execute().await
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Argument Parsing Tests
// ============================================================================

#[test]
fn test_parse_global_flags() {
    let cli = Cli::parse_from(["feedrange", "-v", "--format", "pretty", "inspect", "{}"]);
    assert!(cli.verbose);
    assert_eq!(cli.format, OutputFormat::Pretty);
    assert!(matches!(cli.command, Commands::Inspect { .. }));
}

#[test]
fn test_parse_log_level() {
    let cli = Cli::parse_from(["feedrange", "validate", "feed.yaml", "--log-level", "warn"]);
    assert_eq!(cli.log_level, LogLevel::Warn);
    assert!(!cli.verbose);

    let cli = Cli::parse_from(["feedrange", "validate", "feed.yaml"]);
    assert_eq!(cli.log_level, LogLevel::Info);
}

// ============================================================================
// Inspect Tests
// ============================================================================

#[tokio::test]
async fn test_inspect_composite() {
    let output = run(&["inspect", FRONTIER]).await.unwrap();

    assert_eq!(output["kind"], "composite");
    assert_eq!(output["current"], "[,40)");
    assert_eq!(output["continuation"], "7");
    assert_eq!(
        output["rotation"],
        json!([
            {"range": "[,40)", "token": "7", "done": false},
            {"range": "[40,FF)", "token": "9", "done": true}
        ])
    );
    assert_eq!(output["is_done"], false);
}

#[tokio::test]
async fn test_inspect_from_file() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "continuation.json",
        r#"{"kind":"partition_key_range","container_id":"coll1","range_id":"3","token":"x"}"#,
    );

    let output = run(&["inspect", &format!("@{path}")]).await.unwrap();
    assert_eq!(output["kind"], "partition_key_range");
    assert_eq!(output["range_id"], "3");
}

#[tokio::test]
async fn test_inspect_malformed() {
    let err = run(&["inspect", "not a continuation"]).await.unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}

// ============================================================================
// Overlap Tests
// ============================================================================

#[tokio::test]
async fn test_overlap_lists_ids() {
    let dir = tempdir().unwrap();
    let routing = write(dir.path(), "routing.yaml", ROUTING);

    let output = run(&["overlap", "--routing", &routing, "--min", "10", "--max", "50"])
        .await
        .unwrap();
    let ids: Vec<_> = output["ranges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(output["query"], "[10,50)");
}

#[tokio::test]
async fn test_overlap_point_on_boundary() {
    let dir = tempdir().unwrap();
    let routing = write(dir.path(), "routing.yaml", ROUTING);

    let output = run(&[
        "overlap",
        "--routing",
        &routing,
        "--min",
        "0D",
        "--max",
        "0D",
        "--max-inclusive",
    ])
    .await
    .unwrap();
    assert_eq!(
        output["ranges"],
        json!([{"id": "1", "min": "0D", "max": "40"}])
    );
}

#[tokio::test]
async fn test_overlap_rejects_incomplete_routing() {
    let dir = tempdir().unwrap();
    let routing = write(
        dir.path(),
        "routing.json",
        r#"[{"id":"0","min_inclusive":"","max_exclusive":"80"}]"#,
    );

    let err = run(&["overlap", "--routing", &routing]).await.unwrap_err();
    assert!(matches!(err, Error::IncompleteRoutingMap { .. }));
}

#[tokio::test]
async fn test_missing_input_files_name_the_path() {
    let err = run(&["overlap", "--routing", "/nonexistent/routing.yaml"])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Other(_)));
    assert!(err
        .to_string()
        .starts_with("Failed to read routing file '/nonexistent/routing.yaml'"));

    let err = run(&["inspect", "@/nonexistent/frontier.json"]).await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Failed to read continuation file '/nonexistent/frontier.json'"));
}

// ============================================================================
// Split Tests
// ============================================================================

#[tokio::test]
async fn test_split_current_range() {
    let dir = tempdir().unwrap();
    let routing = write(dir.path(), "routing.yaml", ROUTING);

    let output = run(&["split", "--routing", &routing, FRONTIER]).await.unwrap();
    let frontier = &output["frontier"];
    assert_eq!(frontier["current"], "[,0D)");
    assert_eq!(frontier["rotation"].as_array().unwrap().len(), 3);
    assert_eq!(frontier["rotation"][2]["range"], "[0D,40)");
    assert_eq!(frontier["rotation"][2]["token"], "7");

    let continuation = output["continuation"].as_str().unwrap();
    assert!(continuation.starts_with(r#"{"kind":"composite""#));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[tokio::test]
async fn test_validate_config() {
    let dir = tempdir().unwrap();
    let config = write(dir.path(), "feed.yaml", "container_id: orders\nmode: read_feed\n");

    let output = run(&["validate", &config]).await.unwrap();
    let message = output["log"]["message"].as_str().unwrap();
    assert!(message.contains("orders"));
    assert!(message.contains("ReadFeed"));
}

#[tokio::test]
async fn test_validate_missing_file() {
    let err = run(&["validate", "/nonexistent/feed.yaml"]).await.unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
