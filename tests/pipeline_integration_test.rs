//! End-to-end transfer tests against a mock CouchDB server

use async_trait::async_trait;
use couchcopy::config::CopyConfig;
use couchcopy::core::transfer::{
    ProgressReporter, ProgressSnapshot, TransferCoordinator, TransferMode,
};
use couchcopy::domain::CopyError;
use mockito::{Matcher, Server};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

const THREE_ROWS: &str = r#"{"total_rows":3,"rows":[{"doc":{"_id":"a","_rev":"1","v":1}},{"doc":{"_id":"b","v":2}},{"doc":{"_id":"c","_rev":"9","v":3}}]}"#;

#[derive(Default)]
struct RecordingReporter {
    snapshots: Mutex<Vec<ProgressSnapshot>>,
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, snapshot: &ProgressSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

fn config(input: impl Into<String>, output: impl Into<String>, bulk_size: usize) -> CopyConfig {
    let mut config = CopyConfig::default();
    config.transfer.input = input.into();
    config.transfer.output = output.into();
    config.transfer.bulk_size = bulk_size;
    config
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_remote_to_remote_in_two_batches() {
    let mut server = Server::new_async().await;

    let source = server
        .mock("GET", "/src/_all_docs")
        .match_query(Matcher::UrlEncoded("include_docs".into(), "true".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(THREE_ROWS)
        .expect(1)
        .create_async()
        .await;

    let first = server
        .mock("POST", "/dst/_bulk_docs")
        .match_body(Matcher::Json(json!({"docs": [{"_id": "a", "v": 1}, {"_id": "b", "v": 2}]})))
        .with_status(201)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let second = server
        .mock("POST", "/dst/_bulk_docs")
        .match_body(Matcher::Json(json!({"docs": [{"_id": "c", "v": 3}]})))
        .with_status(201)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let summary = TransferCoordinator::new(config(
        format!("{}/src/_all_docs?include_docs=true", server.url()),
        format!("{}/dst/", server.url()),
        2,
    ))
    .with_reporter(reporter.clone())
    .execute()
    .await
    .unwrap();

    source.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;

    assert_eq!(summary.mode, TransferMode::Bulk);
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.batches, 2);

    let snapshots = reporter.snapshots.lock().unwrap();
    let last = snapshots.last().unwrap();
    assert_eq!(last.total, 3.0);
    assert_eq!(last.processed, last.total);
}

#[tokio::test]
async fn test_failed_first_flush_aborts_run() {
    let mut server = Server::new_async().await;
    let input = source_file(THREE_ROWS);

    let bulk = server
        .mock("POST", "/dst/_bulk_docs")
        .with_status(500)
        .with_body("{\"error\":\"internal_server_error\"}")
        .expect(1)
        .create_async()
        .await;

    let destination = server
        .url()
        .replacen("http://", "http://admin:secret@", 1);
    let err = TransferCoordinator::new(config(
        input.path().to_string_lossy(),
        format!("{destination}/dst"),
        2,
    ))
    .execute()
    .await
    .unwrap_err();

    bulk.assert_async().await;

    assert!(matches!(err, CopyError::Transport { status: Some(500), .. }));
    assert_eq!(err.exit_code(), 4);
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("internal_server_error"));
    assert!(message.contains("/dst/_bulk_docs"));
    assert!(!message.contains("secret"));
}

#[tokio::test]
async fn test_flatten_to_database_is_rejected_before_reading_source() {
    let mut server = Server::new_async().await;
    let source = server
        .mock("GET", "/src/_all_docs")
        .with_status(200)
        .with_body(THREE_ROWS)
        .expect(0)
        .create_async()
        .await;

    let mut config = config(
        format!("{}/src/_all_docs", server.url()),
        format!("{}/dst", server.url()),
        2,
    );
    config.transfer.flatten = true;

    let err = TransferCoordinator::new(config).execute().await.unwrap_err();

    assert!(matches!(err, CopyError::Configuration(_)));
    source.assert_async().await;
}

#[tokio::test]
async fn test_source_error_status_is_reported() {
    let mut server = Server::new_async().await;
    let _source = server
        .mock("GET", "/src/_all_docs")
        .with_status(404)
        .with_body("{\"error\":\"not_found\",\"reason\":\"Database does not exist.\"}")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let err = TransferCoordinator::new(config(
        format!("{}/src/_all_docs", server.url()),
        dir.path().join("out.json").to_string_lossy(),
        2,
    ))
    .execute()
    .await
    .unwrap_err();

    assert!(matches!(err, CopyError::Source(_)));
    assert!(err.to_string().contains("404"));
    assert!(!dir.path().join("out.json").exists());
}

#[tokio::test]
async fn test_local_copy_is_byte_identical_and_repeatable() {
    let mut server = Server::new_async().await;
    let body = format!("{THREE_ROWS}\n  ");
    let _source = server
        .mock("GET", "/src/_all_docs")
        .with_status(200)
        .with_body(&body)
        .expect(2)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("backup.json");
    let run = || {
        TransferCoordinator::new(config(
            format!("{}/src/_all_docs", server.url()),
            output.to_string_lossy(),
            2,
        ))
    };

    let first = run().execute().await.unwrap();
    let first_bytes = std::fs::read(&output).unwrap();
    let second = run().execute().await.unwrap();
    let second_bytes = std::fs::read(&output).unwrap();

    assert_eq!(first.mode, TransferMode::LocalCopy);
    assert_eq!(first.bytes_written, body.len() as u64);
    assert_eq!(second.bytes_written, body.len() as u64);
    assert_eq!(first_bytes, body.as_bytes());
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_flatten_writes_one_line_per_document() {
    let input = source_file(THREE_ROWS);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("flat.jsonl");

    let mut config = config(input.path().to_string_lossy(), output.to_string_lossy(), 2);
    config.transfer.flatten = true;
    let summary = TransferCoordinator::new(config).execute().await.unwrap();

    assert_eq!(summary.mode, TransferMode::Flatten);
    assert_eq!(summary.documents, 3);

    let contents = std::fs::read_to_string(&output).unwrap();
    let docs: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        docs,
        vec![
            json!({"_id": "a", "v": 1}),
            json!({"_id": "b", "v": 2}),
            json!({"_id": "c", "v": 3}),
        ]
    );
}

/// Slow writer that records the order batches arrive in
struct SlowWriter {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl couchcopy::adapters::couchdb::BulkWriter for SlowWriter {
    async fn write_bulk(&self, docs: &[couchcopy::domain::Document]) -> couchcopy::domain::Result<()> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let mut seen = self.seen.lock().unwrap();
        for doc in docs {
            seen.push(doc["_id"].as_str().unwrap_or_default().to_string());
        }
        Ok(())
    }

    fn destination(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn test_slow_destination_keeps_source_order() {
    let rows: Vec<String> = (0..250)
        .map(|i| format!(r#"{{"id":"d{i:03}","doc":{{"_id":"d{i:03}","_rev":"1-x"}}}}"#))
        .collect();
    let input = source_file(&format!(
        r#"{{"total_rows":250,"offset":0,"rows":[{}]}}"#,
        rows.join(",")
    ));

    let writer = Arc::new(SlowWriter {
        seen: Mutex::new(Vec::new()),
    });
    let summary = TransferCoordinator::new(config(
        input.path().to_string_lossy(),
        "http://localhost:5984/unused",
        16,
    ))
    .with_bulk_writer(writer.clone())
    .execute()
    .await
    .unwrap();

    assert_eq!(summary.batches, 16);
    let seen = writer.seen.lock().unwrap();
    let expected: Vec<String> = (0..250).map(|i| format!("d{i:03}")).collect();
    assert_eq!(*seen, expected);
}
