//! # Upload Store Tests
//!
//! Verifies content-addressed storage of uploaded datasets: duplicate detection
//! across key order and whitespace, rejection of malformed uploads, and the
//! hand-off of new examples to the example store.

mod common;

use common::setup_tracing;
use sqlchat::training::store::{ExampleStore, JsonExampleStore};
use sqlchat::training::uploads::{normalize_json, upload_file_name, UploadReport, UploadStore};
use sqlchat::PromptError;

struct Fixture {
    _dir: tempfile::TempDir,
    uploads: UploadStore,
    store: JsonExampleStore,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadStore::new(dir.path().join("uploads"));
    let store = JsonExampleStore::new(dir.path().join("training_examples.json"));
    Fixture {
        _dir: dir,
        uploads,
        store,
    }
}

const DATASET: &str = r#"{
    "natural_language": ["How many employees?", "List departments"],
    "sql": ["SELECT COUNT(*) FROM employee;", "SELECT name FROM department;"]
}"#;

const DATASET_REORDERED: &str = r#"{"sql":["SELECT COUNT(*) FROM employee;","SELECT name FROM department;"],"natural_language":["How many employees?","List departments"]}"#;

#[tokio::test]
async fn test_new_upload_is_stored_and_ingested() {
    setup_tracing();
    let f = fixture();

    let report = f.uploads.ingest(&f.store, DATASET.as_bytes()).await.unwrap();

    let expected_file = upload_file_name(&normalize_json(DATASET.as_bytes()).unwrap());
    assert_eq!(
        report,
        UploadReport::Success {
            added: 2,
            total_examples: 2,
            file: expected_file.clone(),
        }
    );
    assert_eq!(f.uploads.list().await.unwrap(), vec![expected_file.clone()]);

    // The stored file holds the normalized text.
    let stored = std::fs::read_to_string(f.uploads.dir().join(&expected_file)).unwrap();
    assert_eq!(stored, normalize_json(DATASET.as_bytes()).unwrap());
}

#[tokio::test]
async fn test_same_content_in_another_layout_is_a_duplicate() {
    setup_tracing();
    let f = fixture();

    let first = f.uploads.ingest(&f.store, DATASET.as_bytes()).await.unwrap();
    let second = f
        .uploads
        .ingest(&f.store, DATASET_REORDERED.as_bytes())
        .await
        .unwrap();

    let UploadReport::Success { file, .. } = first.clone() else {
        panic!("first upload should succeed, got {first:?}");
    };
    assert_eq!(second, UploadReport::Exists { file });
    assert_eq!(f.uploads.list().await.unwrap().len(), 1);
    assert_eq!(f.store.status().await.unwrap().example_count, 2);
}

#[tokio::test]
async fn test_overlapping_upload_adds_only_new_questions() {
    setup_tracing();
    let f = fixture();
    f.uploads.ingest(&f.store, DATASET.as_bytes()).await.unwrap();

    let overlapping = r#"{
        "natural_language": ["List departments", "Who earns the most?"],
        "sql": ["SELECT * FROM department;", "SELECT name FROM employee ORDER BY salary DESC LIMIT 1;"]
    }"#;
    let report = f
        .uploads
        .ingest(&f.store, overlapping.as_bytes())
        .await
        .unwrap();

    match report {
        UploadReport::Success {
            added,
            total_examples,
            ..
        } => {
            assert_eq!(added, 1);
            assert_eq!(total_examples, 3);
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(f.uploads.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_json_is_rejected_without_writing() {
    setup_tracing();
    let f = fixture();

    let result = f.uploads.ingest(&f.store, b"{\"natural_language\": [").await;

    assert!(matches!(result, Err(PromptError::InvalidDataset(_))));
    assert!(f.uploads.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_shape_is_rejected() {
    setup_tracing();
    let f = fixture();

    let missing_sql = f
        .uploads
        .ingest(&f.store, br#"{"natural_language": ["a"]}"#)
        .await;
    let unequal = f
        .uploads
        .ingest(
            &f.store,
            br#"{"natural_language": ["a", "b"], "sql": ["SELECT 1;"]}"#,
        )
        .await;

    assert!(matches!(missing_sql, Err(PromptError::InvalidDataset(_))));
    assert!(matches!(unequal, Err(PromptError::InvalidDataset(_))));
    assert!(f.uploads.list().await.unwrap().is_empty());
    assert!(f.store.load().await.is_empty());
}

#[tokio::test]
async fn test_list_is_empty_before_first_upload() {
    setup_tracing();
    let f = fixture();
    assert!(f.uploads.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_skips_in_flight_temp_files() {
    setup_tracing();
    let f = fixture();
    let report = f.uploads.ingest(&f.store, DATASET.as_bytes()).await.unwrap();
    let UploadReport::Success { file, .. } = report.clone() else {
        panic!("first upload must succeed, got {report:?}");
    };

    std::fs::write(f.uploads.dir().join(".tmpA1b2C3"), "{").unwrap();

    assert_eq!(f.uploads.list().await.unwrap(), vec![file]);
}
