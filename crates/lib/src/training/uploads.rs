//! # Uploaded Datasets
//!
//! Uploaded training datasets are stored content-addressed: each file is named
//! after the MD5 digest of its normalized JSON, so the upload directory doubles
//! as the dedup index. Re-uploading the same logical content (regardless of key
//! order or whitespace) is detected and skipped.

use super::{store::write_atomically, store::ExampleStore, TrainingExamples};
use crate::errors::PromptError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// The number of hex digest characters used in an upload's file name.
const HASH_PREFIX_LEN: usize = 8;

/// The outcome of an upload, serialized as the HTTP response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadReport {
    /// The same content was uploaded before; nothing changed.
    Exists { file: String },
    /// The content was new; its examples went through the example store.
    Success {
        added: usize,
        total_examples: usize,
        file: String,
    },
}

/// Re-serializes JSON with keys sorted at every level and 2-space indentation.
pub fn normalize_json(body: &[u8]) -> Result<String, PromptError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PromptError::InvalidDataset(format!("malformed JSON: {e}")))?;
    Ok(serde_json::to_string_pretty(&sort_keys(value))?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// The content-addressed file name of a normalized dataset.
pub fn upload_file_name(normalized: &str) -> String {
    let digest = format!("{:x}", md5::compute(normalized.as_bytes()));
    format!("{}.json", &digest[..HASH_PREFIX_LEN])
}

/// The directory of uploaded datasets.
#[derive(Debug)]
pub struct UploadStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores an uploaded dataset and feeds its examples to `store`.
    ///
    /// Malformed JSON, a missing list, or lists of unequal length are rejected
    /// before anything is written.
    pub async fn ingest(
        &self,
        store: &dyn ExampleStore,
        body: &[u8],
    ) -> Result<UploadReport, PromptError> {
        let normalized = normalize_json(body)?;
        let dataset: TrainingExamples = serde_json::from_str(&normalized)
            .map_err(|e| PromptError::InvalidDataset(e.to_string()))?;
        dataset.validate()?;

        let file = upload_file_name(&normalized);
        let path = self.dir.join(&file);

        let _guard = self.lock.lock().await;
        if tokio::fs::try_exists(&path).await? {
            info!("Dataset '{file}' was already uploaded, skipping.");
            return Ok(UploadReport::Exists { file });
        }

        let added = store.add(&dataset.natural_language, &dataset.sql).await?;
        let total_examples = store.status().await?.example_count;

        let body = normalized.into_bytes();
        tokio::task::spawn_blocking(move || write_atomically(&path, &body))
            .await
            .map_err(|e| PromptError::ExampleStore(std::io::Error::other(e)))??;

        info!("Stored dataset '{file}': {added} new examples, {total_examples} total.");
        Ok(UploadReport::Success {
            added,
            total_examples,
            file,
        })
    }

    /// Lists the stored dataset file names (`*.json`), sorted.
    pub async fn list(&self) -> Result<Vec<String>, PromptError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // In-flight uploads are temp files without the extension.
            if entry.file_type().await?.is_file() && name.ends_with(".json") {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }
}
