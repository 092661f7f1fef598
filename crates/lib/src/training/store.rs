//! # Example Store
//!
//! A deduplicated, append-only collection of (natural-language, SQL) pairs.
//! `JsonExampleStore` keeps the whole collection in one JSON document and
//! replaces it atomically on every write.

use super::{question_hash, TrainingExamples, TrainingStatus};
use crate::errors::PromptError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashSet,
    fmt::Debug,
    io::Write,
    path::{Path, PathBuf},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// A store of few-shot training examples.
#[async_trait]
pub trait ExampleStore: Send + Sync + Debug {
    /// Returns every stored example. Never fails: an absent or unreadable
    /// store is reported as empty.
    async fn load(&self) -> TrainingExamples;

    /// Replaces the stored examples.
    async fn save(&self, examples: &TrainingExamples) -> Result<(), PromptError>;

    /// Appends the pairs whose question is not stored yet and returns how
    /// many were added. Nothing is written when nothing is new, or when the
    /// stored examples could not be read.
    async fn add(&self, natural_language: &[String], sql: &[String])
        -> Result<usize, PromptError>;

    /// Reports the number of stored examples and when they last changed.
    async fn status(&self) -> Result<TrainingStatus, PromptError>;

    /// Returns the `n` most recently added pairs, oldest first.
    async fn recent(&self, n: usize) -> Vec<(String, String)> {
        self.load().await.recent(n)
    }
}

/// An `ExampleStore` persisted as a single JSON file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous version intact.
/// Load-modify-save cycles are serialized by an internal lock.
#[derive(Debug)]
pub struct JsonExampleStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonExampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored examples.
    ///
    /// A missing file is an empty store, and so is a corrupt one (malformed
    /// JSON, invalid UTF-8, unequal list lengths). Any other I/O failure is an
    /// error, so callers never overwrite a store they could not read.
    async fn try_read(&self) -> Result<TrainingExamples, PromptError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Example store not found, starting empty.");
                return Ok(TrainingExamples::default());
            }
            Err(e) => {
                error!(path = %self.path.display(), "Failed to read example store: {e}");
                return Err(e.into());
            }
        };

        match serde_json::from_slice::<TrainingExamples>(&content) {
            Ok(examples) if examples.validate().is_ok() => Ok(examples),
            Ok(_) => {
                warn!(path = %self.path.display(), "Example store lists have unequal lengths, ignoring it.");
                Ok(TrainingExamples::default())
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Example store is corrupt, ignoring it: {e}");
                Ok(TrainingExamples::default())
            }
        }
    }

    async fn write(&self, examples: &TrainingExamples) -> Result<(), PromptError> {
        examples.validate()?;
        let body = serde_json::to_vec_pretty(examples)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &body))
            .await
            .map_err(|e| PromptError::ExampleStore(std::io::Error::other(e)))??;
        Ok(())
    }
}

/// Writes `body` to a sibling temp file, then renames it over `path`.
pub(crate) fn write_atomically(path: &Path, body: &[u8]) -> Result<(), PromptError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ExampleStore for JsonExampleStore {
    async fn load(&self) -> TrainingExamples {
        self.try_read().await.unwrap_or_default()
    }

    async fn save(&self, examples: &TrainingExamples) -> Result<(), PromptError> {
        let _guard = self.write_lock.lock().await;
        self.write(examples).await
    }

    async fn add(
        &self,
        natural_language: &[String],
        sql: &[String],
    ) -> Result<usize, PromptError> {
        if natural_language.len() != sql.len() {
            return Err(PromptError::InvalidDataset(format!(
                "'natural_language' has {} entries but 'sql' has {}",
                natural_language.len(),
                sql.len()
            )));
        }

        let _guard = self.write_lock.lock().await;
        let mut examples = self.try_read().await?;
        let mut seen: HashSet<String> = examples
            .natural_language
            .iter()
            .map(|q| question_hash(q))
            .collect();

        let mut added = 0;
        for (question, answer) in natural_language.iter().zip(sql) {
            if !seen.insert(question_hash(question)) {
                debug!("Skipping duplicate example: '{question}'");
                continue;
            }
            examples.natural_language.push(question.clone());
            examples.sql.push(answer.clone());
            added += 1;
        }

        if added > 0 {
            self.write(&examples).await?;
            info!(
                "Added {added} training examples ({} total).",
                examples.len()
            );
        }
        Ok(added)
    }

    async fn status(&self) -> Result<TrainingStatus, PromptError> {
        let example_count = self.try_read().await?.len();
        let last_modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(TrainingStatus {
            example_count,
            last_modified,
        })
    }
}
