//! # Training Examples
//!
//! The few-shot examples used to steer SQL generation, and the uploaded
//! datasets they come from.
//!
//! - [`store`]: the deduplicated, file-backed example store.
//! - [`uploads`]: the content-addressed directory of uploaded datasets.

pub mod store;
pub mod uploads;

use crate::errors::PromptError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parallel lists of natural-language questions and their SQL answers.
///
/// Both lists always have the same length; entry `i` of one pairs with entry
/// `i` of the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrainingExamples {
    pub natural_language: Vec<String>,
    pub sql: Vec<String>,
}

impl TrainingExamples {
    /// Builds a pair of lists, rejecting lists of unequal length.
    pub fn new(natural_language: Vec<String>, sql: Vec<String>) -> Result<Self, PromptError> {
        let examples = Self {
            natural_language,
            sql,
        };
        examples.validate()?;
        Ok(examples)
    }

    pub fn len(&self) -> usize {
        self.natural_language.len()
    }

    pub fn is_empty(&self) -> bool {
        self.natural_language.is_empty()
    }

    /// Checks the equal-length invariant.
    pub fn validate(&self) -> Result<(), PromptError> {
        if self.natural_language.len() != self.sql.len() {
            return Err(PromptError::InvalidDataset(format!(
                "'natural_language' has {} entries but 'sql' has {}",
                self.natural_language.len(),
                self.sql.len()
            )));
        }
        Ok(())
    }

    /// Returns the `n` most recently added pairs, oldest first.
    pub fn recent(&self, n: usize) -> Vec<(String, String)> {
        let start = self.len().saturating_sub(n);
        self.natural_language[start..]
            .iter()
            .cloned()
            .zip(self.sql[start..].iter().cloned())
            .collect()
    }
}

/// A snapshot of the example store for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub example_count: usize,
    pub last_modified: Option<DateTime<Utc>>,
}

/// The dedup key of a natural-language question.
pub fn question_hash(natural_language: &str) -> String {
    format!("{:x}", md5::compute(natural_language.as_bytes()))
}
