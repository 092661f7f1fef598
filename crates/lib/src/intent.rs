//! # Intent Classification
//!
//! Decides, from the user's text alone, whether a request wants a chart or a
//! tabular answer. Prompt construction and response shaping both branch on the
//! result, but neither re-inspects the text.

use serde::{Deserialize, Serialize};

/// What shape of answer the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Rows plus a natural-language summary.
    #[default]
    Tabular,
    /// Two labeled series ready for plotting.
    Chart,
}

/// Classifies a request as `Chart` when it mentions "chart" in any casing.
pub fn classify_intent(text: &str) -> Intent {
    if text.to_lowercase().contains("chart") {
        Intent::Chart
    } else {
        Intent::Tabular
    }
}
