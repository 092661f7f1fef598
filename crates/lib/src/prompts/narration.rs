//! # Narration Prompts
//!
//! Prompts for the second model call, which summarizes a result set as a
//! human-readable answer.

use crate::types::QueryResult;
use serde_json::Value;

/// The system prompt for narration.
pub const NARRATION_SYSTEM_PROMPT: &str = "You are a helpful data assistant. You answer the user's question using only the query results you are given. Do not mention SQL or the database.";

/// Placeholders: `{question}`, `{columns}`, `{rows}`
pub const NARRATION_USER_PROMPT: &str = "The user asked: \"{question}\"

The query returned the following rows (columns: {columns}):
{rows}

Answer the user's question in plain language, in one or two sentences.";

/// Renders a single cell for the flat text block.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Serializes rows as comma-joined values, one row per line.
pub fn rows_to_text(result: &QueryResult) -> String {
    result
        .rows
        .iter()
        .map(|row| row.iter().map(render_value).collect::<Vec<_>>().join(", "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assembles the narration prompt for a question and its result set.
///
/// The question is substituted last so placeholders typed by the user stay literal.
pub fn build_narration_prompt(question: &str, result: &QueryResult) -> String {
    NARRATION_USER_PROMPT
        .replace("{columns}", &result.columns.join(", "))
        .replace("{rows}", &rows_to_text(result))
        .replace("{question}", question)
}
