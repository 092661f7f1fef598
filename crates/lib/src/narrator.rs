//! # Result Narration and Charting
//!
//! The last stage of the pipeline: a result set either becomes two chart
//! series, or is handed back to the model for a one-sentence summary.

use crate::{
    constants::NO_RESULTS_MESSAGE,
    errors::PromptError,
    prompts::narration::{build_narration_prompt, NARRATION_SYSTEM_PROMPT},
    providers::ai::AiProvider,
    types::{ChartData, QueryResult},
};
use serde_json::Value;
use tracing::{debug, info};

/// Reshapes the first two columns of a result into chart series.
///
/// Results with fewer than two columns are rejected rather than padded.
/// Extra columns are ignored.
pub fn chartify(result: &QueryResult) -> Result<ChartData, PromptError> {
    if result.columns.len() < 2 {
        return Err(PromptError::ChartShape(result.columns.len()));
    }

    let (x, y): (Vec<Value>, Vec<Value>) = result
        .rows
        .iter()
        .map(|row| {
            (
                row.first().cloned().unwrap_or(Value::Null),
                row.get(1).cloned().unwrap_or(Value::Null),
            )
        })
        .unzip();

    Ok(ChartData {
        x,
        y,
        x_label: result.columns[0].clone(),
        y_label: result.columns[1].clone(),
    })
}

/// Summarizes a result set in natural language.
///
/// An empty result short-circuits to a fixed message without calling the model.
pub async fn narrate(
    ai_provider: &dyn AiProvider,
    question: &str,
    result: &QueryResult,
) -> Result<String, PromptError> {
    if result.is_empty() {
        info!("Query returned no rows, skipping narration.");
        return Ok(NO_RESULTS_MESSAGE.to_string());
    }

    let user_prompt = build_narration_prompt(question, result);
    debug!(user_prompt = %user_prompt, "--> Sending narration prompt to AI Provider");

    let answer = ai_provider
        .generate(NARRATION_SYSTEM_PROMPT, &user_prompt)
        .await?;

    debug!("<-- Narration from AI: {}", &answer);
    Ok(answer.trim().to_string())
}
