//! # Natural Language to SQL
//!
//! This crate turns a free-text question into a SQL query using a configurable AI
//! provider, runs the query against a storage provider, and shapes the result
//! either as a natural-language answer or as chart series.
//!
//! The pipeline is strictly linear per request:
//! introspect → build prompt → call model → sanitize → execute → (narrate | chartify).

pub mod constants;
pub mod errors;
pub mod intent;
pub mod narrator;
pub mod prompts;
pub mod providers;
pub mod sanitize;
pub mod schema;
pub mod training;
pub mod types;

pub use errors::PromptError;
pub use intent::{classify_intent, Intent};
pub use types::{
    ChartData, ChatFailure, ChatOutcome, PromptClient, PromptClientBuilder, QueryResult,
};

use prompts::core::{build_sql_prompt, sql_system_prompt, PromptContext};
use tracing::{debug, error, info};

impl PromptClient {
    /// Answers a single chat message.
    ///
    /// The intent decides the final stage: chart requests are reshaped into
    /// two series, everything else is narrated by a second model call. On
    /// failure the returned `ChatFailure` still carries any SQL that was
    /// generated, so callers can report it.
    pub async fn execute_chat(&self, message: &str) -> Result<ChatOutcome, ChatFailure> {
        let intent = classify_intent(message);
        info!(?intent, "[execute_chat] received message: {:?}", message);

        let sql_query = self.generate_sql(message, intent).await?;

        let db_result = match self.storage_provider.execute_query(&sql_query).await {
            Ok(result) => result,
            Err(e) => {
                error!("[execute_chat] Query execution error: {e:?}");
                return Err(ChatFailure::new(Some(sql_query), e));
            }
        };
        info!(
            "[execute_chat] query returned {} columns, {} rows",
            db_result.columns.len(),
            db_result.rows.len()
        );

        match intent {
            Intent::Chart => match narrator::chartify(&db_result) {
                Ok(chart_data) => Ok(ChatOutcome::Chart {
                    sql_query,
                    chart_data,
                }),
                Err(e) => Err(ChatFailure::new(Some(sql_query), e)),
            },
            Intent::Tabular => {
                match narrator::narrate(self.ai_provider.as_ref(), message, &db_result).await {
                    Ok(human_answer) => Ok(ChatOutcome::Narrative {
                        sql_query,
                        db_result,
                        human_answer,
                    }),
                    Err(e) => {
                        error!("[execute_chat] Narration error: {e:?}");
                        Err(ChatFailure::new(Some(sql_query), e))
                    }
                }
            }
        }
    }

    /// Converts a natural-language message into executable SQL.
    ///
    /// The live schema and the most recent training examples are folded into
    /// the prompt; the model's answer is stripped of markdown fences.
    pub async fn generate_sql(
        &self,
        message: &str,
        intent: Intent,
    ) -> Result<String, PromptError> {
        let storage = self.storage_provider.as_ref();
        let schema = schema::describe_schema(storage, self.include_foreign_keys).await;
        let examples = self.example_store.recent(self.recent_examples).await;

        let user_prompt = build_sql_prompt(&PromptContext {
            user_message: message,
            schema: &schema,
            examples: &examples,
            intent,
            db_name: storage.name(),
            language: storage.language(),
            case_insensitive_operator: storage.case_insensitive_operator(),
        });
        let system_prompt = sql_system_prompt(storage.language(), storage.name());

        debug!(system_prompt = %system_prompt, user_prompt = %user_prompt, "--> Sending prompts to AI Provider");

        let raw_response = self
            .ai_provider
            .generate(&system_prompt, &user_prompt)
            .await
            .map_err(|e| {
                error!("[generate_sql] AI provider error: {e}");
                e
            })?;

        debug!("<-- Query from AI: {}", &raw_response);

        Ok(sanitize::strip_sql_fences(&raw_response))
    }
}
