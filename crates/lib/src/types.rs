use crate::{
    errors::PromptError,
    providers::{ai::AiProvider, db::storage::Storage},
    training::store::ExampleStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The number of recent training examples included in a prompt by default.
pub const DEFAULT_RECENT_EXAMPLES: usize = 3;

// --- Schema Types ---

/// A single column of an introspected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    pub name: String,
    pub r#type: String,
}

/// A foreign-key relationship from `table.column` to `references_table(references_column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// The introspected shape of a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSchema {
    pub fields: Vec<TableField>,
    pub foreign_keys: Vec<ForeignKey>,
}

// --- Query Results ---

/// The tabular result of executing a query: column names plus positional rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Chart-ready series derived from the first two columns of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartData {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    pub x_label: String,
    pub y_label: String,
}

/// The successful outcome of a chat request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Chart {
        sql_query: String,
        chart_data: ChartData,
    },
    Narrative {
        sql_query: String,
        db_result: QueryResult,
        human_answer: String,
    },
}

/// A failed chat request. `sql_query` holds whatever SQL was generated
/// before the failure, so callers can still report it.
#[derive(Debug)]
pub struct ChatFailure {
    pub sql_query: Option<String>,
    pub error: PromptError,
}

impl ChatFailure {
    pub(crate) fn new(sql_query: Option<String>, error: PromptError) -> Self {
        Self { sql_query, error }
    }
}

impl From<PromptError> for ChatFailure {
    fn from(error: PromptError) -> Self {
        Self::new(None, error)
    }
}

// --- Prompt Client ---

/// The natural-language-to-SQL pipeline.
///
/// Every collaborator is injected, so tests can substitute a mock AI provider
/// or an in-memory database.
pub struct PromptClient {
    pub ai_provider: Box<dyn AiProvider>,
    pub storage_provider: Box<dyn Storage>,
    pub example_store: Arc<dyn ExampleStore>,
    pub recent_examples: usize,
    pub include_foreign_keys: bool,
}

impl fmt::Debug for PromptClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptClient")
            .field("storage_provider", &self.storage_provider.name())
            .field("recent_examples", &self.recent_examples)
            .field("include_foreign_keys", &self.include_foreign_keys)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `PromptClient` instances.
pub struct PromptClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    storage_provider: Option<Box<dyn Storage>>,
    example_store: Option<Arc<dyn ExampleStore>>,
    recent_examples: usize,
    include_foreign_keys: bool,
}

impl Default for PromptClientBuilder {
    fn default() -> Self {
        Self {
            ai_provider: None,
            storage_provider: None,
            example_store: None,
            recent_examples: DEFAULT_RECENT_EXAMPLES,
            include_foreign_keys: true,
        }
    }
}

impl PromptClientBuilder {
    /// Creates a new `PromptClientBuilder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlchat::PromptClientBuilder;
    ///
    /// let builder = PromptClientBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AI provider used for SQL generation and narration.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the database the generated SQL runs against.
    pub fn storage_provider(mut self, storage_provider: Box<dyn Storage>) -> Self {
        self.storage_provider = Some(storage_provider);
        self
    }

    /// Sets the store the few-shot examples are read from.
    pub fn example_store(mut self, example_store: Arc<dyn ExampleStore>) -> Self {
        self.example_store = Some(example_store);
        self
    }

    pub fn recent_examples(mut self, count: usize) -> Self {
        self.recent_examples = count;
        self
    }

    pub fn include_foreign_keys(mut self, include: bool) -> Self {
        self.include_foreign_keys = include;
        self
    }

    /// Builds the `PromptClient`.
    ///
    /// Fails if any of the three collaborators has not been set.
    pub fn build(self) -> Result<PromptClient, PromptError> {
        Ok(PromptClient {
            ai_provider: self.ai_provider.ok_or(PromptError::MissingAiProvider)?,
            storage_provider: self
                .storage_provider
                .ok_or(PromptError::MissingStorageProvider)?,
            example_store: self
                .example_store
                .ok_or(PromptError::MissingExampleStore)?,
            recent_examples: self.recent_examples,
            include_foreign_keys: self.include_foreign_keys,
        })
    }
}
