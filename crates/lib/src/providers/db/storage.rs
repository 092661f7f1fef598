use crate::{
    errors::PromptError,
    types::{QueryResult, TableSchema},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a storage backend.
///
/// This trait defines a common interface for executing queries and retrieving
/// catalog information from a relational database.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Returns the query language of the provider (e.g., "SQL").
    fn language(&self) -> &str;

    /// Returns the operator the model should use for case-insensitive text matching.
    fn case_insensitive_operator(&self) -> &str;

    /// Executes a query verbatim and returns its columns and rows.
    async fn execute_query(&self, query: &str) -> Result<QueryResult, PromptError>;

    /// Lists the user tables in the database, ordered by name.
    async fn list_tables(&self) -> Result<Vec<String>, PromptError>;

    /// Retrieves the columns and foreign keys of a given table.
    async fn get_table_schema(&self, table_name: &str) -> Result<TableSchema, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);
