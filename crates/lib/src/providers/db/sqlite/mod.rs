use crate::{
    errors::PromptError,
    providers::db::storage::Storage,
    types::{ForeignKey, QueryResult, TableField, TableSchema},
};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{params, Database, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance, and opens a fresh connection for
/// every call. When cloned, it shares the same underlying database, so a cloned
/// in-memory provider sees the same tables as the original.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database. To share an in-memory database across multiple
    ///   `SqliteProvider` instances (e.g., in tests), create one provider and
    ///   then `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// A helper to pre-populate data by executing multiple `;`-separated statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PromptError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn table_definition(&self, table_name: &str) -> Result<Option<String>, PromptError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        let mut rows = conn
            .query(sql::TABLE_DEFINITION_SQL, params![table_name])
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;

        match rows
            .next()
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?
        {
            Some(row) => match row.get_value(0) {
                Ok(TursoValue::Text(definition)) => Ok(Some(definition)),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

/// Converts a Turso value to a serde_json::Value.
fn turso_value_to_json(v: TursoValue) -> Value {
    match v {
        TursoValue::Null => Value::Null,
        TursoValue::Integer(i) => Value::Number(i.into()),
        TursoValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TursoValue::Text(s) => Value::String(s),
        TursoValue::Blob(_) => Value::String("<blob>".to_string()),
    }
}

/// Splits the body of a `CREATE TABLE` statement into its top-level definitions.
fn split_definitions(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(body[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Extracts foreign keys from a `CREATE TABLE` statement.
///
/// Both table constraints (`FOREIGN KEY (a) REFERENCES t(b)`) and inline column
/// constraints (`a INTEGER REFERENCES t(b)`) are recognized.
pub fn parse_foreign_keys(create_sql: &str) -> Result<Vec<ForeignKey>, PromptError> {
    let (Some(open), Some(close)) = (create_sql.find('('), create_sql.rfind(')')) else {
        return Ok(Vec::new());
    };
    if close <= open {
        return Ok(Vec::new());
    }

    let ident = r#"[`"\[]?(\w+)[`"\]]?"#;
    let table_constraint = Regex::new(&format!(
        r"(?i)^(?:CONSTRAINT\s+\S+\s+)?FOREIGN\s+KEY\s*\(\s*{ident}\s*\)\s*REFERENCES\s+{ident}\s*\(\s*{ident}\s*\)"
    ))?;
    let inline = Regex::new(&format!(
        r"(?i)^{ident}\s+[^,]*?\bREFERENCES\s+{ident}\s*\(\s*{ident}\s*\)"
    ))?;

    let mut foreign_keys = Vec::new();
    for definition in split_definitions(&create_sql[open + 1..close]) {
        let caps = table_constraint
            .captures(definition)
            .or_else(|| inline.captures(definition));
        if let Some(caps) = caps {
            foreign_keys.push(ForeignKey {
                column: caps[1].to_string(),
                references_table: caps[2].to_string(),
                references_column: caps[3].to_string(),
            });
        }
    }
    Ok(foreign_keys)
}

#[async_trait]
impl Storage for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    fn language(&self) -> &str {
        "SQL"
    }

    fn case_insensitive_operator(&self) -> &str {
        "LIKE"
    }

    /// Executes a query on SQLite and returns its columns and positional rows.
    async fn execute_query(&self, query: &str) -> Result<QueryResult, PromptError> {
        debug!(query = %query, "--> Executing SQLite query");

        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let mut stmt = conn
            .prepare(query)
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;

        let columns: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;

        let mut result_rows = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?
        {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value = row
                    .get_value(i)
                    .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;
                values.push(turso_value_to_json(value));
            }
            result_rows.push(values);
        }

        debug!("<-- Query returned {} rows", result_rows.len());
        Ok(QueryResult {
            columns,
            rows: result_rows,
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>, PromptError> {
        debug!("Listing all tables in SQLite database.");
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let mut rows = conn
            .query(sql::LIST_TABLES_SQL, ())
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;

        let mut tables = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?
        {
            if let Ok(TursoValue::Text(name)) = row.get_value(0) {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    /// Retrieves the columns and foreign keys of a SQLite table.
    async fn get_table_schema(&self, table_name: &str) -> Result<TableSchema, PromptError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let mut rows = conn
            .query(&sql::table_info(table_name), ())
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?;

        let mut fields = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageQueryFailed(e.to_string()))?
        {
            // PRAGMA table_info columns: cid, name, type, notnull, dflt_value, pk
            if let Ok(TursoValue::Text(name)) = row.get_value(1) {
                let r#type = match row.get_value(2) {
                    Ok(TursoValue::Text(t)) if !t.is_empty() => t.to_lowercase(),
                    _ => "any".to_string(),
                };
                fields.push(TableField { name, r#type });
            }
        }

        if fields.is_empty() {
            return Err(PromptError::StorageQueryFailed(format!(
                "Table '{table_name}' not found or has no columns."
            )));
        }

        let foreign_keys = match self.table_definition(table_name).await? {
            Some(definition) => parse_foreign_keys(&definition)?,
            None => Vec::new(),
        };

        info!(table_name = %table_name, "Fetched schema with {} columns and {} foreign keys.", fields.len(), foreign_keys.len());

        Ok(TableSchema {
            fields,
            foreign_keys,
        })
    }
}
