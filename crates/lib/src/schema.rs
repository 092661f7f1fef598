//! # Schema Introspection
//!
//! Reads the live database catalog and renders it as the textual schema
//! description that opens every SQL-generation prompt.

use crate::{errors::PromptError, providers::db::storage::Storage, types::TableSchema};
use std::fmt::Write;
use tracing::{info, warn};

/// Introspects the database and renders its schema for prompting.
///
/// Any catalog error yields an empty string, so the caller falls back to
/// schema-less prompting instead of failing the request.
pub async fn describe_schema(storage: &dyn Storage, include_foreign_keys: bool) -> String {
    match introspect(storage).await {
        Ok(tables) => {
            info!("Introspected {} tables from {}.", tables.len(), storage.name());
            format_schema(&tables, include_foreign_keys)
        }
        Err(e) => {
            warn!("Schema introspection failed, continuing without schema: {e}");
            String::new()
        }
    }
}

async fn introspect(storage: &dyn Storage) -> Result<Vec<(String, TableSchema)>, PromptError> {
    let mut tables = Vec::new();
    for table in storage.list_tables().await? {
        let schema = storage.get_table_schema(&table).await?;
        tables.push((table, schema));
    }
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(tables)
}

/// Renders introspected tables as a numbered list of tables and columns,
/// followed by an optional relationships block.
pub fn format_schema(tables: &[(String, TableSchema)], include_foreign_keys: bool) -> String {
    if tables.is_empty() {
        return String::new();
    }

    let mut out = String::from("Tables:\n");
    for (i, (table, schema)) in tables.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {table}", i + 1);
        for field in &schema.fields {
            let _ = writeln!(out, "- {} ({})", field.name, field.r#type);
        }
    }

    if include_foreign_keys {
        let relationships: Vec<String> = tables
            .iter()
            .flat_map(|(table, schema)| {
                schema.foreign_keys.iter().map(move |fk| {
                    format!(
                        "- {table}.{} references {}({})",
                        fk.column, fk.references_table, fk.references_column
                    )
                })
            })
            .collect();
        if !relationships.is_empty() {
            out.push_str("\nRelationships:\n");
            for line in relationships {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }

    out
}
