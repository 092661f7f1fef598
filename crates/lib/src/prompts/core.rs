//! # SQL Generation Prompts
//!
//! The prompt sent to the model is assembled from fixed parts, in order:
//! schema preamble, generation rules, chart rules (chart requests only),
//! recent examples, and the user's request. Identical inputs always produce a
//! byte-identical prompt.

use crate::intent::Intent;

/// The system prompt for the SQL generation stage.
///
/// Placeholders: `{language}`, `{db_name}`
pub const SQL_GENERATION_SYSTEM_PROMPT: &str = "You are a {language} expert for {db_name}. You translate a user's request into a single {language} query.";

/// Placeholders: `{db_name}`, `{schema}`
const SCHEMA_PREAMBLE: &str = "You must assume the following {db_name} database schema:\n\n{schema}";

/// Used when introspection produced nothing.
const NO_SCHEMA_PREAMBLE: &str = "No schema information is available. Use only table and column names that the user's request makes explicit.";

/// Placeholders: `{db_name}`, `{language}`, `{operator}`
const GENERATION_RULES: &str = "Rules:
- Always generate queries based on these tables and their relationships.
- Use proper JOINs where necessary based on foreign keys.
- Use {operator} instead of = for any text comparison to make it case-insensitive.
- Do not hallucinate columns that are not in these tables.
- Output only pure {db_name} {language} code, without markdown formatting (no ```sql).";

const CHART_RULES: &str = "Chart Rules:
- The user wants a chart. The query MUST return exactly two columns.
- The first column is the category or label for the x axis; the second column is the numeric value for the y axis.
- Alias both columns with short, human-readable names, because they are used as the axis labels.";

/// Everything the SQL generation prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub user_message: &'a str,
    /// The rendered schema description; may be empty.
    pub schema: &'a str,
    /// Few-shot examples as (question, SQL) pairs, oldest first.
    pub examples: &'a [(String, String)],
    pub intent: Intent,
    /// The database name shown to the model (e.g. "SQLite").
    pub db_name: &'a str,
    /// The query language (e.g. "SQL").
    pub language: &'a str,
    /// The case-insensitive match operator of the dialect (e.g. "LIKE").
    pub case_insensitive_operator: &'a str,
}

/// Renders the system prompt for SQL generation.
pub fn sql_system_prompt(language: &str, db_name: &str) -> String {
    SQL_GENERATION_SYSTEM_PROMPT
        .replace("{language}", language)
        .replace("{db_name}", db_name)
}

/// Assembles the SQL generation prompt.
pub fn build_sql_prompt(ctx: &PromptContext<'_>) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(5);

    let schema = ctx.schema.trim_end();
    if schema.is_empty() {
        sections.push(NO_SCHEMA_PREAMBLE.to_string());
    } else {
        sections.push(
            SCHEMA_PREAMBLE
                .replace("{db_name}", ctx.db_name)
                .replace("{schema}", schema),
        );
    }

    sections.push(
        GENERATION_RULES
            .replace("{operator}", ctx.case_insensitive_operator)
            .replace("{db_name}", ctx.db_name)
            .replace("{language}", ctx.language),
    );

    if ctx.intent == Intent::Chart {
        sections.push(CHART_RULES.to_string());
    }

    if !ctx.examples.is_empty() {
        let examples = ctx
            .examples
            .iter()
            .map(|(question, sql)| format!("Question: {question}\nSQL: {sql}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("Examples:\n{examples}"));
    }

    sections.push(format!("User Request: {}", ctx.user_message));

    sections.join("\n\n")
}
