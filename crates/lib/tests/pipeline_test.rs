//! # Chat Pipeline Tests
//!
//! Drives `PromptClient::execute_chat` end to end against a seeded in-memory
//! database and a `MockAiProvider`, covering both answer shapes and every
//! failure class.

mod common;

use common::{setup_tracing, strings};
use serde_json::json;
use sqlchat::constants::NO_RESULTS_MESSAGE;
use sqlchat::training::store::ExampleStore;
use sqlchat::{ChatOutcome, PromptClient, PromptClientBuilder, PromptError};
use sqlchat_test_utils::{MockAiProvider, TestSetup};

/// A unique substring of the SQL generation system prompt.
const SQL_KEY: &str = "SQL expert";
/// A unique substring of the narration system prompt.
const NARRATION_KEY: &str = "data assistant";

fn client(setup: &TestSetup, ai: &MockAiProvider) -> PromptClient {
    PromptClientBuilder::new()
        .ai_provider(Box::new(ai.clone()))
        .storage_provider(Box::new(setup.provider.clone()))
        .example_store(setup.example_store.clone())
        .build()
        .expect("Failed to build PromptClient")
}

#[tokio::test]
async fn test_narrative_answer() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let ai = MockAiProvider::new();
    ai.add_response(
        SQL_KEY,
        "```sql\nSELECT name FROM employee WHERE department_id = 1 ORDER BY id;\n```",
    );
    ai.add_response(NARRATION_KEY, "  Alice and Carol work in Engineering.\n");

    let outcome = client(&setup, &ai)
        .execute_chat("Who works in engineering?")
        .await
        .expect("chat should succeed");

    match outcome {
        ChatOutcome::Narrative {
            sql_query,
            db_result,
            human_answer,
        } => {
            assert_eq!(
                sql_query,
                "SELECT name FROM employee WHERE department_id = 1 ORDER BY id;"
            );
            assert_eq!(db_result.columns, vec!["name".to_string()]);
            assert_eq!(db_result.rows, vec![vec![json!("Alice")], vec![json!("Carol")]]);
            assert_eq!(human_answer, "Alice and Carol work in Engineering.");
        }
        other => panic!("expected a narrative outcome, got {other:?}"),
    }

    let calls = ai.get_calls();
    assert_eq!(calls.len(), 2);
    // The narration prompt carries the question and the flattened rows.
    assert!(calls[1].1.contains("Who works in engineering?"));
    assert!(calls[1].1.contains("Alice\nCarol"));
}

#[tokio::test]
async fn test_chart_answer() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    setup
        .provider
        .initialize_with_data(
            "CREATE TABLE hires (year INTEGER, count INTEGER);
             INSERT INTO hires VALUES (2021, 10);
             INSERT INTO hires VALUES (2022, 20);",
        )
        .await
        .unwrap();
    let ai = MockAiProvider::new();
    ai.add_response(SQL_KEY, "SELECT year, count FROM hires ORDER BY year;");

    let outcome = client(&setup, &ai)
        .execute_chat("Show a Chart of hires per year")
        .await
        .expect("chat should succeed");

    match outcome {
        ChatOutcome::Chart {
            sql_query,
            chart_data,
        } => {
            assert_eq!(sql_query, "SELECT year, count FROM hires ORDER BY year;");
            assert_eq!(chart_data.x, vec![json!(2021), json!(2022)]);
            assert_eq!(chart_data.y, vec![json!(10), json!(20)]);
            assert_eq!(chart_data.x_label, "year");
            assert_eq!(chart_data.y_label, "count");
        }
        other => panic!("expected a chart outcome, got {other:?}"),
    }

    // Charts are not narrated, and the prompt carried the chart rules.
    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.contains("Chart Rules:"));
}

#[tokio::test]
async fn test_zero_rows_skip_narration() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let ai = MockAiProvider::new();
    ai.add_response(SQL_KEY, "SELECT name FROM employee WHERE age > 100;");

    let outcome = client(&setup, &ai)
        .execute_chat("Who is older than 100?")
        .await
        .unwrap();

    let ChatOutcome::Narrative { human_answer, .. } = outcome else {
        panic!("expected a narrative outcome");
    };
    assert_eq!(human_answer, NO_RESULTS_MESSAGE);
    assert_eq!(ai.get_calls().len(), 1, "the model must not be asked to narrate");
}

#[tokio::test]
async fn test_prompt_includes_schema_and_three_recent_examples() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    setup
        .example_store
        .add(
            &strings(&["q1", "q2", "q3", "q4"]),
            &strings(&["SELECT 1;", "SELECT 2;", "SELECT 3;", "SELECT 4;"]),
        )
        .await
        .unwrap();
    let ai = MockAiProvider::new();
    ai.add_response(SQL_KEY, "SELECT COUNT(*) AS total FROM employee;");
    ai.add_response(NARRATION_KEY, "There are 3 employees.");

    client(&setup, &ai)
        .execute_chat("How many employees are there?")
        .await
        .unwrap();

    let prompt = &ai.get_calls()[0].1;
    assert!(prompt.contains("1. department"));
    assert!(prompt.contains("- employee.department_id references department(id)"));
    assert!(prompt.contains("Use LIKE instead of ="));
    assert!(!prompt.contains("Question: q1\n"));
    assert!(prompt.contains("Question: q2\nSQL: SELECT 2;\n\nQuestion: q3\nSQL: SELECT 3;\n\nQuestion: q4\nSQL: SELECT 4;"));
    assert!(prompt.ends_with("User Request: How many employees are there?"));
    assert!(!prompt.contains("Chart Rules"));
}

#[tokio::test]
async fn test_bad_sql_reports_generated_query() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let ai = MockAiProvider::new();
    ai.add_response(SQL_KEY, "SELECT salary FROM payroll;");

    let failure = client(&setup, &ai)
        .execute_chat("What is the payroll?")
        .await
        .unwrap_err();

    assert_eq!(failure.sql_query.as_deref(), Some("SELECT salary FROM payroll;"));
    assert!(matches!(failure.error, PromptError::StorageQueryFailed(_)));
}

#[tokio::test]
async fn test_model_failure_has_no_query() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    // Nothing programmed: every call fails.
    let ai = MockAiProvider::new();

    let failure = client(&setup, &ai)
        .execute_chat("How many employees?")
        .await
        .unwrap_err();

    assert!(failure.sql_query.is_none());
    assert!(matches!(failure.error, PromptError::AiApi(_)));
}

#[tokio::test]
async fn test_single_column_chart_is_rejected() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    let ai = MockAiProvider::new();
    ai.add_response(SQL_KEY, "SELECT COUNT(*) AS total FROM employee;");

    let failure = client(&setup, &ai)
        .execute_chat("chart the employee count")
        .await
        .unwrap_err();

    assert!(matches!(failure.error, PromptError::ChartShape(1)));
    assert_eq!(
        failure.sql_query.as_deref(),
        Some("SELECT COUNT(*) AS total FROM employee;")
    );
}

#[tokio::test]
async fn test_builder_requires_collaborators() {
    let result = PromptClientBuilder::new()
        .ai_provider(Box::new(MockAiProvider::new()))
        .build();
    assert!(matches!(result, Err(PromptError::MissingStorageProvider)));
}
