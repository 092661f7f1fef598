use anyhow::Result;
use async_trait::async_trait;
use sqlchat::errors::PromptError;
use sqlchat::providers::{ai::AiProvider, db::sqlite::SqliteProvider};
use sqlchat::training::store::JsonExampleStore;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// The schema and rows every test database starts with.
pub const COMPANY_FIXTURE_SQL: &str = "
    CREATE TABLE department (id INTEGER PRIMARY KEY, name TEXT, location TEXT);
    CREATE TABLE employee (id INTEGER PRIMARY KEY, name TEXT, age INTEGER, department_id INTEGER, salary REAL, join_date TEXT, FOREIGN KEY (department_id) REFERENCES department(id));
    INSERT INTO department (id, name, location) VALUES (1, 'Engineering', 'Berlin');
    INSERT INTO department (id, name, location) VALUES (2, 'Sales', 'Lisbon');
    INSERT INTO employee (id, name, age, department_id, salary, join_date) VALUES (1, 'Alice', 34, 1, 5200.0, '2021-03-01');
    INSERT INTO employee (id, name, age, department_id, salary, join_date) VALUES (2, 'Bob', 41, 2, 4100.0, '2022-07-15');
    INSERT INTO employee (id, name, age, department_id, salary, join_date) VALUES (3, 'Carol', 29, 1, 4800.0, '2022-01-10');
";

// --- Test Setup ---

/// A helper struct holding an isolated database and example store for each test.
pub struct TestSetup {
    pub provider: SqliteProvider,
    pub example_store: Arc<JsonExampleStore>,
    pub data_dir: TempDir,
}

impl TestSetup {
    /// Creates a new in-memory database seeded with the company fixture, and
    /// an empty example store in a temporary directory.
    pub async fn new() -> Result<Self> {
        let provider = SqliteProvider::new(":memory:").await?;
        provider.initialize_with_data(COMPANY_FIXTURE_SQL).await?;

        let data_dir = tempfile::tempdir()?;
        let example_store = Arc::new(JsonExampleStore::new(
            data_dir.path().join("training_examples.json"),
        ));

        Ok(Self {
            provider,
            example_store,
            data_dir,
        })
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for system prompt. Got: '{system_prompt}'"
        )))
    }
}
