//! # Common Test Utilities
//!
//! - `TestApp`: spawns the real router on a random port. The database is an
//!   in-memory SQLite seeded with the company fixture, the training files live
//!   in a temporary directory, and the AI provider is a `LocalAiProvider`
//!   pointed at an `httpmock::MockServer`.

// Not every test binary uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::json;
use sqlchat::providers::factory::{create_provider, ProviderConfig};
use sqlchat_server::{config::AppConfig, router::create_router, state::build_app_state_with};
use sqlchat_test_utils::TestSetup;
use std::{net::SocketAddr, path::PathBuf};
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};

/// The path the mock model answers on.
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";
/// A substring of the SQL generation system prompt.
pub const SQL_KEY: &str = "SQL expert";
/// A substring of the narration system prompt.
pub const NARRATION_KEY: &str = "data assistant";
/// The content of the chat page served at `/`.
pub const INDEX_HTML: &str = "<html><body><h1>SQL Chat</h1></body></html>";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub data_dir: TempDir,
    _setup: TestSetup,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server with the default test configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the application server after letting the caller adjust the configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        dotenvy::dotenv().ok();
        // `try_init` is used to prevent panic if the logger is already initialized.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let data_dir = tempfile::tempdir()?;
        let index_path = data_dir.path().join("index.html");
        tokio::fs::write(&index_path, INDEX_HTML).await?;

        let mut config = AppConfig {
            port: 0,
            db_url: ":memory:".to_string(),
            index_html_path: path_string(index_path),
            examples_file: path_string(data_dir.path().join("training_examples.json")),
            upload_dir: path_string(data_dir.path().join("uploads")),
            recent_examples: 3,
            include_foreign_keys: true,
            ai: ProviderConfig {
                provider: "local".to_string(),
                api_url: Some(mock_server.url(COMPLETIONS_PATH)),
                api_key: None,
                model_name: "mock-model".to_string(),
            },
        };
        configure(&mut config);

        let setup = TestSetup::new().await?;
        let ai_provider = create_provider(&config.ai)?;
        let app_state =
            build_app_state_with(config, ai_provider, Box::new(setup.provider.clone()))?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            data_dir,
            _setup: setup,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Answers SQL generation requests with `sql`.
    pub async fn mock_sql(&self, sql: &str) -> Mock<'_> {
        self.mock_completion(SQL_KEY, sql).await
    }

    /// Answers narration requests with `answer`.
    pub async fn mock_narration(&self, answer: &str) -> Mock<'_> {
        self.mock_completion(NARRATION_KEY, answer).await
    }

    async fn mock_completion(&self, key: &str, content: &str) -> Mock<'_> {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });
        let key = key.to_string();
        self.mock_server
            .mock_async(move |when, then| {
                when.method(POST).path(COMPLETIONS_PATH).body_contains(key);
                then.status(200).json_body(body);
            })
            .await
    }

    /// Sends a single-message chat request.
    pub async fn chat(&self, message: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat", self.address))
            .json(&json!({ "messages": [{ "role": "user", "content": message }] }))
            .send()
            .await?;
        Ok(response)
    }

    /// Uploads `body` as the multipart `file` part of `/upload-dataset`.
    pub async fn upload(&self, body: &str) -> Result<reqwest::Response> {
        let part = reqwest::multipart::Part::bytes(body.as_bytes().to_vec())
            .file_name("dataset.json")
            .mime_str("application/json")?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(format!("{}/upload-dataset", self.address))
            .multipart(form)
            .send()
            .await?;
        Ok(response)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.path().join("uploads")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver might already be gone if the server task panicked.
            let _ = tx.send(());
        }
    }
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
