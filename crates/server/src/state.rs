//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds all shared resources, such
//! as the configuration, the prompt client and the training stores, making them
//! accessible to all request handlers.

use crate::config::AppConfig;
use sqlchat::{
    providers::{
        ai::AiProvider,
        db::{sqlite::SqliteProvider, storage::Storage},
        factory::create_provider,
    },
    training::{
        store::{ExampleStore, JsonExampleStore},
        uploads::UploadStore,
    },
    PromptClient, PromptClientBuilder,
};
use std::{path::Path, sync::Arc};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// The natural-language-to-SQL pipeline.
    pub prompt_client: Arc<PromptClient>,
    /// The few-shot examples, shared with `prompt_client`.
    pub example_store: Arc<dyn ExampleStore>,
    /// The content-addressed directory of uploaded datasets.
    pub upload_store: Arc<UploadStore>,
}

/// Builds the shared application state from the configuration.
///
/// - It instantiates the AI provider named in the `ai` section.
/// - It opens the SQLite database, creating its parent directory if needed.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = create_provider(&config.ai)?;
    info!(provider = %config.ai.provider, model = %config.ai.model_name, "Initialized AI provider.");

    if let Some(parent) = Path::new(&config.db_url).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    info!(db_path = %config.db_url, "Initialized storage provider (SQLite).");

    build_app_state_with(config, ai_provider, Box::new(sqlite_provider))
}

/// Wires already constructed providers into an `AppState`.
pub fn build_app_state_with(
    config: AppConfig,
    ai_provider: Box<dyn AiProvider>,
    storage_provider: Box<dyn Storage>,
) -> anyhow::Result<AppState> {
    let example_store: Arc<dyn ExampleStore> =
        Arc::new(JsonExampleStore::new(&config.examples_file));
    let upload_store = Arc::new(UploadStore::new(&config.upload_dir));

    let prompt_client = PromptClientBuilder::new()
        .ai_provider(ai_provider)
        .storage_provider(storage_provider)
        .example_store(example_store.clone())
        .recent_examples(config.recent_examples)
        .include_foreign_keys(config.include_foreign_keys)
        .build()?;

    Ok(AppState {
        config: Arc::new(config),
        prompt_client: Arc::new(prompt_client),
        example_store,
        upload_store,
    })
}
