use thiserror::Error;

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("AI provider is not configured")]
    MissingAiProvider,
    #[error("Storage provider is not configured")]
    MissingStorageProvider,
    #[error("Example store is not configured")]
    MissingExampleStore,
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage query execution failed: {0}")]
    StorageQueryFailed(String),
    #[error("Example store error: {0}")]
    ExampleStore(#[from] std::io::Error),
    #[error("Invalid training dataset: {0}")]
    InvalidDataset(String),
    #[error("Chart requires at least two result columns, got {0}")]
    ChartShape(usize),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
