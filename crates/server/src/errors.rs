use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlchat::PromptError;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
pub enum AppError {
    /// Errors originating from the `sqlchat` library.
    Prompt(PromptError),
    /// Client input that was rejected before any work was done.
    BadRequest(String),
}

/// Conversion from `PromptError` to `AppError`.
impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Prompt(err)
    }
}

/// Maps a library error onto the HTTP status reported to the client.
///
/// Model failures are upstream failures (502), a query the database rejects or
/// a result that cannot be charted is a bad request (400), and everything else
/// is on the server (500).
pub fn status_for(err: &PromptError) -> StatusCode {
    match err {
        PromptError::AiRequest(_) | PromptError::AiDeserialization(_) | PromptError::AiApi(_) => {
            StatusCode::BAD_GATEWAY
        }
        PromptError::StorageQueryFailed(_)
        | PromptError::ChartShape(_)
        | PromptError::InvalidDataset(_) => StatusCode::BAD_REQUEST,
        PromptError::MissingAiProvider
        | PromptError::MissingStorageProvider
        | PromptError::MissingExampleStore
        | PromptError::ReqwestClientBuild(_)
        | PromptError::StorageConnection(_)
        | PromptError::ExampleStore(_)
        | PromptError::JsonSerialization(_)
        | PromptError::Regex(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The client-facing message for a library error.
pub fn message_for(err: &PromptError) -> String {
    match err {
        PromptError::MissingAiProvider
        | PromptError::MissingStorageProvider
        | PromptError::MissingExampleStore => "Server is not configured correctly.".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Prompt(err) => {
                // Log the original error for debugging purposes
                error!("PromptError: {:?}", err);
                (status_for(&err), message_for(&err))
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
