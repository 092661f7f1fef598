//! # General Route Handlers
//!
//! The static chat page and the health check.

use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

/// Served when the configured page cannot be read.
const NOT_FOUND_PAGE: &str = "<!DOCTYPE html><html><head><title>Not Found</title></head><body><h1>404 Not Found</h1><p>The chat page is not available.</p></body></html>";

/// The handler for the root (`/`) endpoint, which serves the chat page.
pub async fn root(State(app_state): State<AppState>) -> Response {
    let path = &app_state.config.index_html_path;
    match tokio::fs::read_to_string(path).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            warn!("Could not read index page '{path}': {e}");
            (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
        }
    }
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
