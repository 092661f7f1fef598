//! # Training Data Handlers
//!
//! Uploading few-shot datasets and inspecting what has been stored.

use super::{AppError, AppState};
use crate::types::ListUploadsResponse;
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use sqlchat::training::{uploads::UploadReport, TrainingStatus};
use tracing::info;

/// Ingests a dataset uploaded as the multipart `file` part.
pub async fn upload_dataset_handler(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>, AppError> {
    let mut dataset: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("dataset.json").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
            info!("Received dataset upload '{file_name}' ({} bytes).", bytes.len());
            dataset = Some(bytes.to_vec());
        }
    }

    let dataset = dataset.ok_or_else(|| {
        AppError::BadRequest("No file provided. Send the dataset in the 'file' field.".to_string())
    })?;

    let report = app_state
        .upload_store
        .ingest(app_state.example_store.as_ref(), &dataset)
        .await?;
    Ok(Json(report))
}

/// Reports how many examples are stored and when they last changed.
pub async fn training_status_handler(
    State(app_state): State<AppState>,
) -> Result<Json<TrainingStatus>, AppError> {
    let status = app_state.example_store.status().await?;
    Ok(Json(status))
}

/// Lists the stored dataset files.
pub async fn list_uploads_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ListUploadsResponse>, AppError> {
    let files = app_state.upload_store.list().await?;
    Ok(Json(ListUploadsResponse { files }))
}
