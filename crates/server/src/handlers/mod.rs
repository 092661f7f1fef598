//! # Route Handlers
//!
//! Axum handlers for the `sqlchat-server`, grouped by concern.

pub mod chat;
pub mod general;
pub mod training;

pub use crate::errors::AppError;
pub use crate::state::AppState;

pub use chat::chat_handler;
pub use general::{health_check, root};
pub use training::{list_uploads_handler, training_status_handler, upload_dataset_handler};
