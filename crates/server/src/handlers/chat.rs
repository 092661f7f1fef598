//! # Chat Handler
//!
//! `POST /chat` answers the last message of a conversation. The response shape
//! depends on the message's intent and stays the same on failure, with empty
//! data and the `error` field set.

use super::AppState;
use crate::errors::{message_for, status_for};
use crate::types::{ChartResponse, ChatRequest, NarrativeResponse, ReplyResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlchat::{
    classify_intent, constants::NO_MESSAGE_REPLY, ChatFailure, ChatOutcome, Intent,
};
use tracing::{error, info};

/// The handler for the `/chat` endpoint.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let Some(message) = payload
        .messages
        .last()
        .map(|m| m.content.trim())
        .filter(|content| !content.is_empty())
    else {
        info!("Chat request without a message.");
        let body = ReplyResponse {
            reply: NO_MESSAGE_REPLY.to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    info!("Received chat message: '{message}'");
    match app_state.prompt_client.execute_chat(message).await {
        Ok(outcome) => success_response(outcome),
        Err(failure) => failure_response(classify_intent(message), failure),
    }
}

fn success_response(outcome: ChatOutcome) -> Response {
    match outcome {
        ChatOutcome::Chart {
            sql_query,
            chart_data,
        } => Json(ChartResponse {
            sql_query,
            chart_data,
            error: None,
        })
        .into_response(),
        ChatOutcome::Narrative {
            sql_query,
            db_result,
            human_answer,
        } => Json(NarrativeResponse {
            sql_query,
            db_result,
            human_answer,
            error: None,
        })
        .into_response(),
    }
}

fn failure_response(intent: Intent, failure: ChatFailure) -> Response {
    error!("Chat request failed: {:?}", failure.error);
    let status = status_for(&failure.error);
    let error = Some(format!(
        "Sorry, I couldn't process your request. Error: {}",
        message_for(&failure.error)
    ));
    let sql_query = failure.sql_query.unwrap_or_default();

    match intent {
        Intent::Chart => (
            status,
            Json(ChartResponse {
                sql_query,
                chart_data: Default::default(),
                error,
            }),
        )
            .into_response(),
        Intent::Tabular => (
            status,
            Json(NarrativeResponse {
                sql_query,
                db_result: Default::default(),
                human_answer: String::new(),
                error,
            }),
        )
            .into_response(),
    }
}
