//! # API Payloads
//!
//! Request and response bodies of the HTTP endpoints.

use serde::{Deserialize, Serialize};
use sqlchat::{ChartData, QueryResult};

/// A single chat turn as sent by the frontend.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// The body of `POST /chat`. Only the last message is answered.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// The reply to an empty chat request.
#[derive(Serialize, Deserialize, Debug)]
pub struct ReplyResponse {
    pub reply: String,
}

/// The reply to a chart request.
#[derive(Serialize, Deserialize, Debug)]
pub struct ChartResponse {
    pub sql_query: String,
    pub chart_data: ChartData,
    pub error: Option<String>,
}

/// The reply to a tabular request.
#[derive(Serialize, Deserialize, Debug)]
pub struct NarrativeResponse {
    pub sql_query: String,
    pub db_result: QueryResult,
    pub human_answer: String,
    pub error: Option<String>,
}

/// The body of `GET /list-uploads`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ListUploadsResponse {
    pub files: Vec<String>,
}
