use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::routes::error_status;
use crate::api::state::AppState;
use crate::domain::Message;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub document_id: Uuid,
    pub message: String,
    /// Prior turns, oldest first. The service only forwards the most recent
    /// window to the model.
    #[serde(default)]
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub context_chunks: usize,
    pub grounded: bool,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let answer = state
        .chat_service
        .ask(request.document_id, &request.message, &request.history)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, document_id = %request.document_id, "Chat failed");
            error_status(&e)
        })?;

    Ok(Json(ChatResponse {
        answer: answer.answer,
        context_chunks: answer.context_chunks,
        grounded: answer.grounded,
    }))
}
