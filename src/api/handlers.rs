//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ClearRequest, InfoResponse, StatusResponse};
use super::AppState;
use crate::chat::{ChatTurn, DEFAULT_SESSION_KEY};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

const ONLINE_MESSAGE: &str =
    "MedAssist AI API is running. Use /api/chat for assistant interactions.";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness
        .route("/", get(info))
        // Conversation
        .route("/api/chat", post(chat))
        .route("/api/clear", post(clear_session))
        .with_state(state)
}

// ============================================================
// Liveness
// ============================================================

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let generator = state.chat.generator();
    Json(InfoResponse {
        status: "online".to_string(),
        message: ONLINE_MESSAGE.to_string(),
        model: generator.model_id().map(str::to_string),
        llm_configured: generator.is_configured(),
        sessions: state.chat.session_count().await,
    })
}

// ============================================================
// Conversation
// ============================================================

/// A body that fails to parse is answered as an empty turn on the default session
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatResponse> {
    let req = payload.map(|Json(req)| req).unwrap_or_else(|rejection| {
        tracing::warn!(error = %rejection, "Unparseable chat request, treating as empty");
        ChatRequest::default()
    });

    let turn = ChatTurn::new(req.session_id, req.message, req.image);
    let response = state.chat.handle_turn(turn).await;

    Json(ChatResponse { response })
}

async fn clear_session(
    State(state): State<AppState>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Json<StatusResponse> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let session_key = req
        .session_id
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string());

    state.chat.clear(&session_key).await;
    Json(StatusResponse::success())
}
