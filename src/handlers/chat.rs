use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::handlers::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(quick_chat))
        .route("/image", post(analyze_image))
        .route("/histories", get(list_histories))
        .route("/create", post(create_chat))
        .route("/{chat_id}", get(get_chat))
        .route("/{chat_id}/delete", delete(delete_chat))
        .route("/{chat_id}/clear", post(clear_chat))
}

async fn list_histories(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let chats = state.db.list_chats(user.user_id).await?;
    Ok(Json(chats))
}

#[derive(Debug, Deserialize)]
struct CreateChatRequest {
    title: Option<String>,
}

async fn create_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = req.title.unwrap_or_else(|| "New Chat".to_string());
    let chat = state.db.create_chat(user.user_id, &title).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

async fn get_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = state
        .db
        .find_chat(chat_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    let messages = state.db.list_messages(chat_id).await?;

    let mut body = serde_json::to_value(&chat)?;
    body["messages"] = serde_json::to_value(&messages)?;
    Ok(Json(body))
}

async fn delete_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = state
        .db
        .find_chat(chat_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    state.db.delete_chat(chat.id).await?;
    Ok(Json(json!({ "message": "Chat deleted successfully" })))
}

async fn clear_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = state
        .db
        .find_chat(chat_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    state.db.clear_chat_messages(chat.id).await?;
    Ok(Json(json!({ "message": "Chat cleared successfully" })))
}

#[derive(Debug, Deserialize)]
struct QuickChatRequest {
    message: Option<String>,
}

/// Stateless exchange: resolves a reply without touching chat history.
async fn quick_chat(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<QuickChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = req.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    let reply = state.ai.resolve(message, None).await;
    Ok(Json(json!({
        "message": message,
        "reply": &reply,
        "response": &reply
    })))
}

#[derive(Debug, Deserialize)]
struct AnalyzeImageRequest {
    image: Option<String>,
    question: Option<String>,
}

async fn analyze_image(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<AnalyzeImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(image) = req.image.filter(|data| !data.trim().is_empty()) else {
        return Err(ApiError::BadRequest("No image provided".to_string()));
    };
    let question = req
        .question
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| "What is in this image?".to_string());

    let prompt = format!("{question}\n\n[Image Analysis]");
    let reply = state.ai.resolve(&prompt, Some(&image)).await;
    Ok(Json(json!({
        "question": question,
        "reply": &reply,
        "response": &reply
    })))
}
