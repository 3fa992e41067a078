use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::models::{MessageInsert, SENDER_BOT, SENDER_USER};
use crate::handlers::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{chat_id}/send", post(send_message))
        .route("/{chat_id}/send-image-query", post(send_image_query))
        .route("/{chat_id}/messages", get(list_messages))
        .route("/{message_id}", delete(delete_message))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    text: Option<String>,
    /// Transcribed voice input, merged into the message text.
    voice_text: Option<String>,
    /// Base64 or data-URL image payload.
    image: Option<String>,
}

fn combine_text_and_voice(text: Option<String>, voice: Option<String>) -> String {
    let text = text.unwrap_or_default();
    match voice.filter(|v| !v.trim().is_empty()) {
        Some(voice) if text.trim().is_empty() => voice,
        Some(voice) => format!("{text} [Voice: {voice}]"),
        None => text,
    }
}

async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = state
        .db
        .find_chat(chat_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;

    let message_text = combine_text_and_voice(req.text, req.voice_text);
    if message_text.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    let user_message = state
        .db
        .insert_message(MessageInsert {
            chat_id: chat.id,
            user_id: user.user_id,
            text: message_text.clone(),
            sender: SENDER_USER.to_string(),
            image_url: req.image.clone(),
        })
        .await?;

    let reply = state.ai.resolve(&message_text, req.image.as_deref()).await;

    let ai_message = state
        .db
        .insert_message(MessageInsert {
            chat_id: chat.id,
            user_id: user.user_id,
            text: reply,
            sender: SENDER_BOT.to_string(),
            image_url: None,
        })
        .await?;

    state.db.touch_chat(chat.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user_message": user_message,
            "ai_message": ai_message
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct SendImageQueryRequest {
    image: Option<String>,
    query: Option<String>,
}

async fn send_image_query(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<i64>,
    Json(req): Json<SendImageQueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = state
        .db
        .find_chat(chat_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;

    let Some(image) = req.image.filter(|data| !data.trim().is_empty()) else {
        return Err(ApiError::BadRequest("Image data required".to_string()));
    };
    let query = req
        .query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| "Analyze this image".to_string());

    let user_message = state
        .db
        .insert_message(MessageInsert {
            chat_id: chat.id,
            user_id: user.user_id,
            text: format!("Image Query: {query}"),
            sender: SENDER_USER.to_string(),
            image_url: Some(image.clone()),
        })
        .await?;

    let reply = state.ai.resolve(&query, Some(&image)).await;

    let ai_message = state
        .db
        .insert_message(MessageInsert {
            chat_id: chat.id,
            user_id: user.user_id,
            text: reply,
            sender: SENDER_BOT.to_string(),
            image_url: None,
        })
        .await?;

    state.db.touch_chat(chat.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user_message": user_message,
            "ai_message": ai_message
        })),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .find_chat(chat_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;

    let messages = state.db.list_messages(chat_id).await?;
    Ok(Json(messages))
}

async fn delete_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .db
        .find_message(message_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    state.db.delete_message(message.id).await?;
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_text_replaces_empty_text() {
        let combined = combine_text_and_voice(None, Some("order a pizza".to_string()));
        assert_eq!(combined, "order a pizza");
    }

    #[test]
    fn voice_text_is_appended_to_typed_text() {
        let combined = combine_text_and_voice(
            Some("please".to_string()),
            Some("order a pizza".to_string()),
        );
        assert_eq!(combined, "please [Voice: order a pizza]");
    }

    #[test]
    fn missing_voice_leaves_text_alone() {
        assert_eq!(
            combine_text_and_voice(Some("hello".to_string()), None),
            "hello"
        );
        assert_eq!(combine_text_and_voice(None, None), "");
    }
}
