use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::config::CONFIG;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "AI Chat API is running",
        "gemini_ready": state.ai.gemini_ready(),
        "api_key_exists": !CONFIG.gemini_api_key.trim().is_empty()
    }))
}
