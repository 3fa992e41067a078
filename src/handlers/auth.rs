use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{jwt, password, AuthUser};
use crate::handlers::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(email), Some(pass)) = (
        non_empty(req.username),
        non_empty(req.email),
        non_empty(req.password),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    if state.db.find_user_by_username(&username).await?.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }
    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&pass)?;
    let user = state.db.create_user(&username, &email, &password_hash).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(pass)) = (non_empty(req.username), non_empty(req.password)) else {
        return Err(ApiError::BadRequest(
            "Missing username or password".to_string(),
        ));
    };

    let user = state.db.find_user_by_username(&username).await?;
    let Some(user) = user else {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };
    if !password::verify_password(&pass, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = jwt::create_token(user.id, &user.username)?;

    // Both token keys are kept for older clients.
    Ok(Json(json!({
        "message": "Login successful",
        "access_token": &access_token,
        "token": &access_token,
        "user": user
    })))
}

async fn logout(_user: AuthUser) -> Json<serde_json::Value> {
    // Tokens are stateless; invalidation is the client's concern.
    Json(json!({ "message": "Logged out successfully" }))
}

async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.db.find_user_by_id(user.user_id).await?;
    match row {
        Some(row) => Ok(Json(row)),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}
