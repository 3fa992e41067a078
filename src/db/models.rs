use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const SENDER_USER: &str = "user";
pub const SENDER_BOT: &str = "bot";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageRow {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub text: String,
    pub sender: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MessageInsert {
    pub chat_id: i64,
    pub user_id: i64,
    pub text: String,
    pub sender: String,
    pub image_url: Option<String>,
}
