use std::str::FromStr;

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::{ChatRow, MessageInsert, MessageRow, UserRow};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (\
                id INTEGER PRIMARY KEY AUTOINCREMENT,\
                username TEXT NOT NULL UNIQUE,\
                email TEXT NOT NULL UNIQUE,\
                password_hash TEXT NOT NULL,\
                created_at TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_histories (\
                id INTEGER PRIMARY KEY AUTOINCREMENT,\
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,\
                title TEXT NOT NULL,\
                created_at TEXT NOT NULL,\
                updated_at TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (\
                id INTEGER PRIMARY KEY AUTOINCREMENT,\
                chat_id INTEGER NOT NULL REFERENCES chat_histories(id) ON DELETE CASCADE,\
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,\
                text TEXT NOT NULL,\
                sender TEXT NOT NULL,\
                image_url TEXT,\
                created_at TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_histories_user_id ON chat_histories(user_id);",
        )
        .execute(&pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_chat_id ON messages(chat_id);")
            .execute(&pool)
            .await?;

        info!("Database tables created successfully");

        Ok(Database { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create_chat(&self, user_id: i64, title: &str) -> Result<ChatRow> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO chat_histories (user_id, title, created_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(title)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, ChatRow>(
            "SELECT id, user_id, title, created_at, updated_at FROM chat_histories WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_chats(&self, user_id: i64) -> Result<Vec<ChatRow>> {
        let rows = sqlx::query_as::<_, ChatRow>(
            "SELECT id, user_id, title, created_at, updated_at FROM chat_histories \
             WHERE user_id = ? ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Ownership-scoped lookup: only returns the chat when it belongs to
    /// the given user.
    pub async fn find_chat(&self, chat_id: i64, user_id: i64) -> Result<Option<ChatRow>> {
        let row = sqlx::query_as::<_, ChatRow>(
            "SELECT id, user_id, title, created_at, updated_at FROM chat_histories \
             WHERE id = ? AND user_id = ?",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_chat(&self, chat_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM chat_histories WHERE id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_chat_messages(&self, chat_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn touch_chat(&self, chat_id: i64) -> Result<()> {
        sqlx::query("UPDATE chat_histories SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_message(&self, insert: MessageInsert) -> Result<MessageRow> {
        let result = sqlx::query(
            "INSERT INTO messages (chat_id, user_id, text, sender, image_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(insert.chat_id)
        .bind(insert.user_id)
        .bind(&insert.text)
        .bind(&insert.sender)
        .bind(&insert.image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, user_id, text, sender, image_url, created_at \
             FROM messages WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_messages(&self, chat_id: i64) -> Result<Vec<MessageRow>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, user_id, text, sender, image_url, created_at \
             FROM messages WHERE chat_id = ? ORDER BY created_at, id",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_message(&self, message_id: i64, user_id: i64) -> Result<Option<MessageRow>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, user_id, text, sender, image_url, created_at \
             FROM messages WHERE id = ? AND user_id = ?",
        )
        .bind(message_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_message(&self, message_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{SENDER_BOT, SENDER_USER};
    use tempfile::TempDir;

    async fn test_db() -> (TempDir, Database) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let db = Database::init(&url).await.expect("init db");
        (dir, db)
    }

    fn user_message(chat_id: i64, user_id: i64, text: &str) -> MessageInsert {
        MessageInsert {
            chat_id,
            user_id,
            text: text.to_string(),
            sender: SENDER_USER.to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn creates_and_finds_users() {
        let (_dir, db) = test_db().await;
        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        assert_eq!(user.username, "alice");

        let found = db.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        let found = db.find_user_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(db.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_usernames() {
        let (_dir, db) = test_db().await;
        db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let err = db.create_user("alice", "other@example.com", "hash").await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn lists_chats_most_recently_updated_first() {
        let (_dir, db) = test_db().await;
        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let first = db.create_chat(user.id, "first").await.unwrap();
        let _second = db.create_chat(user.id, "second").await.unwrap();

        db.touch_chat(first.id).await.unwrap();
        let chats = db.list_chats(user.id).await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].title, "first");
    }

    #[tokio::test]
    async fn chat_lookup_is_scoped_to_the_owner() {
        let (_dir, db) = test_db().await;
        let alice = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let bob = db.create_user("bob", "bob@example.com", "hash").await.unwrap();
        let chat = db.create_chat(alice.id, "mine").await.unwrap();

        assert!(db.find_chat(chat.id, alice.id).await.unwrap().is_some());
        assert!(db.find_chat(chat.id, bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn messages_are_listed_in_insertion_order() {
        let (_dir, db) = test_db().await;
        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let chat = db.create_chat(user.id, "chat").await.unwrap();

        db.insert_message(user_message(chat.id, user.id, "one")).await.unwrap();
        db.insert_message(MessageInsert {
            chat_id: chat.id,
            user_id: user.id,
            text: "two".to_string(),
            sender: SENDER_BOT.to_string(),
            image_url: None,
        })
        .await
        .unwrap();

        let messages = db.list_messages(chat.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "one");
        assert_eq!(messages[0].sender, SENDER_USER);
        assert_eq!(messages[1].text, "two");
        assert_eq!(messages[1].sender, SENDER_BOT);
    }

    #[tokio::test]
    async fn deleting_a_chat_cascades_to_its_messages() {
        let (_dir, db) = test_db().await;
        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let chat = db.create_chat(user.id, "chat").await.unwrap();
        db.insert_message(user_message(chat.id, user.id, "hello")).await.unwrap();

        db.delete_chat(chat.id).await.unwrap();
        assert!(db.find_chat(chat.id, user.id).await.unwrap().is_none());
        assert!(db.list_messages(chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clearing_a_chat_removes_messages_but_keeps_the_chat() {
        let (_dir, db) = test_db().await;
        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let chat = db.create_chat(user.id, "chat").await.unwrap();
        db.insert_message(user_message(chat.id, user.id, "hello")).await.unwrap();

        db.clear_chat_messages(chat.id).await.unwrap();
        assert!(db.list_messages(chat.id).await.unwrap().is_empty());
        assert!(db.find_chat(chat.id, user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn message_deletion_is_scoped_to_the_owner() {
        let (_dir, db) = test_db().await;
        let alice = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let bob = db.create_user("bob", "bob@example.com", "hash").await.unwrap();
        let chat = db.create_chat(alice.id, "chat").await.unwrap();
        let message = db.insert_message(user_message(chat.id, alice.id, "hello")).await.unwrap();

        assert!(db.find_message(message.id, bob.id).await.unwrap().is_none());
        assert!(db.find_message(message.id, alice.id).await.unwrap().is_some());
        db.delete_message(message.id).await.unwrap();
        assert!(db.find_message(message.id, alice.id).await.unwrap().is_none());
    }
}
