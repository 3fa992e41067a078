use std::sync::Arc;

use crate::ai::AiResponder;
use crate::db::database::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ai: Arc<AiResponder>,
}

impl AppState {
    pub fn new(db: Database, ai: Arc<AiResponder>) -> Self {
        AppState { db, ai }
    }
}
