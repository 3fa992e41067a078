use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{info, warn};

mod ai;
mod auth;
mod config;
mod db;
mod handlers;
mod state;
mod utils;

use ai::AiResponder;
use config::CONFIG;
use db::database::Database;
use state::AppState;
use utils::logging::init_logging;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    info!("Starting AI chat backend");

    let db = Database::init(&CONFIG.database_url).await?;

    let ai = Arc::new(AiResponder::from_config());
    if ai.ensure_ready() {
        info!("Gemini provider ready (model: {})", CONFIG.gemini_model);
    } else {
        warn!("Gemini provider not ready; replies will come from fallbacks");
    }

    let state = AppState::new(db, ai);
    let app = handlers::app(state);

    let bind_address = format!("{}:{}", CONFIG.server_host, CONFIG.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("HTTP server listening on {bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
