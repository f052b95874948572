// This is the entry point of the moderation gateway.
//
// **Architecture Overview:**
// - `core/` = Business logic (transport-agnostic)
// - `infra/` = Implementations of core traits (database, hosted APIs)
// - `http/` = HTTP-specific adapters (routes, handlers)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Bind the HTTP listener and serve

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "http/http_layer.rs"]
mod http;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::moderation::{
    ModerationConfig, ModerationLogStore, ModerationOracle, ModerationService,
};
use crate::http::routes::create_router;
use crate::http::state::AppState;
use crate::infra::moderation::{OpenAiModerationClient, SqliteModerationLogStore};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory for SQLite files");
    let db_path = format!("{}/moderation.db", data_dir);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", db_path))
        .await
        .expect("Failed to connect to moderation DB");
    let log_store = SqliteModerationLogStore::new(pool);
    log_store
        .migrate()
        .await
        .expect("Failed to migrate moderation DB");

    // The oracle stage is optional: without a credential it is skipped,
    // which is a configuration state, not an error.
    let oracle: Option<Box<dyn ModerationOracle>> = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            let client =
                OpenAiModerationClient::new(key).expect("Failed to create moderations client");
            Some(Box::new(client))
        }
        _ => {
            tracing::info!("OPENAI_API_KEY not set; external moderation stage disabled");
            None
        }
    };

    let config = ModerationConfig {
        oracle_enabled: oracle.is_some(),
        ..Default::default()
    };

    let service = ModerationService::new(
        Box::new(log_store) as Box<dyn ModerationLogStore>,
        oracle,
        config,
    );
    let state = AppState::new(Arc::new(service));

    // ========================================================================
    // HTTP SERVER SETUP
    // ========================================================================

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let app = create_router(state);

    tracing::info!("Moderation gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind HTTP listener");
    axum::serve(listener, app)
        .await
        .expect("Error running server");
}
