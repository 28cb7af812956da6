use std::sync::Arc;

mod app;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod session;
mod state;
mod store;

use crate::{config::AppConfig, state::AppState, store::sqlstore::SqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "apiserver=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = db::connect(&config).await?;
    db::migrate(&db).await;

    let state = AppState::new(Arc::new(SqlStore::new(db)), &config.session);
    let app = app::build_app(state);

    app::serve(app, config.bind_addr()?).await
}
