use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    config::{AppConfig, DatabaseConfig},
    db::connection,
    routes::app,
    state::AppState,
};

/// One pooled connection that never idles out, so the in-memory database
/// lives as long as the pool.
pub fn memory_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_idle: 1,
        idle_timeout_secs: None,
        max_lifetime_secs: None,
        ..DatabaseConfig::default()
    }
}

/// A fresh in-memory SQLite database with the schema synced.
pub async fn memory_db() -> DatabaseConnection {
    connection::connect(&memory_db_config())
        .await
        .expect("connect to in-memory sqlite")
}

pub async fn sqlite_state() -> Arc<AppState> {
    let cfg = AppConfig {
        database: memory_db_config(),
        ..AppConfig::default()
    };
    let db = memory_db().await;
    AppState::new(cfg, db)
}

pub fn mock_state(db: DatabaseConnection) -> Arc<AppState> {
    AppState::new(AppConfig::default(), db)
}

/// The full application over an empty mock database.
pub fn test_router() -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    app(mock_state(db))
}
