use anyhow::Context;
use sea_orm::DatabaseConnection;
use tracing::info;

use super::providers;
use crate::config::DatabaseConfig;

/// Opens the pool for the configured backend and creates any missing tables
/// and indexes from the entity definitions.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let provider = providers::default_registry()?.resolve(&cfg.url)?;
    info!(
        provider = %provider.id(),
        max_connections = cfg.max_connections,
        min_idle = cfg.min_idle,
        statement_timeout_ms = ?cfg.statement_timeout_ms,
        "connecting to database"
    );

    let db = provider
        .connect(cfg)
        .await
        .with_context(|| format!("failed to open {} pool", provider.id()))?;

    info!("syncing database schema from entities");
    db.get_schema_registry("todo_api::db::entities::*")
        .sync(&db)
        .await
        .context("failed to sync database schema")?;
    Ok(db)
}
