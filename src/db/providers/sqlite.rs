use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};

use super::registry::{DbProvider, DbProviderId, pool_options};
use crate::config::DatabaseConfig;

// Concurrent writers wait on the file lock instead of failing with SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

pub struct SqliteDbProvider;

#[async_trait]
impl DbProvider for SqliteDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Sqlite
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["sqlite:"]
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = pool_options(cfg);
        // Applied per connection, so every pooled handle gets it.
        options.map_sqlx_sqlite_opts(|opts| opts.busy_timeout(BUSY_TIMEOUT));
        Ok(Database::connect(options).await?)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    use super::{BUSY_TIMEOUT, SqliteDbProvider};
    use crate::{
        config::DatabaseConfig, db::providers::registry::DbProvider,
        test_helpers::memory_db_config,
    };

    #[tokio::test]
    async fn every_connection_waits_on_locks() {
        let cfg = DatabaseConfig {
            max_connections: 2,
            min_idle: 2,
            ..memory_db_config()
        };
        let db = SqliteDbProvider
            .connect(&cfg)
            .await
            .expect("connect to in-memory sqlite");

        // Both connections are opened up front and each reports its own value.
        let pragma = || Statement::from_string(DatabaseBackend::Sqlite, "PRAGMA busy_timeout");
        let (first, second) = tokio::join!(db.query_one_raw(pragma()), db.query_one_raw(pragma()));
        for row in [first, second] {
            let row = row
                .expect("pragma should run")
                .expect("pragma should return a row");
            let millis: i64 = row.try_get_by_index(0).expect("timeout should be an integer");
            assert_eq!(millis, BUSY_TIMEOUT.as_millis() as i64);
        }
    }
}
