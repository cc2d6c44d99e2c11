use std::{fmt, sync::Arc, time::Duration};

use anyhow::{Result, bail};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, DatabaseConnection};

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DbProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database backend that can be selected from the configured URL.
#[async_trait]
pub trait DbProvider: Send + Sync {
    fn id(&self) -> DbProviderId;

    /// URL prefixes (lowercase) this backend accepts.
    fn schemes(&self) -> &'static [&'static str];

    fn supports_url(&self, url: &str) -> bool {
        let normalized = url.trim().to_ascii_lowercase();
        self.schemes()
            .iter()
            .any(|scheme| normalized.starts_with(scheme))
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection>;
}

/// Registered backends in registration order. The first one accepting a URL
/// wins.
#[derive(Default)]
pub struct DbProviders {
    providers: Vec<Arc<dyn DbProvider>>,
}

impl DbProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn DbProvider>) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    pub fn register(&mut self, provider: Arc<dyn DbProvider>) -> Result<()> {
        let id = provider.id();
        if self.providers.iter().any(|existing| existing.id() == id) {
            bail!("database provider already registered: {id}");
        }
        self.providers.push(provider);
        Ok(())
    }

    pub fn resolve(&self, url: &str) -> Result<Arc<dyn DbProvider>> {
        if let Some(provider) = self.providers.iter().find(|p| p.supports_url(url)) {
            return Ok(Arc::clone(provider));
        }

        let accepted = self
            .providers
            .iter()
            .flat_map(|provider| provider.schemes().iter().copied())
            .collect::<Vec<_>>();
        bail!(
            "unsupported database url '{}'; accepted prefixes: [{}]",
            redact_url(url),
            accepted.join(", ")
        )
    }
}

/// Pool policy shared by every backend: bounded size, a warm floor of idle
/// connections, idle reclamation and connection recycling.
pub(super) fn pool_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(false);
    if let Some(secs) = cfg.idle_timeout_secs {
        options.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = cfg.max_lifetime_secs {
        options.max_lifetime(Duration::from_secs(secs));
    }
    options
}

// Keeps the scheme, drops credentials and host.
fn redact_url(url: &str) -> String {
    let trimmed = url.trim();
    if let Some((scheme, _)) = trimmed.split_once("://") {
        format!("{scheme}://<redacted>")
    } else if let Some((scheme, _)) = trimmed.split_once(':') {
        format!("{scheme}:<redacted>")
    } else {
        "<invalid-url>".to_string()
    }
}
