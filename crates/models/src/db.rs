use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Open a pooled connection using the `[database]` section.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(db)
}

/// Connect using `DATABASE_URL` with default pool settings. Used by tests.
pub async fn connect_from_env() -> anyhow::Result<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL")?;
    let cfg = DatabaseConfig { url, ..DatabaseConfig::default() };
    connect_with_config(&cfg).await
}
