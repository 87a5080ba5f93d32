use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use shelf_kernel::settings::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Open the connection pool described by `settings`.
///
/// Foreign keys are enforced on every connection. In-memory databases are
/// pinned to one long-lived connection, since each connection would otherwise
/// see its own empty database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

    if settings.is_in_memory() {
        if settings.max_connections != 1 {
            tracing::warn!(
                requested = settings.max_connections,
                "in-memory database forces a single pooled connection"
            );
        }
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        pool_options = pool_options.max_connections(settings.max_connections.max(1));
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(url = %settings.url, "database pool ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> DatabaseSettings {
        DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 4,
            acquire_timeout_ms: 1000,
        }
    }

    #[tokio::test]
    async fn memory_pool_shares_one_database() {
        let pool = connect(&memory()).await.unwrap();

        sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (id) VALUES (1)")
            .execute(&pool)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = connect(&memory()).await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
