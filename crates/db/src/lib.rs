//! Database bootstrap for SHELF: pooled SQLite connections and module migrations.

mod migrate;
mod pool;

pub use migrate::{applied_migrations, run_migrations};
pub use pool::connect;

use async_trait::async_trait;
use shelf_kernel::{InitCtx, Module};
use sqlx::SqlitePool;

/// Core module owning the connection pool's health check and shutdown.
pub struct DbModule {
    pool: SqlitePool,
}

impl DbModule {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        ping(ctx.db).await?;
        tracing::info!(
            module = self.name(),
            connections = ctx.db.size(),
            idle = ctx.db.num_idle(),
            "database reachable"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        tracing::info!(module = self.name(), "connection pool closed");
        Ok(())
    }
}

/// Round-trip a trivial statement to prove the pool hands out working connections.
pub async fn ping(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
