//! SHELF application library
//!
//! Feature modules for the book review backend plus the bootstrap that wires
//! them to the database, the authz core, and the HTTP server.

pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use shelf_authz::AuthzModule;
use shelf_db::DbModule;
use shelf_kernel::{AppState, InitCtx, ModuleRegistry, Settings};

/// A booted application: every module initialized and started.
pub struct App {
    pub registry: ModuleRegistry,
    pub state: AppState,
}

impl App {
    /// Fully layered router, as served by [`App::serve`].
    pub fn router(&self) -> Router {
        shelf_http::build_router(&self.registry, self.state.clone())
    }

    /// Serve until Ctrl-C, then stop modules in reverse order.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served = shelf_http::start_server(&self.registry, self.state.clone()).await;
        self.registry.shutdown().await?;
        served
    }
}

/// Registry with the core modules and every feature module registered.
pub fn build_registry(db: sqlx::SqlitePool) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DbModule::new(db)));
    registry.register_core(Arc::new(AuthzModule::new()));
    modules::register_all(&mut registry);
    registry
}

/// Connect, migrate, and boot all modules.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<App> {
    let db = shelf_db::connect(&settings.database).await?;
    let registry = build_registry(db.clone());

    let applied = shelf_db::run_migrations(&db, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations up to date");

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.boot(&ctx).await?;

    Ok(App {
        registry,
        state: AppState::new(settings, db),
    })
}

/// Apply pending migrations and exit; used by `shelf-cli migrate`.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = shelf_db::connect(&settings.database).await?;
    let registry = build_registry(db.clone());
    let applied = shelf_db::run_migrations(&db, &registry.collect_migrations()).await?;
    db.close().await;
    Ok(applied)
}
