use std::sync::Arc;

use sqlx::SqlitePool;

use crate::settings::Settings;

/// State handed to every module router.
///
/// Cloning is cheap: settings sit behind an `Arc` and the pool is itself a handle.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(settings: Settings, db: SqlitePool) -> Self {
        Self {
            settings: Arc::new(settings),
            db,
        }
    }
}
