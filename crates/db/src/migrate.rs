use anyhow::Context;
use shelf_kernel::Migration;
use sqlx::SqlitePool;

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Apply every migration not yet recorded in the `_migrations` ledger.
///
/// `migrations` is expected in the order produced by
/// `ModuleRegistry::collect_migrations`. Each migration runs in its own
/// transaction together with its ledger row. Returns how many were applied.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(LEDGER_DDL)
        .execute(pool)
        .await
        .context("failed to create migration ledger")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let seen: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await?;
        if seen.is_some() {
            tracing::debug!(module = %module, migration = migration.id, "already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(module = %module, migration = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

/// `module/id` pairs recorded in the ledger, oldest first.
pub async fn applied_migrations(pool: &SqlitePool) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT module, id FROM _migrations ORDER BY rowid")
            .fetch_all(pool)
            .await?;
    Ok(rows
        .into_iter()
        .map(|(module, id)| format!("{}/{}", module, id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_kernel::settings::DatabaseSettings;

    async fn memory_pool() -> SqlitePool {
        crate::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            ..DatabaseSettings::default()
        })
        .await
        .unwrap()
    }

    fn shelf() -> Vec<(String, Migration)> {
        vec![
            (
                "shelf".to_string(),
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY, label TEXT NOT NULL);",
                },
            ),
            (
                "shelf".to_string(),
                Migration {
                    id: "002_seed",
                    up: "INSERT INTO shelf (label) VALUES ('a'); INSERT INTO shelf (label) VALUES ('b');",
                },
            ),
        ]
    }

    #[tokio::test]
    async fn applies_each_migration_once() {
        let pool = memory_pool().await;

        assert_eq!(run_migrations(&pool, &shelf()).await.unwrap(), 2);
        assert_eq!(run_migrations(&pool, &shelf()).await.unwrap(), 0);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shelf")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 2);
        assert_eq!(
            applied_migrations(&pool).await.unwrap(),
            vec!["shelf/001_init", "shelf/002_seed"]
        );
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = memory_pool().await;
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE oops (;",
            },
        )];

        assert!(run_migrations(&pool, &broken).await.is_err());
        assert!(applied_migrations(&pool).await.unwrap().is_empty());
    }
}
