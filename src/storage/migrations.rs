//! # Database Migration Management
//!
//! Schema evolution via SQL migrations embedded in the binary and applied
//! on startup when `auto_migrate` is enabled. Applied versions are tracked
//! in a `_migrations` table so each migration runs exactly once.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use sqlx::Row;
use tracing::{debug, info};

/// Ordered list of embedded migrations: (version, description, sql).
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (1, "create_auth", include_str!("../../migrations/0001_create_auth.sql")),
    (2, "create_profiles", include_str!("../../migrations/0002_create_profiles.sql")),
    (3, "create_pokemons", include_str!("../../migrations/0003_create_pokemons.sql")),
];

/// Run all pending migrations against the pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    ensure_tracking_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for (version, description, sql) in MIGRATIONS {
        if applied.contains(version) {
            debug!(version, description, "Migration already applied, skipping");
            continue;
        }

        info!(version, description, "Applying migration");

        sqlx::raw_sql(sql).execute(pool).await.map_err(|e| Error::Database {
            source: e,
            context: format!("Failed to apply migration {} ({})", version, description),
        })?;

        sqlx::query("INSERT INTO _migrations (version, description, installed_on) VALUES (?, ?, ?)")
            .bind(version)
            .bind(description)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(pool)
            .await
            .map_err(|e| Error::Database {
                source: e,
                context: format!("Failed to record migration {}", version),
            })?;
    }

    info!("Database migrations up to date");
    Ok(())
}

async fn ensure_tracking_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            installed_on TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database {
        source: e,
        context: "Failed to create migration tracking table".to_string(),
    })?;
    Ok(())
}

async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Database {
            source: e,
            context: "Failed to read applied migrations".to_string(),
        })?;

    Ok(rows.iter().map(|row| row.get::<i64, _>("version")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_unique() {
        let mut last = 0;
        for (version, _, sql) in MIGRATIONS {
            assert!(*version > last, "migration versions must strictly increase");
            assert!(!sql.trim().is_empty());
            last = *version;
        }
    }
}
