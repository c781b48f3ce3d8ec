//! Database schema migrations.
//!
//! A `_migrations` table records the highest applied version; anything
//! above it is applied in order on open.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// A single schema step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered schema steps. Every script uses `IF NOT EXISTS` so replaying one
/// against a partially migrated database is harmless.
const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "cache_stores", sql: include_str!("../../migrations/001_cache_stores.sql") },
    Migration {
        version: 2,
        name: "push_subscriptions",
        sql: include_str!("../../migrations/002_push_subscriptions.sql"),
    },
    Migration {
        version: 3,
        name: "worker_registration",
        sql: include_str!("../../migrations/003_worker_registration.sql"),
    },
];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns an error if a migration SQL fails to execute.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    let applied = conn
        .call(|conn| -> Result<Vec<&'static str>, Error> {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS _migrations (
                    version INTEGER PRIMARY KEY,
                    applied_at TEXT NOT NULL
                )",
                [],
            )?;

            let current: i64 =
                conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

            let mut applied = Vec::new();
            for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
                let tx = conn.transaction()?;
                tx.execute_batch(migration.sql)
                    .map_err(|e| Error::MigrationFailed(format!("{} ({}): {e}", migration.version, migration.name)))?;
                tx.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                    params![migration.version, chrono::Utc::now().to_rfc3339()],
                )?;
                tx.commit()?;
                applied.push(migration.name);
            }

            Ok(applied)
        })
        .await
        .map_err(Error::from)?;

    if !applied.is_empty() {
        tracing::info!(migrations = ?applied, "applied cache schema migrations");
    }

    Ok(())
}
