//! Schema migrations of the mirror database.
//!
//! The schema version lives in `PRAGMA user_version`. Each pending migration
//! runs in its own transaction together with the version bump, so a failed
//! upgrade leaves the database at the last good version. A database written
//! by a newer build is refused rather than modified.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Connection) -> rusqlite::Result<()>,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "v001_initial",
    up: v001_initial::up,
}];

/// Schema version of a fully migrated mirror database.
pub const CURRENT_VERSION: u32 = 1;

/// Bring the schema of `conn` up to [`CURRENT_VERSION`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "mirror schema v{current} is newer than supported v{CURRENT_VERSION}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tracing::info!(
            from = current,
            to = migration.version,
            name = migration.name,
            "migrating mirror schema"
        );
        let tx = conn.unchecked_transaction()?;
        (migration.up)(&*tx)
            .map_err(|e| StoreError::Migration(format!("{}: {e}", migration.name)))?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
        assert_eq!(MIGRATIONS.last().map(|m| m.version), Some(CURRENT_VERSION));
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_VERSION + 1)
            .unwrap();

        assert!(matches!(
            run_migrations(&conn),
            Err(StoreError::Migration(_))
        ));
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'buffers'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
