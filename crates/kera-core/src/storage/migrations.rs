//! Database schema migrations for kera.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(tx: &Connection, version: i32) -> SqliteResult<()> {
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: habits.
///
/// `tracked_week_days` holds the 7-bit weekday mask, `status` 0 (active)
/// or 1 (ended). Dates are ISO `YYYY-MM-DD` strings.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id                TEXT PRIMARY KEY,
            user_id           TEXT NOT NULL,
            status            INTEGER NOT NULL DEFAULT 0,
            title             TEXT NOT NULL,
            description       TEXT NOT NULL DEFAULT '',
            tracked_week_days INTEGER NOT NULL,
            start_date        TEXT NOT NULL,
            end_date          TEXT,
            created_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    tracing::info!("applied schema migration v1");
    Ok(())
}

/// Migration v2: monthly completion bitmaps.
///
/// One row per (habit, first day of month); bit `day - 1` of `days` is set
/// when that day was marked done. Rows go away with their habit.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habit_histories (
            habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            month    TEXT NOT NULL,
            days     INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (habit_id, month)
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    tracing::info!("applied schema migration v2");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        conn.execute(
            "INSERT INTO habits (id, user_id, title, tracked_week_days, start_date, created_at)
             VALUES ('h1', 'u1', 'Read', 1, '2024-07-01', '2024-07-01T08:00:00Z')",
            [],
        )
        .unwrap();
        let (status, description): (i64, String) = conn
            .query_row("SELECT status, description FROM habits WHERE id = 'h1'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(status, 0);
        assert_eq!(description, "");

        conn.execute(
            "INSERT INTO habit_histories (habit_id, month) VALUES ('h1', '2024-07-01')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 1);

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);

        let stmt = conn
            .prepare("SELECT habit_id, month, days FROM habit_histories")
            .unwrap();
        drop(stmt);
    }
}
