//! SQLite connection setup and schema migrations.
//!
//! Schema changes are appended to `MIGRATIONS` and tracked with
//! `PRAGMA user_version` so `migrate_db` only applies what's missing.

use std::time::Duration;

use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
    // 1: events and their responses
    r"
    CREATE TABLE IF NOT EXISTS event (
        id TEXT PRIMARY KEY,
        owner_id TEXT,
        name TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        event_type TEXT NOT NULL,
        dates TEXT NOT NULL DEFAULT '[]',
        notifications_enabled INTEGER,
        remindees TEXT,
        attendees TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS event_owner_idx ON event(owner_id);

    -- One row per participant so a response write never touches
    -- anyone else's entry
    CREATE TABLE IF NOT EXISTS event_response (
        event_id TEXT NOT NULL REFERENCES event(id) ON DELETE CASCADE,
        participant_key TEXT NOT NULL,
        data TEXT NOT NULL,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (event_id, participant_key)
    );
    ",
    // 2: users, read by the directory for display names and emails
    r"
    CREATE TABLE IF NOT EXISTS user (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL UNIQUE
    );
    ",
    // 3: scheduled reminder emails
    r"
    CREATE TABLE IF NOT EXISTS reminder_task (
        id TEXT PRIMARY KEY,
        event_id TEXT NOT NULL,
        email TEXT NOT NULL,
        owner_name TEXT NOT NULL,
        event_name TEXT NOT NULL,
        due_at TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS reminder_task_due_idx ON reminder_task(due_at);
    ",
];

/// Open the database stored under `db_path`.
pub async fn async_db(db_path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let db = Connection::open(format!("{}/huddle.sqlite3", db_path)).await?;
    db.call(|conn| {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        configure(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// Open an in-memory database with the full schema applied. Nothing
/// is persisted once the connection is dropped.
pub async fn memory_db() -> Result<Connection, tokio_rusqlite::Error> {
    let db = Connection::open_in_memory().await?;
    db.call(|conn| {
        configure(conn)?;
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

fn configure(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}

fn schema_version(conn: &SyncConnection) -> Result<usize, rusqlite::Error> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version.max(0) as usize)
}

fn apply_migrations(conn: &mut SyncConnection, from: usize) -> Result<usize, rusqlite::Error> {
    let tx = conn.transaction()?;
    let mut applied = 0;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(from) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", (idx + 1) as i64)?;
        applied += 1;
    }
    tx.commit()?;
    Ok(applied)
}

/// Create every table from scratch. Safe to run against an existing
/// database since all statements are `IF NOT EXISTS`.
pub fn initialize_db(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    let applied = apply_migrations(conn, 0)?;
    tracing::debug!("Initialized db schema ({} migrations)", applied);
    Ok(())
}

/// Apply any migrations newer than the database's recorded version.
pub fn migrate_db(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    let current = schema_version(conn)?;
    let applied = apply_migrations(conn, current)?;
    tracing::debug!(
        "Migrated db schema from version {} ({} applied)",
        current,
        applied
    );
    Ok(())
}
