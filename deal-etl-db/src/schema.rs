//! SQLite schema creation and migration.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Schema version written by this build.
pub const CURRENT_VERSION: i32 = 1;

/// Upgrade steps, keyed by the version they upgrade from.
const MIGRATIONS: &[(i32, &str)] = &[];

/// Create every table that is missing and stamp the current version.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    stamp_version(conn, CURRENT_VERSION)
}

/// Open (creating if needed) the store database at `path`.
///
/// Missing parent directories are created. Older stores are migrated in
/// place; a store written by a newer build is rejected.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    match get_schema_version(&conn)? {
        0 => create_schema(&conn)?,
        found if found > CURRENT_VERSION => {
            return Err(SchemaError::VersionMismatch {
                expected: CURRENT_VERSION,
                found,
            });
        }
        found => migrate(&conn, found)?,
    }
    Ok(conn)
}

/// Fresh in-memory store, for tests and dry runs.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Highest recorded schema version; 0 for an empty database.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let has_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(0);
    }
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?)
}

fn stamp_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Apply every step between `from` and [`CURRENT_VERSION`], stamping each.
fn migrate(conn: &Connection, from: i32) -> Result<(), SchemaError> {
    for version in from..CURRENT_VERSION {
        if let Some((_, sql)) = MIGRATIONS.iter().find(|(v, _)| *v == version) {
            log::info!("Migrating store schema v{} -> v{}", version, version + 1);
            conn.execute_batch(sql)?;
        }
        stamp_version(conn, version + 1)?;
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Provisioned key-value tables
CREATE TABLE IF NOT EXISTS kv_tables (
    name TEXT PRIMARY KEY,
    partition_key TEXT NOT NULL,
    sort_key TEXT NOT NULL,
    read_capacity INTEGER NOT NULL DEFAULT 10,
    write_capacity INTEGER NOT NULL DEFAULT 10,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Items, one row per (table, partition, sort) key; the item body is JSON
CREATE TABLE IF NOT EXISTS kv_items (
    table_name TEXT NOT NULL REFERENCES kv_tables(name),
    partition_value TEXT NOT NULL,
    sort_value TEXT NOT NULL,
    item TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (table_name, partition_value, sort_value)
);

-- Pipeline run tracking
CREATE TABLE IF NOT EXISTS run_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    deal_input TEXT,
    link_input TEXT,
    review_input TEXT,
    games_loaded INTEGER NOT NULL DEFAULT 0,
    deals_loaded INTEGER NOT NULL DEFAULT 0,
    reviews_loaded INTEGER NOT NULL DEFAULT 0,
    items_skipped INTEGER NOT NULL DEFAULT 0,
    join_misses INTEGER NOT NULL DEFAULT 0
);
"#;
