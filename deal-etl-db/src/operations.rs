//! Write operations and the SQLite-backed sink.

use std::collections::HashMap;

use rusqlite::{Connection, params};

use crate::config::StoreConfig;
use crate::schema::{self, SchemaError};
use crate::store::{Item, RecordSink, SinkError, TableSchema};

// ── Tables ──────────────────────────────────────────────────────────────────

/// Provision a table. An existing table keeps its original key layout.
pub fn create_table(conn: &Connection, table: &TableSchema) -> Result<(), SinkError> {
    let created = conn.execute(
        "INSERT OR IGNORE INTO kv_tables (name, partition_key, sort_key, read_capacity, write_capacity)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            table.name,
            table.partition_key,
            table.sort_key,
            table.read_capacity,
            table.write_capacity,
        ],
    )?;
    if created == 0 {
        log::debug!("Table '{}' already exists", table.name);
    } else {
        log::info!(
            "Created table '{}' (partition: {}, sort: {})",
            table.name,
            table.partition_key,
            table.sort_key
        );
    }
    Ok(())
}

/// Look up a provisioned table by name.
pub fn find_table(conn: &Connection, name: &str) -> Result<Option<TableSchema>, SinkError> {
    let mut stmt = conn.prepare_cached(
        "SELECT name, partition_key, sort_key, read_capacity, write_capacity
         FROM kv_tables WHERE name = ?1",
    )?;
    let result = stmt.query_row(params![name], |row| {
        Ok(TableSchema {
            name: row.get(0)?,
            partition_key: row.get(1)?,
            sort_key: row.get(2)?,
            read_capacity: row.get(3)?,
            write_capacity: row.get(4)?,
        })
    });
    match result {
        Ok(table) => Ok(Some(table)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Items ───────────────────────────────────────────────────────────────────

/// Insert or replace an item under its key.
pub fn put_item(conn: &Connection, table: &TableSchema, item: &Item) -> Result<(), SinkError> {
    let (partition, sort) = table.key_of(item)?;
    let body = serde_json::to_string(item)?;
    conn.prepare_cached(
        "INSERT INTO kv_items (table_name, partition_value, sort_value, item)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(table_name, partition_value, sort_value) DO UPDATE SET
             item = excluded.item,
             updated_at = datetime('now')",
    )?
    .execute(params![table.name, partition, sort, body])?;
    Ok(())
}

// ── Run log ─────────────────────────────────────────────────────────────────

/// One pipeline run as recorded in `run_log`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    pub id: i64,
    pub started_at: String,
    pub deal_input: Option<String>,
    pub link_input: Option<String>,
    pub review_input: Option<String>,
    pub games_loaded: i64,
    pub deals_loaded: i64,
    pub reviews_loaded: i64,
    pub items_skipped: i64,
    pub join_misses: i64,
}

/// Record a run. Returns the new row id.
pub fn insert_run_log(conn: &Connection, run: &RunLog) -> Result<i64, SinkError> {
    conn.execute(
        "INSERT INTO run_log (started_at, deal_input, link_input, review_input,
                              games_loaded, deals_loaded, reviews_loaded, items_skipped, join_misses)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            run.started_at,
            run.deal_input,
            run.link_input,
            run.review_input,
            run.games_loaded,
            run.deals_loaded,
            run.reviews_loaded,
            run.items_skipped,
            run.join_misses,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Sink ────────────────────────────────────────────────────────────────────

/// [`RecordSink`] over a SQLite database.
pub struct SqliteStore {
    conn: Connection,
    tables: HashMap<String, TableSchema>,
}

impl SqliteStore {
    /// Open (or create) the database named by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, SchemaError> {
        Ok(Self::from_connection(schema::open_database(
            &config.database_path,
        )?))
    }

    /// A store backed by a fresh in-memory database.
    pub fn in_memory() -> Result<Self, SchemaError> {
        Ok(Self::from_connection(schema::open_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            tables: HashMap::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn table(&mut self, name: &str) -> Result<&TableSchema, SinkError> {
        if !self.tables.contains_key(name) {
            let table = find_table(&self.conn, name)?
                .ok_or_else(|| SinkError::UnknownTable(name.to_string()))?;
            self.tables.insert(name.to_string(), table);
        }
        self.tables
            .get(name)
            .ok_or_else(|| SinkError::UnknownTable(name.to_string()))
    }
}

impl RecordSink for SqliteStore {
    fn create_table(&mut self, schema: &TableSchema) -> Result<(), SinkError> {
        create_table(&self.conn, schema)?;
        self.tables.remove(&schema.name);
        Ok(())
    }

    fn put_item(&mut self, table: &str, item: Item) -> Result<(), SinkError> {
        let schema = self.table(table)?.clone();
        put_item(&self.conn, &schema, &item)
    }

    fn begin(&mut self) -> Result<(), SinkError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
