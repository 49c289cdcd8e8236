//! Read queries over stored items and run history.

use rusqlite::{Connection, Row, params};

use crate::operations::RunLog;
use crate::store::{Item, SinkError, TableSchema};

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<String> {
    row.get(0)
}

fn decode(body: &str) -> Result<Item, SinkError> {
    Ok(serde_json::from_str(body)?)
}

/// Fetch one item by its full key.
pub fn get_item(
    conn: &Connection,
    table: &str,
    partition: &str,
    sort: &str,
) -> Result<Option<Item>, SinkError> {
    let mut stmt = conn.prepare(
        "SELECT item FROM kv_items
         WHERE table_name = ?1 AND partition_value = ?2 AND sort_value = ?3",
    )?;
    match stmt.query_row(params![table, partition, sort], row_to_item) {
        Ok(body) => decode(&body).map(Some),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All items sharing a partition key, ordered by sort key.
pub fn query_partition(
    conn: &Connection,
    table: &str,
    partition: &str,
) -> Result<Vec<Item>, SinkError> {
    let mut stmt = conn.prepare(
        "SELECT item FROM kv_items
         WHERE table_name = ?1 AND partition_value = ?2
         ORDER BY sort_value",
    )?;
    let bodies = stmt
        .query_map(params![table, partition], row_to_item)?
        .collect::<Result<Vec<_>, _>>()?;
    bodies.iter().map(|b| decode(b)).collect()
}

/// Number of items stored in a table.
pub fn count_items(conn: &Connection, table: &str) -> Result<i64, SinkError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM kv_items WHERE table_name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// All provisioned tables, by name.
pub fn list_tables(conn: &Connection) -> Result<Vec<TableSchema>, SinkError> {
    let mut stmt = conn.prepare(
        "SELECT name, partition_key, sort_key, read_capacity, write_capacity
         FROM kv_tables ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(TableSchema {
            name: row.get(0)?,
            partition_key: row.get(1)?,
            sort_key: row.get(2)?,
            read_capacity: row.get(3)?,
            write_capacity: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Most recent runs first.
pub fn list_runs(conn: &Connection, limit: u32) -> Result<Vec<RunLog>, SinkError> {
    let mut stmt = conn.prepare(
        "SELECT id, started_at, deal_input, link_input, review_input,
                games_loaded, deals_loaded, reviews_loaded, items_skipped, join_misses
         FROM run_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(RunLog {
            id: row.get(0)?,
            started_at: row.get(1)?,
            deal_input: row.get(2)?,
            link_input: row.get(3)?,
            review_input: row.get(4)?,
            games_loaded: row.get(5)?,
            deals_loaded: row.get(6)?,
            reviews_loaded: row.get(7)?,
            items_skipped: row.get(8)?,
            join_misses: row.get(9)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
