//! Key-value persistence for normalized storefront records.
//!
//! Records are written as items into named tables, each keyed by a string
//! partition key and a string sort key. The [`RecordSink`] trait is the only
//! surface the pipeline writes through; [`SqliteStore`] backs it with SQLite
//! (via rusqlite with the bundled feature) and [`MemoryStore`] keeps
//! everything in memory.

pub mod config;
pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use operations::{RunLog, SqliteStore, create_table, find_table, insert_run_log, put_item};
pub use queries::{count_items, get_item, list_runs, list_tables, query_partition};
pub use schema::{SchemaError, open_database, open_memory};
pub use store::{
    AttributeValue, Item, MemoryStore, RecordSink, SinkError, TableSchema, item_to_json,
};
