//! Load progress reporting.
//!
//! A load walks the tables one after another. Each table produces one
//! `on_table_start`, a run of `on_item` calls, and one `on_table_done`.

/// What happened to one table's items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLoad {
    /// Distinct keys written. Items sharing a key overwrite each other.
    pub written: usize,
    /// Items whose key attribute was empty.
    pub skipped: usize,
    /// Writes that replaced an item already written in this load.
    pub overwritten: usize,
}

/// Receives load events. Every method defaults to doing nothing.
pub trait LoadProgress {
    /// Loading into `table` begins; `total` items will be offered.
    fn on_table_start(&self, _table: &str, _total: usize) {}

    /// `done` of the current table's items have been handled.
    fn on_item(&self, _done: usize) {}

    /// The current table is finished.
    fn on_table_done(&self, _table: &str, _load: &TableLoad) {}

    /// A pipeline step outside the table loads (reading, normalizing).
    fn on_phase(&self, _message: &str) {}
}

/// Discards every event.
pub struct SilentProgress;

impl LoadProgress for SilentProgress {}

/// Reports through the `log` crate, with a line every 500 items.
pub struct LogProgress;

impl LoadProgress for LogProgress {
    fn on_table_start(&self, table: &str, total: usize) {
        log::info!("Loading {total} items into '{table}'");
    }

    fn on_item(&self, done: usize) {
        if done % 500 == 0 {
            log::info!("  {done} items");
        }
    }

    fn on_table_done(&self, table: &str, load: &TableLoad) {
        log::info!(
            "  '{}': {} stored, {} skipped, {} overwritten",
            table,
            load.written,
            load.skipped,
            load.overwritten
        );
    }

    fn on_phase(&self, message: &str) {
        log::info!("{message}");
    }
}
