//! Progress bar for the load stage.

use std::cell::RefCell;

use deal_etl_import::{LoadProgress, TableLoad};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One progress bar per table, replaced when the next table starts.
pub(crate) struct BarProgress {
    bar: RefCell<ProgressBar>,
    quiet: bool,
}

impl BarProgress {
    /// When `quiet` is true no bar is drawn.
    pub(crate) fn new(quiet: bool) -> Self {
        Self {
            bar: RefCell::new(ProgressBar::hidden()),
            quiet,
        }
    }

    fn table_bar(&self, table: &str, total: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        if self.quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template("  {msg:<10} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_message(table.to_string());
        bar
    }
}

impl LoadProgress for BarProgress {
    fn on_table_start(&self, table: &str, total: usize) {
        let bar = self.table_bar(table, total);
        self.bar.replace(bar).finish_and_clear();
    }

    fn on_item(&self, done: usize) {
        self.bar.borrow().set_position(done as u64);
    }

    fn on_table_done(&self, table: &str, load: &TableLoad) {
        self.bar.borrow().finish_and_clear();
        let mut line = format!("  {:<10} {} stored", table, load.written);
        if load.skipped > 0 {
            line.push_str(&format!(", {} skipped", load.skipped));
        }
        if load.overwritten > 0 {
            line.push_str(&format!(", {} overwritten", load.overwritten));
        }
        log::info!("{line}");
    }

    fn on_phase(&self, message: &str) {
        log::info!("{message}");
    }
}
