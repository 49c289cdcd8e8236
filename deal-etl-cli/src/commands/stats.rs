use deal_etl_db::{
    SqliteStore, count_items, find_table, get_item, item_to_json, list_runs, list_tables,
    query_partition,
};
use deal_etl_import::PipelineSettings;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Show item counts per table and the most recent runs.
pub(crate) fn run_stats(settings: &PipelineSettings, runs: u32) -> Result<(), CliError> {
    let store = SqliteStore::open(&settings.store)?;
    let conn = store.connection();

    log::info!(
        "{}",
        "Store Statistics".if_supports_color(Stdout, |t| t.bold())
    );
    log::info!("  Database: {}", settings.store.database_path.display());
    crate::log_blank();

    let tables = list_tables(conn)?;
    if tables.is_empty() {
        log::info!("  No tables yet. Run 'deal-etl create-tables' or 'deal-etl run'.");
        return Ok(());
    }
    for table in &tables {
        let count = count_items(conn, &table.name)?;
        log::info!(
            "  {:<10} {:>8} items  ({} / {})",
            table.name,
            count,
            table.partition_key,
            table.sort_key
        );
    }

    let history = list_runs(conn, runs)?;
    if !history.is_empty() {
        crate::log_blank();
        log::info!("{}", "Recent Runs".if_supports_color(Stdout, |t| t.bold()));
        for run in &history {
            log::info!(
                "  #{:<4} {}  {} games, {} deals, {} reviews, {} skipped, {} unmatched",
                run.id,
                run.started_at,
                run.games_loaded,
                run.deals_loaded,
                run.reviews_loaded,
                run.items_skipped,
                run.join_misses
            );
        }
    }
    Ok(())
}

/// Print stored items as JSON.
pub(crate) fn run_get(
    settings: &PipelineSettings,
    table: &str,
    app_id: &str,
    sort_key: Option<&str>,
) -> Result<(), CliError> {
    let store = SqliteStore::open(&settings.store)?;
    let conn = store.connection();

    if find_table(conn, table)?.is_none() {
        return Err(CliError::UnknownTable(table.to_string()));
    }

    let items: Vec<_> = match sort_key {
        Some(sort) => get_item(conn, table, app_id, sort)?.into_iter().collect(),
        None => query_partition(conn, table, app_id)?,
    };

    if items.is_empty() {
        log::info!("No items for {} in '{}'", app_id, table);
        return Ok(());
    }
    for item in &items {
        let body = serde_json::to_string_pretty(&item_to_json(item))
            .map_err(|e| CliError::database(e.to_string()))?;
        log::info!("{body}");
    }
    Ok(())
}
