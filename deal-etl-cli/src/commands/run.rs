use chrono::NaiveDate;
use deal_etl_db::SqliteStore;
use deal_etl_import::{
    LoadStats, NormalizeOptions, PipelineSettings, TransformStats, create_tables, extract,
    log_run, run, transform,
};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::progress::BarProgress;

/// Run the full pipeline, or only its transform half with `dry_run`.
pub(crate) fn run_pipeline(
    settings: &PipelineSettings,
    today: NaiveDate,
    dry_run: bool,
    quiet: bool,
) -> Result<(), CliError> {
    log::info!(
        "{} (reference date {})",
        "Running pipeline".if_supports_color(Stdout, |t| t.bold()),
        today
    );
    log::info!("  Deals:   {}", settings.inputs.deal.display());
    log::info!("  Links:   {}", settings.inputs.link.display());
    log::info!("  Reviews: {}", settings.inputs.review.display());
    crate::log_blank();

    if dry_run {
        let raw = extract(&settings.inputs)?;
        let options = NormalizeOptions {
            today,
            skip_malformed_links: settings.skip_malformed_links,
        };
        let transformed = transform(raw, &options)?;
        print_transform_stats(&transformed.stats);
        crate::log_blank();
        log::info!(
            "{}",
            "Dry run: nothing written".if_supports_color(Stdout, |t| t.dimmed())
        );
        return Ok(());
    }

    let mut store = SqliteStore::open(&settings.store)?;
    let progress = BarProgress::new(quiet);
    let summary = run(settings, &mut store, today, &progress)?;
    let run_id = log_run(store.connection(), settings, &summary)?;

    crate::log_blank();
    print_transform_stats(&summary.transform);
    print_load_stats(&summary.load);
    crate::log_blank();
    log::info!(
        "{} run #{} into {}",
        "Recorded".if_supports_color(Stdout, |t| t.green()),
        run_id,
        settings.store.database_path.display()
    );
    Ok(())
}

/// Provision the three tables without loading anything.
pub(crate) fn run_create_tables(settings: &PipelineSettings) -> Result<(), CliError> {
    let mut store = SqliteStore::open(&settings.store)?;
    create_tables(&mut store, &settings.store)?;
    for schema in settings.store.table_schemas() {
        log::info!(
            "  {:<10} {} / {}",
            schema.name.if_supports_color(Stdout, |t| t.bold()),
            schema.partition_key,
            schema.sort_key
        );
    }
    Ok(())
}

fn print_transform_stats(stats: &TransformStats) {
    log::info!("{}", "Transform".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  Deals:   {} read, {} dropped (no name), {} skipped (bad link)",
        stats.deals_read,
        stats.deals_dropped,
        stats.deals_skipped
    );
    log::info!("  Links:   {} read", stats.links_read);
    log::info!("  Reviews: {} read", stats.reviews_read);
    log::info!(
        "  Join:    {} matched, {} without catalog entry, {} extra rows from duplicates",
        stats.join.matched,
        stats.join.missed,
        stats.join.fanned_out
    );
}

fn print_load_stats(stats: &LoadStats) {
    log::info!("{}", "Load".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} games, {} deals, {} reviews stored",
        stats.games,
        stats.deals,
        stats.reviews
    );
    if stats.skipped > 0 {
        log::info!(
            "  {} items skipped (empty key)",
            stats.skipped.if_supports_color(Stdout, |t| t.yellow())
        );
    }
    if stats.overwritten > 0 {
        log::info!(
            "  {} items overwritten by a later record with the same key",
            stats.overwritten.if_supports_color(Stdout, |t| t.yellow())
        );
    }
}
