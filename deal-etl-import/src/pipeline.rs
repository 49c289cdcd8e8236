//! Extract → transform → load.

use chrono::NaiveDate;
use deal_etl_catalog::{DealRecord, GameRecord, ReviewRecord};
use deal_etl_db::{RecordSink, RunLog, StoreConfig, insert_run_log};
use rusqlite::Connection;

use crate::error::ImportError;
use crate::extract::{RawDatasets, extract};
use crate::load::{LoadStats, load};
use crate::merge::{MergeStats, left_join};
use crate::normalize::{NormalizeOptions, normalize_deals, normalize_links, normalize_reviews};
use crate::progress::LoadProgress;
use crate::settings::PipelineSettings;

/// Record counts from the transform stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub deals_read: usize,
    /// Deals without a name.
    pub deals_dropped: usize,
    /// Deals with a malformed link, when skipping is enabled.
    pub deals_skipped: usize,
    pub links_read: usize,
    pub reviews_read: usize,
    pub join: MergeStats,
}

/// Output of the transform stage, ready to load.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub games: Vec<GameRecord>,
    pub deals: Vec<DealRecord>,
    pub reviews: Vec<ReviewRecord>,
    pub stats: TransformStats,
}

/// Normalize all three exports and join deals with the catalog.
///
/// Pure and in-memory: the only failure is a deal whose link carries no item
/// id (unless `options.skip_malformed_links` is set) or a record whose fields
/// cannot be typed.
pub fn transform(
    raw: RawDatasets,
    options: &NormalizeOptions,
) -> Result<Transformed, ImportError> {
    let mut stats = TransformStats {
        deals_read: raw.deals.len(),
        links_read: raw.links.len(),
        reviews_read: raw.reviews.len(),
        ..TransformStats::default()
    };

    let reviews = normalize_reviews(raw.reviews, options)?;
    let links = normalize_links(raw.links, options)?;
    let deals = normalize_deals(raw.deals, options)?;
    stats.deals_dropped = deals.dropped;
    stats.deals_skipped = deals.skipped;

    let (games, join) = left_join(&deals.records, &links.records);
    stats.join = join;

    log::info!(
        "Transformed {} deals into {} games ({} without catalog entry), {} reviews",
        deals.records.len(),
        games.len(),
        join.missed,
        reviews.records.len()
    );

    Ok(Transformed {
        games,
        deals: deals.records,
        reviews: reviews.records,
        stats,
    })
}

/// Provision the deal, game and review tables.
pub fn create_tables(sink: &mut dyn RecordSink, config: &StoreConfig) -> Result<(), ImportError> {
    for table in config.table_schemas() {
        sink.create_table(&table)?;
    }
    Ok(())
}

/// What one run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub today: NaiveDate,
    pub transform: TransformStats,
    pub load: LoadStats,
}

/// Run the whole pipeline against `sink`.
///
/// Tables are provisioned first, so a fresh store works out of the box.
pub fn run(
    settings: &PipelineSettings,
    sink: &mut dyn RecordSink,
    today: NaiveDate,
    progress: &dyn LoadProgress,
) -> Result<RunSummary, ImportError> {
    progress.on_phase("Reading exports");
    let raw = extract(&settings.inputs)?;

    progress.on_phase("Normalizing records");
    let options = NormalizeOptions {
        today,
        skip_malformed_links: settings.skip_malformed_links,
    };
    let transformed = transform(raw, &options)?;

    create_tables(sink, &settings.store)?;
    let load = load(sink, &settings.store, &transformed, progress)?;

    log::info!(
        "Loaded {} games, {} deals, {} reviews ({} skipped, {} overwritten)",
        load.games,
        load.deals,
        load.reviews,
        load.skipped,
        load.overwritten
    );

    Ok(RunSummary {
        today,
        transform: transformed.stats,
        load,
    })
}

/// Record a finished run in the store's run log.
pub fn log_run(
    conn: &Connection,
    settings: &PipelineSettings,
    summary: &RunSummary,
) -> Result<i64, ImportError> {
    let path = |p: &std::path::Path| Some(p.display().to_string());
    let entry = RunLog {
        id: 0,
        started_at: chrono::Utc::now().to_rfc3339(),
        deal_input: path(&settings.inputs.deal),
        link_input: path(&settings.inputs.link),
        review_input: path(&settings.inputs.review),
        games_loaded: summary.load.games as i64,
        deals_loaded: summary.load.deals as i64,
        reviews_loaded: summary.load.reviews as i64,
        items_skipped: summary.load.skipped as i64,
        join_misses: summary.transform.join.missed as i64,
    };
    Ok(insert_run_log(conn, &entry)?)
}
