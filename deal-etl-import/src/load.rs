//! Mapping normalized records onto store items, and writing them.

use std::collections::HashSet;

use deal_etl_catalog::{DealRecord, GameRecord, ReviewRecord};
use deal_etl_db::{AttributeValue, Item, RecordSink, SinkError, StoreConfig, TableSchema};
use serde_json::Value;

use crate::error::ImportError;
use crate::pipeline::Transformed;
use crate::progress::{LoadProgress, TableLoad};

/// Distinct items stored per table.
///
/// Records mapping to the same key overwrite each other in the sink (a deal
/// fanned out over catalog entries with the same name, for instance); they
/// count once here and the extra writes are tallied in `overwritten`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub games: usize,
    pub deals: usize,
    pub reviews: usize,
    /// Items not written because a key attribute was empty.
    pub skipped: usize,
    /// Writes that replaced an item from the same run.
    pub overwritten: usize,
}

impl LoadStats {
    fn absorb(&mut self, load: &TableLoad) {
        self.skipped += load.skipped;
        self.overwritten += load.overwritten;
    }
}

fn attr(item: &mut Item, name: &str, value: impl Into<AttributeValue>) {
    item.insert(name.to_string(), value.into());
}

fn json_attr(value: Option<&Value>) -> AttributeValue {
    value.map_or(AttributeValue::Null, AttributeValue::from_json)
}

fn number_attr(value: Option<&serde_json::Number>) -> AttributeValue {
    value.map_or(AttributeValue::Null, AttributeValue::number)
}

/// Deal item: `app_id`, `discounted_price`, `end_date`.
pub fn deal_item(deal: &DealRecord) -> Item {
    let mut item = Item::new();
    attr(&mut item, "app_id", deal.app_id.to_string());
    attr(
        &mut item,
        "discounted_price",
        deal.discounted_price.clone().unwrap_or_default(),
    );
    attr(&mut item, "end_date", deal.timestamp.as_str());
    item
}

/// Game item: deal identity and review text plus the catalog's descriptive
/// fields (null on a join miss).
pub fn game_item(game: &GameRecord) -> Item {
    let deal = &game.deal;
    let mut item = Item::new();
    attr(&mut item, "app_id", deal.app_id.to_string());
    attr(&mut item, "name", deal.name.as_str());
    attr(&mut item, "release_date", deal.release_date.clone());
    attr(&mut item, "review", deal.review.as_str());
    attr(&mut item, "recent_review", deal.recent_review.as_str());
    attr(&mut item, "original_price", deal.original_price.clone());
    for field in [
        "tag",
        "category",
        "developer",
        "support_windows",
        "support_mac",
        "support_linux",
        "support_vr",
    ] {
        attr(&mut item, field, json_attr(game.catalog_field(field)));
    }
    item
}

/// Review item: string ids, numeric counts, decimal vote score.
pub fn review_item(review: &ReviewRecord) -> Item {
    let mut item = Item::new();
    attr(&mut item, "app_id", review.app_id.as_str());
    attr(&mut item, "steam_id", review.steam_id.as_str());
    attr(&mut item, "total_playtime", number_attr(review.total_playtime.as_ref()));
    attr(
        &mut item,
        "playtime_at_review",
        number_attr(review.playtime_at_review.as_ref()),
    );
    attr(&mut item, "last_play_time", review.last_play_time.clone());
    attr(&mut item, "recommended", review.recommended);
    attr(&mut item, "helpful_vote", number_attr(review.helpful_vote.as_ref()));
    attr(&mut item, "funny_vote", number_attr(review.funny_vote.as_ref()));
    attr(&mut item, "weighted_vote_score", review.weighted_vote_score);
    attr(&mut item, "content", review.content.clone());
    attr(&mut item, "created_time", review.created_time.clone());
    attr(&mut item, "last_updated", review.last_updated.clone());
    item
}

/// Write one table's items. Items with an empty key are skipped and counted.
fn put_all(
    sink: &mut dyn RecordSink,
    table: &TableSchema,
    items: impl ExactSizeIterator<Item = Item>,
    progress: &dyn LoadProgress,
) -> Result<TableLoad, ImportError> {
    progress.on_table_start(&table.name, items.len());

    let mut load = TableLoad::default();
    let mut keys: HashSet<(String, String)> = HashSet::new();
    for (i, item) in items.enumerate() {
        let key = match table.key_of(&item) {
            Ok((partition, sort)) => (partition.to_string(), sort.to_string()),
            Err(SinkError::MissingKey { attribute, .. }) => {
                log::warn!("Skipping {} item {i}: empty '{attribute}'", table.name);
                load.skipped += 1;
                progress.on_item(i + 1);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        sink.put_item(&table.name, item)?;
        if !keys.insert(key) {
            load.overwritten += 1;
        }
        progress.on_item(i + 1);
    }
    load.written = keys.len();

    if load.overwritten > 0 {
        log::warn!(
            "{} '{}' items replaced an earlier item with the same key",
            load.overwritten,
            table.name
        );
    }
    progress.on_table_done(&table.name, &load);
    Ok(load)
}

fn load_tables(
    sink: &mut dyn RecordSink,
    config: &StoreConfig,
    data: &Transformed,
    progress: &dyn LoadProgress,
) -> Result<LoadStats, ImportError> {
    let mut stats = LoadStats::default();

    let games = put_all(
        sink,
        &config.game_schema(),
        data.games.iter().map(game_item),
        progress,
    )?;
    stats.games = games.written;
    stats.absorb(&games);

    let deals = put_all(
        sink,
        &config.deal_schema(),
        data.deals.iter().map(deal_item),
        progress,
    )?;
    stats.deals = deals.written;
    stats.absorb(&deals);

    let reviews = put_all(
        sink,
        &config.review_schema(),
        data.reviews.iter().map(review_item),
        progress,
    )?;
    stats.reviews = reviews.written;
    stats.absorb(&reviews);

    Ok(stats)
}

/// Write games, then deals, then reviews as one batch.
///
/// The batch is rolled back if any write fails for a reason other than an
/// empty key.
pub fn load(
    sink: &mut dyn RecordSink,
    config: &StoreConfig,
    data: &Transformed,
    progress: &dyn LoadProgress,
) -> Result<LoadStats, ImportError> {
    sink.begin()?;
    match load_tables(sink, config, data, progress) {
        Ok(stats) => {
            sink.commit()?;
            Ok(stats)
        }
        Err(e) => {
            if let Err(rollback) = sink.rollback() {
                log::error!("Rollback failed: {rollback}");
            }
            Err(e)
        }
    }
}
