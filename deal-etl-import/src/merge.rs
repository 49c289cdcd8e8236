//! Left join of deals with catalog entries.
//!
//! Deals and catalog entries match when `app_id`, `link` and `name` are all
//! equal. Every deal survives: a deal with no catalog entry becomes a game
//! with no catalog fields, and a deal with several entries becomes one game
//! per entry. Duplicates are not collapsed here.

use std::collections::HashMap;

use deal_etl_catalog::{DealRecord, GameRecord, JoinKey, LinkRecord};

/// Join outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Deals with at least one catalog entry.
    pub matched: usize,
    /// Deals with no catalog entry.
    pub missed: usize,
    /// Extra games produced by deals matching more than one entry.
    pub fanned_out: usize,
}

/// Join `deals` with `links`, keeping deal order and, within one deal, catalog
/// order.
pub fn left_join(deals: &[DealRecord], links: &[LinkRecord]) -> (Vec<GameRecord>, MergeStats) {
    let mut index: HashMap<JoinKey<'_>, Vec<&LinkRecord>> = HashMap::new();
    for link in links {
        if let Some(key) = link.join_key() {
            index.entry(key).or_default().push(link);
        }
    }

    let mut stats = MergeStats::default();
    let mut games = Vec::with_capacity(deals.len());

    for deal in deals {
        match index.get(&deal.join_key()) {
            Some(matches) => {
                stats.matched += 1;
                stats.fanned_out += matches.len() - 1;
                games.extend(matches.iter().map(|link| GameRecord {
                    deal: deal.clone(),
                    catalog: Some((*link).clone()),
                }));
            }
            None => {
                log::debug!("No catalog entry for deal {} ({})", deal.app_id, deal.name);
                stats.missed += 1;
                games.push(GameRecord {
                    deal: deal.clone(),
                    catalog: None,
                });
            }
        }
    }

    if stats.fanned_out > 0 {
        log::warn!(
            "{} extra game records from deals matching several catalog entries",
            stats.fanned_out
        );
    }

    (games, stats)
}
