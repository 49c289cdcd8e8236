//! Per-dataset field cleanup.
//!
//! | dataset | rules |
//! |---|---|
//! | deal | drop rows without `name`; placeholder reviews and offer text; strip `$` from prices; fill `timestamp` from the offer text and canonicalize it; canonicalize `release_date`; derive `app_id` from `link` |
//! | review | canonicalize `last_play_time`, `created_time`, `last_updated` |
//! | link | field names only |
//!
//! Every dataset first has the spaces in its field names replaced with
//! underscores.

use chrono::NaiveDate;
use deal_etl_catalog::dates::{
    epoch_to_instant, parse_offer_ends_text, parse_release_date, to_instant,
};
use deal_etl_catalog::{
    Dataset, DealRecord, LinkIdError, LinkRecord, NO_REVIEW, OFFER_ENDS_SENTINEL, RawRecord,
    ReviewRecord, extract_app_id, strip_currency_symbol,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ImportError;
use crate::fields::{FieldPolicy, RuleContext, apply_policies, canonicalize_fields};

/// Run-wide normalization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// The date offer countdown text is resolved against.
    pub today: NaiveDate,
    /// Skip deals whose link carries no item id instead of failing the run.
    pub skip_malformed_links: bool,
}

impl NormalizeOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            skip_malformed_links: false,
        }
    }

    fn context(&self) -> RuleContext {
        RuleContext { today: self.today }
    }
}

// ── Rules ───────────────────────────────────────────────────────────────────

fn strip_price(value: &Value, _: &RuleContext) -> Result<Value, LinkIdError> {
    Ok(match value {
        Value::String(price) => Value::from(strip_currency_symbol(price)),
        Value::Number(n) => Value::from(n.to_string()),
        other => other.clone(),
    })
}

fn offer_ends_to_timestamp(value: &Value, ctx: &RuleContext) -> Result<Value, LinkIdError> {
    Ok(match value {
        Value::String(text) => Value::from(parse_offer_ends_text(text, ctx.today)),
        other => other.clone(),
    })
}

fn canonical_instant(value: &Value, _: &RuleContext) -> Result<Value, LinkIdError> {
    Ok(to_instant(value))
}

fn release_date(value: &Value, _: &RuleContext) -> Result<Value, LinkIdError> {
    Ok(match value {
        Value::String(text) => Value::from(parse_release_date(text)),
        other => other.clone(),
    })
}

fn app_id_from_link(value: &Value, _: &RuleContext) -> Result<Value, LinkIdError> {
    let link = match value {
        Value::String(link) => link.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    extract_app_id(&link).map(Value::from)
}

/// Epoch seconds become instants first; everything then goes through
/// [`to_instant`].
fn review_instant(value: &Value, _: &RuleContext) -> Result<Value, LinkIdError> {
    let converted = value
        .as_i64()
        .and_then(epoch_to_instant)
        .map(Value::from)
        .unwrap_or_else(|| value.clone());
    Ok(to_instant(&converted))
}

/// Deal rules, in application order.
pub const DEAL_POLICIES: &[FieldPolicy] = &[
    FieldPolicy::new("name").required(),
    FieldPolicy::new("review").default_text(NO_REVIEW),
    FieldPolicy::new("recent_review").default_text(NO_REVIEW),
    FieldPolicy::new("offer_ends").default_text(OFFER_ENDS_SENTINEL),
    FieldPolicy::new("original_price").transform(strip_price),
    FieldPolicy::new("discounted_price").transform(strip_price),
    FieldPolicy::new("timestamp")
        .default_from("offer_ends", offer_ends_to_timestamp)
        .transform(canonical_instant),
    FieldPolicy::new("release_date").transform(release_date),
    FieldPolicy::new("app_id").computed_from("link", app_id_from_link),
];

/// Review rules, in application order.
pub const REVIEW_POLICIES: &[FieldPolicy] = &[
    FieldPolicy::new("last_play_time").transform(review_instant),
    FieldPolicy::new("created_time").transform(review_instant),
    FieldPolicy::new("last_updated").transform(review_instant),
];

// ── Record sets ─────────────────────────────────────────────────────────────

/// A normalized record set plus what was left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    /// Rows dropped for a missing required field.
    pub dropped: usize,
    /// Rows skipped for a malformed link (only when skipping is enabled).
    pub skipped: usize,
}

fn normalize_set<T: DeserializeOwned>(
    dataset: Dataset,
    records: Vec<RawRecord>,
    policies: &[FieldPolicy],
    options: &NormalizeOptions,
) -> Result<Normalized<T>, ImportError> {
    let ctx = options.context();
    let mut out = Normalized {
        records: Vec::with_capacity(records.len()),
        dropped: 0,
        skipped: 0,
    };

    for (index, raw) in records.into_iter().enumerate() {
        let record = match apply_policies(canonicalize_fields(raw), policies, &ctx) {
            Ok(Some(record)) => record,
            Ok(None) => {
                out.dropped += 1;
                continue;
            }
            Err(source) if options.skip_malformed_links => {
                log::warn!("Skipping {dataset} record {index}: {source}");
                out.skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(ImportError::MalformedLink {
                    dataset,
                    index,
                    source,
                });
            }
        };

        let typed = serde_json::from_value(Value::Object(record)).map_err(|source| {
            ImportError::InvalidRecord {
                dataset,
                index,
                source,
            }
        })?;
        out.records.push(typed);
    }

    if out.dropped > 0 {
        log::info!("Dropped {} {dataset} records without a name", out.dropped);
    }
    Ok(out)
}

/// Normalize the deal export. Input order is kept for surviving rows.
pub fn normalize_deals(
    records: Vec<RawRecord>,
    options: &NormalizeOptions,
) -> Result<Normalized<DealRecord>, ImportError> {
    normalize_set(Dataset::Deal, records, DEAL_POLICIES, options)
}

/// Normalize the review export.
pub fn normalize_reviews(
    records: Vec<RawRecord>,
    options: &NormalizeOptions,
) -> Result<Normalized<ReviewRecord>, ImportError> {
    normalize_set(Dataset::Review, records, REVIEW_POLICIES, options)
}

/// Normalize the catalog export. Only field names change.
pub fn normalize_links(
    records: Vec<RawRecord>,
    options: &NormalizeOptions,
) -> Result<Normalized<LinkRecord>, ImportError> {
    normalize_set(Dataset::Link, records, &[], options)
}
