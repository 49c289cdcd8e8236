//! Extract, transform and load the storefront exports.
//!
//! This crate owns the pipeline: reading the three JSON exports, applying the
//! per-dataset field policies, left-joining deals with catalog entries, and
//! writing the results through a [`deal_etl_db::RecordSink`].

pub mod error;
pub mod extract;
pub mod fields;
pub mod load;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod settings;

pub use error::ImportError;
pub use extract::{InputPaths, RawDatasets, extract, parse_records, read_records};
pub use fields::{DefaultValue, FieldPolicy, RuleContext, apply_policies, canonical_field_name};
pub use load::{LoadStats, deal_item, game_item, load, review_item};
pub use merge::{MergeStats, left_join};
pub use normalize::{
    DEAL_POLICIES, NormalizeOptions, Normalized, REVIEW_POLICIES, normalize_deals, normalize_links,
    normalize_reviews,
};
pub use pipeline::{
    RunSummary, TransformStats, Transformed, create_tables, log_run, run, transform,
};
pub use progress::{LoadProgress, LogProgress, SilentProgress, TableLoad};
pub use settings::{PipelineSettings, load_settings, settings_path};
