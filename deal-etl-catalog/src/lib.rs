//! Storefront record types and the field normalizers applied to them.
//!
//! This crate defines the deal, catalog, review and joined game records along
//! with the pure string rules used to clean them: item id extraction from
//! store links, date and offer-expiry parsing, and price cleanup. It has no
//! I/O; `deal-etl-import` drives these rules over whole record sets and
//! `deal-etl-db` persists the result.

pub mod dates;
pub mod link_id;
pub mod price;
pub mod types;

pub use dates::{
    CANONICAL_FORMAT, epoch_to_instant, parse_offer_ends_text, parse_release_date, to_instant,
};
pub use link_id::{LinkIdError, extract_app_id};
pub use price::strip_currency_symbol;
pub use types::*;
