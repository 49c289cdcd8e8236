//! Record types for the three storefront exports and their join.
//!
//! Raw records are flat JSON objects. After normalization they are read into
//! the typed records below; any field without a dedicated slot is kept in the
//! record's `extra`/`fields` map so nothing from the export is lost.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A flat, schema-less record as read from a JSON export.
pub type RawRecord = Map<String, Value>;

/// Placeholder for a missing `review`/`recent_review`.
pub const NO_REVIEW: &str = "No Review";

/// Placeholder for a missing `offer_ends`; carries no date.
pub const OFFER_ENDS_SENTINEL: &str = "Offer ends in";

/// Which export a record set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Deal,
    Link,
    Review,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deal => write!(f, "deal"),
            Self::Link => write!(f, "link"),
            Self::Review => write!(f, "review"),
        }
    }
}

// ── Deal ────────────────────────────────────────────────────────────────────

/// A discounted storefront listing after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    #[serde(deserialize_with = "lenient::int")]
    pub app_id: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub original_price: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub discounted_price: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub review: String,
    #[serde(deserialize_with = "lenient::string")]
    pub recent_review: String,
    #[serde(deserialize_with = "lenient::string")]
    pub offer_ends: String,
    /// Canonical instant, or the offer text when it held no date.
    #[serde(deserialize_with = "lenient::string")]
    pub timestamp: String,
    /// Canonical instant, or the store's text when it matched no date format.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub release_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DealRecord {
    pub fn join_key(&self) -> JoinKey<'_> {
        JoinKey {
            app_id: self.app_id,
            link: &self.link,
            name: &self.name,
        }
    }
}

// ── Catalog link ────────────────────────────────────────────────────────────

/// Descriptive catalog metadata for an item.
///
/// Only the join columns are typed; tag, category, developer and the platform
/// support flags stay in `fields` exactly as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub app_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LinkRecord {
    /// The join key, or `None` when any key column is missing.
    pub fn join_key(&self) -> Option<JoinKey<'_>> {
        Some(JoinKey {
            app_id: self.app_id?,
            link: self.link.as_deref()?,
            name: self.name.as_deref()?,
        })
    }
}

/// Composite key matching a deal to its catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinKey<'a> {
    pub app_id: i64,
    pub link: &'a str,
    pub name: &'a str,
}

// ── Review ──────────────────────────────────────────────────────────────────

/// A user review after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(alias = "appid", deserialize_with = "lenient::string")]
    pub app_id: String,
    #[serde(alias = "steamid", deserialize_with = "lenient::string")]
    pub steam_id: String,
    #[serde(default)]
    pub total_playtime: Option<Number>,
    #[serde(default)]
    pub playtime_at_review: Option<Number>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub last_play_time: Option<String>,
    #[serde(default)]
    pub recommended: Option<bool>,
    #[serde(default)]
    pub helpful_vote: Option<Number>,
    #[serde(default)]
    pub funny_vote: Option<Number>,
    #[serde(default, deserialize_with = "lenient::opt_decimal")]
    pub weighted_vote_score: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Game ────────────────────────────────────────────────────────────────────

/// A deal joined with its catalog entry, if one matched.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub deal: DealRecord,
    pub catalog: Option<LinkRecord>,
}

impl GameRecord {
    /// A catalog-only field; `None` on a join miss or when the entry lacks it.
    pub fn catalog_field(&self, name: &str) -> Option<&Value> {
        self.catalog.as_ref()?.fields.get(name)
    }

    pub fn tag(&self) -> Option<&Value> {
        self.catalog_field("tag")
    }

    pub fn category(&self) -> Option<&Value> {
        self.catalog_field("category")
    }

    pub fn developer(&self) -> Option<&Value> {
        self.catalog_field("developer")
    }
}

/// Serde helpers that accept the loose scalar typing of the JSON exports.
///
/// A column that is textual in one export may hold a bare number in another,
/// so string slots take any scalar and integer slots take numeric strings.
pub mod lenient {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    fn scalar_to_string(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    fn value_to_int(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        scalar_to_string(Value::deserialize(d)?)
            .ok_or_else(|| D::Error::custom("expected a value, found null"))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_to_string(Value::deserialize(d)?))
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Value::deserialize(d)?;
        value_to_int(&value)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, found {value}")))
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            value => value_to_int(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected an integer, found {value}"))),
        }
    }

    /// Decimals are read from the number's text so no binary rounding creeps in.
    pub fn opt_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
        let text = match Value::deserialize(d)? {
            Value::Null => return Ok(None),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            other => return Err(D::Error::custom(format!("expected a decimal, found {other}"))),
        };
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map(Some)
            .map_err(D::Error::custom)
    }
}
