//! Item model and the sink abstraction.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Item serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Item for table '{table}' has no usable '{attribute}' key attribute")]
    MissingKey { table: String, attribute: String },
}

/// A typed attribute value, tagged the way DynamoDB tags them on the wire.
///
/// Numbers keep their decimal text so integers and decimals round-trip
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    #[serde(rename = "M")]
    M(BTreeMap<String, AttributeValue>),
}

/// One stored record: attribute name to value.
pub type Item = BTreeMap<String, AttributeValue>;

/// Plain JSON object for an item, without the type tags.
pub fn item_to_json(item: &Item) -> Value {
    Value::Object(
        item.iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

impl AttributeValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::S(s.into())
    }

    pub fn number(n: impl fmt::Display) -> Self {
        Self::N(n.to_string())
    }

    /// Convert a JSON value, mapping each JSON type onto its attribute type.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::N(n.to_string()),
            Value::String(s) => Self::S(s.clone()),
            Value::Array(items) => Self::L(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to plain JSON for display. Numbers that JSON cannot hold
    /// exactly are kept as strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::S(s) => Value::String(s.clone()),
            Self::N(n) => serde_json::from_str::<serde_json::Number>(n)
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.clone())),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null => Value::Null,
            Self::L(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::M(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Decimal> for AttributeValue {
    fn from(d: Decimal) -> Self {
        Self::N(d.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::S(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::S(s.to_string())
    }
}

/// Key layout and provisioning of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Hash key attribute; always string-typed.
    pub partition_key: String,
    /// Range key attribute; always string-typed.
    pub sort_key: String,
    pub read_capacity: u32,
    pub write_capacity: u32,
}

impl TableSchema {
    pub fn new(name: &str, partition_key: &str, sort_key: &str) -> Self {
        Self {
            name: name.to_string(),
            partition_key: partition_key.to_string(),
            sort_key: sort_key.to_string(),
            read_capacity: 10,
            write_capacity: 10,
        }
    }

    /// Extract `(partition, sort)` key values from an item.
    ///
    /// Both attributes must be present, string-typed and non-empty.
    pub fn key_of<'a>(&self, item: &'a Item) -> Result<(&'a str, &'a str), SinkError> {
        let key = |attribute: &str| {
            item.get(attribute)
                .and_then(AttributeValue::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| SinkError::MissingKey {
                    table: self.name.clone(),
                    attribute: attribute.to_string(),
                })
        };
        Ok((key(&self.partition_key)?, key(&self.sort_key)?))
    }
}

/// Destination for loaded items.
///
/// `put_item` overwrites any existing item with the same key.
pub trait RecordSink {
    /// Provision a table. Creating an existing table is a no-op.
    fn create_table(&mut self, schema: &TableSchema) -> Result<(), SinkError>;

    /// Write one item into an existing table.
    fn put_item(&mut self, table: &str, item: Item) -> Result<(), SinkError>;

    /// Start a batch of writes. Sinks without batching ignore this.
    fn begin(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Make a batch durable.
    fn commit(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Discard a batch after a failed write.
    fn rollback(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-memory sink. Items are kept per table in key order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, MemoryTable>,
}

#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    items: BTreeMap<(String, String), Item>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str, partition: &str, sort: &str) -> Option<&Item> {
        self.tables
            .get(table)?
            .items
            .get(&(partition.to_string(), sort.to_string()))
    }

    /// All items of a table in key order; empty for unknown tables.
    pub fn items(&self, table: &str) -> Vec<&Item> {
        self.tables
            .get(table)
            .map(|t| t.items.values().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.items.len())
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }
}

impl RecordSink for MemoryStore {
    fn create_table(&mut self, schema: &TableSchema) -> Result<(), SinkError> {
        self.tables
            .entry(schema.name.clone())
            .or_insert_with(|| MemoryTable {
                schema: schema.clone(),
                items: BTreeMap::new(),
            });
        Ok(())
    }

    fn put_item(&mut self, table: &str, item: Item) -> Result<(), SinkError> {
        let entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| SinkError::UnknownTable(table.to_string()))?;
        let (partition, sort) = entry.schema.key_of(&item)?;
        let key = (partition.to_string(), sort.to_string());
        entry.items.insert(key, item);
        Ok(())
    }
}
