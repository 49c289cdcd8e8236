//! Store configuration.
//!
//! The sink never reads process-wide state: everything it needs is passed in
//! through a [`StoreConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::TableSchema;

/// Where the store lives and how its tables are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub deal_table: String,
    pub game_table: String,
    pub review_table: String,
    pub read_capacity: u32,
    pub write_capacity: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            deal_table: "deal".to_string(),
            game_table: "game".to_string(),
            review_table: "reviews".to_string(),
            read_capacity: 10,
            write_capacity: 10,
        }
    }
}

/// `<data dir>/deal-etl/store.db`, falling back to the working directory.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("deal-etl").join("store.db")
}

impl StoreConfig {
    fn schema(&self, name: &str, sort_key: &str) -> TableSchema {
        TableSchema {
            read_capacity: self.read_capacity,
            write_capacity: self.write_capacity,
            ..TableSchema::new(name, "app_id", sort_key)
        }
    }

    /// Deals: partitioned by `app_id`, sorted by `discounted_price`.
    pub fn deal_schema(&self) -> TableSchema {
        self.schema(&self.deal_table, "discounted_price")
    }

    /// Games: partitioned by `app_id`, sorted by `name`.
    pub fn game_schema(&self) -> TableSchema {
        self.schema(&self.game_table, "name")
    }

    /// Reviews: partitioned by `app_id`, sorted by `steam_id`.
    pub fn review_schema(&self) -> TableSchema {
        self.schema(&self.review_table, "steam_id")
    }

    pub fn table_schemas(&self) -> [TableSchema; 3] {
        [self.deal_schema(), self.game_schema(), self.review_schema()]
    }
}
