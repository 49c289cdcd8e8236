//! Reading the raw JSON exports.
//!
//! An export is either a JSON array of objects or JSON Lines (one object per
//! line). Record order is preserved.

use std::path::{Path, PathBuf};

use deal_etl_catalog::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;

/// Locations of the three exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    pub deal: PathBuf,
    pub link: PathBuf,
    pub review: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::in_dir(Path::new("../Data_Crawl"))
    }
}

impl InputPaths {
    /// `deal.json`, `link.json` and `reviews.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            deal: dir.join("deal.json"),
            link: dir.join("link.json"),
            review: dir.join("reviews.json"),
        }
    }
}

/// The three exports as read, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDatasets {
    pub deals: Vec<RawRecord>,
    pub links: Vec<RawRecord>,
    pub reviews: Vec<RawRecord>,
}

fn into_record(path: &Path, index: usize, value: Value) -> Result<RawRecord, ImportError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ImportError::NotAnObject {
            path: path.to_path_buf(),
            index,
        }),
    }
}

/// Parse export text. `path` is only used in error messages.
pub fn parse_records(path: &Path, text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let json_error = |source: serde_json::Error| ImportError::Json {
        path: path.to_path_buf(),
        source,
    };

    if text.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(text).map_err(json_error)?;
        return values
            .into_iter()
            .enumerate()
            .map(|(i, v)| into_record(path, i, v))
            .collect();
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let value = serde_json::from_str(line).map_err(json_error)?;
            into_record(path, i, value)
        })
        .collect()
}

/// Read one export file.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(path, &text)?;
    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read all three exports.
pub fn extract(paths: &InputPaths) -> Result<RawDatasets, ImportError> {
    Ok(RawDatasets {
        deals: read_records(&paths.deal)?,
        links: read_records(&paths.link)?,
        reviews: read_records(&paths.review)?,
    })
}
