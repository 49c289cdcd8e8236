//! Pipeline settings (input locations, store location, hardening switches).
//!
//! Settings are read from `~/.config/deal-etl/settings.toml`, then selected
//! fields are overridden from the environment. Command-line flags override
//! both in the CLI.
//!
//! ```toml
//! skip_malformed_links = false
//!
//! [inputs]
//! deal = "../Data_Crawl/deal.json"
//! link = "../Data_Crawl/link.json"
//! review = "../Data_Crawl/reviews.json"
//!
//! [store]
//! database_path = "/var/lib/deal-etl/store.db"
//! deal_table = "deal"
//! ```

use std::path::{Path, PathBuf};

use deal_etl_db::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::extract::InputPaths;

/// Overrides `store.database_path`.
pub const ENV_DATABASE: &str = "DEAL_ETL_DB";
/// Overrides all three inputs with `deal.json`, `link.json`, `reviews.json` in this directory.
pub const ENV_INPUT_DIR: &str = "DEAL_ETL_INPUT_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Skip deals whose link has no item id instead of aborting the run.
    pub skip_malformed_links: bool,
    pub inputs: InputPaths,
    pub store: StoreConfig,
}

/// Canonical path to the settings file: `~/.config/deal-etl/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("deal-etl").join("settings.toml")
}

impl PipelineSettings {
    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ImportError> {
        toml::from_str(text).map_err(|e| ImportError::Settings(e.to_string()))
    }

    /// Read a settings file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ImportError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ImportError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.store.database_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup(ENV_INPUT_DIR).filter(|v| !v.is_empty()) {
            self.inputs = InputPaths::in_dir(Path::new(&dir));
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ImportError> {
        toml::to_string_pretty(self).map_err(|e| ImportError::Settings(e.to_string()))
    }
}

/// Load settings from the settings file and the process environment.
pub fn load_settings() -> Result<PipelineSettings, ImportError> {
    let mut settings = PipelineSettings::from_file(&settings_path())?;
    settings.apply_env(|name| std::env::var(name).ok());
    Ok(settings)
}
