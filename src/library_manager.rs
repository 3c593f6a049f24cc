//! # Library Manager Module
//!
//! ## Purpose
//! Keeps the persistent settings of the crate: which reaction database to use, the default
//! temperature of a query and the logging level. The manager is an ordinary value; it is
//! created where it is needed and the database it produces is passed explicitly into closure
//! and assembly calls.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "reaction_database": "my_database.txt",
//!   "default_temperature": 298.15,
//!   "log_level": "info"
//! }
//! ```
//! `reaction_database` may be `null`, which selects the built-in database.
//!
//! ## Usage
//! ```rust
//! use AquaEquilibria::library_manager::LibraryManager;
//!
//! let manager = LibraryManager::new();
//! let database = manager.database().unwrap();
//! println!("T = {}", manager.default_temperature());
//! ```

use crate::AqueousEquilibrium::errors::AqueousEquilibriumError;
use crate::AqueousEquilibrium::reaction_database::ReactionDatabase;
use crate::Utils::load_from_file::load_database_from_file;
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "aqua_config.json";

/// Serializable settings.
///
/// # Fields
/// * `reaction_database` - path to a sectioned database document, `None` for the built-in one
/// * `default_temperature` - temperature of a query when none is given, K
/// * `log_level` - one of "off", "error", "warn", "info", "debug", "trace"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub reaction_database: Option<String>,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_temperature() -> f64 {
    298.15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            reaction_database: None,
            default_temperature: default_temperature(),
            log_level: default_log_level(),
        }
    }
}

/// Loads, validates and persists a [`LibraryConfig`].
#[derive(Debug, Clone)]
pub struct LibraryManager {
    config: LibraryConfig,
    config_file: String,
}

impl LibraryManager {
    /// Manager backed by "aqua_config.json" in the current directory; a missing or invalid
    /// file gives the default configuration.
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    pub fn with_config_file(config_file: &str) -> Self {
        let config = match Self::load_config(config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!("config file {} not usable ({}), using defaults", config_file, e);
                LibraryConfig::default()
            }
        };
        Self {
            config,
            config_file: config_file.to_string(),
        }
    }

    fn load_config(config_file: &str) -> Result<LibraryConfig, AqueousEquilibriumError> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: LibraryConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(LibraryConfig::default())
        }
    }

    /// Writes the configuration to the config file. Does nothing under `cargo test`.
    pub fn save_config(&self) -> Result<(), AqueousEquilibriumError> {
        #[cfg(test)]
        {
            return Ok(());
        }

        #[cfg(not(test))]
        {
            let content = serde_json::to_string_pretty(&self.config)?;
            fs::write(&self.config_file, content)?;
            info!("configuration saved to {}", self.config_file);
            Ok(())
        }
    }

    pub fn get_config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn reaction_database_path(&self) -> Option<&str> {
        self.config.reaction_database.as_deref()
    }

    pub fn default_temperature(&self) -> f64 {
        self.config.default_temperature
    }

    /// the configured level, `Info` for an unrecognised string
    pub fn log_level(&self) -> LevelFilter {
        self.config.log_level.parse().unwrap_or_else(|_| {
            warn!("unknown log level {}, using info", self.config.log_level);
            LevelFilter::Info
        })
    }

    /// Points the configuration at a database document; the file must exist.
    pub fn set_reaction_database(&mut self, path: &str) -> Result<(), AqueousEquilibriumError> {
        if Path::new(path).exists() {
            self.config.reaction_database = Some(path.to_string());
            self.save_config()
        } else {
            Err(AqueousEquilibriumError::Config(format!(
                "File does not exist: {}",
                path
            )))
        }
    }

    pub fn use_default_database(&mut self) -> Result<(), AqueousEquilibriumError> {
        self.config.reaction_database = None;
        self.save_config()
    }

    pub fn set_default_temperature(&mut self, T: f64) -> Result<(), AqueousEquilibriumError> {
        if !(T.is_finite() && T > 0.0) {
            return Err(AqueousEquilibriumError::Config(format!(
                "temperature must be a positive number of kelvins, got {}",
                T
            )));
        }
        self.config.default_temperature = T;
        self.save_config()
    }

    pub fn set_log_level(&mut self, level: &str) -> Result<(), AqueousEquilibriumError> {
        if level.parse::<LevelFilter>().is_err() {
            return Err(AqueousEquilibriumError::Config(format!(
                "unknown log level: {}",
                level
            )));
        }
        self.config.log_level = level.to_lowercase();
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), AqueousEquilibriumError> {
        self.config = LibraryConfig::default();
        self.save_config()
    }

    /// The database selected by the configuration: the document at `reaction_database`, or
    /// the built-in database.
    pub fn database(&self) -> Result<ReactionDatabase, AqueousEquilibriumError> {
        match &self.config.reaction_database {
            Some(path) => load_database_from_file(path),
            None => ReactionDatabase::default_database(),
        }
    }
}

impl Default for LibraryManager {
    fn default() -> Self {
        Self::new()
    }
}
