//! Settings for the `quote` binary.
//!
//! Values are layered: command-line flags win over the TOML file, which wins
//! over built-in defaults. Every section and key in the file is optional.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection = "quotes.db"
//!
//! [logging]
//! level = "debug"
//! file = "quote.log"
//!
//! [pricing]
//! short_job = "prorated"
//! max_hours_per_category = 400
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quote_core::ShortJobPolicy;
use quote_core::db::DbConfig;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const DEFAULT_BACKEND: &str = "sqlite";
pub const DEFAULT_CONNECTION: &str = "quotes.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The configuration file as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub pricing: PricingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: Option<String>,
    pub connection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingSection {
    pub short_job: Option<ShortJobPolicy>,
    pub max_hours_per_category: Option<Decimal>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("in config file '{}'", path.display()))
    }
}

/// Values given on the command line, taking precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub connection: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub short_job: Option<ShortJobPolicy>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: DbConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub short_job: ShortJobPolicy,
    /// `None` keeps the built-in limit.
    pub max_hours_per_category: Option<Decimal>,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
    ) -> Self {
        let FileConfig {
            database,
            logging,
            pricing,
        } = file;

        Self {
            database: DbConfig {
                backend: overrides
                    .backend
                    .or(database.backend)
                    .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
                connection_string: overrides
                    .connection
                    .or(database.connection)
                    .unwrap_or_else(|| DEFAULT_CONNECTION.to_string()),
            },
            log_level: overrides
                .log_level
                .or(logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: overrides.log_file.or(logging.file),
            short_job: overrides.short_job.or(pricing.short_job).unwrap_or_default(),
            max_hours_per_category: pricing.max_hours_per_category,
        }
    }

    /// Reads `path` when given, then applies `overrides`.
    pub fn load(
        path: Option<&Path>,
        overrides: Overrides,
    ) -> Result<Self> {
        let file = match path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, overrides))
    }
}
