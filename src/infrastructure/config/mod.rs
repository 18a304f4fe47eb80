use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::domain::error::{AppError, Result};
use crate::domain::import::MergePolicy;

const ENV_PREFIX: &str = "DONOR_IMPORT_";
const DEFAULT_CONFIG_FILE: &str = "donor_import.toml";

/// Settings for the import engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// SQLite URL of the primary store
    pub database_url: String,

    /// International dialing code replaced by the trunk `0` during phone normalization
    #[serde(deserialize_with = "string_or_number")]
    pub country_code: String,

    /// Encoding label tried for CSV files that are neither BOM-marked nor UTF-8
    pub fallback_encoding: String,

    /// Upper bound on data rows per file
    pub max_rows: usize,

    pub merge_policy: MergePolicy,

    /// Whether `toMerge` records are committed together with new ones
    pub include_merges_in_commit: bool,

    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://donor_import.db".to_string(),
            country_code: "972".to_string(),
            fallback_encoding: "windows-1255".to_string(),
            max_rows: 10_000,
            merge_policy: MergePolicy::FillBlanks,
            include_merges_in_commit: true,
            log_filter: "info".to_string(),
        }
    }
}

impl ImportConfig {
    /// Defaults, then `donor_import.toml` if present, then `DONOR_IMPORT_*` variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config: ImportConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(ImportConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.country_code.is_empty() || !self.country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::ConfigError(
                "country_code must be a non-empty string of digits".to_string(),
            ));
        }
        if encoding_rs::Encoding::for_label(self.fallback_encoding.as_bytes()).is_none() {
            return Err(AppError::ConfigError(format!(
                "Unknown fallback_encoding: {}",
                self.fallback_encoding
            )));
        }
        if self.max_rows == 0 {
            return Err(AppError::ConfigError("max_rows must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Env values are parsed as typed values, so `DONOR_IMPORT_COUNTRY_CODE=44` arrives as a number
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
