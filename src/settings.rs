//! Configuration for formatting, cash counting and justification reasons.
//!
//! Loaded from an optional `config/reconciliation.{toml,json,...}` file and
//! `RECON__*` environment variables, e.g. `RECON__CASH__FLOAT_AMOUNT=15000`
//! or `RECON__BACKEND__BASE_URLS=http://localhost:3001,http://127.0.0.1:3001`.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::normalize::{amount, FormatOptions, MAX_FRACTION_DIGITS};
use crate::types::ClosingResult;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/reconciliation";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// How amounts are displayed
    pub format: FormatOptions,
    /// Register cash count settings
    pub cash: CashSettings,
    /// Reasons a justification may cite; empty accepts any reason
    pub adjustment_reasons: Vec<String>,
    /// Backend locations
    pub backend: BackendConfig,
}

/// Register cash count settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashSettings {
    /// Change fund left in the drawer
    #[serde(with = "amount")]
    pub float_amount: BigDecimal,
    /// Bill denominations, largest first
    pub denominations: Vec<u32>,
}

impl Default for CashSettings {
    fn default() -> Self {
        Self {
            float_amount: BigDecimal::from(10000),
            denominations: vec![20000, 10000, 2000, 1000, 500, 200, 100, 50, 20, 10],
        }
    }
}

/// Where the closing backend can be reached
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Candidate base URLs, tried in order
    pub base_urls: Vec<String>,
}

impl ReconConfig {
    /// Load from the default file location and the environment
    pub fn load() -> ClosingResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a file (extension optional, file optional) and the environment
    pub fn load_from(path: &str) -> ClosingResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(environment())
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.check()?;
        tracing::debug!(
            path,
            locale = %loaded.format.locale,
            backends = loaded.backend.base_urls.len(),
            "configuration loaded"
        );
        Ok(loaded)
    }

    /// Parse TOML text, ignoring the environment
    pub fn from_toml_str(toml: &str) -> ClosingResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.check()?;
        Ok(loaded)
    }

    fn check(&self) -> ClosingResult<()> {
        if !self.format.has_valid_precision() {
            return Err(config::ConfigError::Message(format!(
                "format fraction digits cannot exceed {}",
                MAX_FRACTION_DIGITS
            ))
            .into());
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("RECON")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("backend.base_urls")
        .with_list_parse_key("adjustment_reasons")
        .try_parsing(true)
}
