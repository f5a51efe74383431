// Configuration management for the grid simulation engine

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::core::types::AssetId;
use crate::error::{EngineError, EngineResult};

/// Grid parameters. Immutable once an engine is built from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub lower_price: f64,
    pub upper_price: f64,
    pub grid_count: usize,
    pub total_investment: f64,
    pub base_asset_id: AssetId,
    pub quote_asset_id: AssetId,
}

impl GridConfig {
    pub fn new(
        lower_price: f64,
        upper_price: f64,
        grid_count: usize,
        total_investment: f64,
        base_asset_id: impl Into<AssetId>,
        quote_asset_id: impl Into<AssetId>,
    ) -> Self {
        Self {
            lower_price,
            upper_price,
            grid_count,
            total_investment,
            base_asset_id: base_asset_id.into(),
            quote_asset_id: quote_asset_id.into(),
        }
    }

    /// Check numeric bounds and asset identifiers
    pub fn validate(&self) -> EngineResult<()> {
        self.validate_with(&AssetPolicy::default())
    }

    pub fn validate_with(&self, policy: &AssetPolicy) -> EngineResult<()> {
        self.validate_bounds()?;
        self.validate_assets(policy)
    }

    /// Price bounds, grid count and investment only
    pub fn validate_bounds(&self) -> EngineResult<()> {
        if !self.lower_price.is_finite() || !self.upper_price.is_finite() {
            return Err(EngineError::InvalidConfig(
                "grid bounds must be finite".to_string(),
            ));
        }
        if self.lower_price <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "lower_price must be positive, got {}",
                self.lower_price
            )));
        }
        if self.upper_price <= self.lower_price {
            return Err(EngineError::InvalidConfig(format!(
                "upper_price ({}) must be greater than lower_price ({})",
                self.upper_price, self.lower_price
            )));
        }
        if self.grid_count < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "grid_count must be at least 2, got {}",
                self.grid_count
            )));
        }
        if !self.total_investment.is_finite() || self.total_investment <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "total_investment must be positive, got {}",
                self.total_investment
            )));
        }

        Ok(())
    }

    /// Asset identifiers under the given policy; base and quote must differ
    pub fn validate_assets(&self, policy: &AssetPolicy) -> EngineResult<()> {
        self.base_asset_id
            .validate("base_asset_id", policy.require_canonical_addresses)?;
        self.quote_asset_id
            .validate("quote_asset_id", policy.require_canonical_addresses)?;

        if self.base_asset_id == self.quote_asset_id {
            return Err(EngineError::InvalidConfig(
                "base_asset_id and quote_asset_id must differ".to_string(),
            ));
        }

        Ok(())
    }

    /// Distance between two adjacent levels
    pub fn step(&self) -> f64 {
        (self.upper_price - self.lower_price) / self.grid_count as f64
    }

    /// Quote notional deployed by one full-size buy
    pub fn notional_per_grid(&self) -> f64 {
        self.total_investment / self.grid_count as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub initial_base_balance: Option<f64>,
    #[serde(default)]
    pub initial_quote_balance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetPolicy {
    /// Require `0x`-prefixed 20-byte hex addresses for both assets
    #[serde(default)]
    pub require_canonical_addresses: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log each fill and print the trade history after a replay
    #[serde(default = "default_true")]
    pub enable_trade_logging: bool,
    /// Log crossings skipped for lack of balance
    #[serde(default = "default_true")]
    pub enable_skip_logging: bool,
}

fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_trade_logging: true,
            enable_skip_logging: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub assets: AssetPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::new(20000.0, 30000.0, 10, 100000.0, "WBTC", "USDC"),
            ledger: LedgerConfig::default(),
            assets: AssetPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid
            .validate_with(&self.assets)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        for (name, value) in [
            ("initial_base_balance", self.ledger.initial_base_balance),
            ("initial_quote_balance", self.ledger.initial_quote_balance),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ConfigError::Validation(format!(
                        "{} must be a non-negative number, got {}",
                        name, v
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!((config.grid.step() - 1000.0).abs() < 1e-9);
        assert!((config.grid.notional_per_grid() - 10000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut grid = Config::default().grid;
        grid.upper_price = grid.lower_price;
        assert!(matches!(grid.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_small_grid_count() {
        let mut grid = Config::default().grid;
        grid.grid_count = 1;
        assert!(matches!(grid.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_investment() {
        let mut grid = Config::default().grid;
        grid.total_investment = 0.0;
        assert!(grid.validate().is_err());
        grid.total_investment = -5.0;
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_rejects_same_assets() {
        let grid = GridConfig::new(1.0, 2.0, 4, 100.0, "ETH", "ETH");
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_canonical_address_policy() {
        let grid = GridConfig::new(
            1.0,
            2.0,
            4,
            100.0,
            "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599",
            "USDC",
        );
        assert!(grid.validate().is_ok());

        let strict = AssetPolicy { require_canonical_addresses: true };
        assert!(grid.validate_with(&strict).is_err());
    }

    #[test]
    fn test_negative_initial_balance_rejected() {
        let mut config = Config::default();
        config.ledger.initial_quote_balance = Some(-1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
