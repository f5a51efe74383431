//! Pre-flight validation before a replay
//!
//! Checks the configuration and the price feed together so that problems
//! which would silently produce an empty trade history are reported up front.

use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::grid::Grid;
use crate::feed::PriceFeed;

/// Share of out-of-range prices above which a warning is raised
const OUT_OF_RANGE_WARN_RATIO: f64 = 0.25;

/// Validation result with detailed findings
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
}

#[derive(Debug, Clone)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub level: ValidationLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Critical,  // Must pass for the replay to run
    Warning,   // Replay runs, results may be degenerate
    Info,
}

impl ValidationCheck {
    fn new(name: &str, passed: bool, level: ValidationLevel, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            message,
            level,
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult {
            passed: true,
            checks: Vec::new(),
        }
    }

    pub fn add_check(&mut self, check: ValidationCheck) {
        if !check.passed && check.level == ValidationLevel::Critical {
            self.passed = false;
        }
        self.checks.push(check);
    }

    pub fn critical_failures(&self) -> Vec<&ValidationCheck> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.level == ValidationLevel::Critical)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationCheck> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.level == ValidationLevel::Warning)
            .collect()
    }

    pub fn display(&self) {
        info!("🔍 Pre-flight Validation");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        for check in &self.checks {
            let icon = if check.passed {
                "✅"
            } else {
                match check.level {
                    ValidationLevel::Critical => "❌",
                    ValidationLevel::Warning => "⚠️",
                    ValidationLevel::Info => "ℹ️",
                }
            };

            info!("{} {} - {}", icon, check.name, check.message);
        }

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if !self.passed {
            let failures = self.critical_failures();
            error!("❌ Validation failed: {} critical issue(s)", failures.len());
            for failure in failures {
                error!("   • {}: {}", failure.name, failure.message);
            }
        } else {
            let warnings = self.warnings();
            if !warnings.is_empty() {
                warn!("⚠️  {} warning(s) detected", warnings.len());
                for warning in warnings {
                    warn!("   • {}: {}", warning.name, warning.message);
                }
            }
            info!("✅ All critical checks passed");
        }
    }
}

/// Pre-flight validator for grid replays
pub struct PreFlightValidator {
    config: Config,
}

impl PreFlightValidator {
    pub fn new(config: Config) -> Self {
        PreFlightValidator { config }
    }

    /// Validate the configuration on its own
    pub fn validate_config(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.add_check(self.check_grid());
        result.add_check(self.check_assets());
        result.add_check(self.check_initial_balance());
        result
    }

    /// Validate the configuration against the feed about to be replayed
    pub fn validate_for_replay(&self, feed: &PriceFeed) -> ValidationResult {
        let mut result = self.validate_config();
        result.add_check(self.check_feed_not_empty(feed));

        // Range checks need a buildable grid
        if let Ok(grid) = Grid::build(&self.config.grid) {
            if let Some(check) = self.check_feed_range(&grid, feed) {
                result.add_check(check);
            }
            if let Some(check) = self.check_seed_level(&grid, feed) {
                result.add_check(check);
            }
        }

        result
    }

    fn check_grid(&self) -> ValidationCheck {
        let grid = &self.config.grid;
        match grid.validate_bounds() {
            Ok(()) => ValidationCheck::new(
                "Grid",
                true,
                ValidationLevel::Critical,
                format!(
                    "{} grids from {} to {} (step {:.4})",
                    grid.grid_count,
                    grid.lower_price,
                    grid.upper_price,
                    grid.step()
                ),
            ),
            Err(e) => ValidationCheck::new("Grid", false, ValidationLevel::Critical, e.to_string()),
        }
    }

    fn check_assets(&self) -> ValidationCheck {
        let grid = &self.config.grid;

        match grid.validate_assets(&self.config.assets) {
            Ok(()) => ValidationCheck::new(
                "Assets",
                true,
                ValidationLevel::Critical,
                format!("{}/{}", grid.base_asset_id, grid.quote_asset_id),
            ),
            Err(e) => ValidationCheck::new("Assets", false, ValidationLevel::Critical, e.to_string()),
        }
    }

    fn check_initial_balance(&self) -> ValidationCheck {
        let grid = &self.config.grid;
        let quote = self
            .config
            .ledger
            .initial_quote_balance
            .unwrap_or(grid.total_investment);
        let base = self.config.ledger.initial_base_balance.unwrap_or(0.0);
        let notional = grid.notional_per_grid();

        if quote + 1e-9 < notional && base <= 0.0 {
            ValidationCheck::new(
                "Initial Balance",
                false,
                ValidationLevel::Warning,
                format!(
                    "Quote {:.2} cannot fund one grid ({:.2}) and no base is held",
                    quote, notional
                ),
            )
        } else {
            ValidationCheck::new(
                "Initial Balance",
                true,
                ValidationLevel::Warning,
                format!("Quote {:.2}, base {:.8}, {:.2} per grid", quote, base, notional),
            )
        }
    }

    fn check_feed_not_empty(&self, feed: &PriceFeed) -> ValidationCheck {
        if feed.is_empty() {
            ValidationCheck::new(
                "Price Feed",
                false,
                ValidationLevel::Critical,
                "Feed contains no prices".to_string(),
            )
        } else {
            ValidationCheck::new(
                "Price Feed",
                true,
                ValidationLevel::Critical,
                format!("{} prices", feed.len()),
            )
        }
    }

    fn check_feed_range(&self, grid: &Grid, feed: &PriceFeed) -> Option<ValidationCheck> {
        if feed.is_empty() {
            return None;
        }

        let outside = feed
            .prices()
            .iter()
            .filter(|&&p| grid.index_of(p).is_none())
            .count();
        let ratio = outside as f64 / feed.len() as f64;

        Some(ValidationCheck::new(
            "Feed Range",
            ratio <= OUT_OF_RANGE_WARN_RATIO,
            ValidationLevel::Warning,
            format!(
                "{} of {} prices ({:.1}%) outside [{}, {}]",
                outside,
                feed.len(),
                ratio * 100.0,
                grid.lower_price(),
                grid.upper_price()
            ),
        ))
    }

    fn check_seed_level(&self, grid: &Grid, feed: &PriceFeed) -> Option<ValidationCheck> {
        let first = feed.prices().iter().copied().find(|&p| grid.index_of(p).is_some())?;
        let index = grid.index_of(first)?;

        Some(ValidationCheck::new(
            "Seed Level",
            index == 0,
            ValidationLevel::Info,
            if index == 0 {
                format!("Feed opens at {} on the lowest level, seed lot will be bought", first)
            } else {
                format!("Feed opens at {} on level {}, no seed lot", first, index)
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_result() {
        let mut result = ValidationResult::new();

        result.add_check(ValidationCheck::new("ok", true, ValidationLevel::Critical, String::new()));
        assert!(result.passed);

        result.add_check(ValidationCheck::new("warn", false, ValidationLevel::Warning, String::new()));
        assert!(result.passed);
        assert_eq!(result.warnings().len(), 1);

        result.add_check(ValidationCheck::new("fail", false, ValidationLevel::Critical, String::new()));
        assert!(!result.passed);
        assert_eq!(result.critical_failures().len(), 1);
    }

    #[test]
    fn test_default_config_passes() {
        let validator = PreFlightValidator::new(Config::default());
        let feed = PriceFeed::from_prices(vec![20000.0, 21000.0, 20000.0]);

        let result = validator.validate_for_replay(&feed);
        assert!(result.passed);
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_empty_feed_fails() {
        let validator = PreFlightValidator::new(Config::default());
        let result = validator.validate_for_replay(&PriceFeed::default());
        assert!(!result.passed);
    }

    #[test]
    fn test_invalid_grid_fails() {
        let mut config = Config::default();
        config.grid.grid_count = 1;

        let result = PreFlightValidator::new(config).validate_config();
        assert!(!result.passed);
        assert_eq!(result.critical_failures()[0].name, "Grid");
    }

    #[test]
    fn test_asset_failure_reported_once() {
        let mut config = Config::default();
        config.grid.quote_asset_id = "  ".into();

        let result = PreFlightValidator::new(config).validate_config();
        let failures = result.critical_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "Assets");

        let mut config = Config::default();
        config.grid.quote_asset_id = config.grid.base_asset_id.clone();
        let result = PreFlightValidator::new(config).validate_config();
        assert_eq!(result.critical_failures().len(), 1);
        assert_eq!(result.critical_failures()[0].name, "Assets");
    }

    #[test]
    fn test_mostly_out_of_range_feed_warns() {
        let validator = PreFlightValidator::new(Config::default());
        let feed = PriceFeed::from_prices(vec![35000.0, 36000.0, 25000.0]);

        let result = validator.validate_for_replay(&feed);
        assert!(result.passed);
        assert!(result.warnings().iter().any(|c| c.name == "Feed Range"));
    }

    #[test]
    fn test_underfunded_ledger_warns() {
        let mut config = Config::default();
        config.ledger.initial_quote_balance = Some(100.0);

        let result = PreFlightValidator::new(config).validate_config();
        assert!(result.passed);
        assert_eq!(result.warnings().len(), 1);
    }
}
