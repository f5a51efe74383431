// Grid simulation engine: crossing detection, order execution and PnL

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Config, GridConfig, LoggingConfig};
use crate::core::crossing::{Crossing, CrossingDetector};
use crate::core::grid::Grid;
use crate::core::ledger::Ledger;
use crate::core::pnl::{self, Lot, PnlReport};
use crate::core::types::{ExecutedOrder, GridLevel, GridSignal, Observation, Position};
use crate::error::{EngineError, EngineResult};

/// Counters for a batch of observations fed through [`GridEngine::replay`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub observed: usize,
    pub out_of_range: usize,
    pub trades_executed: usize,
    pub skipped: usize,
}

impl ReplaySummary {
    pub fn merge(&mut self, other: ReplaySummary) {
        self.observed += other.observed;
        self.out_of_range += other.out_of_range;
        self.trades_executed += other.trades_executed;
        self.skipped += other.skipped;
    }
}

/// Single-strategy grid engine. A pure, synchronous function of the ordered
/// price observations fed into it; all state is owned here and only exposed
/// as copies.
#[derive(Debug, Clone)]
pub struct GridEngine {
    config: GridConfig,
    grid: Grid,
    detector: CrossingDetector,
    ledger: Ledger,
    logging: LoggingConfig,

    // Inventory held before the first trade and the price it is costed at
    opening_base: f64,
    opening_price: Option<f64>,
}

impl GridEngine {
    /// Start with no base and the whole investment in quote
    pub fn new(config: GridConfig) -> EngineResult<Self> {
        let quote = config.total_investment;
        Self::with_position(config, 0.0, quote)
    }

    pub fn with_position(config: GridConfig, base_balance: f64, quote_balance: f64) -> EngineResult<Self> {
        let grid = Grid::build(&config)?;
        let ledger = Ledger::new(base_balance, quote_balance)?;

        info!(
            "🚀 Grid engine ready for {}/{} | base {:.8} | quote {:.2}",
            config.base_asset_id, config.quote_asset_id, base_balance, quote_balance
        );

        Ok(Self {
            config,
            grid,
            detector: CrossingDetector::new(),
            ledger,
            logging: LoggingConfig::default(),
            opening_base: base_balance,
            opening_price: None,
        })
    }

    /// Build from a loaded [`Config`], honouring its ledger and asset sections
    pub fn from_config(config: &Config) -> EngineResult<Self> {
        config.grid.validate_with(&config.assets)?;

        let base = config.ledger.initial_base_balance.unwrap_or(0.0);
        let quote = config
            .ledger
            .initial_quote_balance
            .unwrap_or(config.grid.total_investment);

        let mut engine = Self::with_position(config.grid.clone(), base, quote)?;
        engine.set_logging(config.logging.clone());
        Ok(engine)
    }

    /// Apply the `[logging]` switches for fills and skipped crossings
    pub fn set_logging(&mut self, logging: LoggingConfig) {
        self.ledger
            .set_logging(logging.enable_trade_logging, logging.enable_skip_logging);
        self.logging = logging;
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Process one price observation.
    ///
    /// Out-of-range prices return `OutOfRange` and change nothing. A crossing
    /// the ledger cannot fund is reported as `Observation::Skipped`.
    pub fn on_price_observed(&mut self, new_price: f64) -> EngineResult<Observation> {
        let crossing = self.detector.observe(&self.grid, new_price)?;

        if let Crossing::First { index } = crossing {
            debug!("First observation {:.4} at level {}", new_price, index);
            self.opening_price.get_or_insert(new_price);
        }

        let signal = crossing.signal(&self.grid);
        let result = match signal {
            GridSignal::Buy { grid_index, price, quantity } => {
                self.ledger.try_buy(price, quantity, grid_index).map(|o| o.clone())
            }
            GridSignal::Sell { grid_index, price, quantity } => {
                self.ledger.try_sell(price, quantity, grid_index).map(|o| o.clone())
            }
            GridSignal::None => return Ok(Observation::NoCrossing),
        };

        match result {
            Ok(order) if matches!(crossing, Crossing::First { .. }) => Ok(Observation::Seeded(order)),
            Ok(order) => Ok(Observation::Filled(order)),
            Err(e) if e.is_recoverable() => {
                if self.logging.enable_skip_logging {
                    debug!("⚠️  {:?} at {:.4} not filled: {}", signal.side(), new_price, e);
                }
                Ok(Observation::Skipped(signal))
            }
            Err(e) => Err(e),
        }
    }

    /// Feed a sequence of prices in order. Out-of-range prices are counted
    /// and ignored; any other error stops the replay.
    pub fn replay<I>(&mut self, prices: I) -> EngineResult<ReplaySummary>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut summary = ReplaySummary::default();

        for price in prices {
            summary.observed += 1;
            match self.on_price_observed(price) {
                Ok(Observation::Seeded(_)) | Ok(Observation::Filled(_)) => summary.trades_executed += 1,
                Ok(Observation::Skipped(_)) => summary.skipped += 1,
                Ok(Observation::NoCrossing) => {}
                Err(EngineError::OutOfRange { price, lower, upper }) => {
                    warn!("Ignoring price {:.4} outside grid [{:.4}, {:.4}]", price, lower, upper);
                    summary.out_of_range += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Replayed {} prices, {} trades, {} skipped, {} out of range",
            summary.observed, summary.trades_executed, summary.skipped, summary.out_of_range
        );
        Ok(summary)
    }

    /// FIFO realized and unrealized PnL marked at `current_price`
    pub fn pnl_report(&self, current_price: f64) -> EngineResult<PnlReport> {
        let opening = (self.opening_base > 0.0).then(|| Lot {
            // Before any observation the opening inventory is costed at the mark
            price: self.opening_price.unwrap_or(current_price),
            remaining_quantity: self.opening_base,
        });

        pnl::calculate_from(opening, self.ledger.history(), current_price)
    }

    pub fn profit_and_loss(&self, current_price: f64) -> EngineResult<f64> {
        Ok(self.pnl_report(current_price)?.total)
    }

    pub fn portfolio_value(&self, current_price: f64) -> f64 {
        self.ledger.quote_balance() + self.ledger.base_balance() * current_price
    }

    pub fn position_summary(&self, current_price: f64) -> EngineResult<String> {
        let report = self.pnl_report(current_price)?;
        let position = self.ledger.position();

        Ok(format!(
            "Portfolio: {:.2} | Quote: {:.2} {} | Base: {:.8} {} @ avg {:.4}\n   \
             Unrealized P&L: {:.2} | Realized P&L: {:.2} | Total: {:.2} | Trades: {}",
            self.portfolio_value(current_price),
            position.quote_balance,
            self.config.quote_asset_id,
            position.base_balance,
            self.config.base_asset_id,
            report.average_open_cost,
            report.unrealized,
            report.realized,
            report.total,
            self.ledger.history().len()
        ))
    }

    pub fn index_of(&self, price: f64) -> Option<usize> {
        self.grid.index_of(price)
    }

    pub fn try_index_of(&self, price: f64) -> EngineResult<usize> {
        self.grid.try_index_of(price)
    }

    pub fn grid_levels(&self) -> Vec<GridLevel> {
        self.grid.levels().to_vec()
    }

    pub fn trade_history(&self) -> Vec<ExecutedOrder> {
        self.ledger.history().to_vec()
    }

    pub fn position(&self) -> Position {
        self.ledger.position()
    }

    pub fn last_observed_price(&self) -> Option<f64> {
        self.detector.last_observed_price()
    }

    pub fn trade_count(&self) -> usize {
        self.ledger.history().len()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::OrderSide;

    fn create_test_config() -> GridConfig {
        GridConfig::new(20000.0, 30000.0, 10, 100000.0, "WBTC", "USDC")
    }

    #[test]
    fn test_engine_initialization() {
        let engine = GridEngine::new(create_test_config()).unwrap();

        assert_eq!(engine.grid_levels().len(), 11);
        assert!(engine.trade_history().is_empty());
        assert_eq!(engine.position().base_balance, 0.0);
        assert_eq!(engine.position().quote_balance, 100000.0);
        assert_eq!(engine.last_observed_price(), None);
    }

    #[test]
    fn test_seed_buy_on_lowest_level() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();

        let observation = engine.on_price_observed(20000.0).unwrap();
        let order = match observation {
            Observation::Seeded(order) => order,
            other => panic!("Expected seed, got {:?}", other),
        };
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.grid_index, 0);
        assert!((order.quantity - 0.5).abs() < 1e-12);
        assert!((engine.position().quote_balance - 90000.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_seed_above_lowest_level() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();

        assert_eq!(engine.on_price_observed(25000.0).unwrap(), Observation::NoCrossing);
        assert!(engine.trade_history().is_empty());
    }

    #[test]
    fn test_sell_without_inventory_is_skipped() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();

        engine.on_price_observed(25000.0).unwrap();
        let observation = engine.on_price_observed(26000.0).unwrap();
        assert!(matches!(observation, Observation::Skipped(GridSignal::Sell { grid_index: 6, .. })));
        assert!(engine.trade_history().is_empty());
        assert_eq!(engine.last_observed_price(), Some(26000.0));
    }

    #[test]
    fn test_round_trip_pnl() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();

        engine.on_price_observed(20000.0).unwrap();
        engine.on_price_observed(21000.0).unwrap();

        let pnl = engine.profit_and_loss(21000.0).unwrap();
        assert!((pnl - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_changes_nothing() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();

        engine.on_price_observed(24000.0).unwrap();
        let err = engine.on_price_observed(19000.0).unwrap_err();
        assert!(matches!(err, EngineError::OutOfRange { .. }));
        assert_eq!(engine.last_observed_price(), Some(24000.0));
        assert!(engine.trade_history().is_empty());
    }

    #[test]
    fn test_replay_counts() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();

        let summary = engine
            .replay(vec![25000.0, 24000.0, 35000.0, 24500.0, 26000.0])
            .unwrap();
        assert_eq!(summary.observed, 5);
        assert_eq!(summary.out_of_range, 1);
        assert_eq!(summary.trades_executed, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_opening_inventory_is_costed_at_first_price() {
        let mut engine = GridEngine::with_position(create_test_config(), 1.0, 0.0).unwrap();

        engine.on_price_observed(22000.0).unwrap();
        engine.on_price_observed(23000.0).unwrap();

        let report = engine.pnl_report(23000.0).unwrap();
        assert!((report.total - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_position_summary() {
        let mut engine = GridEngine::new(create_test_config()).unwrap();
        engine.on_price_observed(20000.0).unwrap();

        let summary = engine.position_summary(20000.0).unwrap();
        assert!(summary.contains("USDC"));
        assert!(summary.contains("Trades: 1"));
    }
}
