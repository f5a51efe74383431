// Grid construction and price-to-level mapping

use tracing::{debug, info};

use crate::config::GridConfig;
use crate::core::types::GridLevel;
use crate::error::{EngineError, EngineResult};

/// Prices within this many steps below a level still map onto that level,
/// so every canonical level price maps onto its own index despite rounding.
const INDEX_EPSILON: f64 = 1e-9;

/// Evenly spaced levels between the configured bounds, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lower_price: f64,
    upper_price: f64,
    step: f64,
    levels: Vec<GridLevel>,
}

impl Grid {
    /// Build `grid_count + 1` levels from `lower_price` to `upper_price`
    pub fn build(config: &GridConfig) -> EngineResult<Self> {
        config.validate()?;

        let step = config.step();
        let notional = config.notional_per_grid();

        let prices: Vec<f64> = (0..=config.grid_count)
            .map(|i| {
                // Pin the last level to the exact bound instead of lower + n * step
                if i == config.grid_count {
                    config.upper_price
                } else {
                    config.lower_price + i as f64 * step
                }
            })
            .collect();

        let levels = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let buy_order_size = notional / price;
                // A sell carries the lot bought one level below
                let sell_order_size = if i == 0 {
                    buy_order_size
                } else {
                    notional / prices[i - 1]
                };
                GridLevel {
                    index: i,
                    price,
                    buy_order_size,
                    sell_order_size,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "🎯 Grid built: {} levels from {:.4} to {:.4} (step {:.4}, {:.2} {} per grid)",
            levels.len(),
            config.lower_price,
            config.upper_price,
            step,
            notional,
            config.quote_asset_id
        );

        Ok(Self {
            lower_price: config.lower_price,
            upper_price: config.upper_price,
            step,
            levels,
        })
    }

    /// Grid index of `price`, or `None` outside `[lower_price, upper_price]`
    pub fn index_of(&self, price: f64) -> Option<usize> {
        if !price.is_finite() || price < self.lower_price || price > self.upper_price {
            return None;
        }

        let raw = ((price - self.lower_price) / self.step + INDEX_EPSILON).floor();
        let index = (raw.max(0.0) as usize).min(self.grid_count());
        Some(index)
    }

    /// Same as [`Grid::index_of`] but reports the bounds on failure
    pub fn try_index_of(&self, price: f64) -> EngineResult<usize> {
        self.index_of(price).ok_or_else(|| {
            debug!("Price {} outside grid", price);
            EngineError::OutOfRange {
                price,
                lower: self.lower_price,
                upper: self.upper_price,
            }
        })
    }

    pub fn level(&self, index: usize) -> Option<&GridLevel> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    pub fn grid_count(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn lower_price(&self) -> f64 {
        self.lower_price
    }

    pub fn upper_price(&self) -> f64 {
        self.upper_price
    }
}
