// Balance ledger and append-only trade history

use tracing::{debug, info};

use crate::core::types::{ExecutedOrder, OrderSide, Position};
use crate::error::{EngineError, EngineResult};

/// Rounding slack allowed when a fill spends the last of a balance
const BALANCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Ledger {
    base_balance: f64,
    quote_balance: f64,
    history: Vec<ExecutedOrder>,
    log_trades: bool,
    log_skips: bool,
}

impl Ledger {
    pub fn new(base_balance: f64, quote_balance: f64) -> EngineResult<Self> {
        for (name, value) in [("base_balance", base_balance), ("quote_balance", quote_balance)] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidParameter(
                    name.to_string(),
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }

        Ok(Self {
            base_balance,
            quote_balance,
            history: Vec::new(),
            log_trades: true,
            log_skips: true,
        })
    }

    /// Toggle per-fill `info!` lines and skipped-fill `debug!` lines
    pub fn set_logging(&mut self, trades: bool, skips: bool) {
        self.log_trades = trades;
        self.log_skips = skips;
    }

    pub fn logs_skips(&self) -> bool {
        self.log_skips
    }

    /// Spend quote for base. Returns `false` without side effects when the
    /// quote balance cannot cover the cost.
    pub fn buy(&mut self, price: f64, quantity: f64, grid_index: usize) -> bool {
        match self.try_buy(price, quantity, grid_index) {
            Ok(_) => true,
            Err(e) => {
                if self.log_skips {
                    debug!("⏸️  Buy skipped at level {}: {}", grid_index, e);
                }
                false
            }
        }
    }

    /// Spend base for quote. Returns `false` without side effects when the
    /// base balance cannot cover the quantity.
    pub fn sell(&mut self, price: f64, quantity: f64, grid_index: usize) -> bool {
        match self.try_sell(price, quantity, grid_index) {
            Ok(_) => true,
            Err(e) => {
                if self.log_skips {
                    debug!("⏸️  Sell skipped at level {}: {}", grid_index, e);
                }
                false
            }
        }
    }

    pub fn try_buy(&mut self, price: f64, quantity: f64, grid_index: usize) -> EngineResult<&ExecutedOrder> {
        check_order("buy", price, quantity)?;

        let cost = price * quantity;
        if self.quote_balance + BALANCE_EPSILON < cost {
            return Err(EngineError::InsufficientQuote {
                required: cost,
                available: self.quote_balance,
            });
        }

        self.quote_balance = (self.quote_balance - cost).max(0.0);
        self.base_balance += quantity;

        if self.log_trades {
            info!(
                "🟢 BUY {:.8} @ {:.4} (level {}) | base {:.8} | quote {:.2}",
                quantity, price, grid_index, self.base_balance, self.quote_balance
            );
        }
        Ok(self.record(OrderSide::Buy, price, quantity, grid_index))
    }

    pub fn try_sell(&mut self, price: f64, quantity: f64, grid_index: usize) -> EngineResult<&ExecutedOrder> {
        check_order("sell", price, quantity)?;

        if self.base_balance <= 0.0 || self.base_balance + BALANCE_EPSILON < quantity {
            return Err(EngineError::InsufficientBase {
                required: quantity,
                available: self.base_balance,
            });
        }

        // Never record more than is held
        let quantity = quantity.min(self.base_balance);
        self.base_balance -= quantity;
        self.quote_balance += price * quantity;

        if self.log_trades {
            info!(
                "🔴 SELL {:.8} @ {:.4} (level {}) | base {:.8} | quote {:.2}",
                quantity, price, grid_index, self.base_balance, self.quote_balance
            );
        }
        Ok(self.record(OrderSide::Sell, price, quantity, grid_index))
    }

    fn record(&mut self, side: OrderSide, price: f64, quantity: f64, grid_index: usize) -> &ExecutedOrder {
        let mut order = ExecutedOrder::new(side, price, quantity, grid_index);
        // Wall clock can step back; history timestamps never do
        if let Some(previous) = self.history.last() {
            order.timestamp = order.timestamp.max(previous.timestamp);
        }

        let index = self.history.len();
        self.history.push(order);
        &self.history[index]
    }

    pub fn position(&self) -> Position {
        Position {
            base_balance: self.base_balance,
            quote_balance: self.quote_balance,
        }
    }

    pub fn history(&self) -> &[ExecutedOrder] {
        &self.history
    }

    pub fn base_balance(&self) -> f64 {
        self.base_balance
    }

    pub fn quote_balance(&self) -> f64 {
        self.quote_balance
    }
}

fn check_order(side: &str, price: f64, quantity: f64) -> EngineResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(EngineError::InvalidParameter(
            format!("{}_price", side),
            format!("must be positive, got {}", price),
        ));
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(EngineError::InvalidParameter(
            format!("{}_quantity", side),
            format!("must be positive, got {}", quantity),
        ));
    }
    Ok(())
}
