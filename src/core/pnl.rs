//! FIFO cost-basis profit and loss
//!
//! PnL is recomputed from the full trade history on every call rather than
//! maintained incrementally. Buys open lots at the back of a queue, sells
//! consume lots from the front, and whatever remains open is marked at the
//! supplied price against its average cost.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::types::{ExecutedOrder, OrderSide};
use crate::error::{EngineError, EngineResult};

/// Lots below this are treated as fully consumed
const LOT_EPSILON: f64 = 1e-12;

/// Unmatched sell remainder tolerated, relative to the sell quantity
const SELL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lot {
    pub price: f64,
    pub remaining_quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlReport {
    pub realized: f64,
    pub unrealized: f64,
    pub open_quantity: f64,
    pub average_open_cost: f64,
    pub total: f64,
}

/// Replay `history` in order and split PnL into realized and unrealized parts
pub fn calculate(history: &[ExecutedOrder], current_price: f64) -> EngineResult<PnlReport> {
    calculate_from(None, history, current_price)
}

/// Like [`calculate`], with inventory held before the first trade queued
/// ahead of every bought lot
pub fn calculate_from(
    opening: Option<Lot>,
    history: &[ExecutedOrder],
    current_price: f64,
) -> EngineResult<PnlReport> {
    if !current_price.is_finite() {
        return Err(EngineError::InvalidParameter(
            "current_price".to_string(),
            format!("must be finite, got {}", current_price),
        ));
    }

    let (open_lots, realized) = replay_lots(opening, history)?;

    let open_quantity: f64 = open_lots.iter().map(|lot| lot.remaining_quantity).sum();
    let open_cost: f64 = open_lots
        .iter()
        .map(|lot| lot.price * lot.remaining_quantity)
        .sum();

    let average_open_cost = if open_quantity > 0.0 {
        open_cost / open_quantity
    } else {
        0.0
    };
    let unrealized = open_quantity * (current_price - average_open_cost);

    Ok(PnlReport {
        realized,
        unrealized,
        open_quantity,
        average_open_cost,
        total: realized + unrealized,
    })
}

/// Match sells against buy lots first-in first-out.
///
/// Returns the lots still open and the realized PnL. Selling more than was
/// ever bought is a `LedgerInvariant` error.
pub fn replay_lots(
    opening: Option<Lot>,
    history: &[ExecutedOrder],
) -> EngineResult<(VecDeque<Lot>, f64)> {
    let mut lots: VecDeque<Lot> = opening
        .filter(|lot| lot.remaining_quantity > LOT_EPSILON)
        .into_iter()
        .collect();
    let mut realized = 0.0;

    for order in history {
        match order.side {
            OrderSide::Buy => lots.push_back(Lot {
                price: order.price,
                remaining_quantity: order.quantity,
            }),
            OrderSide::Sell => {
                let mut remaining = order.quantity;
                let tolerance = order.quantity * SELL_TOLERANCE;

                while remaining > tolerance {
                    let Some(front) = lots.front_mut() else {
                        return Err(EngineError::LedgerInvariant(format!(
                            "sell {} at {:.4} exceeds open lots by {:.12}",
                            order.id, order.price, remaining
                        )));
                    };

                    let used = remaining.min(front.remaining_quantity);
                    realized += (order.price - front.price) * used;
                    remaining -= used;
                    front.remaining_quantity -= used;

                    if front.remaining_quantity <= LOT_EPSILON {
                        lots.pop_front();
                    }
                }
            }
        }
    }

    Ok((lots, realized))
}
