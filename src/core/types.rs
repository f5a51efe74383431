// Common types used across the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Opaque asset identifier (ticker, mint or token contract address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x` followed by exactly 40 hex digits
    pub fn is_canonical_address(&self) -> bool {
        let Some(hex) = self.0.strip_prefix("0x").or_else(|| self.0.strip_prefix("0X")) else {
            return false;
        };
        hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }

    pub fn validate(&self, field: &str, require_canonical: bool) -> EngineResult<()> {
        if self.0.trim().is_empty() {
            return Err(EngineError::InvalidParameter(
                field.to_string(),
                "must not be empty".to_string(),
            ));
        }
        if require_canonical && !self.is_canonical_address() {
            return Err(EngineError::InvalidParameter(
                field.to_string(),
                format!("'{}' is not a canonical 0x address", self.0),
            ));
        }
        Ok(())
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        AssetId(value.to_string())
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        AssetId(value)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// One evenly spaced price point of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLevel {
    pub index: usize,
    pub price: f64,
    /// Base quantity a full-size buy at this level acquires
    pub buy_order_size: f64,
    /// Base quantity sold when price climbs into this level
    pub sell_order_size: f64,
}

/// Crossing outcome before any balance check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSignal {
    Buy { grid_index: usize, price: f64, quantity: f64 },
    Sell { grid_index: usize, price: f64, quantity: f64 },
    None,
}

impl GridSignal {
    pub fn side(&self) -> Option<OrderSide> {
        match self {
            GridSignal::Buy { .. } => Some(OrderSide::Buy),
            GridSignal::Sell { .. } => Some(OrderSide::Sell),
            GridSignal::None => None,
        }
    }
}

/// Append-only trade history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedOrder {
    pub id: Uuid,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub grid_index: usize,
    /// Display only, never used in calculations
    pub timestamp: DateTime<Utc>,
}

impl ExecutedOrder {
    pub fn new(side: OrderSide, price: f64, quantity: f64, grid_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            price,
            quantity,
            grid_index,
            timestamp: Utc::now(),
        }
    }

    /// Quote value of the order
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub base_balance: f64,
    pub quote_balance: f64,
}

/// What a single price observation did to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// First observation landed on the lowest level and bought the seed lot
    Seeded(ExecutedOrder),
    Filled(ExecutedOrder),
    /// A crossing fired but the ledger could not fund it
    Skipped(GridSignal),
    NoCrossing,
}

impl Observation {
    pub fn executed(&self) -> Option<&ExecutedOrder> {
        match self {
            Observation::Seeded(order) | Observation::Filled(order) => Some(order),
            _ => None,
        }
    }
}
