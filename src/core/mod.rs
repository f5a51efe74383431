// Core engine modules

pub mod types;
pub mod grid;
pub mod crossing;
pub mod ledger;
pub mod pnl;
pub mod grid_engine;
pub mod shared;

// Re-export commonly used types
pub use types::{AssetId, ExecutedOrder, GridLevel, GridSignal, Observation, OrderSide, Position};
pub use grid::Grid;
pub use crossing::{Crossing, CrossingDetector};
pub use ledger::Ledger;
pub use pnl::{Lot, PnlReport};
pub use grid_engine::{GridEngine, ReplaySummary};
pub use shared::SharedGridEngine;
