// Grid Trading Simulation Engine
//
// Builds an evenly spaced price grid, fires virtual buy/sell orders on level
// crossings and reports FIFO cost-basis profit and loss

pub mod core;
pub mod config;
pub mod error;       // Unified error handling
pub mod feed;        // Price feed files
pub mod validation;  // Pre-flight validation
pub mod progress;

// Re-export core engine types
pub use core::{
    AssetId, Crossing, CrossingDetector, ExecutedOrder, Grid, GridEngine, GridLevel, GridSignal,
    Ledger, Lot, Observation, OrderSide, PnlReport, Position, ReplaySummary, SharedGridEngine,
};

// Re-export error types
pub use error::{EngineError, EngineResult};

// Re-export configuration
pub use config::{AssetPolicy, Config, ConfigError, GridConfig, LedgerConfig, LoggingConfig};

pub use feed::{FeedHeaders, PriceFeed};

// Re-export validation types
pub use validation::{PreFlightValidator, ValidationCheck, ValidationLevel, ValidationResult};

pub use progress::{ReplayProgress, Spinner};
