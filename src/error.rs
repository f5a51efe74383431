//! Unified error handling for the grid simulation engine
//!
//! Every fallible operation in the crate returns `EngineResult<T>`. Errors are
//! surfaced directly to the caller; nothing inside the engine retries.

use std::fmt;
use std::io;

/// Main error type for the grid engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    // Construction errors
    InvalidConfig(String),
    InvalidParameter(String, String), // (parameter_name, reason)

    // Observation errors
    OutOfRange { price: f64, lower: f64, upper: f64 },

    // Ledger errors
    InsufficientQuote { required: f64, available: f64 },
    InsufficientBase { required: f64, available: f64 },
    LedgerInvariant(String),

    // IO errors
    FileNotFound(String),
    FileRead(String),
    FileWrite(String),
    FeedParse { line: usize, reason: String },
    ConfigParse(String),

    // Shared access
    LockPoisoned(String),

    Internal(String),
}

impl EngineError {
    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            EngineError::InvalidConfig(msg) => {
                format!(
                    "Invalid grid configuration: {}\n\n\
                    💡 Check grid.toml for:\n\
                    - upper_price greater than lower_price\n\
                    - grid_count of at least 2\n\
                    - positive total_investment",
                    msg
                )
            }
            EngineError::OutOfRange { price, lower, upper } => {
                format!(
                    "Price {:.4} is outside the grid [{:.4}, {:.4}]\n\n\
                    💡 Either:\n\
                    - Ignore the observation\n\
                    - Widen the grid bounds",
                    price, lower, upper
                )
            }
            EngineError::FeedParse { line, reason } => {
                format!(
                    "Could not parse price feed at line {}: {}\n\n\
                    💡 Expected one price per line or `timestamp,price` rows",
                    line, reason
                )
            }
            EngineError::FileNotFound(path) => {
                format!(
                    "File not found: {}\n\n\
                    💡 Run: grid-sim init",
                    path
                )
            }
            _ => self.to_string(),
        }
    }

    /// Recoverable errors leave the engine usable and its state untouched
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::OutOfRange { .. }
                | EngineError::InsufficientQuote { .. }
                | EngineError::InsufficientBase { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::InvalidConfig(_)
            | EngineError::InvalidParameter(_, _)
            | EngineError::ConfigParse(_) => "config",

            EngineError::OutOfRange { .. } => "observation",

            EngineError::InsufficientQuote { .. }
            | EngineError::InsufficientBase { .. }
            | EngineError::LedgerInvariant(_) => "ledger",

            EngineError::FileNotFound(_)
            | EngineError::FileRead(_)
            | EngineError::FileWrite(_)
            | EngineError::FeedParse { .. } => "io",

            EngineError::LockPoisoned(_) | EngineError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfig(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            EngineError::InvalidParameter(param, reason) => {
                write!(f, "Invalid parameter '{}': {}", param, reason)
            }
            EngineError::OutOfRange { price, lower, upper } => {
                write!(
                    f,
                    "Price {} out of grid range [{}, {}]",
                    price, lower, upper
                )
            }
            EngineError::InsufficientQuote { required, available } => {
                write!(
                    f,
                    "Insufficient quote balance: required {:.8}, available {:.8}",
                    required, available
                )
            }
            EngineError::InsufficientBase { required, available } => {
                write!(
                    f,
                    "Insufficient base balance: required {:.8}, available {:.8}",
                    required, available
                )
            }
            EngineError::LedgerInvariant(msg) => {
                write!(f, "Ledger invariant violated: {}", msg)
            }
            EngineError::FileNotFound(path) => {
                write!(f, "File not found: {}", path)
            }
            EngineError::FileRead(msg) => {
                write!(f, "File read error: {}", msg)
            }
            EngineError::FileWrite(msg) => {
                write!(f, "File write error: {}", msg)
            }
            EngineError::FeedParse { line, reason } => {
                write!(f, "Price feed parse error at line {}: {}", line, reason)
            }
            EngineError::ConfigParse(msg) => {
                write!(f, "Configuration parse error: {}", msg)
            }
            EngineError::LockPoisoned(msg) => {
                write!(f, "Engine lock poisoned: {}", msg)
            }
            EngineError::Internal(msg) => {
                write!(f, "Internal error: {}", msg)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => EngineError::FileNotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => EngineError::FileRead(err.to_string()),
            _ => EngineError::Internal(format!("IO error: {}", err)),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigParse(format!("TOML parse error: {}", err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Internal(format!("JSON error: {}", err))
    }
}

impl From<crate::config::ConfigError> for EngineError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::FileNotFound(path) => EngineError::FileNotFound(path),
            ConfigError::FileRead(msg) => EngineError::FileRead(msg),
            ConfigError::FileWrite(msg) => EngineError::FileWrite(msg),
            ConfigError::Parse(msg) | ConfigError::Serialize(msg) => EngineError::ConfigParse(msg),
            ConfigError::Validation(msg) => EngineError::InvalidConfig(msg),
        }
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;
