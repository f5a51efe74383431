//! Price feed files for offline replays
//!
//! Accepts one price per line or `timestamp,price` rows where the last column
//! is the price. Rows are read with the `csv` crate, so quoted fields work.
//! Blank lines and `#` comments are ignored. Whether the first row is a
//! header is controlled by [`FeedHeaders`].

use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// How the first row of a feed is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedHeaders {
    /// Header only if every field is a column name (starts with a letter and
    /// is not a number). Anything else is data, so a mistyped first price is
    /// reported instead of dropped.
    #[default]
    Auto,
    Present,
    Absent,
}

impl FeedHeaders {
    fn skips(self, record: &csv::StringRecord) -> bool {
        match self {
            FeedHeaders::Present => true,
            FeedHeaders::Absent => false,
            FeedHeaders::Auto => record.iter().filter(|f| !f.is_empty()).all(is_column_name),
        }
    }
}

impl FromStr for FeedHeaders {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(FeedHeaders::Auto),
            "present" | "yes" => Ok(FeedHeaders::Present),
            "absent" | "no" => Ok(FeedHeaders::Absent),
            other => Err(format!("unknown header mode '{}' (auto, present, absent)", other)),
        }
    }
}

fn is_column_name(field: &str) -> bool {
    field.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') && field.parse::<f64>().is_err()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFeed {
    prices: Vec<f64>,
}

impl PriceFeed {
    pub fn from_prices(prices: Vec<f64>) -> Self {
        Self { prices }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        Self::from_file_with(path, FeedHeaders::Auto)
    }

    pub fn from_file_with<P: AsRef<Path>>(path: P, headers: FeedHeaders) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EngineError::FileNotFound(path.display().to_string()),
            _ => EngineError::FileRead(format!("{}: {}", path.display(), e)),
        })?;

        let feed = Self::parse_with(&content, headers)?;
        debug!("Loaded {} prices from {}", feed.len(), path.display());
        Ok(feed)
    }

    pub fn parse(content: &str) -> EngineResult<Self> {
        Self::parse_with(content, FeedHeaders::Auto)
    }

    pub fn parse_with(content: &str, headers: FeedHeaders) -> EngineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(content.as_bytes());

        let mut prices = Vec::new();
        let mut first_row = true;

        for result in reader.records() {
            let record = result.map_err(feed_error)?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            if std::mem::take(&mut first_row) && headers.skips(&record) {
                debug!("Skipping feed header {:?}", record);
                continue;
            }

            let line = record.position().map_or(0, |p| p.line() as usize);
            let field = record.iter().last().unwrap_or_default();
            let price = field.parse::<f64>().map_err(|e| EngineError::FeedParse {
                line,
                reason: format!("'{}': {}", field, e),
            })?;

            if !price.is_finite() || price <= 0.0 {
                return Err(EngineError::FeedParse {
                    line,
                    reason: format!("price must be positive and finite, got {}", field),
                });
            }
            prices.push(price);
        }

        Ok(Self { prices })
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn first(&self) -> Option<f64> {
        self.prices.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromStr for PriceFeed {
    type Err = EngineError;

    fn from_str(content: &str) -> EngineResult<Self> {
        Self::parse(content)
    }
}

fn feed_error(err: csv::Error) -> EngineError {
    EngineError::FeedParse {
        line: err.position().map_or(0, |p| p.line() as usize),
        reason: err.to_string(),
    }
}
