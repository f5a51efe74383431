//! Progress bar utilities for long replays
//!
//! Visual feedback while a price feed is loaded and replayed, using the
//! indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar for replaying a price feed
pub struct ReplayProgress {
    pub progress: ProgressBar,
}

impl ReplayProgress {
    /// Create a new replay progress bar
    pub fn new(total_prices: usize) -> Self {
        let progress = ProgressBar::new(total_prices as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})\n{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        progress.set_style(style);

        Self { progress }
    }

    /// A bar that draws nothing, for JSON output
    pub fn hidden() -> Self {
        Self {
            progress: ProgressBar::hidden(),
        }
    }

    /// Advance by `observed` prices and show the running trade count
    pub fn advance(&self, observed: usize, trades: usize) {
        self.progress.inc(observed as u64);
        self.progress.set_message(format!("📊 {} trades executed", trades));
    }

    pub fn finish(&self, trades: usize, pnl: f64) {
        self.progress.finish_with_message(format!(
            "✅ Replay complete! {} trades, PnL {:.2}",
            trades, pnl
        ));
    }

    pub fn finish_with_error(&self, error: &str) {
        self.progress.abandon_with_message(format!("❌ Failed: {}", error));
    }
}

/// Spinner for quick operations
pub struct Spinner {
    pub spinner: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(message.to_string());

        Self { spinner }
    }

    pub fn finish(&self, message: &str) {
        self.spinner.finish_with_message(format!("✅ {}", message));
    }

    pub fn finish_with_error(&self, message: &str) {
        self.spinner.finish_with_message(format!("❌ {}", message));
    }
}
