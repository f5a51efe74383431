// Common test utilities and helpers
#![allow(dead_code)]

use grid_engine::{Config, GridConfig, GridEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// The reference grid: 20000-30000, 10 grids, 100000 invested
pub fn create_test_grid_config() -> GridConfig {
    GridConfig::new(20000.0, 30000.0, 10, 100000.0, "WBTC", "USDC")
}

pub fn create_test_config() -> Config {
    Config {
        grid: create_test_grid_config(),
        ..Config::default()
    }
}

pub fn create_test_engine() -> GridEngine {
    GridEngine::new(create_test_grid_config()).expect("Failed to build engine")
}

/// Temporary directory plus a path inside it
pub fn create_temp_file(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}

/// Seeded random walk clamped to `[lower, upper]`
pub fn generate_price_walk(seed: u64, start: f64, count: usize, step: f64, lower: f64, upper: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = start;

    (0..count)
        .map(|_| {
            price = (price + rng.gen_range(-step..step)).clamp(lower, upper);
            price
        })
        .collect()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {}, got {}",
        expected,
        tolerance,
        actual
    );
}
