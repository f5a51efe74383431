// End-to-end tests: feed files, pre-flight validation, replay and shared access

mod common;

use common::{assert_close, create_temp_file, create_test_config, create_test_engine, generate_price_walk};
use grid_engine::{
    EngineError, GridEngine, OrderSide, PreFlightValidator, PriceFeed, SharedGridEngine,
};
use std::fs;
use std::thread;

#[test]
fn test_replay_from_csv_feed() {
    let (_dir, path) = create_temp_file("prices.csv");
    fs::write(
        &path,
        "timestamp,price\n\
         2024-05-01T00:00:00Z,20000\n\
         2024-05-01T00:01:00Z,20650\n\
         2024-05-01T00:02:00Z,21000\n\
         2024-05-01T00:03:00Z,31000\n\
         2024-05-01T00:04:00Z,20000\n",
    )
    .unwrap();

    let feed = PriceFeed::from_file(&path).unwrap();
    assert_eq!(feed.len(), 5);

    let config = create_test_config();
    let validation = PreFlightValidator::new(config.clone()).validate_for_replay(&feed);
    assert!(validation.passed);

    let mut engine = GridEngine::from_config(&config).unwrap();
    let summary = engine.replay(feed.prices().iter().copied()).unwrap();

    assert_eq!(summary.observed, 5);
    assert_eq!(summary.out_of_range, 1);
    assert_eq!(summary.trades_executed, 3);
    assert_close(engine.profit_and_loss(20000.0).unwrap(), 500.0, 1e-6);
}

#[test]
fn test_missing_feed_file() {
    let (_dir, path) = create_temp_file("missing.csv");
    assert!(matches!(PriceFeed::from_file(&path), Err(EngineError::FileNotFound(_))));
}

#[test]
fn test_chunked_replay_matches_single_pass() {
    let prices = generate_price_walk(42, 25000.0, 2500, 800.0, 19000.0, 31000.0);

    let mut whole = create_test_engine();
    let whole_summary = whole.replay(prices.iter().copied()).unwrap();

    let mut chunked = create_test_engine();
    let mut chunked_summary = grid_engine::ReplaySummary::default();
    for chunk in prices.chunks(333) {
        chunked_summary.merge(chunked.replay(chunk.iter().copied()).unwrap());
    }

    assert_eq!(whole_summary, chunked_summary);
    assert_eq!(whole.position(), chunked.position());
    assert_eq!(
        whole.profit_and_loss(25000.0).unwrap(),
        chunked.profit_and_loss(25000.0).unwrap()
    );
}

#[test]
fn test_history_alternates_within_single_level_band() {
    let mut engine = create_test_engine();

    // Bounce across the 23000 level only
    let mut prices = vec![22500.0];
    for _ in 0..10 {
        prices.push(23500.0);
        prices.push(22500.0);
    }
    engine.replay(prices).unwrap();

    let history = engine.trade_history();
    assert!(!history.is_empty());
    for pair in history.windows(2) {
        assert_ne!(pair[0].side, pair[1].side);
    }
    // Opens mid-band with no inventory, so the first upward crossing is skipped
    assert_eq!(history[0].side, OrderSide::Buy);
}

#[test]
fn test_shared_engine_serializes_writers() {
    let shared = SharedGridEngine::new(create_test_engine());

    let writers: Vec<_> = (0..3)
        .map(|seed| {
            let shared = shared.clone();
            thread::spawn(move || {
                for price in generate_price_walk(seed, 25000.0, 300, 1500.0, 20000.0, 30000.0) {
                    shared.on_price_observed(price).unwrap();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    let mark = 25000.0;
    let pnl = shared.profit_and_loss(mark).unwrap();
    let value = shared.with_engine(|engine| engine.portfolio_value(mark)).unwrap();
    assert_close(pnl, value - 100000.0, 1e-6);
    assert_eq!(shared.grid_levels().unwrap().len(), 11);
}
