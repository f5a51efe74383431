// Replay and grid inspection commands
use serde::Serialize;
use tracing::{error, info, warn};
use grid_engine::{
    Config, EngineError, EngineResult, ExecutedOrder, FeedHeaders, GridEngine, PnlReport, Position,
    PreFlightValidator, PriceFeed, ReplayProgress, ReplaySummary, Spinner,
};

/// Prices fed to the engine between progress bar updates
const REPLAY_CHUNK: usize = 1000;

#[derive(Debug, Serialize)]
struct ReplayReport {
    summary: ReplaySummary,
    mark_price: f64,
    position: Position,
    pnl: PnlReport,
    trades: Vec<ExecutedOrder>,
}

pub fn show_levels(config: &Config) -> EngineResult<()> {
    let engine = GridEngine::from_config(config)?;
    let grid = &config.grid;

    info!(
        "🎯 {}/{} grid: {} levels, step {:.4}",
        grid.base_asset_id,
        grid.quote_asset_id,
        grid.grid_count + 1,
        grid.step()
    );
    for level in engine.grid_levels() {
        info!(
            "   [{:>3}] {:>14.4}  buy {:.8}  sell {:.8}",
            level.index, level.price, level.buy_order_size, level.sell_order_size
        );
    }
    Ok(())
}

pub fn show_index(config: &Config, price: f64) -> EngineResult<()> {
    let engine = GridEngine::from_config(config)?;
    match engine.index_of(price) {
        Some(index) => info!("📍 Price {} is on level {}", price, index),
        None => warn!(
            "⚠️  Price {} is outside [{}, {}]",
            price, config.grid.lower_price, config.grid.upper_price
        ),
    }
    Ok(())
}

pub fn run_replay(
    config: &Config,
    feed_path: &str,
    headers: FeedHeaders,
    json: bool,
    mark: Option<f64>,
) -> EngineResult<()> {
    let spinner = Spinner::new(&format!("Loading price feed {}...", feed_path));
    let feed = match PriceFeed::from_file_with(feed_path, headers) {
        Ok(feed) => {
            spinner.finish(&format!("Loaded {} prices", feed.len()));
            feed
        }
        Err(e) => {
            spinner.finish_with_error(&e.to_string());
            return Err(e);
        }
    };

    let validation = PreFlightValidator::new(config.clone()).validate_for_replay(&feed);
    if !json || !validation.passed {
        validation.display();
    }
    if !validation.passed {
        return Err(EngineError::InvalidConfig("pre-flight validation failed".to_string()));
    }

    let mut engine = GridEngine::from_config(config)?;
    let progress = if json {
        ReplayProgress::hidden()
    } else {
        ReplayProgress::new(feed.len())
    };

    let mut summary = ReplaySummary::default();
    for chunk in feed.prices().chunks(REPLAY_CHUNK) {
        match engine.replay(chunk.iter().copied()) {
            Ok(part) => summary.merge(part),
            Err(e) => {
                progress.finish_with_error(&e.to_string());
                return Err(e);
            }
        }
        progress.advance(chunk.len(), summary.trades_executed);
    }

    let mark_price = mark
        .or_else(|| engine.last_observed_price())
        .or_else(|| feed.last())
        .unwrap_or(config.grid.lower_price);
    let pnl = engine.pnl_report(mark_price)?;
    progress.finish(summary.trades_executed, pnl.total);

    if json {
        let report = ReplayReport {
            summary,
            mark_price,
            position: engine.position(),
            pnl,
            trades: engine.trade_history(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if config.logging.enable_trade_logging {
        info!("📜 Trade history");
        for order in engine.trade_history() {
            info!(
                "   {} {} {:.8} @ {:.4} (level {})",
                order.timestamp.format("%H:%M:%S%.3f"),
                order.side,
                order.quantity,
                order.price,
                order.grid_index
            );
        }
    }

    if summary.out_of_range > 0 {
        warn!("⚠️  {} prices were outside the grid and ignored", summary.out_of_range);
    }
    if summary.skipped > 0 {
        info!("⏸️  {} crossings skipped for lack of balance", summary.skipped);
    }

    match engine.position_summary(mark_price) {
        Ok(line) => info!("💰 {}", line),
        Err(e) => error!("❌ {}", e),
    }
    info!(
        "📈 PnL at {:.4}: realized {:.2} + unrealized {:.2} = {:.2}",
        mark_price, pnl.realized, pnl.unrealized, pnl.total
    );
    Ok(())
}
