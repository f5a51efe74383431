// Thread-safe handle for driving one engine from a monitoring loop

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::grid_engine::GridEngine;
use crate::core::pnl::PnlReport;
use crate::core::types::{ExecutedOrder, GridLevel, Observation, Position};
use crate::error::{EngineError, EngineResult};

/// Observations take the write lock; snapshots share the read lock, so a
/// read never interleaves with an in-flight observation.
#[derive(Debug, Clone)]
pub struct SharedGridEngine {
    inner: Arc<RwLock<GridEngine>>,
}

impl SharedGridEngine {
    pub fn new(engine: GridEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, GridEngine>> {
        self.inner
            .read()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, GridEngine>> {
        self.inner
            .write()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    pub fn on_price_observed(&self, price: f64) -> EngineResult<Observation> {
        self.write()?.on_price_observed(price)
    }

    pub fn position(&self) -> EngineResult<Position> {
        Ok(self.read()?.position())
    }

    pub fn trade_history(&self) -> EngineResult<Vec<ExecutedOrder>> {
        Ok(self.read()?.trade_history())
    }

    pub fn grid_levels(&self) -> EngineResult<Vec<GridLevel>> {
        Ok(self.read()?.grid_levels())
    }

    pub fn pnl_report(&self, current_price: f64) -> EngineResult<PnlReport> {
        self.read()?.pnl_report(current_price)
    }

    pub fn profit_and_loss(&self, current_price: f64) -> EngineResult<f64> {
        self.read()?.profit_and_loss(current_price)
    }

    /// Run `f` against a consistent snapshot of the engine
    pub fn with_engine<R>(&self, f: impl FnOnce(&GridEngine) -> R) -> EngineResult<R> {
        let engine = self.read()?;
        Ok(f(&*engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use std::thread;

    #[test]
    fn test_concurrent_readers_see_consistent_ledger() {
        let config = GridConfig::new(100.0, 200.0, 10, 1000.0, "ETH", "DAI");
        let shared = SharedGridEngine::new(GridEngine::new(config).unwrap());

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let price = if i % 2 == 0 { 100.0 } else { 135.0 };
                    shared.on_price_observed(price).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let position = shared.position().unwrap();
                        assert!(position.base_balance >= 0.0);
                        assert!(position.quote_balance >= 0.0);
                        shared.profit_and_loss(120.0).unwrap();
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        let trades = shared.with_engine(|engine| engine.trade_count()).unwrap();
        assert_eq!(shared.trade_history().unwrap().len(), trades);
        assert!(trades > 0);
    }
}
