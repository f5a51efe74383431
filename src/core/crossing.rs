// Level-crossing detection between consecutive price observations

use tracing::debug;

use crate::core::grid::Grid;
use crate::core::types::GridSignal;
use crate::error::EngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// No earlier observation exists
    First { index: usize },
    Down { from: usize, to: usize },
    Up { from: usize, to: usize },
    /// Price moved inside the level it was already in
    Within { index: usize },
}

impl Crossing {
    /// Number of levels travelled by this observation
    pub fn levels_crossed(&self) -> usize {
        match *self {
            Crossing::Down { from, to } => from - to,
            Crossing::Up { from, to } => to - from,
            Crossing::First { .. } | Crossing::Within { .. } => 0,
        }
    }

    /// Map the crossing onto an order at the landed level's canonical price.
    /// Multi-level jumps produce a single order for the net direction.
    pub fn signal(&self, grid: &Grid) -> GridSignal {
        match *self {
            // Seed lot when the feed starts on the lowest level
            Crossing::First { index: 0 } => buy_at(grid, 0),
            Crossing::Down { to, .. } => buy_at(grid, to),
            Crossing::Up { to, .. } => match grid.level(to) {
                Some(level) => GridSignal::Sell {
                    grid_index: to,
                    price: level.price,
                    quantity: level.sell_order_size,
                },
                None => GridSignal::None,
            },
            Crossing::First { .. } | Crossing::Within { .. } => GridSignal::None,
        }
    }
}

fn buy_at(grid: &Grid, index: usize) -> GridSignal {
    match grid.level(index) {
        Some(level) => GridSignal::Buy {
            grid_index: index,
            price: level.price,
            quantity: level.buy_order_size,
        },
        None => GridSignal::None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrossingDetector {
    last_observed_price: Option<f64>,
}

impl CrossingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_observed_price(&self) -> Option<f64> {
        self.last_observed_price
    }

    /// Classify `new_price` against the previous observation.
    ///
    /// Out-of-range prices return `OutOfRange` and leave the detector
    /// untouched; any in-range price becomes the new last observation.
    pub fn observe(&mut self, grid: &Grid, new_price: f64) -> EngineResult<Crossing> {
        let curr = grid.try_index_of(new_price)?;

        let crossing = match self.last_observed_price.and_then(|p| grid.index_of(p)) {
            None => Crossing::First { index: curr },
            Some(prev) if curr < prev => Crossing::Down { from: prev, to: curr },
            Some(prev) if curr > prev => Crossing::Up { from: prev, to: curr },
            Some(prev) => Crossing::Within { index: prev },
        };

        if crossing.levels_crossed() > 1 {
            debug!("Jump across {} levels: {:?}", crossing.levels_crossed(), crossing);
        }

        self.last_observed_price = Some(new_price);
        Ok(crossing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::error::EngineError;

    fn create_test_grid() -> Grid {
        Grid::build(&GridConfig::new(20000.0, 30000.0, 10, 100000.0, "WBTC", "USDC")).unwrap()
    }

    #[test]
    fn test_first_observation() {
        let grid = create_test_grid();
        let mut detector = CrossingDetector::new();

        let crossing = detector.observe(&grid, 25500.0).unwrap();
        assert_eq!(crossing, Crossing::First { index: 5 });
        assert_eq!(crossing.signal(&grid), GridSignal::None);
        assert_eq!(detector.last_observed_price(), Some(25500.0));
    }

    #[test]
    fn test_first_observation_on_lowest_level_seeds() {
        let grid = create_test_grid();
        let mut detector = CrossingDetector::new();

        let crossing = detector.observe(&grid, 20500.0).unwrap();
        match crossing.signal(&grid) {
            GridSignal::Buy { grid_index, price, quantity } => {
                assert_eq!(grid_index, 0);
                assert_eq!(price, 20000.0);
                assert!((quantity - 0.5).abs() < 1e-12);
            }
            other => panic!("Expected seed buy, got {:?}", other),
        }
    }

    #[test]
    fn test_down_and_up_crossings() {
        let grid = create_test_grid();
        let mut detector = CrossingDetector::new();

        detector.observe(&grid, 25500.0).unwrap();
        assert_eq!(
            detector.observe(&grid, 24900.0).unwrap(),
            Crossing::Down { from: 5, to: 4 }
        );
        assert_eq!(
            detector.observe(&grid, 26100.0).unwrap(),
            Crossing::Up { from: 4, to: 6 }
        );
        assert_eq!(
            detector.observe(&grid, 26900.0).unwrap(),
            Crossing::Within { index: 6 }
        );
    }

    #[test]
    fn test_jump_fires_single_order_at_landed_level() {
        let grid = create_test_grid();
        let crossing = Crossing::Down { from: 8, to: 3 };

        assert_eq!(crossing.levels_crossed(), 5);
        match crossing.signal(&grid) {
            GridSignal::Buy { grid_index, price, .. } => {
                assert_eq!(grid_index, 3);
                assert_eq!(price, 23000.0);
            }
            other => panic!("Expected buy, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_leaves_state() {
        let grid = create_test_grid();
        let mut detector = CrossingDetector::new();

        detector.observe(&grid, 22000.0).unwrap();
        let err = detector.observe(&grid, 31000.0).unwrap_err();
        assert!(matches!(err, EngineError::OutOfRange { .. }));
        assert_eq!(detector.last_observed_price(), Some(22000.0));
    }
}
