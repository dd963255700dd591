//! Historical wind statistics over a grid

pub mod aggregator;
pub mod pool;
pub mod wind_history;

pub use aggregator::{accumulate_month, profile_factor, WindHistoryAggregator};
pub use pool::{TaskHandle, WaitError, WorkerPool};
pub use wind_history::{speed_class, WindAccumulator, WindHistory, SPEED_CLASSES};
