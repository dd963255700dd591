//! Weather stations, their wind series and the provider boundary

pub mod inventory;
pub mod provider;
pub mod state;
pub mod station;

pub use inventory::StationInventory;
pub use provider::{InMemoryArchive, StationDataProvider};
pub use state::{MonthBatch, StationState};
pub use station::{days_in_month, hours_in_month, MonthSeries, Station, KMH_TO_MS};
