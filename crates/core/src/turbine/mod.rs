//! Turbine power model and farm-level aggregation

pub mod wind_farm;
pub mod windmill;

pub use wind_farm::WindFarm;
pub use windmill::{air_density, Windmill, BETZ_LIMIT, DRIVETRAIN_EFFICIENCY};
