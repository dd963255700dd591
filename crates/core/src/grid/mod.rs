//! Study-area grid modules

pub mod geo;
pub mod lat_lon_grid;

// Re-export main types
pub use geo::*;
pub use lat_lon_grid::*;
