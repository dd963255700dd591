//! Weibull estimation of the wind-speed distribution per cell

pub mod factors;
pub mod fit;
pub mod gamma;
pub mod sampling;

pub use crate::config::FitMethod;
pub use factors::{fit_history, WeibullFactors};
pub use fit::{bin_center, fit_mle, fit_moments, WeibullFit, MAX_SHAPE};
pub use gamma::gamma;
pub use sampling::{bin_speeds, sample_weibull};
