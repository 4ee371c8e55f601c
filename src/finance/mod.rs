//! Financial applications of the sampling primitive
//!
//! - GBM price paths and terminal-price trial source
//! - European option pricing (simulated and closed form)
//! - Value at Risk (historical, parametric, simulated)

pub mod gbm;
pub mod options;
pub mod var;

pub use gbm::{geometric_brownian_motion, GbmParams, GbmTerminal};
pub use options::{black_scholes_price, monte_carlo_option_price, EuropeanOption, OptionPrice, OptionType};
pub use var::{calculate_var, monte_carlo_var, VarMethod, VarParams};

use statrs::distribution::Normal;

use crate::error::{Result, SimulationError};

/// N(0, 1) for CDF and quantile lookups.
pub(crate) fn standard_normal_dist() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| SimulationError::invalid_argument(e.to_string()))
}
