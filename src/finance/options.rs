//! European option pricing by simulation of the terminal price

use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;
use std::str::FromStr;

use super::standard_normal_dist;
use crate::error::{
    ensure_count, ensure_finite, ensure_non_negative, ensure_positive, Result, SimulationError,
};
use crate::rng::RandomStream;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    #[inline]
    pub fn payoff(&self, terminal: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (terminal - strike).max(0.0),
            Self::Put => (strike - terminal).max(0.0),
        }
    }
}

impl FromStr for OptionType {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => Err(SimulationError::invalid_argument(format!(
                "unknown option type '{other}' (expected call or put)"
            ))),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// European option contract and market inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuropeanOption {
    pub option_type: OptionType,
    /// Current underlying price
    pub spot: f64,
    pub strike: f64,
    /// Risk-free rate (annualised, continuous)
    pub rate: f64,
    /// Volatility (annualised)
    pub sigma: f64,
    /// Time to expiry in years
    pub expiry: f64,
}

impl EuropeanOption {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("strike", self.strike)?;
        ensure_finite("rate", self.rate)?;
        ensure_non_negative("sigma", self.sigma)?;
        ensure_non_negative("expiry", self.expiry)
    }

    fn discount(&self) -> f64 {
        (-self.rate * self.expiry).exp()
    }
}

/// Simulated price with its Monte Carlo standard error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionPrice {
    pub price: f64,
    pub standard_error: f64,
}

impl OptionPrice {
    /// `price ± z·standard_error` (1.96 for a 95% band)
    pub fn interval(&self, z: f64) -> (f64, f64) {
        (
            self.price - z * self.standard_error,
            self.price + z * self.standard_error,
        )
    }
}

/// Price under risk-neutral GBM from `n_simulations` terminal draws.
pub fn monte_carlo_option_price(
    option: &EuropeanOption,
    n_simulations: usize,
    rng: &mut RandomStream,
) -> Result<OptionPrice> {
    option.validate()?;
    ensure_count("n_simulations", n_simulations)?;

    let drift = (option.rate - 0.5 * option.sigma * option.sigma) * option.expiry;
    let diffusion = option.sigma * option.expiry.sqrt();

    let payoffs: Vec<f64> = (0..n_simulations)
        .map(|_| {
            let terminal = option.spot * (drift + diffusion * rng.standard_normal()).exp();
            option.option_type.payoff(terminal, option.strike)
        })
        .collect();

    let discount = option.discount();
    Ok(OptionPrice {
        price: discount * stats::mean(&payoffs),
        standard_error: discount * stats::population_std(&payoffs) / (n_simulations as f64).sqrt(),
    })
}

/// Closed-form Black-Scholes price (no dividends).
pub fn black_scholes_price(option: &EuropeanOption) -> Result<f64> {
    option.validate()?;
    let EuropeanOption {
        option_type,
        spot,
        strike,
        rate,
        sigma,
        expiry,
    } = *option;

    let vol_sqrt_t = sigma * expiry.sqrt();
    if vol_sqrt_t == 0.0 {
        // deterministic forward
        let forward = spot * (rate * expiry).exp();
        return Ok(option.discount() * option_type.payoff(forward, strike));
    }

    let normal = standard_normal_dist()?;
    let d1 = ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * expiry) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;
    let discounted_strike = strike * option.discount();

    Ok(match option_type {
        OptionType::Call => spot * normal.cdf(d1) - discounted_strike * normal.cdf(d2),
        OptionType::Put => discounted_strike * normal.cdf(-d2) - spot * normal.cdf(-d1),
    })
}
