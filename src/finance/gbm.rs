//! Geometric Brownian Motion price paths
//!
//! `dS = μS dt + σS dW`, discretised exactly in log space:
//! `S_t = S_{t-1} · exp((μ - σ²/2)·dt + σ·√dt·Z)`.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_count, ensure_finite, ensure_non_negative, ensure_positive, Result};
use crate::monte_carlo::TrialSource;
use crate::rng::RandomStream;

/// GBM parameters (annualised drift and volatility, horizon in years)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    /// Initial price
    pub s0: f64,
    /// Drift
    pub mu: f64,
    /// Volatility
    pub sigma: f64,
    /// Horizon in years
    pub horizon: f64,
}

impl GbmParams {
    pub fn new(s0: f64, mu: f64, sigma: f64, horizon: f64) -> Self {
        Self {
            s0,
            mu,
            sigma,
            horizon,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("s0", self.s0)?;
        ensure_finite("mu", self.mu)?;
        ensure_non_negative("sigma", self.sigma)?;
        ensure_positive("horizon", self.horizon)
    }

    /// One step of length `dt` driven by the standard normal `z`.
    #[inline]
    fn step(&self, price: f64, dt: f64, z: f64) -> f64 {
        price * ((self.mu - 0.5 * self.sigma * self.sigma) * dt + self.sigma * dt.sqrt() * z).exp()
    }

    /// `E[S_T] = S0 · e^{μT}`
    pub fn expected_terminal(&self) -> f64 {
        self.s0 * (self.mu * self.horizon).exp()
    }
}

/// Simulate `n_simulations` paths of `n_steps + 1` prices each (first is `s0`).
///
/// Draws are taken step-major: all paths advance one step before any advances
/// the next.
pub fn geometric_brownian_motion(
    params: &GbmParams,
    n_steps: usize,
    n_simulations: usize,
    rng: &mut RandomStream,
) -> Result<Vec<Vec<f64>>> {
    params.validate()?;
    ensure_count("n_steps", n_steps)?;
    ensure_count("n_simulations", n_simulations)?;

    let dt = params.horizon / n_steps as f64;
    let mut paths: Vec<Vec<f64>> = (0..n_simulations)
        .map(|_| {
            let mut path = Vec::with_capacity(n_steps + 1);
            path.push(params.s0);
            path
        })
        .collect();

    for t in 1..=n_steps {
        for path in paths.iter_mut() {
            let z = rng.standard_normal();
            let next = params.step(path[t - 1], dt, z);
            path.push(next);
        }
    }

    Ok(paths)
}

/// Terminal price of one GBM path, usable as an engine trial source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmTerminal {
    pub params: GbmParams,
    pub n_steps: usize,
}

impl GbmTerminal {
    pub fn new(params: GbmParams, n_steps: usize) -> Result<Self> {
        params.validate()?;
        ensure_count("n_steps", n_steps)?;
        Ok(Self { params, n_steps })
    }
}

impl TrialSource for GbmTerminal {
    fn run_trial(&self, rng: &mut RandomStream) -> f64 {
        let dt = self.params.horizon / self.n_steps as f64;
        (0..self.n_steps).fold(self.params.s0, |price, _| {
            self.params.step(price, dt, rng.standard_normal())
        })
    }
}
