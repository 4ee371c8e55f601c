//! Value at Risk
//!
//! All estimators return VaR in currency units; a positive number is a
//! potential loss.

use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;
use std::str::FromStr;

use super::standard_normal_dist;
use crate::error::{
    ensure_count, ensure_finite, ensure_non_negative, ensure_open_unit, ensure_positive, Result,
    SimulationError,
};
use crate::rng::RandomStream;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarMethod {
    /// Empirical percentile of observed returns
    Historical,
    /// Normal approximation from the mean and standard deviation of returns
    Parametric,
}

impl FromStr for VarMethod {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical" => Ok(Self::Historical),
            "parametric" => Ok(Self::Parametric),
            other => Err(SimulationError::invalid_argument(format!(
                "unknown VaR method '{other}' (expected historical or parametric)"
            ))),
        }
    }
}

/// VaR from a series of periodic returns.
pub fn calculate_var(
    returns: &[f64],
    confidence_level: f64,
    investment: f64,
    method: VarMethod,
) -> Result<f64> {
    if returns.is_empty() {
        return Err(SimulationError::EmptySamples);
    }
    if let Some((trial, &value)) = returns.iter().enumerate().find(|(_, r)| !r.is_finite()) {
        return Err(SimulationError::NonFiniteOutcome { trial, value });
    }
    ensure_open_unit("confidence_level", confidence_level)?;
    ensure_positive("investment", investment)?;

    let tail = 1.0 - confidence_level;
    let var_pct = match method {
        VarMethod::Historical => stats::percentile(&stats::sorted_copy(returns), tail),
        VarMethod::Parametric => {
            let mu = stats::mean(returns);
            let sigma = stats::population_std(returns);
            mu + sigma * standard_normal_dist()?.inverse_cdf(tail)
        }
    };

    Ok(-var_pct * investment)
}

/// Normal return model for simulated VaR
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarParams {
    /// Expected daily return
    pub mu: f64,
    /// Daily volatility
    pub sigma: f64,
    pub investment: f64,
    pub horizon_days: usize,
    pub confidence_level: f64,
}

impl VarParams {
    /// 10,000 invested, 1-day horizon, 95% confidence
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self {
            mu,
            sigma,
            investment: 10_000.0,
            horizon_days: 1,
            confidence_level: 0.95,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("mu", self.mu)?;
        ensure_non_negative("sigma", self.sigma)?;
        ensure_positive("investment", self.investment)?;
        ensure_count("horizon_days", self.horizon_days)?;
        ensure_open_unit("confidence_level", self.confidence_level)
    }
}

/// VaR from `n_simulations` horizon returns drawn from `N(μ·h, σ·√h)`.
pub fn monte_carlo_var(params: &VarParams, n_simulations: usize, rng: &mut RandomStream) -> Result<f64> {
    params.validate()?;
    ensure_count("n_simulations", n_simulations)?;

    let h = params.horizon_days as f64;
    let dist = Normal::new(params.mu * h, params.sigma * h.sqrt())
        .map_err(|e| SimulationError::invalid_argument(e.to_string()))?;

    let mut values: Vec<f64> = (0..n_simulations)
        .map(|_| params.investment * (1.0 + dist.sample(&mut *rng)))
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));

    Ok(params.investment - stats::percentile(&values, 1.0 - params.confidence_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_var() {
        // returns -0.10, -0.09, ..., 0.09
        let returns: Vec<f64> = (0..20).map(|i| (i as f64 - 10.0) / 100.0).collect();
        let var = calculate_var(&returns, 0.95, 10_000.0, VarMethod::Historical).unwrap();
        // 5th percentile at position 0.95 → -0.10 + 0.95 * 0.01
        assert!((var - 905.0).abs() < 1e-6);
    }

    #[test]
    fn test_parametric_var() {
        let returns = [-0.02, 0.0, 0.02, 0.0];
        let sigma = stats::population_std(&returns);
        let var = calculate_var(&returns, 0.95, 1_000.0, VarMethod::Parametric).unwrap();
        let expected = 1.6448536269514722 * sigma * 1_000.0;
        assert!((var - expected).abs() < 1e-6);
    }

    #[test]
    fn test_var_validation() {
        assert_eq!(
            calculate_var(&[], 0.95, 1.0, VarMethod::Historical),
            Err(SimulationError::EmptySamples)
        );
        assert!(calculate_var(&[0.01], 1.0, 1.0, VarMethod::Historical).is_err());
        assert!("monte".parse::<VarMethod>().is_err());
        assert_eq!("Parametric".parse::<VarMethod>().unwrap(), VarMethod::Parametric);
    }

    #[test]
    fn test_monte_carlo_var_matches_normal_quantile() {
        let mut rng = RandomStream::seeded(42);
        let params = VarParams {
            investment: 100_000.0,
            ..VarParams::new(0.0005, 0.02)
        };
        let var = monte_carlo_var(&params, 100_000, &mut rng).unwrap();
        // analytic: -(μ - 1.645σ) · investment ≈ 3239.7
        let analytic = -(0.0005 - 1.6448536269514722 * 0.02) * 100_000.0;
        assert!((var - analytic).abs() / analytic < 0.03);
    }

    #[test]
    fn test_higher_confidence_higher_var() {
        let base = VarParams::new(0.0005, 0.02);
        let var_95 = monte_carlo_var(&base, 50_000, &mut RandomStream::seeded(1)).unwrap();
        let var_99 = monte_carlo_var(
            &VarParams {
                confidence_level: 0.99,
                ..base
            },
            50_000,
            &mut RandomStream::seeded(1),
        )
        .unwrap();
        assert!(var_99 > var_95);
    }

    #[test]
    fn test_longer_horizon_scales_var() {
        let one_day = monte_carlo_var(&VarParams::new(0.0, 0.01), 50_000, &mut RandomStream::seeded(3)).unwrap();
        let ten_day = monte_carlo_var(
            &VarParams {
                horizon_days: 10,
                ..VarParams::new(0.0, 0.01)
            },
            50_000,
            &mut RandomStream::seeded(3),
        )
        .unwrap();
        let ratio = ten_day / one_day;
        assert!((ratio - 10_f64.sqrt()).abs() < 0.1);
    }
}
