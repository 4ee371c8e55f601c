//! Terminal-equity distribution for a fixed-fractional strategy

use serde::{Deserialize, Serialize};

use super::strategy::{apply_trade, StrategyConfig};
use crate::error::{ensure_count, ensure_positive, Result, SimulationError};
use crate::monte_carlo::{monte_carlo, SimulationResult, TrialSource};
use crate::rng::RandomStream;

/// One equity curve of `n_trades` sequential trades.
///
/// Each trial starts at `initial_capital` and returns final capital, or 0 as
/// soon as the account is blown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSimulation {
    pub strategy: StrategyConfig,
    pub n_trades: usize,
    pub initial_capital: f64,
    /// Fraction of current capital risked per trade
    pub risk_per_trade: f64,
}

impl TradeSimulation {
    /// 10,000 starting capital, 1% risk per trade
    pub fn new(strategy: StrategyConfig, n_trades: usize) -> Self {
        Self {
            strategy,
            n_trades,
            initial_capital: 10_000.0,
            risk_per_trade: 0.01,
        }
    }

    pub fn with_initial_capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = initial_capital;
        self
    }

    pub fn with_risk_per_trade(mut self, risk_per_trade: f64) -> Self {
        self.risk_per_trade = risk_per_trade;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        ensure_count("n_trades", self.n_trades)?;
        ensure_positive("initial_capital", self.initial_capital)?;
        validate_risk(self.risk_per_trade)
    }
}

impl TrialSource for TradeSimulation {
    fn run_trial(&self, rng: &mut RandomStream) -> f64 {
        let mut capital = self.initial_capital;
        for _ in 0..self.n_trades {
            capital = apply_trade(capital, self.risk_per_trade, &self.strategy, rng);
            if capital <= 0.0 {
                return 0.0;
            }
        }
        capital
    }
}

/// Distribution of final capital over `n_simulations` equity curves.
pub fn simulate_trades(
    simulation: &TradeSimulation,
    n_simulations: usize,
    seed: Option<u64>,
) -> Result<SimulationResult> {
    simulation.validate()?;
    monte_carlo(simulation, n_simulations, seed)
}

pub(crate) fn validate_risk(risk_per_trade: f64) -> Result<()> {
    if !(risk_per_trade > 0.0 && risk_per_trade <= 1.0) {
        return Err(SimulationError::invalid_argument(format!(
            "risk_per_trade must lie in (0, 1], got {risk_per_trade}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_wins_compound() {
        let sim = TradeSimulation::new(StrategyConfig::new(1.0, 1.5, 1.0), 50);
        let result = simulate_trades(&sim, 20, Some(3)).unwrap();
        let expected = 10_000.0 * (1.0_f64 + 0.01 * 1.5).powi(50);
        for &v in result.samples() {
            assert!((v - expected).abs() / expected < 1e-10);
        }
        assert!(result.std() < 1e-6);
    }

    #[test]
    fn test_blown_account_returns_zero() {
        // losing 2R at 100% risk wipes the account on the first loss
        let sim = TradeSimulation::new(StrategyConfig::new(0.0, 1.0, 2.0), 10).with_risk_per_trade(1.0);
        let result = simulate_trades(&sim, 10, Some(1)).unwrap();
        assert!(result.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_positive_edge_grows_capital() {
        let sim = TradeSimulation::new(StrategyConfig::new(0.55, 1.5, 1.0), 100);
        let result = simulate_trades(&sim, 10_000, Some(42)).unwrap();
        // expected growth per trade is 1 + 0.01 * 0.375
        let expected = 10_000.0 * (1.0_f64 + 0.00375).powi(100);
        assert!((result.mean() - expected).abs() / expected < 0.01);
        assert!(result.prob_above(10_000.0) > 0.8);
        assert!(result.min_value() <= result.percentile_5());
        assert!(result.percentile_95() <= result.max_value());
    }

    #[test]
    fn test_invalid_parameters() {
        let strategy = StrategyConfig::new(0.5, 1.0, 1.0);
        assert!(simulate_trades(&TradeSimulation::new(strategy, 0), 10, None).is_err());
        assert!(simulate_trades(&TradeSimulation::new(strategy, 10).with_risk_per_trade(0.0), 10, None).is_err());
        assert!(simulate_trades(&TradeSimulation::new(strategy, 10).with_initial_capital(-5.0), 10, None).is_err());
        assert!(simulate_trades(&TradeSimulation::new(strategy, 10), 0, None).is_err());
    }
}
