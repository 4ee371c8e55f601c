//! Maximum drawdown distribution

use serde::{Deserialize, Serialize};

use super::equity::validate_risk;
use super::strategy::{apply_trade, StrategyConfig};
use crate::error::{ensure_count, ensure_positive, Result};
use crate::monte_carlo::{monte_carlo, SimulationResult, TrialSource};
use crate::rng::RandomStream;

/// Per-trial maximum peak-to-trough decline, as a fraction of the peak.
///
/// Baseline is 10,000 capital at 1% risk. Ruin (capital <= 0) reports 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSimulation {
    pub strategy: StrategyConfig,
    pub n_trades: usize,
    pub initial_capital: f64,
    pub risk_per_trade: f64,
}

impl DrawdownSimulation {
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

impl TrialSource for DrawdownSimulation {
    fn run_trial(&self, rng: &mut RandomStream) -> f64 {
        let mut capital = self.initial_capital;
        let mut peak = capital;
        let mut max_drawdown = 0.0_f64;

        for _ in 0..self.n_trades {
            capital = apply_trade(capital, self.risk_per_trade, &self.strategy, rng);

            if capital > peak {
                peak = capital;
            }
            let drawdown = (peak - capital) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }

            if capital <= 0.0 {
                return 1.0;
            }
        }

        max_drawdown
    }
}

/// Maximum drawdown distribution at the 10,000 / 1% baseline.
///
/// Use [`DrawdownSimulation`] with the `with_*` builders for other baselines.
pub fn simulate_drawdown(
    strategy: &StrategyConfig,
    n_trades: usize,
    n_simulations: usize,
    seed: Option<u64>,
) -> Result<SimulationResult> {
    let simulation = DrawdownSimulation::new(*strategy, n_trades);
    simulation.validate()?;
    monte_carlo(&simulation, n_simulations, seed)
}
