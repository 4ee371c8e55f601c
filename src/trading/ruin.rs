//! Risk of ruin: probability of ever losing `ruin_threshold` of starting capital

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::equity::validate_risk;
use super::strategy::{apply_trade, StrategyConfig};
use crate::config::EngineConfig;
use crate::error::{ensure_count, ensure_open_unit, Result};
use crate::monte_carlo::{MonteCarloEngine, ProbabilityEstimate, TrialEvent};
use crate::rng::RandomStream;

/// Starting capital for every ruin trial. The breach level is relative, so the
/// estimate does not depend on this value.
pub const RUIN_BASELINE_CAPITAL: f64 = 10_000.0;

/// Parameters for a risk-of-ruin estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuinConfig {
    pub strategy: StrategyConfig,
    /// Fraction of current capital risked per trade
    pub risk_per_trade: f64,
    /// Loss fraction that counts as ruin (0.5 = 50% loss)
    pub ruin_threshold: f64,
    /// Trading horizon
    pub n_trades: usize,
}

impl RuinConfig {
    /// 2% risk, 50% ruin threshold, 500-trade horizon
    pub fn new(strategy: StrategyConfig) -> Self {
        Self {
            strategy,
            risk_per_trade: 0.02,
            ruin_threshold: 0.5,
            n_trades: 500,
        }
    }

    pub fn with_risk_per_trade(mut self, risk_per_trade: f64) -> Self {
        self.risk_per_trade = risk_per_trade;
        self
    }

    pub fn with_ruin_threshold(mut self, ruin_threshold: f64) -> Self {
        self.ruin_threshold = ruin_threshold;
        self
    }

    pub fn with_n_trades(mut self, n_trades: usize) -> Self {
        self.n_trades = n_trades;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        validate_risk(self.risk_per_trade)?;
        ensure_open_unit("ruin_threshold", self.ruin_threshold)?;
        ensure_count("n_trades", self.n_trades)
    }

    /// Capital at or below which a trial counts as ruined.
    pub fn ruin_level(&self) -> f64 {
        RUIN_BASELINE_CAPITAL * (1.0 - self.ruin_threshold)
    }
}

impl TrialEvent for RuinConfig {
    /// Stops at the first breach, so ruined trials consume fewer draws.
    fn occurs(&self, rng: &mut RandomStream) -> bool {
        let ruin_level = self.ruin_level();
        let mut capital = RUIN_BASELINE_CAPITAL;
        for _ in 0..self.n_trades {
            capital = apply_trade(capital, self.risk_per_trade, &self.strategy, rng);
            if capital <= ruin_level {
                return true;
            }
        }
        false
    }
}

/// Ruin estimate with its sampling error.
pub fn estimate_ruin(config: &RuinConfig, engine: &EngineConfig) -> Result<ProbabilityEstimate> {
    config.validate()?;
    let estimate = MonteCarloEngine::new(engine.clone()).estimate_probability(config)?;
    debug!(
        "Risk of ruin ({:.0}% threshold, {:.1}% risk): {}",
        config.ruin_threshold * 100.0,
        config.risk_per_trade * 100.0,
        estimate
    );
    Ok(estimate)
}

/// Probability of ruin in `[0, 1]` from `n_simulations` sequential trials.
pub fn risk_of_ruin(config: &RuinConfig, n_simulations: usize, seed: Option<u64>) -> Result<f64> {
    estimate_ruin(config, &EngineConfig::new(n_simulations, seed)).map(|est| est.probability())
}
