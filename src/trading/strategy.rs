//! Strategy parameters and the per-trade capital transition

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_probability, Result};
use crate::rng::RandomStream;

/// Binary win/loss strategy expressed in R-multiples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Probability that a trade wins (0-1)
    pub win_rate: f64,
    /// Average win in R (e.g., 1.5 = 1.5R)
    pub avg_win: f64,
    /// Average loss in R (usually 1.0)
    pub avg_loss: f64,
}

impl StrategyConfig {
    pub fn new(win_rate: f64, avg_win: f64, avg_loss: f64) -> Self {
        Self {
            win_rate,
            avg_win,
            avg_loss,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_probability("win_rate", self.win_rate)?;
        ensure_non_negative("avg_win", self.avg_win)?;
        ensure_non_negative("avg_loss", self.avg_loss)?;
        Ok(())
    }

    /// Expected R per trade
    pub fn expected_r(&self) -> f64 {
        self.win_rate * self.avg_win - (1.0 - self.win_rate) * self.avg_loss
    }
}

/// Apply one trade to `capital`, risking `risk_per_trade` of current equity.
///
/// Consumes exactly one uniform draw. A win adds `risk * avg_win`, a loss
/// subtracts `risk * avg_loss`.
#[inline]
pub fn apply_trade(
    capital: f64,
    risk_per_trade: f64,
    strategy: &StrategyConfig,
    rng: &mut RandomStream,
) -> f64 {
    let risk_amount = capital * risk_per_trade;
    if rng.uniform() < strategy.win_rate {
        capital + risk_amount * strategy.avg_win
    } else {
        capital - risk_amount * strategy.avg_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_r() {
        let strategy = StrategyConfig::new(0.55, 1.5, 1.0);
        assert!((strategy.expected_r() - 0.375).abs() < 1e-12);
        assert!(StrategyConfig::new(0.3, 1.0, 1.0).expected_r() < 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(StrategyConfig::new(0.55, 1.5, 1.0).validate().is_ok());
        assert!(StrategyConfig::new(1.2, 1.5, 1.0).validate().is_err());
        assert!(StrategyConfig::new(0.5, -1.0, 1.0).validate().is_err());
        assert!(StrategyConfig::new(0.5, 1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_certain_win_and_loss() {
        let mut rng = RandomStream::seeded(1);
        let always_win = StrategyConfig::new(1.0, 2.0, 1.0);
        assert_eq!(apply_trade(10_000.0, 0.01, &always_win, &mut rng), 10_200.0);

        let always_lose = StrategyConfig::new(0.0, 2.0, 1.0);
        assert_eq!(apply_trade(10_000.0, 0.01, &always_lose, &mut rng), 9_900.0);
    }
}
