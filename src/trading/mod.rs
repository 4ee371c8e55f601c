//! Trading simulators
//!
//! All three simulators share one step transition: each trade risks a fixed
//! fraction of current capital and wins `avg_win` R or loses `avg_loss` R.
//!
//! - Equity curve: distribution of final capital
//! - Drawdown: distribution of maximum peak-to-trough decline
//! - Ruin: probability of ever breaching a loss threshold

pub mod drawdown;
pub mod equity;
pub mod ruin;
pub mod strategy;

pub use drawdown::{simulate_drawdown, DrawdownSimulation};
pub use equity::{simulate_trades, TradeSimulation};
pub use ruin::{estimate_ruin, risk_of_ruin, RuinConfig, RUIN_BASELINE_CAPITAL};
pub use strategy::{apply_trade, StrategyConfig};
