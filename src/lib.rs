// Library crate - Monte Carlo risk simulation
//
// The sampling engine is domain-agnostic; trading and finance simulators are
// thin trial sources on top of it.

pub mod config;
pub mod error;
pub mod finance;
pub mod monte_carlo;
pub mod rng;
pub mod stats;
pub mod trading;

// Re-export commonly used types
pub use config::{EngineConfig, ExecutionMode};
pub use error::{Result, SimulationError};
pub use monte_carlo::{
    monte_carlo, CancellationToken, MonteCarloEngine, ProbabilityEstimate, SimulationResult,
    SummaryStats, TrialEvent, TrialSource,
};
pub use rng::RandomStream;
pub use trading::{
    risk_of_ruin, simulate_drawdown, simulate_trades, RuinConfig, StrategyConfig, TradeSimulation,
};
