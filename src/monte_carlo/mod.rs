//! Monte Carlo sampling engine
//!
//! - `engine`: trial scheduling (sequential or rayon), seeding, cancellation
//! - `result`: immutable distribution summary with interval and tail queries
//! - `estimate`: Bernoulli probability estimate for breach/no-breach trials

mod engine;
mod estimate;
mod result;

pub use engine::{monte_carlo, CancellationToken, MonteCarloEngine, TrialEvent, TrialSource};
pub use estimate::ProbabilityEstimate;
pub use result::{SimulationResult, SummaryStats, DEFAULT_CONFIDENCE_LEVEL};
