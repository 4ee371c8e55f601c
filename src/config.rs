//! Configuration for the sampling engine

use serde::{Deserialize, Serialize};

use crate::error::{ensure_count, Result};

/// Execution mode determines how trials are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One stream, trials in order (matches single-threaded reference runs)
    Sequential,
    /// Rayon pool, one substream per trial index
    Parallel,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Sequential
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Parallel => write!(f, "Parallel"),
        }
    }
}

/// Configuration for a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of independent trials
    pub n_simulations: usize,

    /// Master seed; `None` draws one from entropy
    pub seed: Option<u64>,

    /// Sequential or parallel scheduling
    pub mode: ExecutionMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_simulations: 10_000,
            seed: None,
            mode: ExecutionMode::Sequential,
        }
    }
}

impl EngineConfig {
    pub fn new(n_simulations: usize, seed: Option<u64>) -> Self {
        Self {
            n_simulations,
            seed,
            ..Default::default()
        }
    }

    /// Fast, rough estimate (1,000 trials)
    pub fn quick() -> Self {
        Self {
            n_simulations: 1_000,
            ..Default::default()
        }
    }

    /// High precision (100,000 trials, parallel)
    pub fn precise() -> Self {
        Self {
            n_simulations: 100_000,
            mode: ExecutionMode::Parallel,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_count("n_simulations", self.n_simulations)
    }
}
