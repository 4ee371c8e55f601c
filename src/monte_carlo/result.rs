//! Immutable summary of one completed sample set.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_open_unit, ensure_probability, Result, SimulationError};
use crate::stats;

/// Confidence level used when callers have no preference.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Scalar statistics computed once over the full sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub n_samples: usize,
}

/// Statistics plus the samples they were derived from.
///
/// Built exactly once from a complete sample set and never mutated. Samples are
/// kept in generation order; every query that needs order statistics sorts a
/// copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    stats: SummaryStats,
    samples: Vec<f64>,
}

impl SimulationResult {
    /// Summarise a non-empty set of finite outcomes.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(SimulationError::EmptySamples);
        }
        if let Some((trial, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(SimulationError::NonFiniteOutcome { trial, value });
        }

        let sorted = stats::sorted_copy(&samples);
        let stats = SummaryStats {
            mean: stats::mean(&samples),
            std: stats::population_std(&samples),
            median: stats::percentile(&sorted, 0.5),
            percentile_5: stats::percentile(&sorted, 0.05),
            percentile_95: stats::percentile(&sorted, 0.95),
            min_value: sorted[0],
            max_value: sorted[sorted.len() - 1],
            n_samples: sorted.len(),
        };

        Ok(Self { stats, samples })
    }

    pub fn summary(&self) -> SummaryStats {
        self.stats
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean
    }

    pub fn std(&self) -> f64 {
        self.stats.std
    }

    pub fn median(&self) -> f64 {
        self.stats.median
    }

    pub fn percentile_5(&self) -> f64 {
        self.stats.percentile_5
    }

    pub fn percentile_95(&self) -> f64 {
        self.stats.percentile_95
    }

    pub fn min_value(&self) -> f64 {
        self.stats.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.stats.max_value
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Linear-interpolated quantile, `q` in `[0, 1]`.
    pub fn percentile(&self, q: f64) -> Result<f64> {
        ensure_probability("quantile", q)?;
        Ok(stats::percentile(&stats::sorted_copy(&self.samples), q))
    }

    /// Central interval holding `level` of the sample mass.
    ///
    /// Bounds are the `(1 - level) / 2` and `1 - (1 - level) / 2` quantiles.
    pub fn confidence_interval(&self, level: f64) -> Result<(f64, f64)> {
        ensure_open_unit("confidence level", level)?;
        let alpha = (1.0 - level) / 2.0;
        let sorted = stats::sorted_copy(&self.samples);
        Ok((
            stats::percentile(&sorted, alpha),
            stats::percentile(&sorted, 1.0 - alpha),
        ))
    }

    /// Fraction of samples strictly above `threshold`.
    pub fn prob_above(&self, threshold: f64) -> f64 {
        self.fraction(|x| x > threshold)
    }

    /// Fraction of samples strictly below `threshold`.
    pub fn prob_below(&self, threshold: f64) -> f64 {
        self.fraction(|x| x < threshold)
    }

    fn fraction(&self, pred: impl Fn(f64) -> bool) -> f64 {
        let hits = self.samples.iter().filter(|&&x| pred(x)).count();
        hits as f64 / self.samples.len() as f64
    }
}

impl std::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = &self.stats;
        writeln!(f, "SimulationResult(")?;
        writeln!(f, "  mean={:.4}, std={:.4}", s.mean, s.std)?;
        writeln!(f, "  median={:.4}", s.median)?;
        writeln!(f, "  90% band=[{:.4}, {:.4}]", s.percentile_5, s.percentile_95)?;
        writeln!(f, "  range=[{:.4}, {:.4}]", s.min_value, s.max_value)?;
        writeln!(f, "  n_samples={}", s.n_samples)?;
        write!(f, ")")
    }
}
