use serde::{Deserialize, Serialize};

/// Bernoulli estimate of an event probability from independent trials.
///
/// Only the hit count is kept; the estimate carries sampling error
/// `sqrt(p(1-p)/n)` that shrinks with more trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    pub hits: usize,
    pub n_simulations: usize,
}

impl ProbabilityEstimate {
    pub fn new(hits: usize, n_simulations: usize) -> Self {
        Self { hits, n_simulations }
    }

    pub fn probability(&self) -> f64 {
        if self.n_simulations == 0 {
            return 0.0;
        }
        self.hits as f64 / self.n_simulations as f64
    }

    pub fn standard_error(&self) -> f64 {
        if self.n_simulations == 0 {
            return 0.0;
        }
        let p = self.probability();
        (p * (1.0 - p) / self.n_simulations as f64).sqrt()
    }

    /// Normal-approximation interval `p ± z·se`, clamped to `[0, 1]`.
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let p = self.probability();
        let half = z * self.standard_error();
        ((p - half).max(0.0), (p + half).min(1.0))
    }
}

impl std::fmt::Display for ProbabilityEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.4} ± {:.4} ({}/{})",
            self.probability(),
            self.standard_error(),
            self.hits,
            self.n_simulations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_and_error() {
        let est = ProbabilityEstimate::new(25, 100);
        assert_eq!(est.probability(), 0.25);
        assert!((est.standard_error() - (0.25_f64 * 0.75 / 100.0).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_certain_outcomes_have_no_error() {
        assert_eq!(ProbabilityEstimate::new(0, 50).standard_error(), 0.0);
        assert_eq!(ProbabilityEstimate::new(50, 50).standard_error(), 0.0);
    }

    #[test]
    fn test_interval_is_clamped() {
        let (lo, hi) = ProbabilityEstimate::new(1, 100).confidence_interval(3.0);
        assert_eq!(lo, 0.0);
        assert!(hi > 0.01 && hi <= 1.0);
    }
}
