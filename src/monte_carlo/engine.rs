//! Sampling engine: drives `n` independent trials and summarises the outcomes.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::estimate::ProbabilityEstimate;
use super::result::SimulationResult;
use crate::config::{EngineConfig, ExecutionMode};
use crate::error::{Result, SimulationError};
use crate::rng::RandomStream;

/// Produces one scalar outcome per call, drawing only from the stream it is given.
pub trait TrialSource {
    fn run_trial(&self, rng: &mut RandomStream) -> f64;
}

impl<F> TrialSource for F
where
    F: Fn(&mut RandomStream) -> f64,
{
    fn run_trial(&self, rng: &mut RandomStream) -> f64 {
        self(rng)
    }
}

/// A trial whose only outcome is whether some event happened.
pub trait TrialEvent {
    fn occurs(&self, rng: &mut RandomStream) -> bool;
}

/// Shared flag checked between trials.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Monte Carlo engine configured once and reusable across trial sources.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloEngine {
    config: EngineConfig,
    cancel: Option<CancellationToken>,
}

impl MonteCarloEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Stop between trials once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `n_simulations` trials on a stream seeded from the configuration.
    pub fn run<S>(&self, source: &S) -> Result<SimulationResult>
    where
        S: TrialSource + Sync + ?Sized,
    {
        self.config.validate()?;
        let started = Instant::now();
        let master = RandomStream::from_seed(self.config.seed);
        debug!(
            "Monte Carlo run: {} trials ({} mode, seed {})",
            self.config.n_simulations,
            self.config.mode,
            master.base_seed()
        );

        let samples = match self.config.mode {
            ExecutionMode::Sequential => {
                let mut rng = master;
                self.sample_sequential(source, &mut rng)?
            }
            ExecutionMode::Parallel => self.sample_parallel(source, &master)?,
        };

        let result = SimulationResult::from_samples(samples)?;
        debug!(
            "Monte Carlo run complete in {:.1}ms: mean={:.4}, std={:.4}",
            started.elapsed().as_secs_f64() * 1000.0,
            result.mean(),
            result.std()
        );
        Ok(result)
    }

    /// Run sequentially on a caller-owned stream, ignoring the configured seed
    /// and mode. The stream is left advanced past every draw the trials made.
    pub fn run_with<S>(&self, source: &S, rng: &mut RandomStream) -> Result<SimulationResult>
    where
        S: TrialSource + ?Sized,
    {
        self.config.validate()?;
        let samples = self.sample_sequential(source, rng)?;
        SimulationResult::from_samples(samples)
    }

    /// Count how often `event` occurs without keeping a distribution.
    pub fn estimate_probability<E>(&self, event: &E) -> Result<ProbabilityEstimate>
    where
        E: TrialEvent + Sync + ?Sized,
    {
        self.config.validate()?;
        let n = self.config.n_simulations;
        let master = RandomStream::from_seed(self.config.seed);

        let hits = match self.config.mode {
            ExecutionMode::Sequential => {
                let mut rng = master;
                let mut hits = 0usize;
                for trial in 0..n {
                    self.check_cancelled(trial)?;
                    if event.occurs(&mut rng) {
                        hits += 1;
                    }
                }
                hits
            }
            ExecutionMode::Parallel => {
                let completed = AtomicUsize::new(0);
                let outcomes: Vec<bool> = (0..n)
                    .into_par_iter()
                    .map(|trial| -> Result<bool> {
                        self.check_cancelled(completed.load(Ordering::Relaxed))?;
                        let mut rng = master.substream(trial as u64);
                        let hit = event.occurs(&mut rng);
                        completed.fetch_add(1, Ordering::Relaxed);
                        Ok(hit)
                    })
                    .collect::<Result<Vec<bool>>>()?;
                outcomes.into_iter().filter(|&hit| hit).count()
            }
        };

        debug!("Event occurred in {}/{} trials", hits, n);
        Ok(ProbabilityEstimate::new(hits, n))
    }

    fn sample_sequential<S>(&self, source: &S, rng: &mut RandomStream) -> Result<Vec<f64>>
    where
        S: TrialSource + ?Sized,
    {
        let n = self.config.n_simulations;
        let mut samples = Vec::with_capacity(n);
        for trial in 0..n {
            self.check_cancelled(trial)?;
            samples.push(finite_outcome(trial, source.run_trial(rng))?);
        }
        Ok(samples)
    }

    fn sample_parallel<S>(&self, source: &S, master: &RandomStream) -> Result<Vec<f64>>
    where
        S: TrialSource + Sync + ?Sized,
    {
        let completed = AtomicUsize::new(0);
        (0..self.config.n_simulations)
            .into_par_iter()
            .map(|trial| -> Result<f64> {
                self.check_cancelled(completed.load(Ordering::Relaxed))?;
                let mut rng = master.substream(trial as u64);
                let value = finite_outcome(trial, source.run_trial(&mut rng))?;
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            })
            .collect()
    }

    fn check_cancelled(&self, completed: usize) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(SimulationError::Cancelled {
                completed,
                requested: self.config.n_simulations,
            }),
            _ => Ok(()),
        }
    }
}

fn finite_outcome(trial: usize, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::NonFiniteOutcome { trial, value })
    }
}

/// Run `source` `n_simulations` times on one stream and summarise the outcomes.
///
/// `seed` makes the run reproducible; `None` seeds from entropy.
pub fn monte_carlo<S>(source: &S, n_simulations: usize, seed: Option<u64>) -> Result<SimulationResult>
where
    S: TrialSource + Sync + ?Sized,
{
    MonteCarloEngine::new(EngineConfig::new(n_simulations, seed)).run(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin_flip(rng: &mut RandomStream) -> f64 {
        if rng.uniform() > 0.5 {
            1.0
        } else {
            -1.0
        }
    }

    #[test]
    fn test_exact_call_count() {
        let calls = AtomicUsize::new(0);
        let source = |_rng: &mut RandomStream| {
            calls.fetch_add(1, Ordering::Relaxed);
            1.0
        };
        let result = monte_carlo(&source, 250, Some(1)).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 250);
        assert_eq!(result.n_samples(), 250);
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let result = monte_carlo(&coin_flip, 0, None);
        assert!(matches!(result, Err(SimulationError::InvalidArgument { .. })));
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let a = monte_carlo(&coin_flip, 1_000, Some(42)).unwrap();
        let b = monte_carlo(&coin_flip, 1_000, Some(42)).unwrap();
        assert_eq!(a.samples(), b.samples());
        assert!(a.mean().abs() < 0.1);
    }

    #[test]
    fn test_run_with_advances_caller_stream() {
        let engine = MonteCarloEngine::new(EngineConfig::new(10, None));
        let mut rng = RandomStream::seeded(5);
        let first = engine.run_with(&coin_flip, &mut rng).unwrap();
        let second = engine.run_with(&coin_flip, &mut rng).unwrap();

        let mut fresh = RandomStream::seeded(5);
        let replay = engine.run_with(&coin_flip, &mut fresh).unwrap();
        assert_eq!(first.samples(), replay.samples());
        assert_eq!(second.n_samples(), 10);
    }

    #[test]
    fn test_parallel_is_deterministic() {
        let config = EngineConfig::new(2_000, Some(9)).with_mode(ExecutionMode::Parallel);
        let engine = MonteCarloEngine::new(config);
        let source = |rng: &mut RandomStream| rng.uniform();
        let a = engine.run(&source).unwrap();
        let b = engine.run(&source).unwrap();
        assert_eq!(a.samples(), b.samples());
        assert!((a.mean() - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_non_finite_outcome_fails() {
        let source = |_rng: &mut RandomStream| f64::NAN;
        let result = monte_carlo(&source, 3, Some(1));
        assert!(matches!(
            result,
            Err(SimulationError::NonFiniteOutcome { trial: 0, .. })
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let engine = MonteCarloEngine::new(EngineConfig::new(100, Some(1))).with_cancellation(token);
        assert_eq!(
            engine.run(&coin_flip),
            Err(SimulationError::Cancelled {
                completed: 0,
                requested: 100
            })
        );
    }

    #[test]
    fn test_cancel_mid_run() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let calls = AtomicUsize::new(0);
        let source = move |_rng: &mut RandomStream| {
            if calls.fetch_add(1, Ordering::Relaxed) == 4 {
                trigger.cancel();
            }
            0.0
        };
        let engine = MonteCarloEngine::new(EngineConfig::new(100, Some(1))).with_cancellation(token);
        assert_eq!(
            engine.run(&source),
            Err(SimulationError::Cancelled {
                completed: 5,
                requested: 100
            })
        );
    }

    #[test]
    fn test_estimate_probability() {
        struct Heads;
        impl TrialEvent for Heads {
            fn occurs(&self, rng: &mut RandomStream) -> bool {
                rng.uniform() < 0.5
            }
        }

        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let engine = MonteCarloEngine::new(EngineConfig::new(20_000, Some(3)).with_mode(mode));
            let est = engine.estimate_probability(&Heads).unwrap();
            assert_eq!(est.n_simulations, 20_000);
            assert!((est.probability() - 0.5).abs() < 4.0 * est.standard_error());
        }
    }
}
