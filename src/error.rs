//! Error types for simulation runs and boundary validation.

use thiserror::Error;

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Everything that can go wrong while configuring or running a simulation.
///
/// All failures are local: there is no I/O in the library, so nothing here is
/// retryable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A caller-supplied parameter is out of its valid range.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A trial source returned NaN or an infinity.
    #[error("Trial {trial} produced a non-finite outcome ({value})")]
    NonFiniteOutcome { trial: usize, value: f64 },

    /// Statistics were requested over an empty sample set.
    #[error("Empty sample set")]
    EmptySamples,

    /// The run was cancelled between trials.
    #[error("Simulation cancelled after {completed} of {requested} trials")]
    Cancelled { completed: usize, requested: usize },
}

impl SimulationError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

pub(crate) fn ensure_count(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(SimulationError::invalid_argument(format!(
            "{name} must be positive"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SimulationError::invalid_argument(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(SimulationError::invalid_argument(format!(
            "{name} must be > 0, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(SimulationError::invalid_argument(format!(
            "{name} must be >= 0, got {value}"
        )));
    }
    Ok(())
}

/// Closed unit interval `[0, 1]`.
pub(crate) fn ensure_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::invalid_argument(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Open unit interval `(0, 1)`.
pub(crate) fn ensure_open_unit(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(SimulationError::invalid_argument(format!(
            "{name} must lie in (0, 1), got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_validation() {
        assert!(ensure_count("n_simulations", 1).is_ok());
        assert_eq!(
            ensure_count("n_simulations", 0),
            Err(SimulationError::invalid_argument("n_simulations must be positive"))
        );
    }

    #[test]
    fn test_interval_validation() {
        assert!(ensure_probability("win_rate", 0.0).is_ok());
        assert!(ensure_probability("win_rate", 1.0).is_ok());
        assert!(ensure_probability("win_rate", 1.01).is_err());
        assert!(ensure_probability("win_rate", f64::NAN).is_err());

        assert!(ensure_open_unit("level", 0.5).is_ok());
        assert!(ensure_open_unit("level", 0.0).is_err());
        assert!(ensure_open_unit("level", 1.0).is_err());
        assert!(ensure_open_unit("level", f64::NAN).is_err());
    }

    #[test]
    fn test_sign_validation() {
        assert!(ensure_positive("initial_capital", 10_000.0).is_ok());
        assert!(ensure_positive("initial_capital", 0.0).is_err());
        assert!(ensure_non_negative("avg_win", 0.0).is_ok());
        assert!(ensure_non_negative("avg_win", -1.0).is_err());
        assert!(ensure_non_negative("avg_win", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SimulationError::Cancelled {
            completed: 10,
            requested: 100,
        };
        assert_eq!(err.to_string(), "Simulation cancelled after 10 of 100 trials");
    }
}
