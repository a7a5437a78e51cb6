//! Startup validation errors.

use thiserror::Error;

/// Errors detected while validating deployment parameters.
///
/// All of these are raised before any platform call is made, so no
/// rollback is ever needed for them.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required and must not be empty")]
    Missing(&'static str),

    #[error("step percentage ({step_pct}) must not exceed final percentage ({final_pct})")]
    StepExceedsFinal { step_pct: u32, final_pct: u32 },

    #[error("{field} is {value}, but must be between 0 and 100")]
    PercentOutOfRange { field: &'static str, value: u32 },

    #[error("step percentage must be positive when the final percentage is nonzero")]
    ZeroStep,

    #[error("error threshold is {0}, but must be a fraction between 0 and 1")]
    ThresholdOutOfRange(f64),

    #[error("{field} is {value}, but must be a finite, non-negative number of minutes")]
    BadDuration { field: &'static str, value: f64 },
}
