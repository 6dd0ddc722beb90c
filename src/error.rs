//! Error types for sample-size planning, analysis, and input parsing
//!
//! Every failure in the inference core is raised synchronously to the caller.
//! There is no retry and no partial result: an operation either returns a
//! fully valid value or one of these errors.

use thiserror::Error;

/// Errors raised by the statistical inference core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Sample-size inputs put the baseline or treatment rate outside (0, 1)
    #[error("Invalid experiment design: {0}")]
    InvalidDesign(String),

    /// Absolute effect between baseline and treatment rate is numerically zero
    #[error(
        "Degenerate effect: baseline_rate={baseline_rate} with mde={mde} gives no detectable difference"
    )]
    DegenerateEffect { baseline_rate: f64, mde: f64 },

    /// An arm has fewer non-missing observations than the test requires
    #[error("Insufficient sample size in {arm} arm: need at least {required} observations, got {actual}")]
    InsufficientSampleSize {
        arm: String,
        required: usize,
        actual: usize,
    },

    /// Pooled standard deviation is zero, so Cohen's d is undefined
    #[error("Zero variance: pooled standard deviation is 0 (both arms are constant)")]
    ZeroVariance,

    /// A numeric parameter is outside its domain
    #[error("Invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A probability distribution rejected its parameters
    ///
    /// Finite inputs of any magnitude are analyzed; this is raised when an
    /// infinite value leaves the statistic or degrees of freedom undefined.
    #[error("Distribution error: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, InferenceError>;

/// Errors raised while reading samples, assignments, or observations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("line {line}: invalid numeric value '{token}'")]
    InvalidValue { line: usize, token: String },

    #[error("line {line}: expected {expected} columns, got {actual}")]
    ColumnCount {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("line {line}: empty {field}")]
    EmptyField { line: usize, field: &'static str },

    #[error("duplicate assignment for user '{user_id}' in experiment '{experiment}'")]
    DuplicateAssignment { user_id: String, experiment: String },

    #[error("user '{user_id}' assigned to unknown variant '{variant}'")]
    UnknownVariant { user_id: String, variant: String },
}

/// Require a probability-like parameter to lie strictly inside (0, 1)
pub(crate) fn ensure_open_unit(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(InferenceError::InvalidParameter {
            name,
            value,
            reason: "must lie strictly between 0 and 1",
        })
    }
}
