// Metric samples for one experiment arm
//
// Missing observations (NaN or an explicit `None`) are dropped once, when the
// sample is built. Every statistic below is derived from the retained values
// only, so no formula downstream needs to re-check for missing entries.

use crate::error::{InferenceError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Real-valued metric observations for one arm of one experiment
///
/// # Example
/// ```
/// use encore::inference::Sample;
///
/// let sample = Sample::new(vec![1.0, f64::NAN, 3.0]);
/// assert_eq!(sample.n(), 2);
/// assert_eq!(sample.missing(), 1);
/// assert_eq!(sample.mean(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    values: Vec<f64>,
    missing: usize,
    mean: f64,
    variance: f64,
}

impl Sample {
    /// Build a sample, treating NaN entries as missing
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_options(values.into_iter().map(|v| (!v.is_nan()).then_some(v)))
    }

    /// Build a sample where `None` marks a missing observation
    pub fn from_options<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut kept = Vec::new();
        let mut missing = 0;
        for value in values {
            match value {
                Some(v) if !v.is_nan() => kept.push(v),
                _ => missing += 1,
            }
        }

        // statrs yields NaN for the mean of an empty set and for the
        // variance of fewer than two values.
        let mean = kept.iter().mean();
        let variance = kept.iter().variance();

        Self {
            values: kept,
            missing,
            mean,
            variance,
        }
    }

    /// Number of non-missing observations
    pub fn n(&self) -> usize {
        self.values.len()
    }

    /// Number of observations dropped as missing
    pub fn missing(&self) -> usize {
        self.missing
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-missing observations in input order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance (denominator n - 1)
    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn stddev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Squared standard error of the mean, s^2 / n
    pub(crate) fn variance_of_mean(&self) -> f64 {
        self.variance / self.n() as f64
    }

    /// Copy with every value divided by `scale`
    pub(crate) fn rescaled(&self, scale: f64) -> Self {
        if scale == 1.0 {
            return self.clone();
        }
        let mut sample = Self::new(self.values.iter().map(|v| v / scale));
        sample.missing = self.missing;
        sample
    }
}

/// Fail unless both arms hold at least `required` non-missing observations
pub(crate) fn ensure_min_arm_size(
    control: &Sample,
    treatment: &Sample,
    required: usize,
) -> Result<()> {
    for (arm, sample) in [("control", control), ("treatment", treatment)] {
        if sample.n() < required {
            return Err(InferenceError::InsufficientSampleSize {
                arm: arm.to_string(),
                required,
                actual: sample.n(),
            });
        }
    }
    Ok(())
}

/// Power of two at the largest finite magnitude across both arms
///
/// Dividing by a power of two is exact, so moments of ordinary data are
/// bit-for-bit unchanged, while squared deviations of very large or very
/// small values stay inside the f64 range.
pub(crate) fn common_scale(a: &Sample, b: &Sample) -> f64 {
    let largest = a
        .values
        .iter()
        .chain(&b.values)
        .map(|v| v.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if largest == 0.0 {
        return 1.0;
    }
    2f64.powi(largest.log2().floor() as i32)
}

impl FromIterator<f64> for Sample {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for Sample {
    fn from(values: &[f64]) -> Self {
        Self::new(values.iter().copied())
    }
}
