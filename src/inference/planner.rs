// Sample-size planning for a two-proportion z-test
//
// Closed form:
//   treatment = baseline * (1 + mde)
//   pooled    = (baseline + treatment) / 2
//   n         = ceil( 2 * pooled * (1 - pooled) * (z_{1-alpha/2} + z_{power})^2 / effect^2 )
//
// The returned size is per arm. Planning is a pure function of its inputs.

use crate::error::{ensure_open_unit, InferenceError, Result};
use crate::inference::config::InferenceConfig;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Experiment design target for a conversion-rate test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeSpec {
    /// Control conversion probability, in (0, 1)
    pub baseline_rate: f64,
    /// Relative lift to detect, e.g. 0.05 for +5%
    pub minimum_detectable_effect: f64,
    /// Probability of detecting a true effect of the given size
    pub power: f64,
    /// Two-sided false-positive rate
    pub alpha: f64,
}

impl SampleSizeSpec {
    /// Design target with the conventional power 0.80 and alpha 0.05
    pub fn new(baseline_rate: f64, minimum_detectable_effect: f64) -> Self {
        Self {
            baseline_rate,
            minimum_detectable_effect,
            power: 0.80,
            alpha: 0.05,
        }
    }

    /// Design target taking power and alpha from an inference configuration
    pub fn with_config(
        baseline_rate: f64,
        minimum_detectable_effect: f64,
        config: &InferenceConfig,
    ) -> Self {
        Self {
            baseline_rate,
            minimum_detectable_effect,
            power: config.power,
            alpha: config.significance_level,
        }
    }

    pub fn power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Conversion probability the treatment arm is expected to reach
    pub fn treatment_rate(&self) -> f64 {
        self.baseline_rate * (1.0 + self.minimum_detectable_effect)
    }
}

/// Required observations per arm, plus the quantities that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizePlan {
    pub required_n_per_arm: u64,
    pub treatment_rate: f64,
    pub pooled_rate: f64,
    pub z_alpha: f64,
    pub z_beta: f64,
}

impl SampleSizePlan {
    /// Observations needed across both arms
    pub fn total(&self) -> u64 {
        self.required_n_per_arm.saturating_mul(2)
    }
}

/// Translates a design target into a per-arm sample size
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSizePlanner;

impl SampleSizePlanner {
    /// Minimum observations needed per arm
    ///
    /// # Errors
    /// * `InvalidDesign` if the baseline or treatment rate falls outside (0, 1)
    /// * `DegenerateEffect` if the rate difference is numerically zero
    /// * `InvalidParameter` if power or alpha falls outside (0, 1)
    ///
    /// # Example
    /// ```
    /// use encore::inference::{SampleSizePlanner, SampleSizeSpec};
    ///
    /// let n = SampleSizePlanner::compute(&SampleSizeSpec::new(0.30, 0.05)).unwrap();
    /// assert!(n > 14_000 && n < 15_500);
    /// ```
    pub fn compute(spec: &SampleSizeSpec) -> Result<u64> {
        Self::plan(spec).map(|plan| plan.required_n_per_arm)
    }

    /// Like [`SampleSizePlanner::compute`], keeping the intermediate quantities
    pub fn plan(spec: &SampleSizeSpec) -> Result<SampleSizePlan> {
        ensure_open_unit("power", spec.power)?;
        ensure_open_unit("alpha", spec.alpha)?;

        if !(spec.baseline_rate > 0.0 && spec.baseline_rate < 1.0) {
            return Err(InferenceError::InvalidDesign(format!(
                "baseline_rate must be in (0, 1), got {}",
                spec.baseline_rate
            )));
        }

        let treatment_rate = spec.treatment_rate();
        if !(treatment_rate > 0.0 && treatment_rate < 1.0) {
            return Err(InferenceError::InvalidDesign(format!(
                "treatment_rate = {} * (1 + {}) = {} must be in (0, 1)",
                spec.baseline_rate, spec.minimum_detectable_effect, treatment_rate
            )));
        }

        let effect = (treatment_rate - spec.baseline_rate).abs();
        if !effect.is_normal() {
            return Err(InferenceError::DegenerateEffect {
                baseline_rate: spec.baseline_rate,
                mde: spec.minimum_detectable_effect,
            });
        }

        let pooled_rate = (spec.baseline_rate + treatment_rate) / 2.0;
        let z_alpha = standard_normal_quantile(1.0 - spec.alpha / 2.0)?;
        let z_beta = standard_normal_quantile(spec.power)?;

        let variance_term = 2.0 * pooled_rate * (1.0 - pooled_rate);
        let n = (variance_term * (z_alpha + z_beta).powi(2) / effect.powi(2)).ceil();

        // An effect barely above zero can still overflow the integer range.
        if !n.is_finite() || n >= u64::MAX as f64 {
            return Err(InferenceError::DegenerateEffect {
                baseline_rate: spec.baseline_rate,
                mde: spec.minimum_detectable_effect,
            });
        }

        Ok(SampleSizePlan {
            required_n_per_arm: (n as u64).max(1),
            treatment_rate,
            pooled_rate,
            z_alpha,
            z_beta,
        })
    }
}

/// Inverse CDF of the standard normal distribution
pub(crate) fn standard_normal_quantile(p: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| InferenceError::Distribution(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}
