// A/B analysis: descriptive statistics, Welch's t-test, a confidence
// interval on the absolute effect, Cohen's d, and a significance verdict.
//
// The interval uses the standard normal quantile while the p-value uses the
// Student-t distribution. This matches the reporting pipeline the results
// feed, and is slightly anti-conservative for small arms: at n = 10 per arm
// the normal interval is narrower than the t interval would be. Kept as is so
// reported intervals stay comparable across runs.

use crate::error::{ensure_open_unit, InferenceError, Result};
use crate::inference::config::InferenceConfig;
use crate::inference::planner::standard_normal_quantile;
use crate::inference::result::ABTestResult;
use crate::inference::sample::{common_scale, ensure_min_arm_size, Sample};
use crate::inference::welch::welch_scaled;

/// Decides whether an observed difference between two arms is significant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ABTestAnalyzer {
    alpha: f64,
}

impl Default for ABTestAnalyzer {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

impl ABTestAnalyzer {
    /// Analyzer at the given significance level
    pub fn new(alpha: f64) -> Result<Self> {
        ensure_open_unit("alpha", alpha)?;
        Ok(Self { alpha })
    }

    /// Analyzer at the configuration's significance level
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        Self::new(config.significance_level)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Compare a treatment arm against a control arm
    ///
    /// Missing observations were already removed when the samples were built.
    /// Inputs are not modified and identical inputs give identical results.
    ///
    /// # Errors
    /// * `InsufficientSampleSize` if either arm has fewer than 2 observations
    /// * `ZeroVariance` if both arms are constant (pooled SD is 0)
    ///
    /// # Example
    /// ```
    /// use encore::inference::{ABTestAnalyzer, Sample};
    ///
    /// let control = Sample::new(vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    /// let treatment = Sample::new(vec![1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
    ///
    /// let result = ABTestAnalyzer::default().analyze(&control, &treatment).unwrap();
    /// assert!((result.absolute_effect - 0.4).abs() < 1e-12);
    /// assert!(result.ci_lower <= result.absolute_effect);
    /// ```
    pub fn analyze(&self, control: &Sample, treatment: &Sample) -> Result<ABTestResult> {
        ensure_min_arm_size(control, treatment, 2)?;

        // Moments are taken on arms divided by a common power of two, then
        // location and spread are multiplied back.
        let scale = common_scale(control, treatment);
        let (control, treatment) = (control.rescaled(scale), treatment.rescaled(scale));

        // Step 1: descriptive statistics
        let (n1, n2) = (control.n(), treatment.n());
        let (mean1, mean2) = (control.mean(), treatment.mean());
        let (var1, var2) = (control.variance(), treatment.variance());

        // Step 5 precondition, checked before any division by the spread
        let pooled_sd = pooled_standard_deviation(var1, n1, var2, n2);
        if pooled_sd == 0.0 {
            return Err(InferenceError::ZeroVariance);
        }

        // Step 2: effect
        let effect = mean2 - mean1;
        let relative_effect = if mean1 == 0.0 {
            f64::NAN
        } else {
            effect / mean1
        };

        // Step 3: Welch's t-test
        let test = welch_scaled(&control, &treatment)?;

        // Step 4: confidence interval on the absolute effect
        let z = standard_normal_quantile(1.0 - self.alpha / 2.0)?;
        let margin = z * test.standard_error;

        // Step 6: verdict
        let is_significant = test.pvalue < self.alpha;

        Ok(ABTestResult {
            control_mean: mean1 * scale,
            treatment_mean: mean2 * scale,
            control_stddev: control.stddev() * scale,
            treatment_stddev: treatment.stddev() * scale,
            control_n: n1,
            treatment_n: n2,
            absolute_effect: effect * scale,
            relative_effect,
            p_value: test.pvalue,
            ci_lower: (effect - margin) * scale,
            ci_upper: (effect + margin) * scale,
            is_significant,
            cohens_d: effect / pooled_sd,
            t_statistic: test.statistic,
            degrees_of_freedom: test.df,
            alpha: self.alpha,
        })
    }
}

/// sqrt( ((n1-1) v1 + (n2-1) v2) / (n1 + n2 - 2) )
fn pooled_standard_deviation(var1: f64, n1: usize, var2: f64, n2: usize) -> f64 {
    let weighted = (n1 - 1) as f64 * var1 + (n2 - 1) as f64 * var2;
    (weighted / (n1 + n2 - 2) as f64).sqrt()
}
