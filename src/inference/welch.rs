// Welch's two-sample t-test
//
// Unequal variances are assumed; the variances are never pooled for the
// p-value. Degrees of freedom come from the Welch-Satterthwaite equation:
//
//   df = (v1/n1 + v2/n2)^2 / ( (v1/n1)^2/(n1-1) + (v2/n2)^2/(n2-1) )
//
// and the p-value is the two-sided Student-t tail at |t|.

use crate::error::{InferenceError, Result};
use crate::inference::sample::{common_scale, ensure_min_arm_size, Sample};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Outcome of Welch's t-test comparing treatment against control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchTest {
    /// (treatment mean - control mean) / standard error
    pub statistic: f64,

    /// Welch-Satterthwaite degrees of freedom
    pub df: f64,

    /// Two-sided p-value in [0, 1]
    pub pvalue: f64,

    /// sqrt(v1/n1 + v2/n2), the unpooled standard error of the difference
    pub standard_error: f64,
}

/// Run Welch's t-test on two arms
///
/// Both arms must hold at least two observations and at least one arm must
/// vary; otherwise the standard error is zero and the statistic undefined.
///
/// # Example
/// ```
/// use encore::inference::{welch_t_test, Sample};
///
/// let control = Sample::new(vec![10.0, 12.0, 11.0, 13.0, 10.0]);
/// let treatment = Sample::new(vec![25.0, 27.0, 26.0, 28.0, 25.0]);
///
/// let test = welch_t_test(&control, &treatment).unwrap();
/// assert!(test.pvalue < 0.05);
/// ```
pub fn welch_t_test(control: &Sample, treatment: &Sample) -> Result<WelchTest> {
    ensure_min_arm_size(control, treatment, 2)?;

    let scale = common_scale(control, treatment);
    let test = welch_scaled(&control.rescaled(scale), &treatment.rescaled(scale))?;
    Ok(WelchTest {
        standard_error: test.standard_error * scale,
        ..test
    })
}

/// Welch's test on arms already divided by a common scale
///
/// The statistic, df and p-value do not depend on the scale; the standard
/// error is left in scaled units.
pub(crate) fn welch_scaled(control: &Sample, treatment: &Sample) -> Result<WelchTest> {
    let a = control.variance_of_mean();
    let b = treatment.variance_of_mean();
    let standard_error = (a + b).sqrt();
    if standard_error == 0.0 {
        return Err(InferenceError::ZeroVariance);
    }

    let statistic = (treatment.mean() - control.mean()) / standard_error;
    let df = welch_satterthwaite_df(a, control.n(), b, treatment.n());
    let pvalue = two_sided_pvalue(statistic, df)?;

    Ok(WelchTest {
        statistic,
        df,
        pvalue,
        standard_error,
    })
}

/// Welch-Satterthwaite degrees of freedom from per-arm s^2/n terms
fn welch_satterthwaite_df(a: f64, n1: usize, b: f64, n2: usize) -> f64 {
    let numerator = (a + b).powi(2);
    let denominator = a.powi(2) / (n1 - 1) as f64 + b.powi(2) / (n2 - 1) as f64;
    numerator / denominator
}

/// p = 2 * (1 - CDF_t(|t|, df)), clamped against rounding
fn two_sided_pvalue(statistic: f64, df: f64) -> Result<f64> {
    // Infinite inputs can leave the statistic or df undefined.
    if statistic.is_nan() || df.is_nan() {
        return Err(InferenceError::Distribution(format!(
            "undefined test statistic: t={}, df={}",
            statistic, df
        )));
    }
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| InferenceError::Distribution(e.to_string()))?;
    let p = 2.0 * (1.0 - dist.cdf(statistic.abs()));
    Ok(p.clamp(0.0, 1.0))
}
