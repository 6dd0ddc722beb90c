// Fixed-horizon A/B inference: sample-size planning and two-sample testing
//
// Two cooperating pieces:
// - SampleSizePlanner: per-arm size for a two-proportion z-test, from a
//   baseline rate, a relative minimum detectable effect, power, and alpha.
// - ABTestAnalyzer: Welch's t-test (unequal variances), a normal-quantile
//   confidence interval on the absolute effect, Cohen's d with a pooled SD,
//   and the verdict p < alpha.
//
// Both are stateless pure functions over their arguments. They may be called
// concurrently from any number of threads with no coordination.
//
// Implementation:
// - Uses statrs (crates.io) for the Student-t CDF and the normal inverse CDF
// - Uses statrs::statistics for means and unbiased (n - 1) variances
// - Missing observations are removed once, when a Sample is constructed

mod analyzer;
mod config;
mod planner;
mod result;
mod sample;
mod verdict;
mod welch;

pub use analyzer::ABTestAnalyzer;
pub use config::InferenceConfig;
pub use planner::{SampleSizePlan, SampleSizePlanner, SampleSizeSpec};
pub use result::ABTestResult;
pub use sample::Sample;
pub(crate) use sample::ensure_min_arm_size;
pub use verdict::{assess_experiment, ExperimentAssessment, ExperimentVerdict};
pub use welch::{welch_t_test, WelchTest};

#[cfg(test)]
mod tests;
