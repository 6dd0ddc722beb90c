// Experiment-level verdict across every metric of an experiment
//
// Each metric is an independent pure analysis. Metrics that cannot be
// analyzed are recorded with a reason instead of failing the whole
// assessment, so one sparse metric never hides the others.

use crate::experiment::{Experiment, Observation};
use crate::inference::analyzer::ABTestAnalyzer;
use crate::inference::config::InferenceConfig;
use crate::inference::result::ABTestResult;
use crate::inference::sample::ensure_min_arm_size;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final verdict for an experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperimentVerdict {
    /// No metric differs significantly between arms
    NoSignificantEffect,

    /// At least one metric differs significantly (p < significance_level)
    SignificantEffect {
        /// Metric(s) with a significant difference
        metrics: Vec<String>,
    },

    /// No metric had enough data to be analyzed
    InsufficientData { reason: String },
}

/// Detailed assessment of an experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentAssessment {
    pub experiment: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Final verdict
    pub verdict: ExperimentVerdict,

    /// Analyses performed (metric → result)
    pub results: BTreeMap<String, ABTestResult>,

    /// Metrics that were not analyzed (metric → reason)
    pub skipped: BTreeMap<String, String>,

    /// Configuration used for assessment
    pub config: InferenceConfig,
}

impl ExperimentAssessment {
    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        match &self.verdict {
            ExperimentVerdict::NoSignificantEffect => {
                report.push_str(&format!(
                    "NO SIGNIFICANT EFFECT: {}\n\n",
                    self.experiment
                ));
            }
            ExperimentVerdict::SignificantEffect { metrics } => {
                report.push_str(&format!(
                    "SIGNIFICANT EFFECT: {} ({} metrics)\n\n",
                    self.experiment,
                    metrics.len()
                ));
                report.push_str(&format!("Significant metrics: {}\n", metrics.join(", ")));
            }
            ExperimentVerdict::InsufficientData { reason } => {
                report.push_str(&format!("INSUFFICIENT DATA: {}\n\n", self.experiment));
                report.push_str(&format!("Reason: {}\n", reason));
            }
        }

        if !self.description.is_empty() {
            report.push_str(&format!("Description: {}\n", self.description));
        }
        report.push_str(&format!("Metrics analyzed: {}\n", self.results.len()));
        report.push_str(&format!(
            "Significance level: {} ({}% confidence)\n",
            self.config.significance_level,
            self.config.confidence_level() * 100.0
        ));

        if !self.skipped.is_empty() {
            report.push_str(&format!("\nSkipped metrics ({}):\n", self.skipped.len()));
            for (metric, reason) in &self.skipped {
                report.push_str(&format!("  - {}: {}\n", metric, reason));
            }
        }

        if !self.results.is_empty() {
            report.push_str("\nMetric Tests:\n");
            for (metric, result) in &self.results {
                report.push_str(&format!(
                    "  {} (p={:.4}, effect={:+.4}, d={:.3}, control_n={}, treatment_n={})\n",
                    metric,
                    result.p_value,
                    result.absolute_effect,
                    result.cohens_d,
                    result.control_n,
                    result.treatment_n
                ));
            }
        }

        report
    }
}

/// Assess every metric observed for an experiment
///
/// # Example
/// ```
/// use encore::experiment::{Experiment, ExperimentConfig, Observation};
/// use encore::inference::{assess_experiment, ExperimentVerdict, InferenceConfig};
///
/// let exp = Experiment::from_groups(
///     ExperimentConfig::new("recs"),
///     ["a", "b", "c"],
///     ["d", "e", "f"],
/// ).unwrap();
/// let observations: Vec<Observation> = [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 1.5), ("e", 2.0), ("f", 3.5)]
///     .iter()
///     .map(|(user, value)| Observation {
///         user_id: user.to_string(),
///         experiment: "recs".to_string(),
///         metric: "sessions".to_string(),
///         value: Some(*value),
///     })
///     .collect();
///
/// let assessment = assess_experiment(&exp, &observations, &InferenceConfig::default()).unwrap();
/// assert_eq!(assessment.verdict, ExperimentVerdict::NoSignificantEffect);
/// ```
pub fn assess_experiment(
    experiment: &Experiment,
    observations: &[Observation],
    config: &InferenceConfig,
) -> Result<ExperimentAssessment> {
    config.validate()?;
    let analyzer = ABTestAnalyzer::from_config(config)?;

    let mut results = BTreeMap::new();
    let mut skipped = BTreeMap::new();
    let mut significant = Vec::new();

    for metric in experiment.metrics(observations) {
        let (control, treatment) = experiment.samples_for(&metric, observations);

        if ensure_min_arm_size(&control, &treatment, config.min_sample_size).is_err() {
            let reason = format!(
                "control_n={}, treatment_n={} below min_sample_size={}",
                control.n(),
                treatment.n(),
                config.min_sample_size
            );
            tracing::warn!("Skipping metric {}: {}", metric, reason);
            skipped.insert(metric, reason);
            continue;
        }

        match analyzer.analyze(&control, &treatment) {
            Ok(result) => {
                if result.is_significant {
                    significant.push(metric.clone());
                }
                results.insert(metric, result);
            }
            Err(e) => {
                tracing::warn!("Failed to analyze metric {}: {}", metric, e);
                skipped.insert(metric, e.to_string());
            }
        }
    }

    let verdict = if results.is_empty() {
        ExperimentVerdict::InsufficientData {
            reason: format!(
                "No metric met the sample size requirement \
                 (min_sample_size={}, skipped={})",
                config.min_sample_size,
                skipped.len()
            ),
        }
    } else if significant.is_empty() {
        ExperimentVerdict::NoSignificantEffect
    } else {
        ExperimentVerdict::SignificantEffect {
            metrics: significant,
        }
    };

    Ok(ExperimentAssessment {
        experiment: experiment.name().to_string(),
        description: experiment.config().description.clone(),
        verdict,
        results,
        skipped,
        config: config.clone(),
    })
}
