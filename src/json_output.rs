//! JSON output format for plans, analyses, and assessments
//!
//! serde_json writes non-finite floats (an undefined relative effect) as `null`.

use crate::experiment::ExperimentResult;
use crate::inference::{ExperimentAssessment, SampleSizePlan, SampleSizeSpec};
use serde::{Deserialize, Serialize};

/// Sample-size plan together with the design it was computed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonPlan {
    pub spec: SampleSizeSpec,
    pub required_n_per_arm: u64,
    pub total_n: u64,
    pub treatment_rate: f64,
    pub pooled_rate: f64,
}

/// Complete JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Output format version
    pub version: String,
    /// Format identifier
    pub format: String,
    /// Sample-size plan (plan command)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<JsonPlan>,
    /// Single-metric analyses
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub results: Vec<ExperimentResult>,
    /// Multi-metric experiment assessment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<ExperimentAssessment>,
}

impl JsonOutput {
    /// Create a new JSON output structure
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "encore-json-v1".to_string(),
            plan: None,
            results: Vec::new(),
            assessment: None,
        }
    }

    pub fn set_plan(&mut self, spec: SampleSizeSpec, plan: &SampleSizePlan) {
        self.plan = Some(JsonPlan {
            spec,
            required_n_per_arm: plan.required_n_per_arm,
            total_n: plan.total(),
            treatment_rate: plan.treatment_rate,
            pooled_rate: plan.pooled_rate,
        });
    }

    pub fn add_result(&mut self, result: ExperimentResult) {
        self.results.push(result);
    }

    pub fn set_assessment(&mut self, assessment: ExperimentAssessment) {
        self.assessment = Some(assessment);
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}
