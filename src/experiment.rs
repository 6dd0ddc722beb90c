//! Experiments: configuration, user assignments, and metric observations
//!
//! Assignment and observation rows mirror the external experiment tables:
//! one assignment row per (user, experiment) with a variant label, and one
//! or more observation rows per (user, experiment, metric) with a numeric
//! value. An [`Experiment`] joins the two by user id to build the control
//! and treatment [`Sample`]s handed to the analyzer.

use crate::error::{InferenceError, InputError};
use crate::inference::{
    ensure_min_arm_size, ABTestAnalyzer, ABTestResult, InferenceConfig, Sample,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Experiment arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Control,
    Treatment,
}

/// Configuration for an A/B experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name: String,
    pub description: String,
    /// Variant label used for the control arm in assignment rows
    pub control_name: String,
    /// Variant label used for the treatment arm in assignment rows
    pub treatment_name: String,
    pub significance_level: f64,
}

impl ExperimentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            control_name: "control".to_string(),
            treatment_name: "treatment".to_string(),
            significance_level: 0.05,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_significance_level(mut self, significance_level: f64) -> Self {
        self.significance_level = significance_level;
        self
    }

    /// Resolve a variant label from an assignment row
    pub fn variant(&self, label: &str) -> Option<Variant> {
        if label == self.control_name {
            Some(Variant::Control)
        } else if label == self.treatment_name {
            Some(Variant::Treatment)
        } else {
            None
        }
    }
}

/// One row of the experiment-assignment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub user_id: String,
    pub experiment: String,
    pub variant: String,
}

/// One row of the experiment-result table; `None` marks a missing value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub user_id: String,
    pub experiment: String,
    pub metric: String,
    pub value: Option<f64>,
}

/// An experiment with its resolved user assignments
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    assignments: HashMap<String, Variant>,
}

/// Analysis of one metric of one experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub experiment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub metric: String,
    pub result: ABTestResult,
}

impl ExperimentResult {
    /// Result for an ad-hoc comparison with no experiment description
    pub fn new(
        experiment: impl Into<String>,
        metric: impl Into<String>,
        result: ABTestResult,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            description: String::new(),
            metric: metric.into(),
            result,
        }
    }

    pub fn to_report_string(&self) -> String {
        let report = self
            .result
            .to_report_string(&format!("{} [{}]", self.experiment, self.metric));
        if self.description.is_empty() {
            report
        } else {
            format!("{}\n{}", self.description, report)
        }
    }
}

impl Experiment {
    /// Build an experiment from assignment-table rows
    ///
    /// Rows belonging to other experiments are ignored.
    ///
    /// # Errors
    /// * `DuplicateAssignment` if a user appears twice for this experiment
    /// * `UnknownVariant` if a row's label matches neither configured arm
    pub fn from_assignments<I>(config: ExperimentConfig, rows: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = Assignment>,
    {
        let mut assignments = HashMap::new();
        for row in rows.into_iter().filter(|r| r.experiment == config.name) {
            let variant = config
                .variant(&row.variant)
                .ok_or_else(|| InputError::UnknownVariant {
                    user_id: row.user_id.clone(),
                    variant: row.variant.clone(),
                })?;
            if assignments.insert(row.user_id.clone(), variant).is_some() {
                return Err(InputError::DuplicateAssignment {
                    user_id: row.user_id,
                    experiment: config.name.clone(),
                });
            }
        }

        let experiment = Self {
            config,
            assignments,
        };
        tracing::info!(
            "Created experiment {}: {} control, {} treatment",
            experiment.config.name,
            experiment.control_size(),
            experiment.treatment_size()
        );
        Ok(experiment)
    }

    /// Build an experiment from explicit control and treatment user lists
    pub fn from_groups<C, T>(
        config: ExperimentConfig,
        control_users: C,
        treatment_users: T,
    ) -> Result<Self, InputError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let name = config.name.clone();
        let control = control_users.into_iter().map(|u| Assignment {
            user_id: u.into(),
            experiment: name.clone(),
            variant: config.control_name.clone(),
        });
        let treatment = treatment_users.into_iter().map(|u| Assignment {
            user_id: u.into(),
            experiment: name.clone(),
            variant: config.treatment_name.clone(),
        });
        let rows: Vec<Assignment> = control.chain(treatment).collect();
        Self::from_assignments(config, rows)
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn variant_of(&self, user_id: &str) -> Option<Variant> {
        self.assignments.get(user_id).copied()
    }

    pub fn control_size(&self) -> usize {
        self.count(Variant::Control)
    }

    pub fn treatment_size(&self) -> usize {
        self.count(Variant::Treatment)
    }

    fn count(&self, variant: Variant) -> usize {
        self.assignments.values().filter(|v| **v == variant).count()
    }

    /// Distinct metric names observed for this experiment
    pub fn metrics(&self, observations: &[Observation]) -> BTreeSet<String> {
        observations
            .iter()
            .filter(|o| o.experiment == self.config.name)
            .map(|o| o.metric.clone())
            .collect()
    }

    /// Join observations of one metric to assignments by user id
    ///
    /// Observations for unassigned users or other experiments are skipped.
    /// Missing values stay in the samples as missing entries.
    pub fn samples_for(&self, metric: &str, observations: &[Observation]) -> (Sample, Sample) {
        let mut control = Vec::new();
        let mut treatment = Vec::new();

        for obs in observations
            .iter()
            .filter(|o| o.experiment == self.config.name && o.metric == metric)
        {
            match self.variant_of(&obs.user_id) {
                Some(Variant::Control) => control.push(obs.value),
                Some(Variant::Treatment) => treatment.push(obs.value),
                None => {}
            }
        }

        (
            Sample::from_options(control),
            Sample::from_options(treatment),
        )
    }

    /// Analyze one metric at the experiment's significance level
    ///
    /// Both arms must reach `config.min_sample_size` non-missing
    /// observations, the same gate [`assess_experiment`] applies per metric.
    ///
    /// [`assess_experiment`]: crate::inference::assess_experiment
    pub fn analyze(
        &self,
        metric: &str,
        observations: &[Observation],
        config: &InferenceConfig,
    ) -> Result<ExperimentResult, InferenceError> {
        let analyzer = ABTestAnalyzer::new(self.config.significance_level)?;
        let (control, treatment) = self.samples_for(metric, observations);
        ensure_min_arm_size(&control, &treatment, config.min_sample_size)?;
        let result = analyzer.analyze(&control, &treatment)?;

        Ok(ExperimentResult {
            experiment: self.config.name.clone(),
            description: self.config.description.clone(),
            metric: metric.to_string(),
            result,
        })
    }
}
