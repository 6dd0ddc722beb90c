// Configuration for experiment planning and analysis
//
// One place for the false-positive rate, the design power, and the minimum
// arm size, so planning and analysis agree on the same thresholds.

use crate::error::{ensure_open_unit, InferenceError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for sample-size planning and A/B analysis
///
/// # Example
/// ```
/// use encore::inference::InferenceConfig;
///
/// let config = InferenceConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Statistical significance level (alpha) for hypothesis testing
    ///
    /// - 0.05 (default): 95% confidence level
    /// - 0.01: stricter, fewer false positives and more false negatives
    /// - 0.10: looser, more false positives and fewer false negatives
    ///
    /// The confidence interval on the absolute effect uses the same level.
    pub significance_level: f64,

    /// Design power (1 - beta) for sample-size planning
    ///
    /// Default: 0.80
    pub power: f64,

    /// Minimum non-missing observations per arm before a metric is analyzed
    ///
    /// Welch's t-test needs at least 2 per arm for the variance to exist.
    ///
    /// Default: 2
    pub min_sample_size: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            power: 0.80,
            min_sample_size: 2,
        }
    }
}

impl InferenceConfig {
    /// Create a strict configuration (fewer false positives, more false negatives)
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            power: 0.90,
            min_sample_size: 30,
        }
    }

    /// Create a permissive configuration (more false positives, fewer false negatives)
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            power: 0.80,
            min_sample_size: 2,
        }
    }

    /// Confidence level of reported intervals, 1 - alpha
    pub fn confidence_level(&self) -> f64 {
        1.0 - self.significance_level
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), InferenceError> {
        ensure_open_unit("significance_level", self.significance_level)?;
        ensure_open_unit("power", self.power)?;

        if self.min_sample_size < 2 {
            return Err(InferenceError::InvalidParameter {
                name: "min_sample_size",
                value: self.min_sample_size as f64,
                reason: "must be >= 2 for a t-test",
            });
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    ///
    /// Keys left out of the file keep their default values.
    ///
    /// # Example TOML
    /// ```toml
    /// significance_level = 0.01
    /// power = 0.9
    /// min_sample_size = 100
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse TOML inference configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.power, 0.80);
        assert_eq!(config.min_sample_size, 2);
        assert!((config.confidence_level() - 0.95).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = InferenceConfig::strict();
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.power, 0.90);
        assert_eq!(config.min_sample_size, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = InferenceConfig::permissive();
        assert_eq!(config.significance_level, 0.10);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_significance_level() {
        let mut config = InferenceConfig::default();
        config.significance_level = 1.5;
        assert!(config.validate().is_err());

        config.significance_level = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_power() {
        let mut config = InferenceConfig::default();
        config.power = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_min_sample_size() {
        let mut config = InferenceConfig::default();
        config.min_sample_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_keys_keep_defaults() {
        let config = InferenceConfig::from_toml_str("significance_level = 0.01\n").unwrap();
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.power, 0.80);
        assert_eq!(config.min_sample_size, 2);
    }

    #[test]
    fn test_toml_invalid_values_rejected() {
        assert!(InferenceConfig::from_toml_str("power = 1.2\n").is_err());
        assert!(InferenceConfig::from_toml_str("min_sample_size = \"ten\"\n").is_err());
    }

    #[test]
    fn test_toml_missing_file() {
        assert!(InferenceConfig::from_toml("/nonexistent/encore.toml").is_err());
    }
}
