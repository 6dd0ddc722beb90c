// Scenario tests for A/B planning and analysis
//
// - Conversion-style binary metrics and continuous engagement metrics
// - Exact expectations recomputed from the formulas, never hardcoded p-values
// - Edge cases: tiny arms, constant arms, zero control mean, missing values

use super::*;
use crate::error::InferenceError;
use crate::simulation::{simulate_conversion_test, SimulationSpec};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

fn welch_reference(control: &[f64], treatment: &[f64]) -> (f64, f64, f64) {
    let stats = |xs: &[f64]| {
        let n = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (n, mean, var)
    };
    let (n1, m1, v1) = stats(control);
    let (n2, m2, v2) = stats(treatment);

    let a = v1 / n1;
    let b = v2 / n2;
    let t = (m2 - m1) / (a + b).sqrt();
    let df = (a + b).powi(2) / (a.powi(2) / (n1 - 1.0) + b.powi(2) / (n2 - 1.0));
    let p = 2.0 * (1.0 - StudentsT::new(0.0, 1.0, df).unwrap().cdf(t.abs()));
    (t, df, p)
}

/// Scenario: conversion flags on ten users per arm, 30% vs 70%
/// Expected: effect 0.4; the Welch test gives t ≈ 1.85 on 18 df, which is
/// not significant at 0.05 but is at 0.10
#[test]
fn test_small_conversion_experiment() {
    let control_values = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    let treatment_values = [1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0];
    let control = Sample::from(&control_values[..]);
    let treatment = Sample::from(&treatment_values[..]);

    let result = ABTestAnalyzer::default()
        .analyze(&control, &treatment)
        .unwrap();
    let (t, df, p) = welch_reference(&control_values, &treatment_values);

    assert_eq!(result.control_n, 10);
    assert_eq!(result.treatment_n, 10);
    assert!((result.control_mean - 0.3).abs() < 1e-12);
    assert!((result.treatment_mean - 0.7).abs() < 1e-12);
    assert!((result.absolute_effect - 0.4).abs() < 1e-12);
    assert!((result.relative_effect - 0.4 / 0.3).abs() < 1e-9);
    assert!((result.t_statistic - t).abs() < 1e-9);
    assert!((result.degrees_of_freedom - df).abs() < 1e-9);
    assert!((result.p_value - p).abs() < 1e-9);

    assert!((result.t_statistic - 1.8516).abs() < 1e-3);
    assert!((result.degrees_of_freedom - 18.0).abs() < 1e-9);
    assert!(result.p_value > 0.05 && result.p_value < 0.10);
    assert!(!result.is_significant);

    // Equal variances of 7/30 give a pooled SD of sqrt(7/30).
    assert!((result.cohens_d - 0.4 / (7.0f64 / 30.0).sqrt()).abs() < 1e-9);

    let lenient = ABTestAnalyzer::new(0.10)
        .unwrap()
        .analyze(&control, &treatment)
        .unwrap();
    assert!(lenient.is_significant);
}

/// Scenario: continuous engagement metric with a clear lift
/// Expected: significant, interval excludes zero, positive effect size
#[test]
fn test_engagement_lift_detected() {
    let control = Sample::new(vec![
        31.0, 29.5, 30.2, 28.9, 30.8, 31.4, 29.1, 30.0, 30.6, 29.7,
    ]);
    let treatment = Sample::new(vec![
        34.2, 35.1, 33.8, 34.9, 35.4, 33.5, 34.0, 35.6, 34.4, 34.8,
    ]);

    let result = ABTestAnalyzer::default()
        .analyze(&control, &treatment)
        .unwrap();

    assert!(result.is_significant, "p = {}", result.p_value);
    assert!(result.ci_excludes_zero());
    assert!(result.ci_lower > 0.0);
    assert!(result.cohens_d > 2.0);
}

/// Scenario: both arms drawn from the same values
/// Expected: zero effect, p-value of one, not significant
#[test]
fn test_identical_arms() {
    let values = vec![12.0, 15.0, 11.0, 14.0, 13.0];
    let control = Sample::new(values.clone());
    let treatment = Sample::new(values);

    let result = ABTestAnalyzer::default()
        .analyze(&control, &treatment)
        .unwrap();

    assert_eq!(result.absolute_effect, 0.0);
    assert_eq!(result.t_statistic, 0.0);
    assert!((result.p_value - 1.0).abs() < 1e-12);
    assert!(!result.is_significant);
    assert_eq!(result.cohens_d, 0.0);
}

/// Scenario: unequal arm sizes and very different spreads
/// Expected: statistic and df follow Welch-Satterthwaite, not the pooled test
#[test]
fn test_unequal_sizes_and_variances() {
    let control_values = [4.1, 3.9, 4.0, 4.2, 3.8, 4.0, 4.1, 3.9];
    let treatment_values = [2.0, 7.5, 3.1, 6.8, 4.9, 8.2, 1.7, 5.5, 6.1, 3.3, 7.9, 4.4];
    let control = Sample::from(&control_values[..]);
    let treatment = Sample::from(&treatment_values[..]);

    let result = ABTestAnalyzer::default()
        .analyze(&control, &treatment)
        .unwrap();
    let (t, df, p) = welch_reference(&control_values, &treatment_values);

    assert!((result.t_statistic - t).abs() < 1e-9);
    assert!((result.degrees_of_freedom - df).abs() < 1e-9);
    assert!((result.p_value - p).abs() < 1e-9);
    // Pooled df would be n1 + n2 - 2 = 18.
    assert!(result.degrees_of_freedom < 18.0);
}

/// Scenario: control arm holds a single user
/// Expected: InsufficientSampleSize for the control arm
#[test]
fn test_single_control_observation_rejected() {
    let control = Sample::new(vec![0.4]);
    let treatment = Sample::new(vec![0.5, 0.6, 0.7]);

    match ABTestAnalyzer::default().analyze(&control, &treatment) {
        Err(InferenceError::InsufficientSampleSize {
            arm,
            required,
            actual,
        }) => {
            assert_eq!(arm, "control");
            assert_eq!(required, 2);
            assert_eq!(actual, 1);
        }
        other => panic!("Expected InsufficientSampleSize, got {:?}", other),
    }
}

/// Scenario: missing values leave only one real observation in an arm
/// Expected: missing entries do not count toward n
#[test]
fn test_missing_values_do_not_count() {
    let control = Sample::new(vec![0.4, f64::NAN, f64::NAN]);
    let treatment = Sample::new(vec![0.5, 0.6, 0.7]);

    assert!(matches!(
        ABTestAnalyzer::default().analyze(&control, &treatment),
        Err(InferenceError::InsufficientSampleSize { actual: 1, .. })
    ));
}

/// Scenario: missing values mixed into otherwise valid arms
/// Expected: same result as the arms without the missing entries
#[test]
fn test_missing_values_excluded_from_statistics() {
    let clean = ABTestAnalyzer::default()
        .analyze(
            &Sample::new(vec![1.0, 2.0, 3.0, 4.0]),
            &Sample::new(vec![2.0, 4.0, 5.0, 7.0]),
        )
        .unwrap();
    let with_missing = ABTestAnalyzer::default()
        .analyze(
            &Sample::new(vec![1.0, f64::NAN, 2.0, 3.0, 4.0]),
            &Sample::from_options(vec![Some(2.0), Some(4.0), None, Some(5.0), Some(7.0)]),
        )
        .unwrap();

    assert_eq!(clean, with_missing);
}

/// Scenario: control metric is zero for every user (e.g. a new feature)
/// Expected: relative effect is NaN, every other field stays valid
#[test]
fn test_zero_control_mean() {
    let control = Sample::new(vec![0.0, 0.0, 0.0, 0.0, 0.0]);
    let treatment = Sample::new(vec![1.0, 0.0, 1.0, 1.0, 0.0]);

    let result = ABTestAnalyzer::default()
        .analyze(&control, &treatment)
        .unwrap();

    assert!(result.relative_effect.is_nan());
    assert_eq!(result.relative_effect(), None);
    assert!((result.absolute_effect - 0.6).abs() < 1e-12);
    assert!(result.p_value.is_finite());
    assert!(result.cohens_d.is_finite());
    assert!(result.ci_lower <= result.absolute_effect);
    assert!(result.absolute_effect <= result.ci_upper);
}

/// Scenario: both arms constant
/// Expected: ZeroVariance error, no partial result
#[test]
fn test_constant_arms_have_zero_variance() {
    let control = Sample::new(vec![1.0, 1.0, 1.0]);
    let treatment = Sample::new(vec![2.0, 2.0, 2.0, 2.0]);

    assert_eq!(
        ABTestAnalyzer::default().analyze(&control, &treatment),
        Err(InferenceError::ZeroVariance)
    );
}

/// Scenario: analysis repeated on the same inputs
/// Expected: identical results, inputs untouched
#[test]
fn test_analysis_is_deterministic() {
    let control = Sample::new(vec![3.2, 4.1, 2.9, 3.8, 3.5]);
    let treatment = Sample::new(vec![3.9, 4.4, 4.0, 4.7, 3.6]);
    let before = (control.clone(), treatment.clone());

    let analyzer = ABTestAnalyzer::default();
    let first = analyzer.analyze(&control, &treatment).unwrap();
    let second = analyzer.analyze(&control, &treatment).unwrap();

    assert_eq!(first, second);
    assert_eq!((control, treatment), before);
}

/// Scenario: swap control and treatment
/// Expected: effect, t, and d flip sign; p-value unchanged
#[test]
fn test_swapping_arms_is_symmetric() {
    let a = Sample::new(vec![3.2, 4.1, 2.9, 3.8, 3.5, 3.0]);
    let b = Sample::new(vec![3.9, 4.4, 4.0, 4.7, 3.6]);

    let forward = ABTestAnalyzer::default().analyze(&a, &b).unwrap();
    let backward = ABTestAnalyzer::default().analyze(&b, &a).unwrap();

    assert_eq!(forward.absolute_effect, -backward.absolute_effect);
    assert_eq!(forward.t_statistic, -backward.t_statistic);
    assert_eq!(forward.cohens_d, -backward.cohens_d);
    assert_eq!(forward.p_value, backward.p_value);
}

/// Scenario: baseline 30% conversion, +5% relative lift, 80% power, alpha 0.05
/// Expected: per-arm size equals the closed-form two-proportion formula
#[test]
fn test_streaming_sample_size_matches_formula() {
    let n = SampleSizePlanner::compute(&SampleSizeSpec::new(0.30, 0.05)).unwrap();

    let normal = Normal::new(0.0, 1.0).unwrap();
    let (p1, p2) = (0.30, 0.30 * 1.05);
    let pooled = (p1 + p2) / 2.0;
    let z = normal.inverse_cdf(0.975) + normal.inverse_cdf(0.80);
    let expected = (2.0 * pooled * (1.0 - pooled) * z * z / (p2 - p1).powi(2)).ceil();

    assert!(((n as f64) - expected).abs() <= 1.0, "n = {}, expected {}", n, expected);
    assert!((14_000..=15_500).contains(&n));
}

/// Scenario: relative lift of zero
/// Expected: DegenerateEffect rather than a division by zero
#[test]
fn test_zero_lift_is_degenerate() {
    assert!(matches!(
        SampleSizePlanner::compute(&SampleSizeSpec::new(0.5, 0.0)),
        Err(InferenceError::DegenerateEffect { .. })
    ));
}

/// Scenario: plan a test, then simulate it with the planned size and the
/// true lift
/// Expected: the simulated experiment detects the lift
#[test]
fn test_planned_size_detects_planned_lift() {
    let plan = SampleSizePlanner::plan(&SampleSizeSpec::new(0.20, 0.25).power(0.999)).unwrap();

    let spec = SimulationSpec {
        users: plan.total() as usize,
        baseline_rate: 0.20,
        effect: 0.25,
        seed: 42,
    };
    let arms = simulate_conversion_test(&spec).unwrap();
    let result = ABTestAnalyzer::default()
        .analyze(&arms.control, &arms.treatment)
        .unwrap();

    assert!(result.absolute_effect > 0.0);
    assert!(result.is_significant, "p = {}", result.p_value);
}

/// Scenario: many large simulated experiments across a range of lifts
/// Expected: the t-test verdict and the normal interval agree almost always
#[test]
fn test_verdict_agrees_with_interval_at_large_n() {
    let analyzer = ABTestAnalyzer::default();
    let mut disagreements = 0;
    let runs = 60;

    for seed in 0..runs {
        let spec = SimulationSpec {
            users: 2_000,
            baseline_rate: 0.30,
            effect: (seed % 6) as f64 * 0.04,
            seed,
        };
        let arms = simulate_conversion_test(&spec).unwrap();
        let result = analyzer.analyze(&arms.control, &arms.treatment).unwrap();

        if result.is_significant != result.ci_excludes_zero() {
            disagreements += 1;
        }
    }

    assert!(
        disagreements * 20 <= runs,
        "{} of {} runs disagree",
        disagreements,
        runs
    );
}

/// Scenario: configuration presets drive the analyzer
/// Expected: strict config never flags what the default config does not
#[test]
fn test_strict_config_is_more_conservative() {
    let control = Sample::new(vec![100.0, 102.0, 101.0, 103.0, 100.0]);
    let treatment = Sample::new(vec![102.0, 104.0, 103.0, 105.0, 102.0]);

    let default = ABTestAnalyzer::from_config(&InferenceConfig::default())
        .unwrap()
        .analyze(&control, &treatment)
        .unwrap();
    let strict = ABTestAnalyzer::from_config(&InferenceConfig::strict())
        .unwrap()
        .analyze(&control, &treatment)
        .unwrap();

    if strict.is_significant {
        assert!(default.is_significant);
    }
    assert!(strict.ci_upper - strict.ci_lower > default.ci_upper - default.ci_lower);
}
