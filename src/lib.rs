//! Encore - A/B experiment planning and statistical inference
//!
//! This library provides sample-size planning for conversion experiments and
//! Welch's t-test analysis of two independent samples, with confidence
//! intervals, effect sizes, and multi-metric experiment assessment.

pub mod cli;
pub mod csv_output;
pub mod error;
pub mod experiment;
pub mod inference;
pub mod input;
pub mod json_output;
pub mod simulation;
