//! Seeded user splits and simulated conversion experiments
//!
//! Randomness is always driven by an explicit seed argument. Nothing here
//! touches a process-wide generator, so two calls with the same seed return
//! the same split or the same simulated arms.

use crate::error::{InferenceError, Result};
use crate::inference::{ABTestAnalyzer, ABTestResult, Sample};
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Randomly split users into (control, treatment)
///
/// The users are shuffled with a generator seeded from `seed`. The first
/// `floor(len * (1 - treatment_ratio))` shuffled users form the control group
/// and the rest form the treatment group.
///
/// # Example
/// ```
/// use encore::simulation::split_users;
///
/// let users: Vec<String> = (0..100).map(|i| format!("user_{}", i)).collect();
/// let (control, treatment) = split_users(&users, 0.5, 42).unwrap();
/// assert_eq!(control.len() + treatment.len(), 100);
/// ```
pub fn split_users<S>(
    user_ids: &[S],
    treatment_ratio: f64,
    seed: u64,
) -> Result<(Vec<S>, Vec<S>)>
where
    S: Clone,
{
    if !(0.0..=1.0).contains(&treatment_ratio) {
        return Err(InferenceError::InvalidParameter {
            name: "treatment_ratio",
            value: treatment_ratio,
            reason: "must lie in [0, 1]",
        });
    }

    let mut shuffled = user_ids.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let split = (shuffled.len() as f64 * (1.0 - treatment_ratio)).floor() as usize;
    let treatment = shuffled.split_off(split.min(shuffled.len()));
    Ok((shuffled, treatment))
}

/// Parameters of a simulated conversion experiment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSpec {
    /// Total users across both arms
    pub users: usize,
    /// Control conversion probability
    pub baseline_rate: f64,
    /// Relative lift applied to the treatment arm
    pub effect: f64,
    pub seed: u64,
}

impl Default for SimulationSpec {
    fn default() -> Self {
        Self {
            users: 10_000,
            baseline_rate: 0.30,
            effect: 0.05,
            seed: 42,
        }
    }
}

impl SimulationSpec {
    pub fn treatment_rate(&self) -> f64 {
        self.baseline_rate * (1.0 + self.effect)
    }
}

/// Simulated control and treatment arms of binary conversion flags
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedArms {
    pub control: Sample,
    pub treatment: Sample,
}

/// Draw conversion flags for both arms
///
/// Control gets `users / 2` draws at the baseline rate; treatment gets the
/// remaining users at `baseline_rate * (1 + effect)`.
pub fn simulate_conversion_test(spec: &SimulationSpec) -> Result<SimulatedArms> {
    let control_dist = bernoulli(spec.baseline_rate)?;
    let treatment_dist = bernoulli(spec.treatment_rate())?;

    let control_n = spec.users / 2;
    let treatment_n = spec.users - control_n;
    let mut rng = StdRng::seed_from_u64(spec.seed);

    let control: Sample = (0..control_n)
        .map(|_| flag(control_dist.sample(&mut rng)))
        .collect();
    let treatment: Sample = (0..treatment_n)
        .map(|_| flag(treatment_dist.sample(&mut rng)))
        .collect();

    tracing::debug!(
        "Simulated {} control / {} treatment users (p={}, p={})",
        control_n,
        treatment_n,
        spec.baseline_rate,
        spec.treatment_rate()
    );

    Ok(SimulatedArms { control, treatment })
}

/// Simulate a conversion experiment and analyze it
pub fn run_simulation(spec: &SimulationSpec, analyzer: &ABTestAnalyzer) -> Result<ABTestResult> {
    let arms = simulate_conversion_test(spec)?;
    analyzer.analyze(&arms.control, &arms.treatment)
}

fn bernoulli(p: f64) -> Result<Bernoulli> {
    Bernoulli::new(p).map_err(|_| {
        InferenceError::InvalidDesign(format!("conversion rate must be in [0, 1], got {}", p))
    })
}

fn flag(converted: bool) -> f64 {
    if converted {
        1.0
    } else {
        0.0
    }
}
