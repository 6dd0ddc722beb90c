// Result record of one A/B analysis, plus its human and tabular renderings

use serde::{Deserialize, Serialize};

/// Outcome of comparing a treatment arm against a control arm
///
/// Created fresh by each analysis; a plain value with no identity.
/// `relative_effect` is NaN when the control mean is exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ABTestResult {
    pub control_mean: f64,
    pub treatment_mean: f64,
    pub control_stddev: f64,
    pub treatment_stddev: f64,
    pub control_n: usize,
    pub treatment_n: usize,

    /// treatment_mean - control_mean
    pub absolute_effect: f64,

    /// absolute_effect / control_mean, NaN when control_mean == 0
    pub relative_effect: f64,

    /// Two-sided Welch t-test p-value
    pub p_value: f64,

    /// Lower confidence bound on absolute_effect (normal quantile)
    pub ci_lower: f64,

    /// Upper confidence bound on absolute_effect (normal quantile)
    pub ci_upper: f64,

    /// p_value < alpha
    pub is_significant: bool,

    /// absolute_effect / pooled standard deviation
    pub cohens_d: f64,

    pub t_statistic: f64,

    /// Welch-Satterthwaite degrees of freedom
    pub degrees_of_freedom: f64,

    /// Significance level the verdict and interval were computed at
    pub alpha: f64,
}

impl ABTestResult {
    /// Relative effect, or `None` when the control mean is zero
    pub fn relative_effect(&self) -> Option<f64> {
        self.relative_effect
            .is_finite()
            .then_some(self.relative_effect)
    }

    /// Confidence level of the interval, 1 - alpha
    pub fn confidence_level(&self) -> f64 {
        1.0 - self.alpha
    }

    /// Whether the confidence interval excludes zero
    pub fn ci_excludes_zero(&self) -> bool {
        self.ci_lower > 0.0 || self.ci_upper < 0.0
    }

    /// Flatten into ordered (field, value) pairs for a flat table
    ///
    /// Sizes are widened to f64 and the verdict is encoded as 0 or 1.
    pub fn to_rows(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("control_n", self.control_n as f64),
            ("treatment_n", self.treatment_n as f64),
            ("control_mean", self.control_mean),
            ("treatment_mean", self.treatment_mean),
            ("control_stddev", self.control_stddev),
            ("treatment_stddev", self.treatment_stddev),
            ("absolute_effect", self.absolute_effect),
            ("relative_effect", self.relative_effect),
            ("ci_lower", self.ci_lower),
            ("ci_upper", self.ci_upper),
            ("p_value", self.p_value),
            ("t_statistic", self.t_statistic),
            ("degrees_of_freedom", self.degrees_of_freedom),
            ("cohens_d", self.cohens_d),
            ("alpha", self.alpha),
            ("is_significant", if self.is_significant { 1.0 } else { 0.0 }),
        ]
    }

    /// Generate human-readable report
    pub fn to_report_string(&self, name: &str) -> String {
        let rule = "=".repeat(60);
        let mut report = String::new();

        report.push_str(&format!("{}\nA/B TEST: {}\n{}\n", rule, name, rule));
        report.push_str(&format!(
            "Control: {} users, Mean: {:.4}, Std: {:.4}\n",
            group_thousands(self.control_n),
            self.control_mean,
            self.control_stddev
        ));
        report.push_str(&format!(
            "Treatment: {} users, Mean: {:.4}, Std: {:.4}\n\n",
            group_thousands(self.treatment_n),
            self.treatment_mean,
            self.treatment_stddev
        ));

        let relative = match self.relative_effect() {
            Some(r) => format!("{:+.2}%", r * 100.0),
            None => "undefined: control mean is 0".to_string(),
        };
        report.push_str(&format!(
            "Effect: {:+.4} ({})\n",
            self.absolute_effect, relative
        ));
        report.push_str(&format!(
            "{}% CI: [{:.4}, {:.4}]\n",
            format_percent(self.confidence_level()),
            self.ci_lower,
            self.ci_upper
        ));
        report.push_str(&format!(
            "t: {:.4} (df={:.1})\n",
            self.t_statistic, self.degrees_of_freedom
        ));
        report.push_str(&format!("P-value: {:.4}\n", self.p_value));
        report.push_str(&format!(
            "Significant: {} (alpha={})\n",
            if self.is_significant { "YES" } else { "NO" },
            self.alpha
        ));
        report.push_str(&format!("Cohen's d: {:.4}\n", self.cohens_d));
        report.push_str(&rule);
        report.push('\n');

        report
    }
}

/// 12345 -> "12,345"
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 0.95 -> "95", 0.975 -> "97.5"
fn format_percent(fraction: f64) -> String {
    let pct = format!("{:.2}", fraction * 100.0);
    pct.trim_end_matches('0').trim_end_matches('.').to_string()
}
