//! CLI argument parsing for Encore

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "encore")]
#[command(version)]
#[command(about = "A/B test planning and statistical inference", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Load significance level, power and minimum arm size from a TOML file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the per-arm sample size for a conversion experiment
    Plan {
        /// Control conversion rate, in (0, 1)
        #[arg(long = "baseline-rate", value_name = "RATE")]
        baseline_rate: f64,

        /// Minimum detectable effect, relative to the baseline (0.05 = +5%)
        #[arg(long, value_name = "EFFECT")]
        mde: f64,

        /// Design power (overrides the configuration)
        #[arg(long, value_name = "POWER")]
        power: Option<f64>,

        /// Significance level (overrides the configuration)
        #[arg(long, value_name = "ALPHA")]
        alpha: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compare two samples with Welch's t-test
    Analyze {
        /// File with control-arm values
        #[arg(long, value_name = "FILE")]
        control: PathBuf,

        /// File with treatment-arm values
        #[arg(long, value_name = "FILE")]
        treatment: PathBuf,

        /// Metric name used in reports
        #[arg(long, default_value = "metric")]
        metric: String,

        /// Significance level (overrides the configuration)
        #[arg(long, value_name = "ALPHA")]
        alpha: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Assess an experiment from assignment and observation tables
    Experiment {
        /// Experiment name as it appears in both tables
        #[arg(long)]
        name: String,

        /// Free-text description shown in reports
        #[arg(long)]
        description: Option<String>,

        /// CSV of user_id,experiment,variant
        #[arg(long, value_name = "FILE")]
        assignments: PathBuf,

        /// CSV of user_id,experiment,metric,value
        #[arg(long, value_name = "FILE")]
        observations: PathBuf,

        /// Analyze only this metric
        #[arg(long)]
        metric: Option<String>,

        /// Variant label of the control arm
        #[arg(long = "control-name", default_value = "control")]
        control_name: String,

        /// Variant label of the treatment arm
        #[arg(long = "treatment-name", default_value = "treatment")]
        treatment_name: String,

        /// Significance level (overrides the configuration)
        #[arg(long, value_name = "ALPHA")]
        alpha: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Simulate a conversion experiment and analyze it
    Simulate {
        /// Total users across both arms
        #[arg(long, default_value = "10000")]
        users: usize,

        /// Control conversion rate
        #[arg(long = "baseline-rate", default_value = "0.3")]
        baseline_rate: f64,

        /// Relative lift applied to the treatment arm
        #[arg(long, default_value = "0.05")]
        effect: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Significance level (overrides the configuration)
        #[arg(long, value_name = "ALPHA")]
        alpha: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
