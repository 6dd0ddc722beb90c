use anyhow::{bail, Context, Result};
use clap::Parser;
use encore::cli::{Cli, Command, OutputArgs, OutputFormat};
use encore::csv_output::CsvOutput;
use encore::experiment::{Experiment, ExperimentConfig, ExperimentResult};
use encore::inference::{
    assess_experiment, ABTestAnalyzer, ExperimentAssessment, InferenceConfig, Sample,
    SampleSizePlan, SampleSizePlanner, SampleSizeSpec,
};
use encore::input;
use encore::json_output::JsonOutput;
use encore::simulation::{run_simulation, SimulationSpec};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the inference configuration, falling back to defaults
fn load_config(path: Option<&Path>) -> Result<InferenceConfig> {
    match path {
        Some(path) => {
            let config = InferenceConfig::from_toml(path)?;
            tracing::debug!("Loaded inference config from {}", path.display());
            Ok(config)
        }
        None => Ok(InferenceConfig::default()),
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn override_config(
    mut config: InferenceConfig,
    alpha: Option<f64>,
    power: Option<f64>,
) -> Result<InferenceConfig> {
    if let Some(alpha) = alpha {
        config.significance_level = alpha;
    }
    if let Some(power) = power {
        config.power = power;
    }
    config.validate().context("Invalid inference configuration")?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_sample(path: &Path) -> Result<Sample> {
    let values = input::parse_values(&read_file(path)?)
        .with_context(|| format!("Failed to parse sample values in {}", path.display()))?;
    let sample = Sample::from_options(values);
    tracing::debug!(
        "Read {} values ({} missing) from {}",
        sample.n(),
        sample.missing(),
        path.display()
    );
    Ok(sample)
}

/// Print to stdout or write to the requested file
fn emit(output: &OutputArgs, content: &str) -> Result<()> {
    match &output.output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn render_results(format: OutputFormat, results: Vec<ExperimentResult>) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(results
            .iter()
            .map(ExperimentResult::to_report_string)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            let mut json = JsonOutput::new();
            for result in results {
                json.add_result(result);
            }
            Ok(json.to_json()? + "\n")
        }
        OutputFormat::Csv => {
            let mut csv = CsvOutput::new();
            for r in &results {
                csv.add_result(&r.experiment, &r.metric, &r.result);
            }
            Ok(csv.to_csv())
        }
    }
}

fn render_assessment(format: OutputFormat, assessment: ExperimentAssessment) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(assessment.to_report_string()),
        OutputFormat::Json => {
            let mut json = JsonOutput::new();
            json.set_assessment(assessment);
            Ok(json.to_json()? + "\n")
        }
        OutputFormat::Csv => {
            let mut csv = CsvOutput::new();
            for (metric, result) in &assessment.results {
                csv.add_result(&assessment.experiment, metric, result);
            }
            Ok(csv.to_csv())
        }
    }
}

fn render_plan(format: OutputFormat, spec: SampleSizeSpec, plan: &SampleSizePlan) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "Baseline rate: {}\n\
             Treatment rate: {:.4} ({:+.2}% relative)\n\
             Power: {}  Alpha: {}\n\
             Required per arm: {}\n\
             Total: {}\n",
            spec.baseline_rate,
            plan.treatment_rate,
            spec.minimum_detectable_effect * 100.0,
            spec.power,
            spec.alpha,
            plan.required_n_per_arm,
            plan.total()
        )),
        OutputFormat::Json => {
            let mut json = JsonOutput::new();
            json.set_plan(spec, plan);
            Ok(json.to_json()? + "\n")
        }
        OutputFormat::Csv => Ok(format!(
            "field,value\nrequired_n_per_arm,{}\ntotal_n,{}\ntreatment_rate,{}\npooled_rate,{}\n",
            plan.required_n_per_arm,
            plan.total(),
            plan.treatment_rate,
            plan.pooled_rate
        )),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Plan {
            baseline_rate,
            mde,
            power,
            alpha,
            output,
        } => {
            let config = override_config(config, alpha, power)?;
            let spec = SampleSizeSpec::with_config(baseline_rate, mde, &config);
            let plan = SampleSizePlanner::plan(&spec).context("Sample size planning failed")?;
            emit(&output, &render_plan(output.format, spec, &plan)?)
        }
        Command::Analyze {
            control,
            treatment,
            metric,
            alpha,
            output,
        } => {
            let config = override_config(config, alpha, None)?;
            let analyzer = ABTestAnalyzer::from_config(&config)?;
            let result = analyzer
                .analyze(&read_sample(&control)?, &read_sample(&treatment)?)
                .context("A/B analysis failed")?;
            let result = ExperimentResult::new("ab_test", metric, result);
            emit(&output, &render_results(output.format, vec![result])?)
        }
        Command::Experiment {
            name,
            description,
            assignments,
            observations,
            metric,
            control_name,
            treatment_name,
            alpha,
            output,
        } => {
            if control_name == treatment_name {
                bail!(
                    "--control-name and --treatment-name must differ (both are '{}')",
                    control_name
                );
            }

            let config = override_config(config, alpha, None)?;
            let mut exp_config = ExperimentConfig::new(name)
                .with_description(description.unwrap_or_default())
                .with_significance_level(config.significance_level);
            exp_config.control_name = control_name;
            exp_config.treatment_name = treatment_name;

            let rows = input::parse_assignments(&read_file(&assignments)?)
                .with_context(|| format!("Failed to parse {}", assignments.display()))?;
            let observed = input::parse_observations(&read_file(&observations)?)
                .with_context(|| format!("Failed to parse {}", observations.display()))?;
            let experiment = Experiment::from_assignments(exp_config, rows)?;

            let rendered = match metric {
                Some(metric) => {
                    if !experiment.metrics(&observed).contains(&metric) {
                        bail!(
                            "No observations of metric '{}' in experiment '{}'",
                            metric,
                            experiment.name()
                        );
                    }
                    let result = experiment
                        .analyze(&metric, &observed, &config)
                        .with_context(|| format!("Failed to analyze metric {}", metric))?;
                    render_results(output.format, vec![result])?
                }
                None => render_assessment(
                    output.format,
                    assess_experiment(&experiment, &observed, &config)?,
                )?,
            };
            emit(&output, &rendered)
        }
        Command::Simulate {
            users,
            baseline_rate,
            effect,
            seed,
            alpha,
            output,
        } => {
            let config = override_config(config, alpha, None)?;
            let spec = SimulationSpec {
                users,
                baseline_rate,
                effect,
                seed,
            };
            let result = run_simulation(&spec, &ABTestAnalyzer::from_config(&config)?)
                .context("Simulated experiment failed")?;
            let result = ExperimentResult::new("simulated_conversion", "conversion", result);
            emit(&output, &render_results(output.format, vec![result])?)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(cli.debug);

    run(cli)
}
