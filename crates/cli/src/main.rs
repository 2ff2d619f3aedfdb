//! attrenc launcher
//!
//! Runs one encode → split → train → evaluate pass over a tabular dataset and
//! prints the accuracy summary and per-record results.

use anyhow::{Context, Result};
use attrenc_core::{
    AttributeTypes, InferenceScope, MajorityClassLearner, Pipeline, ProblemPreset, RunConfig,
    RunReport, TrainingParams, UnseenCategoryPolicy,
};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "attrenc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encode a tabular dataset, train a model and score it", long_about = None)]
struct Args {
    /// Known dataset layout
    #[arg(long, value_enum, default_value = "heart")]
    problem: Problem,

    /// Dataset CSV path (header row, last column is the label)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// TOML configuration file layered under the flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat every column as categorical, ignoring the preset layout
    #[arg(long, conflicts_with = "continuous")]
    all_categorical: bool,

    /// Comma-separated continuous column indices; every other column is categorical
    #[arg(long, value_delimiter = ',')]
    continuous: Option<Vec<usize>>,

    /// Problem number echoed in the report [default: 1]
    #[arg(short = 'i')]
    problem_number: Option<u32>,

    /// Lazy-training multiplier [default: 1]
    #[arg(short = 'j')]
    lazy_multiplier: Option<u64>,

    /// Backpropagation multiplier [default: 1]
    #[arg(short = 'k')]
    backprop_multiplier: Option<u64>,

    /// Seed for the train/test split
    #[arg(long)]
    seed: Option<u64>,

    /// Training share of the dataset
    #[arg(long)]
    split_ratio: Option<f64>,

    /// Derive encoders from training rows only
    #[arg(long)]
    train_only_inference: bool,

    /// Encode unseen feature values as all-zero blocks instead of failing
    #[arg(long)]
    zero_unseen: bool,

    /// Write the per-record CSV here instead of stdout
    #[arg(long)]
    results: Option<PathBuf>,

    /// Also write the full report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Problem {
    Heart,
    BreastCancer,
}

impl From<Problem> for ProblemPreset {
    fn from(problem: Problem) -> Self {
        match problem {
            Problem::Heart => ProblemPreset::Heart,
            Problem::BreastCancer => ProblemPreset::BreastCancer,
        }
    }
}

impl Args {
    /// Flags win over the config file and environment. Flags left out keep
    /// whatever the lower layers set.
    fn resolve_config(&self) -> Result<RunConfig> {
        let base = RunConfig::for_preset(ProblemPreset::from(self.problem));
        let mut config = RunConfig::load(&base, self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(problem_number) = self.problem_number {
            config.problem_number = problem_number;
        }
        if let Some(j) = self.lazy_multiplier {
            let scaled = TrainingParams::from_multipliers(j, 1);
            config.params.information_gain_train_iterations =
                scaled.information_gain_train_iterations;
            config.params.lazy_train_inner_train_iterations =
                scaled.lazy_train_inner_train_iterations;
            config.params.lazy_train_maximum_tries = scaled.lazy_train_maximum_tries;
        }
        if let Some(k) = self.backprop_multiplier {
            config.params.backpropagation_iterations =
                TrainingParams::from_multipliers(1, k).backpropagation_iterations;
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        }
        if let Some(dataset) = &self.dataset {
            config.dataset_file = dataset.clone();
        }
        if self.all_categorical {
            config.attribute_types = AttributeTypes::AllCategorical;
        }
        if let Some(continuous) = &self.continuous {
            config.attribute_types = AttributeTypes::ContinuousSubset {
                continuous: continuous.clone(),
            };
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(ratio) = self.split_ratio {
            config.split_ratio = ratio;
        }
        if self.train_only_inference {
            config.inference_scope = InferenceScope::TrainOnly;
        }
        if self.zero_unseen {
            config.unseen_category = UnseenCategoryPolicy::ZeroVector;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn init_logging(config: &RunConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn publish(report: &RunReport, args: &Args) -> Result<()> {
    for line in report.summary_lines() {
        info!("{}", line);
    }

    match &args.results {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            report.write_results_csv(BufWriter::new(file))?;
            info!("Results written to: {}", path.display());
        }
        None => report.write_results_csv(std::io::stdout().lock())?,
    }

    if let Some(path) = &args.report_json {
        std::fs::write(path, report.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Report written to: {}", path.display());
    }

    Ok(())
}

async fn run(args: &Args, config: RunConfig) -> Result<()> {
    info!("attrenc v{}", attrenc_core::VERSION);
    info!("═══════════════════════════════════════════");

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run(&mut MajorityClassLearner).await?;

    info!("═══════════════════════════════════════════");
    publish(&report, args)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("attrenc: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    match run(&args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Run failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_continuous_flag_overrides_preset() {
        let args = Args::try_parse_from([
            "attrenc",
            "--problem",
            "breast-cancer",
            "--continuous",
            "0,3",
            "--seed",
            "11",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();

        assert_eq!(
            config.attribute_types,
            AttributeTypes::ContinuousSubset {
                continuous: vec![0, 3]
            }
        );
        assert_eq!(config.seed, Some(11));
        assert_eq!(
            config.dataset_file,
            ProblemPreset::BreastCancer.dataset_file()
        );
    }

    #[test]
    fn test_args_parse_multipliers() {
        let args = Args::try_parse_from([
            "attrenc",
            "--problem",
            "breast-cancer",
            "-i",
            "2",
            "-j",
            "3",
            "-k",
            "2",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.problem_number, 2);
        assert_eq!(config.params.backpropagation_iterations, 4);
        assert_eq!(config.params.information_gain_train_iterations, 90);
        assert_eq!(config.params.lazy_train_maximum_tries, 9);
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const RUN_TOML: &str = "\
problem_number = 3
log_level = \"warn\"

[params]
backpropagation_iterations = 7
information_gain_train_iterations = 30
lazy_train_inner_train_iterations = 2
lazy_train_maximum_tries = 5
";

    #[test]
    fn test_explicit_flags_beat_config_file() {
        let file = write_config(RUN_TOML);
        let path = file.path().to_str().unwrap();

        let args =
            Args::try_parse_from(["attrenc", "-c", path, "-i", "2", "-k", "5", "-v"]).unwrap();
        let config = args.resolve_config().unwrap();

        assert_eq!(config.problem_number, 2);
        assert_eq!(config.params.backpropagation_iterations, 25);
        assert_eq!(config.log_level, "debug");
        // -j was not passed, so the file's lazy-training values stand
        assert_eq!(config.params.information_gain_train_iterations, 30);
        assert_eq!(config.params.lazy_train_inner_train_iterations, 2);
        assert_eq!(config.params.lazy_train_maximum_tries, 5);
    }

    #[test]
    fn test_omitted_flags_keep_config_file_values() {
        let file = write_config(RUN_TOML);
        let path = file.path().to_str().unwrap();

        let args = Args::try_parse_from(["attrenc", "-c", path]).unwrap();
        let config = args.resolve_config().unwrap();

        assert_eq!(config.problem_number, 3);
        assert_eq!(config.params.backpropagation_iterations, 7);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_continuous_conflicts_with_all_categorical() {
        let parsed = Args::try_parse_from(["attrenc", "--all-categorical", "--continuous", "0,1"]);
        assert!(parsed.is_err());
    }
}
