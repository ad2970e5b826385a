use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gisfire", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides [logging] level)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// TOML configuration file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match firefighter reports to the strikes that caused them
    Match(MatchArgs),
    /// Build example files from the data API
    Fill {
        #[command(subcommand)]
        command: FillCommands,
    },
    /// Train and evaluate the ignition classifier
    Learn {
        #[command(subcommand)]
        command: LearnCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Data API connection. Flags win over the environment, which wins over
/// the [api] section of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ApiArgs {
    /// Data API base URL, e.g. https://example.org/api/v1
    #[arg(short = 'H', long, env = "GISFIRE_HOST")]
    pub host: Option<String>,
    /// Data API user
    #[arg(short, long, env = "GISFIRE_USERNAME")]
    pub username: Option<String>,
    /// Data API token
    #[arg(short, long, env = "GISFIRE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    #[command(flatten)]
    pub api: ApiArgs,
    /// Firefighter reports CSV
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub firefighters: PathBuf,
    /// Matched lightnings CSV to write
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
    /// Largest accepted spatiotemporal distance
    #[arg(long)]
    pub max_distance: Option<f64>,
    /// Seconds per unit of the time axis
    #[arg(long)]
    pub time_divisor: Option<f64>,
    /// Days searched before each report, its own day included
    #[arg(long)]
    pub window_days: Option<u32>,
    /// UTC offset of report times, in hours
    #[arg(long, allow_negative_numbers = true)]
    pub utc_offset_hours: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum FillCommands {
    /// Feature rows for matched strikes
    Positive {
        #[command(flatten)]
        api: ApiArgs,
        /// Matched lightnings CSV
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        matched: PathBuf,
        /// Example CSV to write
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },
    /// Ground strikes from the days of the positive examples
    Negative {
        #[command(flatten)]
        api: ApiArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Positive examples CSV
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        positives: PathBuf,
        /// Example CSV to write
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },
    /// Ground strikes from days without any fire
    OtherNegative {
        #[command(flatten)]
        api: ApiArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Positive examples CSV
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        positives: PathBuf,
        /// Example CSV to write
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// First day searched (inclusive)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day searched (exclusive)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Days with fewer ground strikes are skipped
        #[arg(long)]
        min_strikes_per_day: Option<usize>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SamplingArgs {
    /// Shuffle seed
    #[arg(long)]
    pub seed: Option<u64>,
    /// Negatives per positive example
    #[arg(long)]
    pub per_example: Option<usize>,
}

/// The three example files.
#[derive(Args, Debug, Clone)]
pub struct ExampleFiles {
    /// Positive examples CSV
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub positive_file: PathBuf,
    /// Negative examples from the days of the positives
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub negative_file: PathBuf,
    /// Negative examples from days without fire
    #[arg(short = 'o', long, value_hint = ValueHint::FilePath)]
    pub negative_other_file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum LearnCommands {
    /// Fit on the training split and report the test confusion matrix
    Fit {
        #[command(flatten)]
        files: ExampleFiles,
        /// Split seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write the model and scores as JSON
        #[arg(long, value_hint = ValueHint::FilePath)]
        report: Option<PathBuf>,
    },
    /// Cross-validate while subsampling the negatives
    Study {
        #[command(flatten)]
        files: ExampleFiles,
        /// Results CSV to write
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        results_file: PathBuf,
        /// Split seed
        #[arg(long)]
        seed: Option<u64>,
        /// Largest subsampling step
        #[arg(long)]
        max_step: Option<usize>,
        /// Cross-validation folds
        #[arg(long)]
        folds: Option<usize>,
    },
    /// Absolute correlation matrix of the model columns
    Correlation {
        #[command(flatten)]
        files: ExampleFiles,
        /// Matrix CSV to write
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        results_file: PathBuf,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
