//! `imcorr` command line: track features between two epoch images.

use clap::{Args, Parser, Subcommand, ValueEnum};
use imcorr::run::{report_path, track_config};
use imcorr::TrackConfig;
use log::LevelFilter;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    name = "imcorr",
    about = "Sub-pixel feature tracking between two raster epochs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tracking job described by a JSON config.
    Track(TrackArgs),
    /// Print the default config for a pair of images.
    Config(ConfigArgs),
}

#[derive(Args)]
struct TrackArgs {
    /// JSON tracking config.
    config: PathBuf,
    /// Report path; overrides `output_path` from the config.
    ///
    /// Relative to the working directory, while the config's own paths are
    /// relative to the config file.
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
    /// Emit JSON log lines (only with the `tracing` feature).
    #[arg(long)]
    json_log: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Args)]
struct ConfigArgs {
    earlier_image: String,
    later_image: String,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Track(args) => run_track(&args),
        Commands::Config(args) => print_config(args),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(args: &TrackArgs) -> CliResult<()> {
    imcorr::core::init_with_level(args.log_level.into())?;
    if args.json_log {
        log::warn!("--json-log needs the `tracing` feature; using plain output");
    }
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(args: &TrackArgs) -> CliResult<()> {
    let level = args.log_level.into();
    tracing_log::LogTracer::init_with_filter(level)?;
    imcorr::core::init_tracing(args.json_log, level);
    Ok(())
}

fn run_track(args: &TrackArgs) -> CliResult<()> {
    init_logging(args)?;
    let cfg = TrackConfig::load_json(&args.config)?;
    let report = track_config(&cfg, &args.config)?;

    let out = args
        .output
        .clone()
        .unwrap_or_else(|| report_path(&cfg, &args.config));
    report.write_json(&out)?;
    log::info!("report written to {}", out.display());

    match report.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_config(args: ConfigArgs) -> CliResult<()> {
    let cfg = TrackConfig {
        earlier_image: args.earlier_image,
        later_image: args.later_image,
        earlier_elevation: None,
        later_elevation: None,
        geometry: Default::default(),
        no_data: None,
        params: Default::default(),
        output_path: None,
    };
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
