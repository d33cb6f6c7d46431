//! CLI entry point for the flight delay statistics tool.
//!
//! Provides subcommands for producing the delay report over a directory of
//! dated flight files and for listing which files a run would read.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use flight_delay_stats::analyzers::analyzer::analyze_dir;
use flight_delay_stats::loader::{FileMatcher, LoadOptions, discover_files};
use flight_delay_stats::output::{print_pretty, render_text, to_json, write_report};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "flight_delay_stats")]
#[command(about = "Descriptive statistics over historical flight delay data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, clean and aggregate every matching file, then print the report
    Report {
        /// Directory holding the YYYY_*.csv files
        #[arg(short = 'd', long, default_value = "Dataset")]
        data_dir: PathBuf,

        /// Only read files for this year (e.g., 2024)
        #[arg(short, long)]
        year: Option<u16>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of files read concurrently
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,
    },
    /// List the files a report would read
    ListFiles {
        /// Directory holding the YYYY_*.csv files
        #[arg(short = 'd', long, default_value = "Dataset")]
        data_dir: PathBuf,

        /// Only list files for this year
        #[arg(short, long)]
        year: Option<u16>,
    },
}

fn matcher_for(year: Option<u16>) -> FileMatcher {
    match year {
        Some(year) => FileMatcher::for_year(year),
        None => FileMatcher::any_year(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/flight_delay_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("flight_delay_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            data_dir,
            year,
            format,
            output,
            concurrency,
        } => {
            let options = LoadOptions {
                matcher: matcher_for(year),
                concurrency,
            };

            let (result, summary) = analyze_dir(&data_dir, &options)
                .await
                .with_context(|| format!("delay report over {} failed", data_dir.display()))?;
            print_pretty(&result);

            for file in &summary.files {
                info!(file = %file.path.display(), rows = file.rows, "Input file");
            }
            info!(
                rows_loaded = summary.rows_loaded,
                rows_dropped = summary.rows_dropped,
                rows_analyzed = summary.rows_analyzed,
                "Run summary"
            );

            let rendered = match format {
                Format::Text => render_text(&result),
                Format::Json => to_json(&result)? + "\n",
            };

            match output {
                Some(path) => write_report(&path, &rendered)?,
                None => print!("{rendered}"),
            }
        }
        Commands::ListFiles { data_dir, year } => {
            let matcher = matcher_for(year);
            let files = discover_files(&data_dir, &matcher)?;

            info!(total = files.len(), pattern = %matcher.describe(), "Matching files");
            for file in &files {
                info!(file = %file.display(), "File");
            }
        }
    }

    Ok(())
}
