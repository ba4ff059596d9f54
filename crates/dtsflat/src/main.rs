//! dtsflat CLI - TEI to static DTS converter.
//!
//! Provides commands for:
//! - `convert`: Segment a TEI document and write fragment and navigation artifacts

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::ConvertArgs;
use output::Output;

/// dtsflat - static DTS artifacts from TEI documents.
#[derive(Parser)]
#[command(name = "dtsflat", version, about)]
struct Cli {
    /// Log level (overrides RUST_LOG).
    #[arg(short, long, global = true, value_enum, ignore_case = true)]
    log: Option<LogLevel>,

    /// Enable INFO logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a TEI document into fragment and navigation artifacts.
    Convert(ConvertArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// Log filter: `--log` wins, `--verbose` enables INFO, otherwise `RUST_LOG`
/// or WARN.
fn env_filter(log: Option<LogLevel>, verbose: bool) -> EnvFilter {
    match (log, verbose) {
        (Some(level), _) => EnvFilter::new(level.directive()),
        (None, true) => EnvFilter::new("info"),
        (None, false) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.log, cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
