//! lzframe CLI - streaming LZ4 frame decoder
//!
//! Decodes files in the LZ4 frame format, inspects their headers and checks
//! their integrity without writing output.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_cat, cmd_info, cmd_test};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "lzframe")]
#[command(author, version, about = "Streaming LZ4 frame decoder")]
#[command(long_about = "
lzframe decodes the LZ4 frame format block by block, holding only one
block in memory at a time.

Examples:
  lzframe cat data.lz4 > data
  lzframe cat data.lz4 -o data --progress
  lzframe info data.lz4 --json
  lzframe test data.lz4 --strict
  cat data.lz4 | lzframe cat -
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level (trace, debug, info, warn, error); overrides -v
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a frame to stdout or a file
    #[command(alias = "d")]
    Cat {
        /// Frame file to decode ("-" for stdin)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject reserved bits and verify the header checksum
        #[arg(long)]
        strict: bool,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Show the frame header
    #[command(alias = "i")]
    Info {
        /// Frame file to inspect ("-" for stdin)
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Decode a frame and discard the output, verifying all checksums
    #[command(alias = "t")]
    Test {
        /// Frame file to test ("-" for stdin)
        input: PathBuf,

        /// Reject reserved bits and verify the header checksum
        #[arg(long)]
        strict: bool,
    },
}

/// Pick the log level from `--log-level` or the `-v` count.
fn log_level(verbose: u8, explicit: Option<&str>) -> Result<Level, Box<dyn std::error::Error>> {
    if let Some(name) = explicit {
        return Ok(name.to_lowercase().parse::<Level>()?);
    }
    Ok(match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    })
}

fn init_logging(level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = log_level(cli.verbose, cli.log_level.as_deref())
        .and_then(init_logging)
        .and_then(|()| match cli.command {
            Commands::Cat {
                input,
                output,
                strict,
                progress,
            } => cmd_cat(&input, output.as_deref(), strict, progress),
            Commands::Info { input, json } => cmd_info(&input, json),
            Commands::Test { input, strict } => cmd_test(&input, strict),
        });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
