//! Committee CLI - run, replay and verify portfolio committee decisions.
//!
//! Loads the four input documents from disk, hashes the config files as
//! loaded, and hands everything to the runtime. The decision packet goes to
//! stdout as JSON; logs go to stderr.
//!
//! Exit codes: `0` COMPLETED, `2` FAILED, `3` VETOED, `4` SHORT_CIRCUITED,
//! `1` for I/O errors, replay divergence and hash mismatches.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod inputs;

use inputs::InputArgs;

#[derive(Parser)]
#[command(name = "committee")]
#[command(about = "Deterministic investment committee governance runs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one run and print its packet
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Also write the run log to this file
        #[arg(long, env = "COMMITTEE_RUN_LOG")]
        run_log: Option<PathBuf>,

        /// Write the packet here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the same inputs several times and compare hashes
    Replay {
        #[command(flatten)]
        inputs: InputArgs,

        /// Number of runs
        #[arg(long, default_value_t = 3)]
        times: usize,
    },

    /// Check a run's hash against a recorded one
    Verify {
        #[command(flatten)]
        inputs: InputArgs,

        /// Run hash recorded for these inputs
        #[arg(long, env = "COMMITTEE_EXPECTED_RUN_HASH")]
        expected_run_hash: String,
    },

    /// Print the canonical hash of a JSON document
    Hash {
        /// JSON file to hash
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Run {
            inputs,
            run_log,
            output,
        } => commands::run(&inputs, run_log.as_deref(), output.as_deref()),
        Commands::Replay { inputs, times } => commands::replay(&inputs, times),
        Commands::Verify {
            inputs,
            expected_run_hash,
        } => commands::verify(&inputs, &expected_run_hash),
        Commands::Hash { file } => commands::hash(&file),
    }
}
