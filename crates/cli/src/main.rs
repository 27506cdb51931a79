//! Tidemark CLI - tidemark command

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cmd;
mod util;

use util::TargetArgs;

/// Tidemark - list files that are new since the last checkpoint
#[derive(Parser)]
#[command(name = "tidemark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files modified after the stored checkpoint
    List {
        #[command(flatten)]
        target: TargetArgs,

        /// Print records with modification times as JSON
        #[arg(long)]
        json: bool,

        /// Commit a new checkpoint after printing the list
        #[arg(long)]
        commit: bool,
    },
    /// Advance the checkpoint without listing
    Commit {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show the stored checkpoint
    Show {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print an example configuration file
    Example,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match util::init_logging(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::List { target, json, commit } => cmd::list::run(&target, json, commit),
        Commands::Commit { target } => cmd::commit::run(&target),
        Commands::Show { target } => cmd::show::run(&target),
        Commands::Example => cmd::example::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            util::exit_code_for(&e)
        }
    }
}
