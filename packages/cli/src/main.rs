mod commands;
mod config;
mod project;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, init, parse, serialize, sync, CheckArgs, InitArgs, ParseArgs, SerializeArgs, SyncArgs,
};
use tracing_subscriber::EnvFilter;

/// Drafter CLI - keep a design document and its JSX source in step
#[derive(Parser, Debug)]
#[command(name = "drafter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Drafter project
    Init(InitArgs),

    /// Print the source module for a document tree
    Serialize(SerializeArgs),

    /// Parse a source module back into elements
    Parse(ParseArgs),

    /// Verify that every tree in a snapshot survives a source round trip
    Check(CheckArgs),

    /// Mirror a document into a buffer directory and pull edits back
    Sync(SyncArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Serialize(args) => serialize(args, &cwd),
        Command::Parse(args) => parse(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Sync(args) => sync(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
