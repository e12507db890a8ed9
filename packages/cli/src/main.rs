mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, init, preview, render, validate, ApplyArgs, InitArgs, PreviewArgs, RenderArgs, ValidateArgs};
use tracing_subscriber::EnvFilter;

/// Blockmail CLI - render, preview and check block-based email documents
#[derive(Parser, Debug)]
#[command(name = "blockmail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a blockmail.config.json and a starter document
    Init(InitArgs),

    /// Render a document to sendable HTML
    Render(RenderArgs),

    /// Render a personalized preview with offers resolved
    Preview(PreviewArgs),

    /// Check a document's block tree for structural problems
    Validate(ValidateArgs),

    /// Apply a list of editor mutations to a document and save it
    Apply(ApplyArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(cwd) => match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Render(args) => render(args, &cwd),
            Command::Preview(args) => preview(args, &cwd).await,
            Command::Validate(args) => validate(args, &cwd),
            Command::Apply(args) => apply(args, &cwd),
        },
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
