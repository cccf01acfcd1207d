//! Explainer CLI - annotated code walkthroughs.
//!
//! Provides commands for:
//! - `render`: Render annotated markdown to JSON without storing it
//! - `create`: Render and store an explainer, printing its id
//! - `list`: List stored explainers
//! - `show`: Print a stored explainer as JSON

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CreateArgs, ListArgs, RenderArgs, ShowArgs};
use output::Output;

/// Explainer - annotated code walkthroughs.
#[derive(Parser)]
#[command(name = "explainer", version, about)]
struct Cli {
    /// Enable verbose output (pipeline and store logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render annotated markdown and print the result as JSON.
    Render(RenderArgs),
    /// Render and store an explainer.
    Create(CreateArgs),
    /// List stored explainers.
    List(ListArgs),
    /// Print a stored explainer as JSON.
    Show(ShowArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Create(args) => args.execute(),
        Commands::List(args) => args.execute(),
        Commands::Show(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
