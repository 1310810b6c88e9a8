use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    launch::{self, LaunchArgs},
    print_args::{self, PrintArgsArgs},
    render::{self, RenderArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "exlauncher", about = "Launch experiments locally or through Slurm")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every experiment of a launch file.
    Launch(LaunchArgs),
    /// Print the submission script of one experiment.
    Render(RenderArgs),
    /// Print the serialized arguments of one experiment.
    Args(PrintArgsArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Launch(args) => launch::run(&args),
        Command::Render(args) => render::run(&args),
        Command::Args(args) => print_args::run(&args),
    }
}
