//! COEVO CLI - Command-line interface
//!
//! Commands:
//! - play: Perfect agent against the random agent, both roles
//! - evolve: Evolve networks with a single-population evaluator
//! - coevolve: Host-parasite coevolution of two populations

mod coevolve;
mod evolve;
mod play;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coevo")]
#[command(about = "Coevolutionary tic-tac-toe tournaments")]
struct Cli {
    /// Seed for every random source
    #[arg(long, global = true, default_value = "42")]
    seed: u64,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the perfect agent against the random agent
    Play(play::PlayArgs),
    /// Evolve a single population
    Evolve(evolve::EvolveArgs),
    /// Coevolve hosts (X) against parasites (O)
    Coevolve(coevolve::CoevolveArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Evolve(args) => evolve::run(args, cli.seed),
        Commands::Coevolve(args) => coevolve::run(args, cli.seed),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
