//! Play command - perfect agent against the random agent
//!
//! Sanity check for the calibration opponents: the perfect agent must never
//! lose, whichever mark it plays.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use coevo_core::{play_game, Mark, PerfectAgent, RandomAgent};
use coevo_tournament::GameTally;

#[derive(Args)]
pub struct PlayArgs {
    /// Games per role
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Print the final board of the first game in each role
    #[arg(long)]
    pub show_board: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Perfect agent results from its own point of view
#[derive(Debug, Default, Serialize)]
struct PlayReport {
    games_per_role: usize,
    perfect_as_x: GameTally,
    perfect_as_o: GameTally,
}

pub fn run(args: PlayArgs, seed: u64) -> Result<()> {
    tracing::info!("Playing perfect vs random: {} games per role", args.games);

    let report = play_both_roles(&args, seed);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    let losses = report.perfect_as_x.losses + report.perfect_as_o.losses;
    if losses > 0 {
        anyhow::bail!("perfect agent lost {} games", losses);
    }
    Ok(())
}

fn play_both_roles(args: &PlayArgs, seed: u64) -> PlayReport {
    let mut perfect = PerfectAgent::new();
    let mut report = PlayReport {
        games_per_role: args.games,
        ..Default::default()
    };

    for game in 0..args.games as u64 {
        let mut random = RandomAgent::with_seed(seed.wrapping_add(2 * game));
        let record = play_game(&mut perfect, &mut random);
        report.perfect_as_x.record(record.outcome, Mark::X);
        if args.show_board && game == 0 {
            println!("Perfect (X) vs Random (O): {:?}\n{}\n", record.outcome, record.board);
        }

        let mut random = RandomAgent::with_seed(seed.wrapping_add(2 * game + 1));
        let record = play_game(&mut random, &mut perfect);
        report.perfect_as_o.record(record.outcome, Mark::O);
        if args.show_board && game == 0 {
            println!("Random (X) vs Perfect (O): {:?}\n{}\n", record.outcome, record.board);
        }
    }
    report
}

fn print_table(report: &PlayReport) {
    println!("\n=== Perfect vs Random ({} games per role) ===", report.games_per_role);
    println!("{:<12} {:>6} {:>6} {:>6}", "Perfect as", "Wins", "Draws", "Losses");
    for (role, tally) in [("X", &report.perfect_as_x), ("O", &report.perfect_as_o)] {
        println!("{:<12} {:>6} {:>6} {:>6}", role, tally.wins, tally.draws, tally.losses);
    }
}
