//! Coevolution command - hosts (X) against parasites (O)
//!
//! Two search drivers run on their own threads. Each publishes its
//! generation updates to the other side's evaluator, which rebuilds its
//! parasite snapshot from them.

use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;

use coevo_core::Mark;
use coevo_evolve::{EvolutionConfig, GenerationStats, GenerationalSearch, NetworkDecoder, NetworkGenome};
use coevo_tournament::{
    pair_host_parasite, CalibrationReport, GenomeDecoder, HostParasiteConfig, HostParasiteEvaluator, ListEvaluator,
    MatchEvaluator, MatchScoring, ParallelConfig,
};

use crate::evolve::{print_report, report_champion};

#[derive(Args)]
pub struct CoevolveArgs {
    /// Population size (each side)
    #[arg(long, default_value = "50")]
    pub population: usize,

    /// Generations per side
    #[arg(long, default_value = "100")]
    pub generations: u64,

    /// Hidden neurons per network
    #[arg(long, default_value = "9")]
    pub hidden: usize,

    /// Target species count for k-means speciation
    #[arg(long, default_value = "5")]
    pub species: usize,

    /// Parasites in each snapshot
    #[arg(long, default_value = "8")]
    pub parasites: usize,

    /// Hall-of-fame opponents sampled per evaluation
    #[arg(long, default_value = "8")]
    pub champions: usize,

    /// Worker threads per side (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one side's run
#[derive(Debug, Serialize)]
struct SideSummary {
    mark: Mark,
    generations_run: u64,
    evaluations: u64,
    hall_of_fame: usize,
    history: Vec<GenerationStats>,
    champion: Option<NetworkGenome>,
    champion_report: Option<CalibrationReport>,
}

#[derive(Debug, Serialize)]
struct CoevolutionSummary {
    hosts: SideSummary,
    parasites: SideSummary,
    /// Host champion (X) against parasite champion (O)
    final_game: Option<coevo_core::MatchOutcome>,
}

/// Run coevolution command
pub fn run(args: CoevolveArgs, seed: u64) -> Result<()> {
    tracing::info!(
        "Starting coevolution: pop={}, gen={}, parasites={}, champions={}",
        args.population,
        args.generations,
        args.parasites,
        args.champions
    );

    let host_config = HostParasiteConfig {
        parasite_count: args.parasites,
        champion_count: args.champions,
        host_mark: Mark::X,
        seed,
        parallel: ParallelConfig {
            max_threads: args.threads,
        },
        ..Default::default()
    };
    let (host_eval, parasite_eval) = pair_host_parasite(host_config, NetworkDecoder, NetworkDecoder)
        .context("Failed to build host-parasite evaluators")?;

    let evolution = EvolutionConfig {
        population_size: args.population,
        hidden: args.hidden,
        species_count: args.species,
        ..Default::default()
    };
    let mut host_search = GenerationalSearch::new(evolution.with_seed(seed));
    let mut parasite_search = GenerationalSearch::new(evolution.with_seed(seed.wrapping_add(1)));
    host_search.subscribe(parasite_eval.subscribe());
    parasite_search.subscribe(host_eval.subscribe());

    let (hosts, parasites) = thread::scope(|scope| -> Result<_> {
        let host_side = spawn_side(scope, "hosts", host_search, host_eval, args.generations)?;
        let parasite_side = spawn_side(scope, "parasites", parasite_search, parasite_eval, args.generations)?;
        let hosts = host_side.join().map_err(|_| anyhow!("host driver panicked"))?;
        let parasites = parasite_side.join().map_err(|_| anyhow!("parasite driver panicked"))?;
        Ok((hosts, parasites))
    })?;

    let summary = summarize(hosts, parasites, seed);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

type SideResult = (GenerationalSearch, HostParasiteEvaluator<NetworkGenome, NetworkDecoder>, u64);

fn spawn_side<'scope>(
    scope: &'scope thread::Scope<'scope, '_>,
    name: &str,
    mut search: GenerationalSearch,
    mut evaluator: HostParasiteEvaluator<NetworkGenome, NetworkDecoder>,
    generations: u64,
) -> Result<thread::ScopedJoinHandle<'scope, SideResult>> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn_scoped(scope, move || {
            let steps = search.run(&mut evaluator, generations);
            (search, evaluator, steps)
        })
        .with_context(|| format!("Failed to spawn {} driver", name))
}

fn summarize(hosts: SideResult, parasites: SideResult, seed: u64) -> CoevolutionSummary {
    let final_game = match (hosts.0.champion(), parasites.0.champion()) {
        (Some(host), Some(parasite)) => play_champions(&host.genome, &parasite.genome),
        _ => None,
    };
    CoevolutionSummary {
        hosts: side_summary(hosts, seed),
        parasites: side_summary(parasites, seed),
        final_game,
    }
}

fn side_summary((search, evaluator, generations_run): SideResult, seed: u64) -> SideSummary {
    let champion = search.champion();
    SideSummary {
        mark: evaluator.config().host_mark,
        generations_run,
        evaluations: evaluator.evaluation_count(),
        hall_of_fame: evaluator.hall_of_fame().len(),
        history: search.history().to_vec(),
        champion: champion.map(|c| c.genome.clone()),
        champion_report: champion.and_then(|c| report_champion(&c.genome, seed)),
    }
}

fn play_champions(host: &NetworkGenome, parasite: &NetworkGenome) -> Option<coevo_core::MatchOutcome> {
    let mut host = NetworkDecoder.decode(host)?;
    let mut parasite = NetworkDecoder.decode(parasite)?;
    let matches = MatchEvaluator::new(MatchScoring::default(), Mark::X);
    Some(matches.play(&mut host, &mut parasite))
}

fn print_summary(summary: &CoevolutionSummary) {
    println!("\n=== Coevolution Complete ===");
    for (label, side) in [("Hosts", &summary.hosts), ("Parasites", &summary.parasites)] {
        println!(
            "{} ({:?}): {} generations, {} matches, hall of fame {}",
            label, side.mark, side.generations_run, side.evaluations, side.hall_of_fame
        );
        if let Some(best) = side.history.last() {
            println!("  Last generation: best={:.3}, avg={:.3}", best.best, best.average);
        }
        if let Some(report) = &side.champion_report {
            print_report("  Champion", report);
        }
    }
    if let Some(outcome) = summary.final_game {
        println!("Host champion vs parasite champion: {:?}", outcome);
    }
}
