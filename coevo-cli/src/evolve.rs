//! Evolution command - evolve one population of networks
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_evaluator(), run_evolution(), report_champion()
//! - Level 3: evaluator constructors
//! - Level 4: argument types, formatting

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use coevo_evolve::{EvolutionConfig, GenerationStats, GenerationalSearch, NetworkDecoder, NetworkGenome};
use coevo_tournament::{
    calibrate, BaselineConfig, BaselineEvaluator, CalibrationReport, GenomeDecoder, HallOfFameConfig,
    HallOfFameEvaluator, ListEvaluator, ParallelConfig, RoundRobinConfig, RoundRobinEvaluator,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluatorKind {
    /// Every genome against every other genome
    RoundRobin,
    /// Round robin plus games against past champions
    HallOfFame,
    /// Games against the random and perfect agents
    Baseline,
}

#[derive(Args)]
pub struct EvolveArgs {
    /// Fitness evaluator
    #[arg(long, value_enum, default_value = "round-robin")]
    pub evaluator: EvaluatorKind,

    /// Population size
    #[arg(long, default_value = "50")]
    pub population: usize,

    /// Maximum number of generations
    #[arg(long, default_value = "100")]
    pub generations: u64,

    /// Hidden neurons per network
    #[arg(long, default_value = "9")]
    pub hidden: usize,

    /// Target species count for k-means speciation
    #[arg(long, default_value = "5")]
    pub species: usize,

    /// Number of elite individuals to preserve
    #[arg(long, default_value = "2")]
    pub elitism: usize,

    /// Worker threads (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Generations between hall-of-fame additions
    #[arg(long, default_value = "10")]
    pub hof_interval: u64,

    /// Share of fitness from hall-of-fame games (0.0-1.0)
    #[arg(long, default_value = "0.5")]
    pub hof_weight: f64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything printed at the end of a run
#[derive(Debug, Serialize)]
struct EvolutionSummary {
    evaluator: EvaluatorKind,
    generations_run: u64,
    evaluations: u64,
    best_fitness: f64,
    history: Vec<GenerationStats>,
    champion: Option<NetworkGenome>,
    champion_report: Option<CalibrationReport>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// 1. Build the search configuration and the chosen evaluator
/// 2. Run generations until the budget or the stop condition
/// 3. Calibrate the champion against the fixed agents
/// 4. Print the summary
pub fn run(args: EvolveArgs, seed: u64) -> Result<()> {
    let config = build_evolution_config(&args, seed);
    tracing::info!(
        "Starting evolution: evaluator={:?}, pop={}, gen={}, hidden={}",
        args.evaluator,
        args.population,
        args.generations,
        args.hidden
    );

    let mut evaluator = build_evaluator(&args, seed)?;
    let mut search = GenerationalSearch::new(config);
    let generations_run = search.run(evaluator.as_mut(), args.generations);

    let summary = summarize(&args, &search, evaluator.as_ref(), generations_run, seed);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

pub(crate) fn build_evolution_config(args: &EvolveArgs, seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: args.population,
        hidden: args.hidden,
        species_count: args.species,
        elitism: args.elitism,
        seed,
        ..Default::default()
    }
}

fn build_evaluator(args: &EvolveArgs, seed: u64) -> Result<Box<dyn ListEvaluator<NetworkGenome> + Send>> {
    let parallel = ParallelConfig {
        max_threads: args.threads,
    };

    let evaluator: Box<dyn ListEvaluator<NetworkGenome> + Send> = match args.evaluator {
        EvaluatorKind::RoundRobin => Box::new(round_robin(parallel)?),
        EvaluatorKind::HallOfFame => {
            let config = HallOfFameConfig::new(args.hof_interval, args.hof_weight).with_parallel(parallel);
            // The wrapper runs its champion games on the round robin's pool.
            let inner = round_robin(parallel)?;
            let hof = HallOfFameEvaluator::<NetworkGenome, _, _>::new(config, inner, NetworkDecoder)
                .context("Invalid hall-of-fame settings")?;
            Box::new(hof)
        }
        EvaluatorKind::Baseline => {
            let config = BaselineConfig::default().with_seed(seed).with_parallel(parallel);
            Box::new(BaselineEvaluator::new(config, NetworkDecoder)?)
        }
    };
    Ok(evaluator)
}

fn summarize(
    args: &EvolveArgs,
    search: &GenerationalSearch,
    evaluator: &dyn ListEvaluator<NetworkGenome>,
    generations_run: u64,
    seed: u64,
) -> EvolutionSummary {
    let champion = search.champion();
    EvolutionSummary {
        evaluator: args.evaluator,
        generations_run,
        evaluations: evaluator.evaluation_count(),
        best_fitness: champion.map_or(0.0, |c| c.fitness.primary),
        history: search.history().to_vec(),
        champion: champion.map(|c| c.genome.clone()),
        champion_report: champion.and_then(|c| report_champion(&c.genome, seed)),
    }
}

/// Champion against the calibration agents, with the baseline game counts
pub(crate) fn report_champion(genome: &NetworkGenome, seed: u64) -> Option<CalibrationReport> {
    let config = BaselineConfig::default();
    let mut phenome = NetworkDecoder.decode(genome)?;
    Some(calibrate(
        &mut phenome,
        config.random_games_per_side,
        config.perfect_games_per_side,
        seed,
    ))
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn round_robin(parallel: ParallelConfig) -> Result<RoundRobinEvaluator<NetworkDecoder>> {
    let config = RoundRobinConfig::default().with_parallel(parallel);
    RoundRobinEvaluator::new(config, NetworkDecoder).context("Failed to build round-robin evaluator")
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn print_summary(summary: &EvolutionSummary) {
    println!("\n=== Evolution Complete ===");
    println!("Evaluator:   {:?}", summary.evaluator);
    println!("Generations: {}", summary.generations_run);
    println!("Matches:     {}", summary.evaluations);
    println!("Best fitness: {:.3}", summary.best_fitness);
    if let Some(report) = &summary.champion_report {
        print_report("Champion", report);
    }
}

pub(crate) fn print_report(label: &str, report: &CalibrationReport) {
    let random = report.vs_random();
    let perfect = report.vs_perfect();
    println!("{} vs Random:  {}W/{}D/{}L", label, random.wins, random.draws, random.losses);
    println!("{} vs Perfect: {}W/{}D/{}L", label, perfect.wins, perfect.draws, perfect.losses);
}
