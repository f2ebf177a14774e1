//! Integration tests for the coevolution stack
//!
//! Tests the full stack: game engine, calibration agents, evaluators and the
//! generational search driver.

use std::thread;

use coevo_core::{play_to_end, Board, Mark, MatchOutcome, PerfectAgent, RandomAgent};
use coevo_evolve::{EvolutionConfig, GenerationalSearch, NetworkDecoder, NetworkGenome};
use coevo_tournament::{
    calibrate, pair_host_parasite, BaselineConfig, BaselineEvaluator, FitnessScore, HallOfFameConfig,
    HallOfFameEvaluator, HostParasiteConfig, Individual, ListEvaluator, ParallelConfig, RoundRobinConfig,
    RoundRobinEvaluator,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn two_threads() -> ParallelConfig {
    ParallelConfig::with_threads(2)
}

fn small_evolution(population: usize, seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: population,
        hidden: 3,
        species_count: 2,
        seed,
        ..Default::default()
    }
}

fn random_population(n: usize, seed: u64) -> Vec<Individual<NetworkGenome>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| Individual::new(NetworkGenome::random(3, &mut rng)))
        .collect()
}

// ============================================================================
// GAME ENGINE
// ============================================================================

#[test]
fn test_board_fixture_has_no_winner() {
    let board: Board = "X|O|X\n_|X|_\nO|_|O".parse().unwrap();
    assert_eq!(board.winner(), None);
    assert_eq!(board.marks_placed(), 6);
}

#[test]
fn test_perfect_agent_is_unbeatable() {
    let mut perfect = PerfectAgent::new();
    for seed in 0..200 {
        let outcome = play_to_end(&mut perfect, &mut RandomAgent::with_seed(seed));
        assert!(!outcome.is_loss_for(Mark::X));
        let outcome = play_to_end(&mut RandomAgent::with_seed(seed), &mut perfect);
        assert!(!outcome.is_loss_for(Mark::O));
    }
    assert_eq!(play_to_end(&mut perfect, &mut PerfectAgent::new()), MatchOutcome::Draw);
}

// ============================================================================
// EVALUATORS
// ============================================================================

#[test]
fn test_round_robin_fitness_bounds() {
    let n = 6;
    let config = RoundRobinConfig::default().with_parallel(two_threads());
    let mut evaluator = RoundRobinEvaluator::new(config, NetworkDecoder).unwrap();
    let mut population = random_population(n, 1);
    evaluator.evaluate(&mut population);

    // Per game both sides together earn 2 (X win), 3 (draw) or 10 (O win).
    let games = (n * (n - 1)) as f64;
    let total: f64 = population.iter().map(|i| i.fitness.primary).sum();
    assert_eq!(evaluator.evaluation_count(), (n * (n - 1)) as u64);
    assert!(total >= 2.0 * games && total <= 10.0 * games, "total {}", total);
}

#[test]
fn test_malformed_genome_scores_zero() {
    let config = RoundRobinConfig::default().with_parallel(two_threads());
    let mut evaluator = RoundRobinEvaluator::new(config, NetworkDecoder).unwrap();
    let mut population = random_population(4, 2);
    population[2].genome.weights.truncate(3);
    evaluator.evaluate(&mut population);

    assert_eq!(population[2].fitness, FitnessScore::ZERO);
    assert_eq!(evaluator.evaluation_count(), 6);
}

#[test]
fn test_hall_of_fame_grows_during_search() {
    let inner = RoundRobinEvaluator::new(RoundRobinConfig::default().with_parallel(two_threads()), NetworkDecoder)
        .unwrap();
    let config = HallOfFameConfig::new(2, 0.5).with_parallel(two_threads());
    let mut evaluator = HallOfFameEvaluator::new(config, inner, NetworkDecoder).unwrap();
    let mut search = GenerationalSearch::new(small_evolution(6, 3));

    search.run(&mut evaluator, 6);

    // Champions are admitted at generations 2 and 4.
    assert_eq!(evaluator.hall_of_fame().len(), 2);
    assert!(evaluator.evaluation_count() > evaluator.inner().evaluation_count());
}

#[test]
fn test_baseline_calibrates_zero_network() {
    let mut network = coevo_tournament::GenomeDecoder::decode(&NetworkDecoder, &NetworkGenome::zeroed(2)).unwrap();
    let report = calibrate(&mut network, 10, 1, 7);

    assert_eq!(report.games(), 22);
    assert!(report.fitness(&BaselineConfig::default().scoring) < 1002.0);
}

#[test]
fn test_baseline_search_runs_to_budget() {
    let config = BaselineConfig {
        random_games_per_side: 2,
        ..Default::default()
    }
    .with_parallel(two_threads());
    let mut evaluator = BaselineEvaluator::new(config, NetworkDecoder).unwrap();
    let mut search = GenerationalSearch::new(small_evolution(5, 4));

    // Maximum fitness with two random games per side is 42, far below 1002.
    assert_eq!(search.run(&mut evaluator, 3), 3);
    assert!(!evaluator.stop_condition_satisfied());
    assert_eq!(evaluator.evaluation_count(), 3 * 5 * 6);
}

// ============================================================================
// HOST-PARASITE COEVOLUTION
// ============================================================================

#[test]
fn test_host_parasite_exchange_in_lockstep() {
    let config = HostParasiteConfig::new(2, 2).with_parallel(two_threads());
    let (mut host_eval, mut parasite_eval) = pair_host_parasite(config, NetworkDecoder, NetworkDecoder).unwrap();
    let mut hosts = GenerationalSearch::new(small_evolution(6, 5));
    let mut parasites = GenerationalSearch::new(small_evolution(6, 6));
    hosts.subscribe(parasite_eval.subscribe());
    parasites.subscribe(host_eval.subscribe());

    // First round: nobody has parasites yet.
    hosts.step(&mut host_eval);
    assert_eq!(host_eval.evaluation_count(), 0);
    parasites.step(&mut parasite_eval);

    // Second round: each side plays the other's snapshot plus its own champions.
    hosts.step(&mut host_eval);
    let snapshot = host_eval.parasite_snapshot().load();
    assert!(!snapshot.is_empty() && snapshot.len() <= 2);
    assert_eq!(host_eval.evaluation_count(), 6 * (snapshot.len() as u64 + 2));
    assert_eq!(host_eval.hall_of_fame().len(), 2);

    parasites.step(&mut parasite_eval);
    assert!(!parasite_eval.parasite_snapshot().load().is_empty());
}

#[test]
fn test_host_parasite_on_threads() {
    let config = HostParasiteConfig::new(3, 2).with_parallel(ParallelConfig::with_threads(1));
    let (host_eval, parasite_eval) = pair_host_parasite(config, NetworkDecoder, NetworkDecoder).unwrap();
    let mut hosts = GenerationalSearch::new(small_evolution(5, 7));
    let mut parasites = GenerationalSearch::new(small_evolution(5, 8));
    hosts.subscribe(parasite_eval.subscribe());
    parasites.subscribe(host_eval.subscribe());

    let (host_steps, parasite_steps) = thread::scope(|scope| {
        let mut host_eval = host_eval;
        let mut parasite_eval = parasite_eval;
        let h = scope.spawn(move || hosts.run(&mut host_eval, 4));
        let p = scope.spawn(move || parasites.run(&mut parasite_eval, 4));
        (h.join().unwrap(), p.join().unwrap())
    });

    assert_eq!(host_steps, 4);
    assert_eq!(parasite_steps, 4);
}
