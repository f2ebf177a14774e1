//! Baseline calibration: fitness against the fixed random and perfect agents
//!
//! Level 2 - Phase-level implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coevo_core::{play_to_end, Agent, DecisionFunction, Mark, NetworkAgent, PerfectAgent, RandomAgent};

use crate::config::{BaselineConfig, ScoringPolicy};
use crate::evaluator::{GenomeDecoder, ListEvaluator};
use crate::fitness::{FitnessScore, GameTally, Individual};
use crate::TournamentError;

/// Results of one phenome against both calibration agents, per side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub random_as_x: GameTally,
    pub random_as_o: GameTally,
    pub perfect_as_x: GameTally,
    pub perfect_as_o: GameTally,
}

impl CalibrationReport {
    pub fn vs_random(&self) -> GameTally {
        self.random_as_x.combine(&self.random_as_o)
    }

    pub fn vs_perfect(&self) -> GameTally {
        self.perfect_as_x.combine(&self.perfect_as_o)
    }

    pub fn games(&self) -> u64 {
        (self.vs_random().total_games() + self.vs_perfect().total_games()) as u64
    }

    /// Total points under `policy`
    pub fn fitness(&self, policy: &ScoringPolicy) -> f64 {
        self.vs_random().points(policy) + self.vs_perfect().points(policy)
    }
}

/// Play `phenome` against the random agent and the perfect agent, the given
/// number of games on each side. Random opponents are seeded from `seed`.
pub fn calibrate<P>(
    phenome: &mut P,
    random_games_per_side: usize,
    perfect_games_per_side: usize,
    seed: u64,
) -> CalibrationReport
where
    P: DecisionFunction + ?Sized,
{
    let mut report = CalibrationReport::default();
    let mut random = RandomAgent::with_seed(seed);
    let mut perfect = PerfectAgent::new();

    for _ in 0..random_games_per_side {
        play_both_sides(phenome, &mut random, &mut report.random_as_x, &mut report.random_as_o);
    }
    for _ in 0..perfect_games_per_side {
        play_both_sides(phenome, &mut perfect, &mut report.perfect_as_x, &mut report.perfect_as_o);
    }
    report
}

fn play_both_sides<P>(phenome: &mut P, opponent: &mut dyn Agent, as_x: &mut GameTally, as_o: &mut GameTally)
where
    P: DecisionFunction + ?Sized,
{
    let mut agent = NetworkAgent::new(&mut *phenome);
    as_x.record(play_to_end(&mut agent, opponent), Mark::X);
    as_o.record(play_to_end(opponent, &mut agent), Mark::O);
}

/// Scores each genome alone against the calibration agents.
///
/// Unlike the tournament evaluators, a genome's fitness does not depend on
/// the rest of the population. The stop condition latches once any genome
/// reaches `stop_fitness`.
pub struct BaselineEvaluator<D> {
    config: BaselineConfig,
    decoder: D,
    pool: Arc<ThreadPool>,
    evaluations: AtomicU64,
    rounds: u64,
    stop_reached: bool,
}

impl<D> BaselineEvaluator<D> {
    pub fn new(config: BaselineConfig, decoder: D) -> Result<Self, TournamentError> {
        config.scoring.validate()?;
        Ok(Self {
            config,
            decoder,
            pool: Arc::new(config.parallel.build_pool()?),
            evaluations: AtomicU64::new(0),
            rounds: 0,
            stop_reached: false,
        })
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Games played so far
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// True once any genome reached `stop_fitness`
    pub fn stop_condition_satisfied(&self) -> bool {
        self.stop_reached
    }

    /// Calibration report of a single genome, `None` if it does not decode
    pub fn report<G>(&self, genome: &G) -> Option<CalibrationReport>
    where
        D: GenomeDecoder<G>,
    {
        let mut phenome = self.decoder.decode(genome)?;
        let report = calibrate(
            &mut phenome,
            self.config.random_games_per_side,
            self.config.perfect_games_per_side,
            self.config.seed,
        );
        self.evaluations.fetch_add(report.games(), Ordering::Relaxed);
        Some(report)
    }
}

impl<G, D> ListEvaluator<G> for BaselineEvaluator<D>
where
    G: Sync,
    D: GenomeDecoder<G>,
{
    fn evaluate(&mut self, population: &mut [Individual<G>]) {
        self.rounds += 1;
        let mut seeder = ChaCha8Rng::seed_from_u64(self.config.seed ^ self.rounds);
        let seeds: Vec<u64> = (0..population.len()).map(|_| seeder.gen()).collect();

        let config = &self.config;
        let decoder = &self.decoder;
        let evaluations = &self.evaluations;
        let population_ref: &[Individual<G>] = population;

        let scores: Vec<FitnessScore> = self.pool.install(|| {
            population_ref
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(individual, &seed)| {
                    let Some(mut phenome) = decoder.decode(&individual.genome) else {
                        return FitnessScore::ZERO;
                    };
                    let report = calibrate(
                        &mut phenome,
                        config.random_games_per_side,
                        config.perfect_games_per_side,
                        seed,
                    );
                    evaluations.fetch_add(report.games(), Ordering::Relaxed);
                    FitnessScore::uniform(report.fitness(&config.scoring))
                })
                .collect()
        });

        let mut best = 0.0f64;
        for (individual, score) in population.iter_mut().zip(scores) {
            best = best.max(score.primary);
            individual.fitness = score;
        }
        debug!("Baseline round {}: best={:.1}", self.rounds, best);

        if best >= self.config.stop_fitness && !self.stop_reached {
            info!(
                "Baseline stop fitness reached: {:.1} >= {:.1}",
                best, self.config.stop_fitness
            );
            self.stop_reached = true;
        }
    }

    fn evaluation_count(&self) -> u64 {
        BaselineEvaluator::evaluation_count(self)
    }

    fn stop_condition_satisfied(&self) -> bool {
        BaselineEvaluator::stop_condition_satisfied(self)
    }

    fn reset(&mut self) {
        self.rounds = 0;
        self.stop_reached = false;
    }

    fn worker_pool(&self) -> Option<Arc<ThreadPool>> {
        Some(Arc::clone(&self.pool))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ParallelConfig;
    use crate::match_play::tests::Preference;
    use coevo_core::{Board, Move, INPUT_COUNT, OUTPUT_COUNT};

    /// Decision function that reads the board back out of its inputs and
    /// plays the perfect agent's move
    #[derive(Default)]
    pub(crate) struct PerfectPhenome {
        board: Board,
        mark: Option<Mark>,
        outputs: [f64; OUTPUT_COUNT],
    }

    impl DecisionFunction for PerfectPhenome {
        fn reset_state(&mut self) {
            self.outputs = [0.0; OUTPUT_COUNT];
        }

        fn set_inputs(&mut self, inputs: &[f64; INPUT_COUNT]) {
            let own = inputs.iter().filter(|&&v| v > 0.0).count();
            let other = inputs.iter().filter(|&&v| v < 0.0).count();
            let mark = if own == other { Mark::X } else { Mark::O };

            let mut board = Board::new();
            for (i, &value) in inputs.iter().enumerate() {
                if value > 0.0 {
                    board.place(Move::from_index(i), mark);
                } else if value < 0.0 {
                    board.place(Move::from_index(i), mark.opponent());
                }
            }
            self.board = board;
            self.mark = Some(mark);
        }

        fn activate(&mut self) {
            if let Some(mark) = self.mark {
                if let Some(mv) = PerfectAgent::new().choose_move(&self.board, mark) {
                    self.outputs[mv.index()] = 1.0;
                }
            }
        }

        fn outputs(&self) -> &[f64] {
            &self.outputs
        }
    }

    /// `true` decodes to the perfect phenome, `false` to raster preference
    struct SwitchDecoder;

    impl GenomeDecoder<bool> for SwitchDecoder {
        type Phenome = Box<dyn DecisionFunction>;

        fn decode(&self, genome: &bool) -> Option<Self::Phenome> {
            if *genome {
                Some(Box::new(PerfectPhenome::default()))
            } else {
                Some(Box::new(Preference::raster()))
            }
        }
    }

    fn config(random: usize, perfect: usize, stop: f64) -> BaselineConfig {
        BaselineConfig {
            random_games_per_side: random,
            perfect_games_per_side: perfect,
            stop_fitness: stop,
            ..Default::default()
        }
        .with_parallel(ParallelConfig::with_threads(2))
    }

    #[test]
    fn test_perfect_phenome_never_loses() {
        let report = calibrate(&mut PerfectPhenome::default(), 40, 1, 5);
        assert_eq!(report.vs_random().losses, 0);
        assert_eq!(report.vs_perfect().draws, 2);
        assert_eq!(report.games(), 82);
    }

    #[test]
    fn test_raster_loses_to_perfect() {
        let report = calibrate(&mut Preference::raster(), 0, 1, 0);
        assert_eq!(report.vs_perfect().losses, 2);
        assert_eq!(report.fitness(&ScoringPolicy::STANDARD), 0.0);
    }

    #[test]
    fn test_stop_condition() {
        let mut baseline = BaselineEvaluator::new(config(0, 1, 2.0), SwitchDecoder).unwrap();

        let mut pop = vec![Individual::new(false)];
        baseline.evaluate(&mut pop);
        assert_eq!(pop[0].fitness, FitnessScore::ZERO);
        assert!(!baseline.stop_condition_satisfied());

        let mut pop = vec![Individual::new(false), Individual::new(true)];
        baseline.evaluate(&mut pop);
        // Two draws against the perfect agent at 1 point each.
        assert_eq!(pop[1].fitness, FitnessScore::uniform(2.0));
        assert!(baseline.stop_condition_satisfied());
        assert_eq!(baseline.evaluation_count(), 6);

        ListEvaluator::<bool>::reset(&mut baseline);
        assert!(!baseline.stop_condition_satisfied());
    }

    #[test]
    fn test_fitness_is_per_genome() {
        let mut baseline = BaselineEvaluator::new(config(5, 1, 1002.0), SwitchDecoder).unwrap();
        let mut pop = vec![Individual::new(true), Individual::new(true), Individual::new(false)];
        baseline.evaluate(&mut pop);

        assert!(pop[0].fitness.primary >= 2.0);
        assert!(pop[0].fitness.primary <= 102.0);
        assert_eq!(baseline.evaluation_count(), 36);
        assert!(!baseline.stop_condition_satisfied());
    }

    #[test]
    fn test_negative_scoring_rejected() {
        let mut config = config(1, 1, 1002.0);
        config.scoring.loss = -10.0;
        assert!(matches!(
            BaselineEvaluator::new(config, SwitchDecoder),
            Err(TournamentError::InvalidScoring(v)) if v == -10.0
        ));
    }

    #[test]
    fn test_single_report() {
        let baseline = BaselineEvaluator::new(config(2, 1, 1002.0), SwitchDecoder).unwrap();
        let report = baseline.report(&true).unwrap();
        assert_eq!(report.vs_perfect().draws, 2);
        assert_eq!(report.vs_random().losses, 0);
    }
}
