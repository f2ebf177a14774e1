//! Host-parasite coevolution: each host plays the other population's
//! parasites plus a sample of its own hall of fame
//!
//! Level 2 - Phase-level implementation

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info};

use crate::config::HostParasiteConfig;
use crate::evaluator::{GenerationUpdate, GenomeDecoder, ListEvaluator};
use crate::fitness::{FitnessScore, Individual};
use crate::match_play::MatchEvaluator;
use crate::parasites::ParasiteSnapshot;
use crate::TournamentError;

/// Evaluates one population (hosts) against the other (parasites).
///
/// Hosts play `host_mark`. The parasite snapshot is rebuilt from the other
/// population's generation updates, delivered through the channel returned
/// by [`HostParasiteEvaluator::subscribe`]. Every evaluation also appends the
/// current generation's best host to this population's hall of fame.
pub struct HostParasiteEvaluator<G, D> {
    config: HostParasiteConfig,
    decoder: D,
    matches: MatchEvaluator,
    pool: Arc<ThreadPool>,
    parasites: ParasiteSnapshot<G>,
    updates: Receiver<GenerationUpdate<G>>,
    update_sender: Sender<GenerationUpdate<G>>,
    hall_of_fame: Vec<G>,
    rng: ChaCha8Rng,
}

impl<G, D> HostParasiteEvaluator<G, D> {
    pub fn new(config: HostParasiteConfig, decoder: D) -> Result<Self, TournamentError> {
        config.validate()?;
        let (update_sender, updates) = mpsc::channel();
        Ok(Self {
            config,
            decoder,
            matches: MatchEvaluator::new(config.scoring, config.host_mark),
            pool: Arc::new(config.parallel.build_pool()?),
            parasites: ParasiteSnapshot::new(),
            updates,
            update_sender,
            hall_of_fame: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        })
    }

    pub fn config(&self) -> &HostParasiteConfig {
        &self.config
    }

    /// Channel the parasite population's driver publishes its generation
    /// updates to
    pub fn subscribe(&self) -> Sender<GenerationUpdate<G>> {
        self.update_sender.clone()
    }

    /// Handle to the parasite snapshot shared with this evaluator
    pub fn parasite_snapshot(&self) -> ParasiteSnapshot<G> {
        self.parasites.clone()
    }

    pub fn hall_of_fame(&self) -> &[G] {
        &self.hall_of_fame
    }

    /// Replace the parasite snapshot with the best member of each species in
    /// `update`, best first, at most `parasite_count` of them
    pub fn rebuild_snapshot(&self, update: &GenerationUpdate<G>)
    where
        G: Clone,
    {
        let size = self.parasites.rebuild_from(update, self.config.parasite_count);
        debug!(
            "Parasite snapshot rebuilt from generation {}: {} parasites from {} species",
            update.generation,
            size,
            update.species.len()
        );
    }

    /// Apply the newest pending update, if any. Older pending updates are
    /// superseded and dropped.
    pub fn sync_parasites(&self) -> bool
    where
        G: Clone,
    {
        match self.updates.try_iter().last() {
            Some(update) => {
                self.rebuild_snapshot(&update);
                true
            }
            None => false,
        }
    }

    /// `champion_count` hall-of-fame members drawn uniformly with
    /// replacement; nothing while the hall of fame is empty
    fn sample_champions(&mut self) -> Vec<G>
    where
        G: Clone,
    {
        if self.hall_of_fame.is_empty() {
            return Vec::new();
        }
        (0..self.config.champion_count)
            .map(|_| {
                let pick = self.rng.gen_range(0..self.hall_of_fame.len());
                self.hall_of_fame[pick].clone()
            })
            .collect()
    }

    /// Total host score against every parasite and every sampled champion
    fn play_hosts(&self, population: &[Individual<G>], parasites: &[G], champions: &[G]) -> Vec<FitnessScore>
    where
        G: Sync,
        D: GenomeDecoder<G>,
    {
        let decoder = &self.decoder;
        let matches = &self.matches;

        self.pool.install(|| {
            population
                .par_iter()
                .map(|individual| {
                    let Some(mut host) = decoder.decode(&individual.genome) else {
                        return FitnessScore::ZERO;
                    };
                    parasites
                        .iter()
                        .chain(champions)
                        .filter_map(|opponent| decoder.decode(opponent))
                        .fold(FitnessScore::ZERO, |acc, mut opponent| {
                            let (score, _) = matches.evaluate(&mut host, &mut opponent);
                            acc + score
                        })
                })
                .collect()
        })
    }
}

/// Index of the fittest individual; the earliest one on ties
fn champion_index<G>(population: &[Individual<G>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, individual) in population.iter().enumerate() {
        match best {
            Some((_, max)) if individual.fitness.primary <= max => {}
            _ => best = Some((i, individual.fitness.primary)),
        }
    }
    best.map(|(i, _)| i)
}

impl<G, D> ListEvaluator<G> for HostParasiteEvaluator<G, D>
where
    G: Clone + Sync,
    D: GenomeDecoder<G>,
{
    fn evaluate(&mut self, population: &mut [Individual<G>]) {
        self.sync_parasites();

        let champions = self.sample_champions();
        let parasites: Arc<Vec<G>> = self.parasites.load();
        let scores = self.play_hosts(population, &parasites, &champions);
        for (individual, score) in population.iter_mut().zip(scores) {
            individual.fitness = score;
        }

        if let Some(best) = champion_index(population) {
            self.hall_of_fame.push(population[best].genome.clone());
            info!(
                "Host {:?}: best={:.3}, parasites={}, champions={}, hall of fame={}",
                self.config.host_mark,
                population[best].fitness.primary,
                parasites.len(),
                champions.len(),
                self.hall_of_fame.len()
            );
        }
    }

    fn evaluation_count(&self) -> u64 {
        self.matches.evaluation_count()
    }

    fn reset(&mut self) {
        self.hall_of_fame.clear();
        self.parasites.replace(Vec::new());
        while self.updates.try_recv().is_ok() {}
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
    }

    fn worker_pool(&self) -> Option<Arc<ThreadPool>> {
        Some(Arc::clone(&self.pool))
    }
}

/// Build the two mirrored evaluators of a host-parasite run: the first
/// population plays `config.host_mark`, the second the other mark.
///
/// Each side's driver must publish its generation updates to the other
/// side's [`HostParasiteEvaluator::subscribe`] channel.
pub fn pair_host_parasite<G, A, B>(
    config: HostParasiteConfig,
    decoder_a: A,
    decoder_b: B,
) -> Result<(HostParasiteEvaluator<G, A>, HostParasiteEvaluator<G, B>), TournamentError> {
    let a = HostParasiteEvaluator::new(config, decoder_a)?;
    let b = HostParasiteEvaluator::new(config.mirrored(), decoder_b)?;
    Ok((a, b))
}
