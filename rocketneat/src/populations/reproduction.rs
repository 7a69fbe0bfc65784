use super::{EvolutionError, PopulationConfig, Species, Stagnation};
use crate::{Genome, GenomeId, InnovationHistory, SpeciesId};

use log::debug;
use rand::prelude::{Rng, SliceRandom};
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

/// Auxiliary type for offspring generation.
/// Removes stagnant species, allots each survivor
/// its share of the next generation, and fills it
/// with elites and mated offspring.
#[derive(Debug, Clone)]
pub(super) struct Reproduction {
    config: PopulationConfig,
    stagnation: Stagnation,
    last_genome_id: GenomeId,
}

impl Reproduction {
    pub(super) fn new(config: &PopulationConfig) -> Reproduction {
        Reproduction {
            config: config.clone(),
            stagnation: Stagnation::new(config),
            last_genome_id: 0,
        }
    }

    fn next_genome_id(&mut self) -> GenomeId {
        self.last_genome_id += 1;
        self.last_genome_id
    }

    /// Returns `size` fresh genomes, with ids
    /// following the last one handed out.
    pub(super) fn initial_population<G: Genome, R: Rng>(
        &mut self,
        genetic_config: &G::Config,
        rng: &mut R,
    ) -> BTreeMap<GenomeId, G> {
        (0..self.config.size.get())
            .map(|_| {
                let id = self.next_genome_id();
                (id, G::new(id, genetic_config, rng))
            })
            .collect()
    }

    /// Generates the next generation from `species`.
    ///
    /// Stagnant species are removed first. The surviving
    /// species keep only their representatives; their
    /// members are moved into the returned offspring (elites)
    /// or used as parents. The innovation history is reset
    /// exactly once, before any offspring is mutated.
    ///
    /// If `best` is not among the offspring, it replaces
    /// the offspring with the highest id.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::Extinction`] if every
    /// species is stagnant.
    pub(super) fn reproduce<G: Genome, R: Rng>(
        &mut self,
        species: &mut BTreeMap<SpeciesId, Species<G>>,
        history: &mut G::InnovationHistory,
        genetic_config: &G::Config,
        generation: usize,
        best: Option<&G>,
        rng: &mut R,
    ) -> Result<BTreeMap<GenomeId, G>, EvolutionError> {
        for (id, stagnant) in self.stagnation.mark_stagnant(species, generation) {
            if stagnant {
                debug!("species {} removed for stagnation", id);
                species.remove(&id);
            }
        }
        if species.is_empty() {
            return Err(EvolutionError::Extinction { generation });
        }

        let quotas = self.allot_offspring(species);
        debug!("spawn quotas: {:?}", quotas);

        let best_id = best.map(|g| g.id());
        let mut offspring = BTreeMap::new();
        history.reset_indexers();
        for (s, quota) in species.values_mut().zip(quotas) {
            let ranked = s.ranked_members();
            let elite = s.count_elite(&self.config, quota);
            for genome in &ranked[..elite] {
                offspring.insert(genome.id(), (*genome).clone());
            }

            let parents = &ranked[..s.count_survivors(&self.config).min(ranked.len())];
            for _ in elite..quota {
                let (parent1, parent2) = match (parents.choose(rng), parents.choose(rng)) {
                    (Some(p1), Some(p2)) => (*p1, *p2),
                    _ => break,
                };
                let child_id = self.next_genome_id();
                let mut child = G::mate(parent1, parent2, child_id, rng);
                if Some(child_id) != best_id {
                    child.mutate(history, genetic_config, rng);
                }
                offspring.insert(child_id, child);
            }
            s.members.clear();
        }

        if let Some(best) = best {
            if !offspring.contains_key(&best.id()) {
                if let Some(last) = offspring.keys().next_back().copied() {
                    offspring.remove(&last);
                }
                debug!("best genome {} reinserted into offspring", best.id());
                offspring.insert(best.id(), best.clone());
            }
        }

        Ok(offspring)
    }

    /// Computes every species' adjusted fitness, and
    /// from it the number of offspring each is allotted,
    /// in ascending species id order.
    fn allot_offspring<G: Genome>(&self, species: &mut BTreeMap<SpeciesId, Species<G>>) -> Vec<usize> {
        let means: Vec<f32> = species.values().map(|s| s.mean_fitness()).collect();
        let min = means.iter().copied().fold(f32::INFINITY, f32::min);
        let max = means.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = (max - min).max(1.0);

        let mut adjusted = Vec::with_capacity(means.len());
        for (s, mean) in species.values_mut().zip(means) {
            let fitness = (mean - min) / range;
            s.adjusted_fitness = if fitness.is_finite() { fitness } else { 0.0 };
            adjusted.push(s.adjusted_fitness);
        }
        let previous: Vec<usize> = species.values().map(|s| s.len()).collect();

        spawn_quotas(
            &adjusted,
            &previous,
            self.config.size.get(),
            self.config.min_species_size,
        )
    }
}

/// Returns each species' offspring count, summing
/// exactly to `size`.
///
/// Every species is allotted a share proportional to its
/// adjusted fitness (but at least `min_species_size`), then
/// moved halfway from its `previous` size towards it.
fn spawn_quotas(
    adjusted: &[f32],
    previous: &[usize],
    size: usize,
    min_species_size: usize,
) -> Vec<usize> {
    let sum: f32 = adjusted.iter().sum();
    let minimum = min_species_size as f32;
    let mut spawns: Vec<f32> = adjusted
        .iter()
        .zip(previous)
        .map(|(a, p)| {
            let proportion = if sum > 0.0 {
                minimum.max(a / sum * size as f32)
            } else {
                minimum
            };
            damp(proportion, *p)
        })
        .collect();

    let mut total: f32 = spawns.iter().sum();
    if total <= 0.0 {
        spawns.iter_mut().for_each(|s| *s = 1.0);
        total = spawns.len() as f32;
    }
    let scaled: Vec<f32> = spawns.iter().map(|s| s * size as f32 / total).collect();
    let mut quotas = round_retain_sum(&scaled);
    raise_to_minimum(&mut quotas, min_species_size);
    quotas
}

/// Moves `previous` half the way to `target`,
/// by at least one unit.
fn damp(target: f32, previous: usize) -> f32 {
    let previous = previous as f32;
    let half = (target - previous) * 0.5;
    let step = half.round();
    let spawn = if step != 0.0 {
        previous + step
    } else if half > 0.0 {
        previous + 1.0
    } else if half < 0.0 {
        previous - 1.0
    } else {
        previous
    };
    spawn.max(0.0)
}

/// Rounds all values to positive whole numbers
/// while preserving their order and sum, assuming it is also whole.
/// Rounding is done in the manner that minimizes
/// the average error to the original set of values.
fn round_retain_sum(values: &[f32]) -> Vec<usize> {
    let total_sum = values.iter().sum::<f32>().round() as usize;
    let mut truncated: Vec<(usize, usize, f32)> = values
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let u = f.floor();
            let e = f - u;
            (i, u as usize, e)
        })
        .collect();
    let truncated_sum: usize = truncated.iter().map(|(_, u, _)| *u).sum();
    let remainder = total_sum.saturating_sub(truncated_sum).min(truncated.len());
    // Sort in decreasing order of error, stable over index.
    truncated.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
    for (_, u, _) in &mut truncated[..remainder] {
        *u += 1;
    }
    truncated.sort_by_key(|(i, ..)| *i);
    truncated.iter().map(|(_, u, _)| *u).collect()
}

/// Raises every quota below `minimum` by taking
/// from the largest quota, while one exceeds it.
fn raise_to_minimum(quotas: &mut [usize], minimum: usize) {
    for i in 0..quotas.len() {
        while quotas[i] < minimum {
            let donor = (0..quotas.len())
                .filter(|j| quotas[*j] > minimum)
                .max_by_key(|j| (quotas[*j], Reverse(*j)));
            match donor {
                Some(j) => {
                    quotas[j] -= 1;
                    quotas[i] += 1;
                }
                None => break,
            }
        }
    }
}
