use super::{PopulationConfig, Species};
use crate::{Genome, SpeciesId};

use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Tracks the mean fitness of every species over
/// time, and flags those which have not improved
/// for too long.
#[derive(Debug, Clone, Copy)]
pub struct Stagnation {
    stagnation_threshold: usize,
    species_elitism: usize,
}

impl Stagnation {
    pub fn new(config: &PopulationConfig) -> Stagnation {
        Stagnation {
            stagnation_threshold: config.stagnation_threshold.get(),
            species_elitism: config.species_elitism,
        }
    }

    /// Records every species' current mean fitness and
    /// returns, per species, whether it is stagnant.
    ///
    /// A species improves when its mean fitness exceeds
    /// every previously recorded one. The `species_elitism`
    /// best species are never flagged, and no species is
    /// flagged if doing so would leave fewer than
    /// `species_elitism` species standing.
    pub fn mark_stagnant<G: Genome>(
        &self,
        species: &mut BTreeMap<SpeciesId, Species<G>>,
        generation: usize,
    ) -> BTreeMap<SpeciesId, bool> {
        let mut ranking = Vec::with_capacity(species.len());
        for s in species.values_mut() {
            let previous = s
                .fitness_history
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            let fitness = s.mean_fitness();
            s.fitness = fitness;
            s.fitness_history.push(fitness);
            if previous < fitness {
                s.last_improved = generation;
            }
            ranking.push((s.id(), fitness, s.last_improved));
        }
        ranking.sort_by(|(_, f1, _), (_, f2, _)| f1.partial_cmp(f2).unwrap_or(Ordering::Equal));

        let count = ranking.len();
        let mut non_stagnant = count;
        let mut flags = BTreeMap::new();
        for (i, (id, _, last_improved)) in ranking.into_iter().enumerate() {
            let mut stagnant = non_stagnant > self.species_elitism
                && generation.saturating_sub(last_improved) >= self.stagnation_threshold;
            if count - i <= self.species_elitism {
                stagnant = false;
            }
            if stagnant {
                debug!(
                    "species {} stagnant: no improvement since generation {}",
                    id, last_improved
                );
                non_stagnant -= 1;
            }
            flags.insert(id, stagnant);
        }
        flags
    }
}
