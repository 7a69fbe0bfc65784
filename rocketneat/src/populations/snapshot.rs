use super::{PopulationConfig, Species};
use crate::{Genome, GenomeId, SpeciesId};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A serializable record of a population's state
/// at a given generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<C, G> {
    pub generation: usize,
    pub population_config: PopulationConfig,
    pub genetic_config: C,
    /// Best genome found so far, if any has been stored.
    pub best: Option<G>,
    pub species: BTreeMap<SpeciesId, SpeciesSnapshot<G>>,
}

/// The state of a single species within a [`Snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSnapshot<G> {
    pub id: SpeciesId,
    pub last_improved: usize,
    pub representative_id: GenomeId,
    pub fitness: f32,
    pub adjusted_fitness: f32,
    pub fitness_history: Vec<f32>,
    pub members: BTreeMap<GenomeId, G>,
}

impl<G: Genome> From<&Species<G>> for SpeciesSnapshot<G> {
    fn from(species: &Species<G>) -> SpeciesSnapshot<G> {
        SpeciesSnapshot {
            id: species.id(),
            last_improved: species.last_improved(),
            representative_id: species.representative().id(),
            fitness: species.fitness(),
            adjusted_fitness: species.adjusted_fitness(),
            fitness_history: species.fitness_history().to_vec(),
            members: species.genomes().map(|g| (g.id(), g.clone())).collect(),
        }
    }
}
