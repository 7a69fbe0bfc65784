use crate::populations::PopulationConfig;
use crate::{Genome, GenomeId, SpeciesId};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Species are collections of reproductively
/// compatible (within a certain [genetic distance])
/// genomes. Membership is determined by calculating
/// the genetic distance to a _representative_, which
/// is re-chosen every generation as the new genome
/// closest to the previous one.
///
/// Species are removed after [`stagnation_threshold`]
/// generations without improving their mean fitness.
///
/// [genetic distance]: PopulationConfig::distance_threshold
/// [`stagnation_threshold`]: PopulationConfig::stagnation_threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species<G> {
    id: SpeciesId,
    pub(super) representative: G,
    pub(super) members: BTreeMap<GenomeId, G>,
    pub(super) fitness: f32,
    pub(super) adjusted_fitness: f32,
    pub(super) fitness_history: Vec<f32>,
    pub(super) last_improved: usize,
}

impl<G: Genome> Species<G> {
    /// Creates a new species with the specified ID and
    /// representative, born in `generation`. The
    /// representative is also added to the species'
    /// members.
    pub fn new(id: SpeciesId, representative: G, generation: usize) -> Species<G> {
        let mut members = BTreeMap::new();
        members.insert(representative.id(), representative.clone());
        Species {
            id,
            representative,
            members,
            fitness: f32::MIN,
            adjusted_fitness: f32::MIN,
            fitness_history: vec![],
            last_improved: generation,
        }
    }

    /// Returns the species' ID.
    pub fn id(&self) -> SpeciesId {
        self.id
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &G {
        &self.representative
    }

    /// Replaces every member with `representative`.
    pub(super) fn reset_members(&mut self, representative: G) {
        self.members.clear();
        self.members
            .insert(representative.id(), representative.clone());
        self.representative = representative;
    }

    /// Returns the genetic distance between the species'
    /// representative and `other`.
    pub fn genetic_distance(&self, other: &G, config: &G::Config) -> f32 {
        G::genetic_distance(&self.representative, other, config)
    }

    /// Adds a genome to the species.
    pub(super) fn add_genome(&mut self, genome: G) {
        self.members.insert(genome.id(), genome);
    }

    /// Returns an iterator over the species' members,
    /// in ascending id order.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.members.values()
    }

    /// Returns a mutable iterator over the species' members,
    /// in ascending id order.
    pub fn genomes_mut(&mut self) -> impl Iterator<Item = &mut G> {
        self.members.values_mut()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the species has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the mean fitness of the species' members,
    /// as recorded during the last stagnation check.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Returns the species' fitness normalized over the
    /// population's range of species fitnesses, as computed
    /// during the last reproduction.
    pub fn adjusted_fitness(&self) -> f32 {
        self.adjusted_fitness
    }

    /// Returns every recorded mean fitness, oldest first.
    pub fn fitness_history(&self) -> &[f32] {
        &self.fitness_history
    }

    /// Returns the last generation in which the
    /// species' mean fitness improved.
    pub fn last_improved(&self) -> usize {
        self.last_improved
    }

    /// Returns the current mean fitness of the members.
    pub(super) fn mean_fitness(&self) -> f32 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.values().map(|g| g.fitness()).sum::<f32>() / self.members.len() as f32
    }

    /// Returns the currently best-performing genome,
    /// the lowest id winning ties.
    pub fn champion(&self) -> Option<&G> {
        self.ranked_members().into_iter().next()
    }

    /// Returns the members by decreasing fitness, with
    /// ties in ascending id order.
    pub(super) fn ranked_members(&self) -> Vec<&G> {
        let mut ranked: Vec<&G> = self.members.values().collect();
        ranked.sort_by(|g1, g2| {
            g2.fitness()
                .partial_cmp(&g1.fitness())
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }

    pub(super) fn count_elite(&self, config: &PopulationConfig, quota: usize) -> usize {
        self.members.len().min(config.elitism).min(quota)
    }

    pub(super) fn count_survivors(&self, config: &PopulationConfig) -> usize {
        ((self.members.len() as f32 * config.survival_threshold).ceil() as usize)
            .clamp(1, self.members.len().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::mock::MockGenome;

    fn species_of(fitnesses: &[f32]) -> Species<MockGenome> {
        let mut genomes = fitnesses
            .iter()
            .enumerate()
            .map(|(i, f)| MockGenome::with_fitness(i + 1, 0.0, *f));
        let mut species = Species::new(1, genomes.next().unwrap(), 0);
        genomes.for_each(|g| species.add_genome(g));
        species
    }

    #[test]
    fn representative_is_member() {
        let species = species_of(&[1.0]);
        assert_eq!(species.len(), 1);
        assert_eq!(species.genomes().next(), Some(species.representative()));
        assert_eq!(species.last_improved(), 0);
    }

    #[test]
    fn ranked_members_ties_by_id() {
        let species = species_of(&[1.0, 3.0, 3.0, 2.0]);
        let ids: Vec<_> = species.ranked_members().iter().map(|g| g.id()).collect();
        assert_eq!(ids, [2, 3, 4, 1]);
        assert_eq!(species.champion().map(|g| g.id()), Some(2));
    }

    #[test]
    fn serde_round_trip() {
        let mut species = species_of(&[1.0, 4.0]);
        species.fitness_history.push(2.5);
        species.fitness = 2.5;
        species.last_improved = 3;

        let json = serde_json::to_string(&species).unwrap();
        let parsed: Species<MockGenome> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id(), species.id());
        assert_eq!(parsed.representative(), species.representative());
        assert_eq!(
            parsed.genomes().collect::<Vec<_>>(),
            species.genomes().collect::<Vec<_>>()
        );
        assert_eq!(parsed.fitness_history(), [2.5]);
        assert_eq!(parsed.last_improved(), 3);
    }

    #[test]
    fn mean_fitness() {
        let species = species_of(&[1.0, 2.0, 6.0]);
        assert_eq!(species.mean_fitness(), 3.0);
    }

    #[test]
    fn survivors_and_elite() {
        let species = species_of(&[1.0; 10]);
        let config = PopulationConfig {
            elitism: 3,
            survival_threshold: 0.25,
            ..PopulationConfig::zero()
        };
        assert_eq!(species.count_survivors(&config), 3);
        assert_eq!(species.count_elite(&config, 2), 2);
        assert_eq!(species.count_elite(&config, 8), 3);

        let config = PopulationConfig::zero();
        assert_eq!(species.count_survivors(&config), 1);
    }

    #[test]
    fn reset_members() {
        let mut species = species_of(&[1.0, 2.0]);
        species.reset_members(MockGenome::with_fitness(9, 0.0, 0.0));
        assert_eq!(species.len(), 1);
        assert_eq!(species.representative().id(), 9);
    }
}
