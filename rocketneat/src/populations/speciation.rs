use super::Species;
use crate::{Genome, GenomeId, SpeciesId};

use log::debug;
use rand::prelude::{IteratorRandom, Rng};
use std::collections::BTreeMap;

/// The set of live species, and the partitioning
/// of each new generation among them.
#[derive(Debug, Clone)]
pub struct SpeciesCatalog<G> {
    pub(super) species: BTreeMap<SpeciesId, Species<G>>,
    last_species_id: SpeciesId,
}

impl<G: Genome> SpeciesCatalog<G> {
    pub fn new() -> SpeciesCatalog<G> {
        SpeciesCatalog {
            species: BTreeMap::new(),
            last_species_id: 0,
        }
    }

    /// Partitions `population` into species.
    ///
    /// Every existing species first takes as its new
    /// representative the genome closest to its previous
    /// one, and loses all other members; species left without
    /// a candidate are dropped. If no species exist, one is
    /// founded from a randomly chosen genome. Each remaining
    /// genome then joins the species with the closest
    /// representative if it lies within `threshold`, or founds
    /// a new species otherwise.
    ///
    /// Ties are resolved towards the lowest species or genome id.
    pub fn speciate<R: Rng + ?Sized>(
        &mut self,
        mut population: BTreeMap<GenomeId, G>,
        generation: usize,
        threshold: f32,
        config: &G::Config,
        rng: &mut R,
    ) {
        self.choose_representatives(&mut population, config);

        if self.species.is_empty() {
            if let Some(seed) = population.keys().copied().choose(rng) {
                if let Some(genome) = population.remove(&seed) {
                    self.found_species(genome, generation);
                }
            }
        }

        for genome in population.into_values() {
            match self.closest_species(&genome, config) {
                Some((id, distance)) if distance < threshold => {
                    if let Some(species) = self.species.get_mut(&id) {
                        species.add_genome(genome);
                    }
                }
                _ => self.found_species(genome, generation),
            }
        }
    }

    /// Moves the genome closest to each species' previous
    /// representative out of `population`, making it the
    /// species' sole member.
    fn choose_representatives(
        &mut self,
        population: &mut BTreeMap<GenomeId, G>,
        config: &G::Config,
    ) {
        let mut orphaned = vec![];
        for (id, species) in self.species.iter_mut() {
            let closest = closest_by_distance(
                population
                    .values()
                    .map(|g| (g.id(), species.genetic_distance(g, config))),
            );
            match closest.and_then(|(genome_id, _)| population.remove(&genome_id)) {
                Some(representative) => species.reset_members(representative),
                None => orphaned.push(*id),
            }
        }
        for id in orphaned {
            debug!("species {} dropped: no genome left to represent it", id);
            self.species.remove(&id);
        }
    }

    /// Returns the id of the species whose representative
    /// is closest to `genome`, and the distance to it.
    fn closest_species(&self, genome: &G, config: &G::Config) -> Option<(SpeciesId, f32)> {
        closest_by_distance(
            self.species
                .iter()
                .map(|(id, s)| (*id, s.genetic_distance(genome, config))),
        )
    }

    fn found_species(&mut self, representative: G, generation: usize) {
        self.last_species_id += 1;
        debug!(
            "species {} founded by genome {} in generation {}",
            self.last_species_id,
            representative.id(),
            generation
        );
        self.species.insert(
            self.last_species_id,
            Species::new(self.last_species_id, representative, generation),
        );
    }

    /// Returns the genetic distance between two genomes.
    pub fn distance(&self, first: &G, second: &G, config: &G::Config) -> f32 {
        G::genetic_distance(first, second, config)
    }

    /// Returns an iterator over all species,
    /// in ascending id order.
    pub fn species(&self) -> impl Iterator<Item = &Species<G>> {
        self.species.values()
    }

    /// Returns the species with the given id.
    pub fn get(&self, id: SpeciesId) -> Option<&Species<G>> {
        self.species.get(&id)
    }

    /// Returns the number of live species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Returns `true` if there are no live species.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl<G: Genome> Default for SpeciesCatalog<G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the candidate with the smallest distance,
/// the first one winning ties.
fn closest_by_distance<I: Iterator<Item = (usize, f32)>>(candidates: I) -> Option<(usize, f32)> {
    candidates.fold(None, |closest, (id, distance)| match closest {
        Some((_, best)) if best <= distance => closest,
        _ => Some((id, distance)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::mock::{MockConfig, MockGenome};
    use crate::rng;

    fn population(positions: &[f32]) -> BTreeMap<GenomeId, MockGenome> {
        positions
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1, MockGenome::with_fitness(i + 1, *p, 0.0)))
            .collect()
    }

    fn member_ids(catalog: &SpeciesCatalog<MockGenome>) -> Vec<Vec<GenomeId>> {
        catalog
            .species()
            .map(|s| s.genomes().map(|g| g.id()).collect())
            .collect()
    }

    #[test]
    fn closest_by_distance_prefers_first() {
        let candidates = vec![(4, 1.0), (2, 0.5), (7, 0.5), (1, 3.0)];
        assert_eq!(closest_by_distance(candidates.into_iter()), Some((2, 0.5)));
        assert_eq!(closest_by_distance(std::iter::empty()), None);
    }

    #[test]
    fn first_speciation_partitions_by_threshold() {
        let mut catalog = SpeciesCatalog::new();
        let mut rng = rng::seeded(0);
        catalog.speciate(
            population(&[0.0, 0.1, 0.2, 5.0, 5.1]),
            0,
            1.0,
            &MockConfig::default(),
            &mut rng,
        );

        assert_eq!(catalog.len(), 2);
        let mut members = member_ids(&catalog);
        members.sort();
        assert_eq!(members, [vec![1, 2, 3], vec![4, 5]]);
        for species in catalog.species() {
            assert!(species
                .genomes()
                .any(|g| g == species.representative()));
        }
    }

    #[test]
    fn representatives_follow_previous_ones() {
        let mut catalog = SpeciesCatalog::new();
        let mut rng = rng::seeded(0);
        let config = MockConfig::default();
        catalog.speciate(population(&[0.0]), 0, 1.0, &config, &mut rng);
        catalog.speciate(population(&[10.0]), 1, 1.0, &config, &mut rng);
        assert_eq!(catalog.species().map(|s| s.id()).collect::<Vec<_>>(), [1]);

        // Genome 2 is the closest to the previous representative,
        // and takes over species 1 although it is not within the
        // threshold.
        let next: BTreeMap<_, _> = [
            (1, MockGenome::with_fitness(1, 0.0, 0.0)),
            (2, MockGenome::with_fitness(2, 9.0, 0.0)),
            (3, MockGenome::with_fitness(3, 8.5, 0.0)),
        ]
        .into_iter()
        .collect();
        catalog.speciate(next, 2, 1.0, &config, &mut rng);

        assert_eq!(catalog.get(1).unwrap().representative().id, 2);
        assert_eq!(member_ids(&catalog), [vec![2, 3], vec![1]]);
        assert_eq!(catalog.get(2).unwrap().last_improved(), 2);
    }

    #[test]
    fn species_without_candidates_are_dropped() {
        let mut catalog = SpeciesCatalog::new();
        let mut rng = rng::seeded(0);
        let config = MockConfig::default();
        catalog.speciate(population(&[0.0, 5.0, 10.0]), 0, 1.0, &config, &mut rng);
        assert_eq!(catalog.len(), 3);

        catalog.speciate(population(&[0.0]), 1, 1.0, &config, &mut rng);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.species().next().unwrap().id(), 1);
    }

    #[test]
    fn ties_go_to_lowest_species() {
        let mut catalog = SpeciesCatalog::new();
        let mut rng = rng::seeded(0);
        let config = MockConfig::default();
        catalog.speciate(population(&[0.0, 2.0]), 0, 1.5, &config, &mut rng);
        assert_eq!(catalog.len(), 2);

        let next = population(&[0.0, 2.0, 1.0]);
        catalog.speciate(next, 1, 1.5, &config, &mut rng);
        let lowest = catalog.species().next().unwrap();
        assert!(lowest.genomes().any(|g| g.id() == 3));
    }
}
