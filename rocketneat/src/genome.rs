use crate::populations::ConfigError;
use crate::GenomeId;

use rand::Rng;

/// An interface for genomes that can be used by NEAT.
///
/// Every operation that needs randomness receives the
/// population's generator explicitly; implementors must
/// not draw from any ambient source.
pub trait Genome: Clone {
    type Config: ValidateConfig;
    type InnovationHistory: InnovationHistory<Config = Self::Config>;

    /// Returns a freshly initialized genome with the given id.
    fn new<R: Rng>(id: GenomeId, config: &Self::Config, rng: &mut R) -> Self;

    /// Returns the genome's id.
    fn id(&self) -> GenomeId;

    /// Returns the genetic distance between two genomes.
    /// Must be 0 for a genome against itself.
    fn genetic_distance(first: &Self, second: &Self, config: &Self::Config) -> f32;

    /// Combines two genomes into a child genome with id `child_id`.
    /// The child is not mutated.
    fn mate<R: Rng>(parent1: &Self, parent2: &Self, child_id: GenomeId, rng: &mut R) -> Self;

    /// Applies the configured mutations to the genome, registering
    /// structural innovations in `history`.
    fn mutate<R: Rng>(
        &mut self,
        history: &mut Self::InnovationHistory,
        config: &Self::Config,
        rng: &mut R,
    );

    /// Sets the genome's fitness value.
    fn set_fitness(&mut self, fitness: f32);

    /// Returns the genome's fitness value.
    fn fitness(&self) -> f32;
}

/// An Innovation History is used to keep track
/// of structural innovations, so that identical
/// mutations arising independently are given the
/// same historical markings.
pub trait InnovationHistory {
    type Config;

    fn new(config: &Self::Config) -> Self;

    /// Starts a new mutation epoch. Called exactly
    /// once per generation, before any offspring
    /// are mutated.
    fn reset_indexers(&mut self);
}

/// Configurations that can be checked
/// before a run is started.
pub trait ValidateConfig {
    /// # Errors
    ///
    /// Returns the first invalid field found.
    fn validate(&self) -> Result<(), ConfigError>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! A one-dimensional genome for exercising the
    //! population machinery in isolation.
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct MockGenome {
        pub id: GenomeId,
        pub position: f32,
        pub fitness: f32,
    }

    impl MockGenome {
        pub fn with_fitness(id: GenomeId, position: f32, fitness: f32) -> MockGenome {
            MockGenome {
                id,
                position,
                fitness,
            }
        }
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockConfig {
        pub spread: f32,
        pub mutation_power: f32,
    }

    impl ValidateConfig for MockConfig {
        fn validate(&self) -> Result<(), ConfigError> {
            ConfigError::check_non_negative("spread", self.spread)
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct MockHistory {
        pub resets: usize,
    }

    impl InnovationHistory for MockHistory {
        type Config = MockConfig;

        fn new(_: &MockConfig) -> Self {
            MockHistory::default()
        }

        fn reset_indexers(&mut self) {
            self.resets += 1;
        }
    }

    impl Genome for MockGenome {
        type Config = MockConfig;
        type InnovationHistory = MockHistory;

        fn new<R: Rng>(id: GenomeId, config: &MockConfig, rng: &mut R) -> Self {
            let position = if config.spread > 0.0 {
                rng.gen_range(0.0..config.spread)
            } else {
                0.0
            };
            MockGenome::with_fitness(id, position, f32::MIN)
        }

        fn id(&self) -> GenomeId {
            self.id
        }

        fn genetic_distance(first: &Self, second: &Self, _: &MockConfig) -> f32 {
            (first.position - second.position).abs()
        }

        fn mate<R: Rng>(parent1: &Self, parent2: &Self, child_id: GenomeId, rng: &mut R) -> Self {
            let parent = if rng.gen::<bool>() { parent1 } else { parent2 };
            MockGenome::with_fitness(child_id, parent.position, f32::MIN)
        }

        fn mutate<R: Rng>(&mut self, _: &mut MockHistory, config: &MockConfig, rng: &mut R) {
            if config.mutation_power > 0.0 {
                self.position += rng.gen_range(-config.mutation_power..config.mutation_power);
            }
        }

        fn set_fitness(&mut self, fitness: f32) {
            self.fitness = fitness;
        }

        fn fitness(&self) -> f32 {
            self.fitness
        }
    }
}
