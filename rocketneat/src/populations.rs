//! A Population is a collection of genomes.
//! These are grouped into species, which can
//! be evolved using externally assigned fitness
//! as the source of selective pressure.
mod config;
mod errors;
pub mod logging;
mod reproduction;
mod snapshot;
mod speciation;
mod species;
mod stagnation;

use crate::rng::{self, NeatRng};
use crate::{Genome, GenomeId, InnovationHistory, ValidateConfig};
pub use config::PopulationConfig;
pub use errors::{ConfigError, EvolutionError};
use reproduction::Reproduction;
pub use snapshot::{Snapshot, SpeciesSnapshot};
pub use speciation::SpeciesCatalog;
pub use species::Species;
pub use stagnation::Stagnation;

use log::{debug, info};

/// Lifecycle stage of a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Seeded,
    Extinct { generation: usize },
}

/// A population of genomes.
///
/// A population starts out empty; [`init`] seeds it,
/// after which fitness is assigned to every genome and
/// [`next_generation`] is called, repeatedly.
///
/// [`init`]: Population::init
/// [`next_generation`]: Population::next_generation
pub struct Population<C, H, G> {
    catalog: SpeciesCatalog<G>,
    reproduction: Reproduction,
    history: H,
    generation: usize,
    best: Option<G>,
    state: State,
    population_config: PopulationConfig,
    genetic_config: C,
    rng: NeatRng,
}

impl<C, H, G> Population<C, H, G>
where
    C: ValidateConfig,
    H: InnovationHistory<Config = C>,
    G: Genome<InnovationHistory = H, Config = C>,
{
    /// Creates a new population using the passed configurations,
    /// drawing randomness from a generator seeded by the
    /// operating system.
    ///
    /// The type of `genetic_config` depends on the implementation
    /// of [`Genome`], and is effectively opaque to the population.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// # use rocketneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use rocketneat::{Population, PopulationConfig};
    ///
    /// let pop_config = PopulationConfig {
    ///     // Set desired configuration
    ///     ..PopulationConfig::default()
    /// };
    /// # let genetic_config = GeneticConfig::default();
    ///
    /// // With `G` a suitable type implementing `Genome`...
    /// let population = Population::<_, _, G>::new(pop_config, genetic_config).unwrap();
    /// ```
    pub fn new(
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, ConfigError> {
        Self::with_rng(population_config, genetic_config, rng::from_entropy())
    }

    /// Creates a new population whose whole run
    /// is determined by `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// # use rocketneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use rocketneat::{ConfigError, Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// let invalid = PopulationConfig {
    ///     survival_threshold: 2.0,
    ///     ..PopulationConfig::default()
    /// };
    /// assert_eq!(
    ///     Population::<_, _, G>::with_seed(invalid, genetic_config, 42).err(),
    ///     Some(ConfigError::OutOfUnitRange { field: "survival_threshold", value: 2.0 })
    /// );
    /// ```
    pub fn with_seed(
        population_config: PopulationConfig,
        genetic_config: C,
        seed: u64,
    ) -> Result<Population<C, H, G>, ConfigError> {
        Self::with_rng(population_config, genetic_config, rng::seeded(seed))
    }

    /// Creates a new population drawing all of
    /// its randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    pub fn with_rng(
        population_config: PopulationConfig,
        genetic_config: C,
        rng: NeatRng,
    ) -> Result<Population<C, H, G>, ConfigError> {
        population_config.validate()?;
        genetic_config.validate()?;
        Ok(Population {
            catalog: SpeciesCatalog::new(),
            reproduction: Reproduction::new(&population_config),
            history: H::new(&genetic_config),
            generation: 0,
            best: None,
            state: State::Uninitialized,
            population_config,
            genetic_config,
            rng,
        })
    }

    /// Generates the initial genomes and speciates
    /// them as generation 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the population was
    /// already initialized.
    ///
    /// # Examples
    /// ```
    /// # use rocketneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use rocketneat::{EvolutionError, Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// let mut population =
    ///     Population::<_, _, G>::with_seed(PopulationConfig::default(), genetic_config, 0).unwrap();
    ///
    /// population.init().unwrap();
    /// assert_eq!(population.genomes().count(), 150);
    /// assert_eq!(population.init(), Err(EvolutionError::AlreadyInitialized));
    /// ```
    pub fn init(&mut self) -> Result<(), EvolutionError> {
        if self.state != State::Uninitialized {
            return Err(EvolutionError::AlreadyInitialized);
        }
        let genomes = self
            .reproduction
            .initial_population(&self.genetic_config, &mut self.rng);
        self.catalog.speciate(
            genomes,
            self.generation,
            self.population_config.distance_threshold,
            &self.genetic_config,
            &mut self.rng,
        );
        self.state = State::Seeded;
        info!(
            "population initialized: {} genomes in {} species",
            self.population_config.size,
            self.catalog.len()
        );
        Ok(())
    }

    /// Evaluates the fitness of each genome in the
    /// population using the passed evaluator.
    ///
    /// # Examples
    /// ```
    /// # use rocketneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use rocketneat::{Genome, Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// let mut population =
    ///     Population::<_, _, G>::with_seed(PopulationConfig::default(), genetic_config, 0).unwrap();
    /// population.init().unwrap();
    ///
    /// population.evaluate_fitness(|g| {
    ///     // Compute genome's fitness...
    ///     g.id() as f32
    /// });
    /// assert_eq!(population.champion().map(|g| g.id()), Some(150));
    /// ```
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E)
    where
        E: FnMut(&G) -> f32,
    {
        for genome in self.genomes_mut() {
            let fitness = evaluator(genome);
            genome.set_fitness(fitness);
        }
    }

    /// Replaces the best genome found so far with the
    /// current [champion], if it is strictly fitter.
    /// Returns whether the best genome changed.
    ///
    /// [champion]: Population::champion
    pub fn store_best(&mut self) -> bool {
        let champion = match self.champion() {
            Some(champion) => champion,
            None => return false,
        };
        let improved = self
            .best
            .as_ref()
            .map_or(true, |best| champion.fitness() > best.fitness());
        if improved {
            debug!(
                "new best genome {} with fitness {}",
                champion.id(),
                champion.fitness()
            );
            self.best = Some(champion.clone());
        }
        improved
    }

    /// Evolves the population into its next generation:
    /// stagnant species are removed, the rest reproduce,
    /// and the offspring are speciated. The best genome
    /// stored so far always survives into the offspring.
    ///
    /// Every genome should have been assigned a fitness
    /// beforehand.
    ///
    /// # Errors
    ///
    /// Returns an error if the population is uninitialized,
    /// or if it goes (or already went) extinct. Extinction
    /// is final.
    ///
    /// # Examples
    /// ```
    /// # use rocketneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use rocketneat::{EvolutionError, Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// let mut population =
    ///     Population::<_, _, G>::with_seed(PopulationConfig::default(), genetic_config, 0).unwrap();
    /// assert_eq!(population.next_generation(), Err(EvolutionError::Uninitialized));
    ///
    /// population.init().unwrap();
    /// population.evaluate_fitness(|_| 1.0);
    /// population.next_generation().unwrap();
    /// assert_eq!(population.generation(), 1);
    /// assert_eq!(population.genomes().count(), 150);
    /// ```
    pub fn next_generation(&mut self) -> Result<(), EvolutionError> {
        match self.state {
            State::Uninitialized => return Err(EvolutionError::Uninitialized),
            State::Extinct { generation } => {
                return Err(EvolutionError::Extinction { generation })
            }
            State::Seeded => {}
        }

        self.generation += 1;
        let offspring = self.reproduction.reproduce(
            &mut self.catalog.species,
            &mut self.history,
            &self.genetic_config,
            self.generation,
            self.best.as_ref(),
            &mut self.rng,
        );
        let offspring = match offspring {
            Ok(offspring) => offspring,
            Err(e) => return Err(self.go_extinct(e)),
        };

        self.catalog.speciate(
            offspring,
            self.generation,
            self.population_config.distance_threshold,
            &self.genetic_config,
            &mut self.rng,
        );
        if self.catalog.is_empty() {
            let generation = self.generation;
            return Err(self.go_extinct(EvolutionError::Extinction { generation }));
        }

        info!(
            "generation {}: {} genomes in {} species, best fitness {}",
            self.generation,
            self.genomes().count(),
            self.catalog.len(),
            self.best.as_ref().map_or(f32::NAN, |g| g.fitness())
        );
        Ok(())
    }

    fn go_extinct(&mut self, error: EvolutionError) -> EvolutionError {
        info!("population extinct at generation {}", self.generation);
        self.state = State::Extinct {
            generation: self.generation,
        };
        error
    }

    /// Returns a record of the population's current state.
    ///
    /// # Examples
    /// ```
    /// # use rocketneat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use rocketneat::{Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// let mut population =
    ///     Population::<_, _, G>::with_seed(PopulationConfig::default(), genetic_config, 0).unwrap();
    /// population.init().unwrap();
    ///
    /// let snapshot = population.snapshot();
    /// assert_eq!(snapshot.generation, 0);
    /// assert!(snapshot.best.is_none());
    /// assert_eq!(
    ///     snapshot.species.values().map(|s| s.members.len()).sum::<usize>(),
    ///     150
    /// );
    /// ```
    pub fn snapshot(&self) -> Snapshot<C, G>
    where
        C: Clone,
    {
        Snapshot {
            generation: self.generation,
            population_config: self.population_config.clone(),
            genetic_config: self.genetic_config.clone(),
            best: self.best.clone(),
            species: self
                .catalog
                .species()
                .map(|s| (s.id(), SpeciesSnapshot::from(s)))
                .collect(),
        }
    }

    /// Returns the currently best-performing genome,
    /// the lowest id winning ties. Returns `None`
    /// before initialization.
    pub fn champion(&self) -> Option<&G> {
        self.genomes().fold(None, |champion: Option<&G>, genome| match champion {
            Some(c)
                if c.fitness() > genome.fitness()
                    || (c.fitness() == genome.fitness() && c.id() < genome.id()) =>
            {
                champion
            }
            _ => Some(genome),
        })
    }

    /// Returns the best genome stored by [`store_best`].
    ///
    /// [`store_best`]: Population::store_best
    pub fn best(&self) -> Option<&G> {
        self.best.as_ref()
    }

    /// Returns an iterator over all current genomes,
    /// grouped by species.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.catalog.species().flat_map(|s| s.genomes())
    }

    /// Returns a mutable iterator over all current
    /// genomes, grouped by species.
    pub fn genomes_mut(&mut self) -> impl Iterator<Item = &mut G> {
        self.catalog
            .species
            .values_mut()
            .flat_map(|s| s.genomes_mut())
    }

    /// Returns the genome with the given id, if present.
    pub fn genome(&self, id: GenomeId) -> Option<&G> {
        self.genomes().find(|g| g.id() == id)
    }

    /// Returns an iterator over all current species,
    /// in ascending id order.
    pub fn species(&self) -> impl Iterator<Item = &Species<G>> {
        self.catalog.species()
    }

    /// Returns the population's species catalog.
    pub fn catalog(&self) -> &SpeciesCatalog<G> {
        &self.catalog
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Returns the population's configuration.
    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    /// Returns the genomes' configuration.
    pub fn genetic_config(&self) -> &C {
        &self.genetic_config
    }
}
