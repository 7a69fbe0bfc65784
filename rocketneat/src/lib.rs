//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Genomes are grouped into species by genetic distance, species
//! that stop improving are culled, and the survivors reproduce in
//! proportion to their adjusted fitness. Genomes are user-defined
//! via the [`Genome`] trait; a feed-forward neural network genome
//! is supplied by the `rocketneat-nn` crate.
//!
//! All randomness flows from a single seedable generator owned by
//! the [`Population`], so a run started with [`Population::with_seed`]
//! is fully reproducible.
//!
//! Fitness is assigned externally: between two calls to
//! [`Population::next_generation`] every genome returned by
//! [`Population::genomes_mut`] must be given a fitness value.
//!
//! # Example usage: Evolution of XOR function approximator, using `rocketneat-nn`
//! ```
//! use rocketneat::{Population, PopulationConfig};
//! use rocketneat_nn::{
//!     genomics::{GeneticConfig, NNGenome},
//!     networks::Network,
//! };
//! use std::collections::HashMap;
//! use std::num::NonZeroUsize;
//!
//! fn evaluate_xor(genome: &NNGenome) -> f32 {
//!     let network = Network::from(genome);
//!     let cases = [
//!         ([0.0, 0.0], 0.0),
//!         ([0.0, 1.0], 1.0),
//!         ([1.0, 0.0], 1.0),
//!         ([1.0, 1.0], 0.0),
//!     ];
//!
//!     let mut error = 0.0;
//!     for ([a, b], expected) in cases {
//!         let inputs: HashMap<_, _> = [(1, a), (2, b), (3, 1.0)].into_iter().collect();
//!         let outputs = network.activate(&inputs).unwrap();
//!         error += (outputs[&4] - expected).abs();
//!     }
//!     (4.0 - error).powf(2.0)
//! }
//!
//! let genetic_config = GeneticConfig {
//!     input_count: NonZeroUsize::new(3).unwrap(),
//!     output_count: NonZeroUsize::new(1).unwrap(),
//!     min_weight: -30.0,
//!     max_weight: 30.0,
//!     weight_mutation_power: 5.0,
//!     ..GeneticConfig::default()
//! };
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(50).unwrap(),
//!     species_elitism: 1,
//!     ..PopulationConfig::default()
//! };
//!
//! let mut population =
//!     Population::<_, _, NNGenome>::with_seed(population_config, genetic_config, 7).unwrap();
//! population.init().unwrap();
//! for _ in 0..5 {
//!     population.evaluate_fitness(evaluate_xor);
//!     population.store_best();
//!     if let Err(e) = population.next_generation() {
//!         eprintln!("{}", e);
//!         break;
//!     }
//! }
//! assert!(population.best().is_some());
//! ```

mod genome;
pub mod rng;
mod populations;

pub use genome::*;
pub use populations::*;

/// Identifier of a genome. Strictly increasing
/// over the lifetime of a run, never reused.
pub type GenomeId = usize;

/// Identifier of a species.
pub type SpeciesId = usize;
