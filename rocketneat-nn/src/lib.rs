//! # RocketNEAT-NN
//! A feed-forward neural network implementation of the `rocketneat` crate's `Genome` trait.
//!
//! Provides an [`NNGenome`] type usable in `rocketneat` `Population`s, its
//! innovation tracker [`History`], and a [`Network`] evaluator which can be
//! generated from an [`NNGenome`].
//!
//! [`NNGenome`]: crate::genomics::NNGenome
//! [`History`]: crate::genomics::History
//! [`Network`]: crate::networks::Network
//!
//! # Example usage: Evolution of XOR function approximator
//! ```
//! use rocketneat::{Population, PopulationConfig};
//! use rocketneat_nn::{
//!     genomics::{GeneticConfig, NNGenome},
//!     networks::Network,
//! };
//! use std::collections::HashMap;
//! use std::num::NonZeroUsize;
//!
//! // Allowed error margin for neural net answers.
//! const ERROR_MARGIN: f32 = 0.3;
//!
//! fn evaluate_xor(genome: &NNGenome) -> f32 {
//!     let network = Network::from(genome);
//!
//!     let values = [
//!         ([1.0, 0.0, 0.0], 0.0),
//!         ([1.0, 0.0, 1.0], 1.0),
//!         ([1.0, 1.0, 0.0], 1.0),
//!         ([1.0, 1.0, 1.0], 0.0),
//!     ];
//!
//!     let mut errors = [0.0, 0.0, 0.0, 0.0];
//!     for (i, (input, output)) in values.iter().enumerate() {
//!         let inputs: HashMap<_, _> = (1..).zip(input.iter().copied()).collect();
//!         errors[i] = (network.activate(&inputs).unwrap()[&4] - output).abs();
//!         if errors[i] < ERROR_MARGIN {
//!             errors[i] = 0.0;
//!         }
//!     }
//!
//!     (4.0 - errors.iter().copied().sum::<f32>()).powf(2.0)
//! }
//!
//! fn main() {
//!     let genetic_config = GeneticConfig {
//!         input_count: NonZeroUsize::new(3).unwrap(),
//!         output_count: NonZeroUsize::new(1).unwrap(),
//!         min_weight: -8.0,
//!         max_weight: 8.0,
//!         weight_mutation_power: 2.5,
//!         node_addition_mutation_chance: 0.03,
//!         node_deletion_mutation_chance: 0.01,
//!         gene_addition_mutation_chance: 0.05,
//!         gene_deletion_mutation_chance: 0.01,
//!         ..GeneticConfig::default()
//!     };
//!
//!     let population_config = PopulationConfig {
//!         size: NonZeroUsize::new(150).unwrap(),
//!         elitism: 1,
//!         species_elitism: 2,
//!         ..PopulationConfig::default()
//!     };
//!
//!     let mut population =
//!         Population::<_, _, NNGenome>::with_seed(population_config, genetic_config, 1).unwrap();
//!     population.init().unwrap();
//!     for _ in 0..10 {
//!         population.evaluate_fitness(evaluate_xor);
//!         population.store_best();
//!         if (population.champion().unwrap().fitness() - 16.0).abs() < f32::EPSILON {
//!             println!("Solution found!: {}", population.champion().unwrap());
//!             break;
//!         }
//!         if let Err(e) = population.next_generation() {
//!             eprintln!("{}", e);
//!             break;
//!         }
//!     }
//! }
//! ```

pub mod genomics;
pub mod networks;

/// Identifier type used to designate historically
/// identical mutations for the purposes of
/// genome comparison and genetic tracking.
pub type Innovation = usize;
