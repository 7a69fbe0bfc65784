use rocketneat::logging::{EvolutionLogger, ReportingLevel, Stats};
use rocketneat::{Population, PopulationConfig, Snapshot};
use rocketneat_nn::genomics::{GeneticConfig, History, NNGenome};
use rocketneat_nn::networks::Network;

use log::{info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::num::NonZeroUsize;

type XorPopulation = Population<GeneticConfig, History, NNGenome>;

const ERROR_MARGIN: f32 = 0.3;
const SOLVED_FITNESS: f32 = 16.0;
const MAX_GENERATIONS: usize = 100;

fn evaluate_xor(genome: &NNGenome) -> f32 {
    let network = Network::from(genome);

    // Sensor 1 is a constant bias.
    let values = [
        ([1.0, 0.0, 0.0], 0.0),
        ([1.0, 0.0, 1.0], 1.0),
        ([1.0, 1.0, 0.0], 1.0),
        ([1.0, 1.0, 1.0], 0.0),
    ];

    let mut errors = [0.0, 0.0, 0.0, 0.0];
    for (i, (input, output)) in values.iter().enumerate() {
        let inputs: HashMap<_, _> = (1..).zip(input.iter().copied()).collect();
        errors[i] = match network.activate(&inputs) {
            Ok(outputs) => (outputs[&4] - output).abs(),
            Err(e) => {
                warn!("genome {} could not be evaluated: {}", genome.id(), e);
                1.0
            }
        };
        if errors[i] < ERROR_MARGIN {
            errors[i] = 0.0;
        }
    }

    (4.0 - errors.iter().copied().sum::<f32>()).powf(2.0)
}

fn solved(population: &XorPopulation) -> bool {
    population
        .champion()
        .map_or(false, |c| (c.fitness() - SOLVED_FITNESS).abs() < f32::EPSILON)
}

fn main() {
    env_logger::init();

    let genetic_config = GeneticConfig {
        input_count: NonZeroUsize::new(3).unwrap(),
        output_count: NonZeroUsize::new(1).unwrap(),
        min_weight: -8.0,
        max_weight: 8.0,
        weight_reset_chance: 0.1,
        weight_nudge_chance: 0.9,
        weight_mutation_power: 2.5,
        node_addition_mutation_chance: 0.03,
        gene_addition_mutation_chance: 0.05,
        node_deletion_mutation_chance: 0.01,
        gene_deletion_mutation_chance: 0.01,
        disjoint_gene_factor: 1.0,
        common_weight_factor: 0.4,
        ..GeneticConfig::default()
    };
    let population_config = PopulationConfig {
        size: NonZeroUsize::new(150).unwrap(),
        distance_threshold: 3.0,
        elitism: 1,
        survival_threshold: 0.2,
        min_species_size: 2,
        stagnation_threshold: NonZeroUsize::new(15).unwrap(),
        species_elitism: 2,
    };

    stress_test(&genetic_config, &population_config);
    snapshot_test(&genetic_config, &population_config);
}

/// Evolves a population until it solves XOR or runs out of
/// generations. Returns the population, and the generation
/// it was solved in.
fn run(
    genetic_config: &GeneticConfig,
    population_config: &PopulationConfig,
    seed: u64,
    logger: Option<&mut EvolutionLogger<NNGenome>>,
) -> (XorPopulation, Option<usize>) {
    let mut population =
        XorPopulation::with_seed(population_config.clone(), genetic_config.clone(), seed)
            .expect("invalid configuration");
    population.init().expect("fresh population");

    let mut logger = logger;
    for _ in 0..MAX_GENERATIONS {
        population.evaluate_fitness(evaluate_xor);
        population.store_best();
        if let Some(logger) = logger.as_deref_mut() {
            logger.log(
                &population,
                &|g: &NNGenome| [g.fitness(), g.genes().count() as f32, g.nodes().count() as f32],
                ["fitness", "genes", "nodes"],
            );
        }
        if solved(&population) {
            let generation = population.generation();
            return (population, Some(generation));
        }
        if let Err(e) = population.next_generation() {
            warn!("seed {}: {}", seed, e);
            break;
        }
    }
    (population, None)
}

fn stress_test(genetic_config: &GeneticConfig, population_config: &PopulationConfig) {
    const ITERATIONS: usize = 100;
    let mut seeds = rand::thread_rng();
    let generations: Vec<Option<usize>> = (0..ITERATIONS)
        .map(|_| run(genetic_config, population_config, seeds.gen(), None).1)
        .collect();

    println!(
        "Successful run generation count {}, {}% failure rate over {} iterations",
        Stats::from(generations.iter().filter_map(|g| g.map(|g| g as f32))),
        generations.iter().filter(|g| g.is_none()).count() as f32 * 100.0 / ITERATIONS as f32,
        ITERATIONS
    );
}

fn snapshot_test(genetic_config: &GeneticConfig, population_config: &PopulationConfig) {
    let mut logger = EvolutionLogger::new(ReportingLevel::PopulationChampion);
    let (population, solved_at) = run(genetic_config, population_config, 0, Some(&mut logger));
    if let Some(log) = logger.iter().last() {
        println!("{}", log);
    }
    match solved_at {
        Some(generation) => info!("seed 0 solved XOR at generation {}", generation),
        None => info!("seed 0 did not solve XOR"),
    }

    let serialized = ron::to_string(&population.snapshot()).expect("snapshot serialization");
    let restored: Snapshot<GeneticConfig, NNGenome> =
        ron::from_str(&serialized).expect("snapshot deserialization");
    if let Some(best) = restored.best {
        println!("{}", best);
        println!("{}", ron::to_string(&best).unwrap_or_default());
    }
}
