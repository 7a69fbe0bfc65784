use rand::Rng;
use rocketneat::{rng, ConfigError, Population, PopulationConfig, Snapshot};
use rocketneat_nn::genomics::{GeneticConfig, History, NNGenome, NodeType};
use rocketneat_nn::networks::Network;

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;

type NNPopulation = Population<GeneticConfig, History, NNGenome>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn population_config(size: usize) -> PopulationConfig {
    PopulationConfig {
        size: NonZeroUsize::new(size).unwrap(),
        ..PopulationConfig::default()
    }
}

fn busy_genetic_config() -> GeneticConfig {
    GeneticConfig {
        node_addition_mutation_chance: 0.5,
        node_deletion_mutation_chance: 0.2,
        gene_addition_mutation_chance: 0.8,
        gene_deletion_mutation_chance: 0.2,
        ..GeneticConfig::default()
    }
}

#[test]
fn size_is_kept_and_ids_increase() {
    init_logging();
    let mut population =
        NNPopulation::with_seed(population_config(20), GeneticConfig::default(), 11).unwrap();
    population.init().unwrap();
    let mut fitness_rng = rng::seeded(99);

    let mut highest_id = population.genomes().map(|g| g.id()).max().unwrap();
    let mut previous: Vec<_> = population.genomes().map(|g| g.id()).collect();
    assert_eq!(previous.len(), 20);

    for generation in 1..=10 {
        population.evaluate_fitness(|_| fitness_rng.gen_range(0.0..10.0));
        population.store_best();
        population.next_generation().unwrap();

        let current: Vec<_> = population.genomes().map(|g| g.id()).collect();
        assert_eq!(current.len(), 20, "generation {}", generation);
        for id in current.iter().filter(|id| !previous.contains(*id)) {
            assert!(*id > highest_id, "id {} reused or out of order", id);
        }
        highest_id = highest_id.max(current.iter().copied().max().unwrap());
        previous = current;
    }
}

#[test]
fn elites_survive_unchanged() {
    init_logging();
    let config = PopulationConfig {
        distance_threshold: 1000.0,
        elitism: 3,
        ..population_config(15)
    };
    let mut population = NNPopulation::with_seed(config, busy_genetic_config(), 3).unwrap();
    population.init().unwrap();

    for _ in 0..5 {
        population.evaluate_fitness(|g| g.genes().map(|gene| gene.weight()).sum());
        assert_eq!(population.species().count(), 1);
        let previous: BTreeMap<_, _> = population.genomes().map(|g| (g.id(), g.clone())).collect();

        population.next_generation().unwrap();
        let unchanged = population
            .genomes()
            .filter(|g| previous.get(&g.id()) == Some(g))
            .count();
        assert!(unchanged >= 3, "only {} elites kept", unchanged);
    }
}

#[test]
fn evolved_genomes_stay_well_formed() {
    init_logging();
    let mut population =
        NNPopulation::with_seed(population_config(30), busy_genetic_config(), 5).unwrap();
    population.init().unwrap();

    for _ in 0..15 {
        population.evaluate_fitness(|g| g.nodes().count() as f32);
        population.next_generation().unwrap();

        for genome in population.genomes() {
            for gene in genome.genes() {
                assert!(genome.node(gene.input()).is_some());
                assert!(genome.node(gene.output()).is_some());
            }
            assert!(genome.topological_order().is_some(), "cycle in {}", genome);
            assert_eq!(
                genome
                    .nodes()
                    .filter(|n| n.node_type() != NodeType::Hidden)
                    .count(),
                3
            );
            assert_eq!(
                population
                    .catalog()
                    .distance(genome, genome, population.genetic_config()),
                0.0
            );
        }
    }
}

#[test]
fn crossover_inherits_whole_genes() {
    init_logging();
    let mut population =
        NNPopulation::with_seed(population_config(20), busy_genetic_config(), 8).unwrap();
    population.init().unwrap();
    for _ in 0..5 {
        population.evaluate_fitness(|g| g.genes().count() as f32);
        population.next_generation().unwrap();
    }

    let genomes: Vec<&NNGenome> = population.genomes().collect();
    let mut rng = rng::seeded(0);
    for pair in genomes.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let child = NNGenome::mate(p1, p2, 1000, &mut rng);
        for gene in child.genes() {
            let id = gene.innovation();
            assert!(p1.gene(id).is_some() || p2.gene(id).is_some());
            assert!(p1.gene(id) == Some(gene) || p2.gene(id) == Some(gene));
        }
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    init_logging();
    let run = || {
        let mut population =
            NNPopulation::with_seed(population_config(25), busy_genetic_config(), 21).unwrap();
        population.init().unwrap();
        for _ in 0..6 {
            population.evaluate_fitness(|g| g.genes().filter(|gene| gene.enabled()).count() as f32);
            population.store_best();
            population.next_generation().unwrap();
        }
        population.snapshot()
    };
    assert_eq!(run(), run());
}

#[test]
fn snapshot_serializes() {
    init_logging();
    let mut population =
        NNPopulation::with_seed(population_config(10), GeneticConfig::default(), 2).unwrap();
    population.init().unwrap();
    population.evaluate_fitness(|g| g.id() as f32);
    population.store_best();
    population.next_generation().unwrap();

    let snapshot = population.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: Snapshot<GeneticConfig, NNGenome> = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.generation, 1);
    assert_eq!(restored.population_config, snapshot.population_config);
    assert_eq!(restored.best.as_ref().map(|g| g.id()), Some(10));
    assert_eq!(
        restored.species.keys().collect::<Vec<_>>(),
        snapshot.species.keys().collect::<Vec<_>>()
    );
    for (id, species) in &restored.species {
        let original = &snapshot.species[id];
        assert_eq!(species.representative_id, original.representative_id);
        assert_eq!(
            species.members.keys().collect::<Vec<_>>(),
            original.members.keys().collect::<Vec<_>>()
        );
        assert!(species.members.contains_key(&species.representative_id));
    }
}

#[test]
fn invalid_genetic_config_is_rejected() {
    init_logging();
    let config = GeneticConfig {
        gene_addition_mutation_chance: 1.5,
        ..GeneticConfig::default()
    };
    assert!(matches!(
        NNPopulation::with_seed(population_config(10), config, 0),
        Err(ConfigError::OutOfUnitRange { .. })
    ));

    let config = GeneticConfig {
        min_weight: 2.0,
        max_weight: -2.0,
        ..GeneticConfig::default()
    };
    assert!(matches!(
        NNPopulation::with_seed(population_config(10), config, 0),
        Err(ConfigError::InvalidWeightRange { .. })
    ));
}

#[test]
fn networks_follow_evolved_genomes() {
    init_logging();
    let mut population =
        NNPopulation::with_seed(population_config(20), busy_genetic_config(), 4).unwrap();
    population.init().unwrap();
    for _ in 0..5 {
        population.evaluate_fitness(|_| 1.0);
        population.next_generation().unwrap();
    }

    let inputs: HashMap<_, _> = [(1, 0.5), (2, -0.5)].into_iter().collect();
    for genome in population.genomes() {
        let outputs = Network::from(genome).activate(&inputs).unwrap();
        assert_eq!(outputs.keys().copied().collect::<Vec<_>>(), [3]);
        assert!((0.0..=1.0).contains(&outputs[&3]));
    }
}
