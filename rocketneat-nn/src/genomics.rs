//! Genomes are the focus of evolution in NEAT.
//! They are a collection of connection genes and nodes that can be
//! instantiated as a phenotype (a feed-forward neural network).
//! Genomes can be progressively mutated, thus adding complexity
//! and functionality.

mod config;
mod errors;
mod genes;
mod history;
mod nodes;

pub use config::GeneticConfig;
pub use errors::{ActivationError, GeneValidityError, NodeValidityError};
pub use genes::{Connection, ConnectionGene, ConnectionStatus};
pub use history::History;
pub use nodes::{NodeGene, NodeType};

use crate::Innovation;
use rocketneat::{Genome, GenomeId};

use log::trace;
use rand::prelude::{IteratorRandom, Rng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// A mutable collection of connection genes and nodes,
/// both keyed by innovation number.
///
/// The connection graph of a genome is always acyclic:
/// gene additions that would close a cycle are rejected.
///
/// Suports Serde for convenient genome saving and loading.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NNGenome {
    id: GenomeId,
    nodes: BTreeMap<Innovation, NodeGene>,
    genes: BTreeMap<Innovation, ConnectionGene>,
    fitness: f32,
}

impl NNGenome {
    /// Create a new genome with the specified configuration.
    ///
    /// Sensors are numbered `1..=input_count` and outputs
    /// follow them. If the configuration is fully connected,
    /// a gene is created for every input-output pair, numbered
    /// from 1 in output-major order.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     ..GeneticConfig::default()
    /// };
    ///
    /// let genome = NNGenome::new(1, &config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// // As configured, the genome should have 3 sensors + 2 outputs.
    /// assert_eq!(genome.nodes().count(), 3 + 2);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Sensor).count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Output).count(), 2);
    ///
    /// // Being fully connected, there is a gene for every pair of nodes.
    /// assert_eq!(genome.genes().count(), 3 * 2);
    ///
    /// // All genes should have weights within the configured range.
    /// assert!(genome.genes().all(|g| g.weight().abs() <= 1.0));
    ///
    /// // Gene 4 is the first gene into the second output.
    /// let gene = genome.gene(4).unwrap();
    /// assert_eq!((gene.input(), gene.output()), (1, 5));
    /// ```
    pub fn new<R: Rng + ?Sized>(id: GenomeId, config: &GeneticConfig, rng: &mut R) -> NNGenome {
        let input_count = config.input_count.get();
        let output_count = config.output_count.get();

        let nodes: BTreeMap<_, _> = (1..=input_count)
            .map(|i| NodeGene::new(i, NodeType::Sensor))
            .chain(
                (input_count + 1..=input_count + output_count)
                    .map(|o| NodeGene::new(o, NodeType::Output)),
            )
            .map(|n| (n.innovation(), n))
            .collect();

        let mut genes = BTreeMap::new();
        if config.fully_connected {
            let mut next_id = 0;
            for o in input_count + 1..=input_count + output_count {
                for i in 1..=input_count {
                    next_id += 1;
                    let weight = if config.initial_random_weights {
                        ConnectionGene::random_weight(config, rng)
                    } else {
                        0.0
                    };
                    genes.insert(
                        next_id,
                        ConnectionGene::new(next_id, Connection::new(i, o), weight),
                    );
                }
            }
        }

        NNGenome {
            id,
            nodes,
            genes,
            fitness: f32::MIN,
        }
    }

    /// Add a new gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Errors
    ///
    /// Returns an error if a gene with the same `gene_id`
    /// or the same endpoints already exists in the genome,
    /// if either endpoint is not present in the genome, if
    /// `output_id` is a sensor or `input_id` an output, or
    /// if the gene would create a cycle.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    ///
    /// let config = GeneticConfig {
    ///     fully_connected: false,
    ///     ..GeneticConfig::default()
    /// };
    ///
    /// let mut genome = NNGenome::new(1, &config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// // The genome is initially empty.
    /// assert_eq!(genome.genes().count(), 0);
    ///
    /// genome.add_node(4, NodeType::Hidden).unwrap();
    /// let inserted_gene = genome.add_gene(42, 1, 4, 2.5).unwrap().clone();
    ///
    /// assert_eq!(&inserted_gene, genome.genes().next().unwrap());
    /// assert_eq!(inserted_gene.input(), 1);
    /// assert_eq!(inserted_gene.output(), 4);
    /// assert_eq!(inserted_gene.weight(), 2.5);
    ///
    /// // Closing a cycle is rejected.
    /// genome.add_node(5, NodeType::Hidden).unwrap();
    /// genome.add_gene(43, 4, 5, 1.0).unwrap();
    /// assert!(genome.add_gene(44, 5, 4, 1.0).is_err());
    /// ```
    pub fn add_gene(
        &mut self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
        weight: f32,
    ) -> Result<&mut ConnectionGene, GeneValidityError> {
        let connection = Connection::new(input_id, output_id);
        self.check_gene_viability(gene_id, connection)?;
        Ok(self
            .genes
            .entry(gene_id)
            .or_insert_with(|| ConnectionGene::new(gene_id, connection, weight)))
    }

    /// Checks whether a gene is a duplicate or
    /// is invalid for the genome.
    fn check_gene_viability(
        &self,
        gene_id: Innovation,
        connection: Connection,
    ) -> Result<(), GeneValidityError> {
        use GeneValidityError::*;
        let Connection { input, output } = connection;
        let (input_node, output_node) = match (self.nodes.get(&input), self.nodes.get(&output)) {
            (Some(i), Some(o)) => (i, o),
            _ => return Err(NonexistantEndpoints(input, output)),
        };
        if self.genes.contains_key(&gene_id) {
            Err(DuplicateGeneID(gene_id))
        } else if let Some(duplicate) = self.gene_between(connection) {
            Err(DuplicateGeneWithEndpoints(
                duplicate.innovation(),
                (input, output),
            ))
        } else if !output_node.can_be_target() {
            Err(SensorEndpoint(output))
        } else if !input_node.can_be_source() {
            Err(OutputSource(input))
        } else if self.path_exists(connection) {
            Err(Cycle(input, output))
        } else {
            Ok(())
        }
    }

    /// Add a new hidden, sensor or output node to the genome.
    ///
    /// # Errors
    ///
    /// Returns an error if a node of the
    /// same ID already exists in the genome.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    ///
    /// let config = GeneticConfig::default();
    /// let mut genome = NNGenome::new(1, &config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// let inserted_node = *genome.add_node(42, NodeType::Hidden).unwrap();
    ///
    /// assert_eq!(genome.nodes().count(), 2 + 1 + 1);
    /// assert_eq!(inserted_node.innovation(), 42);
    /// assert_eq!(inserted_node.node_type(), NodeType::Hidden);
    ///
    /// assert!(genome.add_node(42, NodeType::Hidden).is_err());
    /// ```
    pub fn add_node(
        &mut self,
        node_id: Innovation,
        node_type: NodeType,
    ) -> Result<&NodeGene, NodeValidityError> {
        if self.nodes.contains_key(&node_id) {
            return Err(NodeValidityError::DuplicateNodeID(node_id));
        }
        Ok(self
            .nodes
            .entry(node_id)
            .or_insert_with(|| NodeGene::new(node_id, node_type)))
    }

    /// Applies every mutation operator, each with its configured
    /// chance, in the order: node addition, node deletion, gene
    /// addition, gene deletion, and finally weight mutations.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) {
        if rocketneat::rng::chance(rng, config.node_addition_mutation_chance) {
            if let Some(node) = self.mutate_add_node(history, rng) {
                trace!("genome {}: added node {}", self.id, node);
            }
        }
        if rocketneat::rng::chance(rng, config.node_deletion_mutation_chance) {
            if let Some((node, genes)) = self.mutate_delete_node(rng) {
                trace!(
                    "genome {}: deleted node {} and {} genes",
                    self.id,
                    node.innovation(),
                    genes.len()
                );
            }
        }
        if rocketneat::rng::chance(rng, config.gene_addition_mutation_chance) {
            if let Some(gene) = self.mutate_add_gene(history, rng) {
                trace!("genome {}: added or re-enabled gene {}", self.id, gene);
            }
        }
        if rocketneat::rng::chance(rng, config.gene_deletion_mutation_chance) {
            if let Some(gene) = self.mutate_delete_gene(rng) {
                trace!("genome {}: disabled gene {}", self.id, gene);
            }
        }
        self.mutate_weights(config, rng);
    }

    /// Induces _weight mutations_ in the genome. Each gene,
    /// in ascending innovation order, is nudged with chance
    /// [`weight_nudge_chance`] and then reset with chance
    /// [`weight_reset_chance`].
    ///
    /// [`weight_nudge_chance`]: GeneticConfig::weight_nudge_chance
    /// [`weight_reset_chance`]: GeneticConfig::weight_reset_chance
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     min_weight: 5.0,
    ///     max_weight: 10.0,
    ///     weight_reset_chance: 1.0,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(1, &GeneticConfig::default(), &mut rng);
    ///
    /// genome.mutate_weights(&config, &mut rng);
    ///
    /// assert!(genome.genes().all(|g| (5.0..=10.0).contains(&g.weight())));
    /// ```
    pub fn mutate_weights<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        for gene in self.genes.values_mut() {
            if rocketneat::rng::chance(rng, config.weight_nudge_chance) {
                gene.nudge_weight(config, rng);
            }
            if rocketneat::rng::chance(rng, config.weight_reset_chance) {
                gene.randomize_weight(config, rng);
            }
        }
    }

    /// Induces a _node addition mutation_ in the genome.
    ///
    /// A random gene is split in two: it is disabled, and a new
    /// hidden node is placed between its endpoints. The incoming
    /// gene has weight 1 and the outgoing gene keeps the split
    /// gene's weight.
    ///
    /// Returns the new node's innovation number, or `None` if the
    /// genome has no genes or already holds the innovations the
    /// history assigns to this split.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, History, NNGenome, NodeType};
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut history = History::new(&config);
    /// let mut genome = NNGenome::new(1, &config, &mut rng);
    ///
    /// let node = genome.mutate_add_node(&mut history, &mut rng).unwrap();
    ///
    /// assert_eq!(node, 4);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Hidden).count(), 1);
    /// assert_eq!(genome.genes().count(), 2 + 2);
    /// assert_eq!(genome.genes().filter(|g| !g.enabled()).count(), 1);
    /// ```
    pub fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        rng: &mut R,
    ) -> Option<Innovation> {
        let split_id = match self.genes.keys().copied().choose(rng) {
            Some(id) => id,
            None => {
                trace!("genome {}: node addition on genome without genes", self.id);
                return None;
            }
        };
        let split = self.genes[&split_id].connection();
        let weight = self.genes[&split_id].weight();

        let new_node = history.next_node_id(split);
        let incoming = Connection::new(split.input, new_node);
        let outgoing = Connection::new(new_node, split.output);
        let incoming_id = history.next_gene_id(incoming);
        let outgoing_id = history.next_gene_id(outgoing);

        if self.nodes.contains_key(&new_node)
            || self.genes.contains_key(&incoming_id)
            || self.genes.contains_key(&outgoing_id)
        {
            trace!(
                "genome {}: split of {} already present as node {}",
                self.id,
                split,
                new_node
            );
            return None;
        }

        if let Some(gene) = self.genes.get_mut(&split_id) {
            gene.set_status(ConnectionStatus::Disabled);
        }
        self.nodes
            .insert(new_node, NodeGene::new(new_node, NodeType::Hidden));
        self.genes
            .insert(incoming_id, ConnectionGene::new(incoming_id, incoming, 1.0));
        self.genes
            .insert(outgoing_id, ConnectionGene::new(outgoing_id, outgoing, weight));

        Some(new_node)
    }

    /// Deletes a randomly-chosen hidden node, and all
    /// incident genes, from the genome.
    ///
    /// Returns `None` if the genome has no hidden nodes,
    /// or `Some((node, incident_genes))` otherwise.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    ///
    /// let config = GeneticConfig {
    ///     fully_connected: false,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(1, &config, &mut rng);
    /// genome.add_node(42, NodeType::Hidden).unwrap();
    /// genome.add_gene(16, 1, 42, 1.0).unwrap();
    /// genome.add_gene(17, 42, 3, 1.0).unwrap();
    ///
    /// let (removed_node, removed_genes) = genome.mutate_delete_node(&mut rng).unwrap();
    ///
    /// assert_eq!(removed_node.innovation(), 42);
    /// assert_eq!(removed_genes[0].innovation(), 16);
    /// assert_eq!(removed_genes[1].innovation(), 17);
    ///
    /// assert_eq!(genome.nodes().count(), 3);
    /// assert_eq!(genome.genes().count(), 0);
    /// ```
    pub fn mutate_delete_node<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Option<(NodeGene, Vec<ConnectionGene>)> {
        let node_id = match self
            .nodes
            .values()
            .filter(|n| n.node_type() == NodeType::Hidden)
            .map(|n| n.innovation())
            .choose(rng)
        {
            Some(id) => id,
            None => {
                trace!("genome {}: node deletion without hidden nodes", self.id);
                return None;
            }
        };
        let node = self.nodes.remove(&node_id)?;
        let incident: Vec<Innovation> = self
            .genes
            .values()
            .filter(|g| g.input() == node_id || g.output() == node_id)
            .map(|g| g.innovation())
            .collect();
        let genes = incident
            .into_iter()
            .filter_map(|id| self.genes.remove(&id))
            .collect();

        Some((node, genes))
    }

    /// Induces a _gene addition mutation_ in the genome.
    ///
    /// A random non-output node is paired with a random
    /// non-sensor node. If the genome already has a gene
    /// between them, that gene is re-enabled. Otherwise a
    /// new gene is created, unless it would close a cycle.
    ///
    /// Returns the innovation number of the enabled or added
    /// gene, or `None` if no gene could be added.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     fully_connected: false,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut history = History::new(&config);
    /// let mut genome = NNGenome::new(1, &config, &mut rng);
    ///
    /// // With only sensors and one output, every pair is valid.
    /// let gene = genome.mutate_add_gene(&mut history, &mut rng).unwrap();
    /// assert_eq!(gene, 1);
    /// assert_eq!(genome.gene(gene).unwrap().output(), 3);
    /// ```
    pub fn mutate_add_gene<R: Rng + ?Sized>(
        &mut self,
        history: &mut History,
        rng: &mut R,
    ) -> Option<Innovation> {
        let input = self
            .nodes
            .values()
            .filter(|n| n.can_be_source())
            .map(|n| n.innovation())
            .choose(rng);
        let output = self
            .nodes
            .values()
            .filter(|n| n.can_be_target())
            .map(|n| n.innovation())
            .choose(rng);
        let connection = match (input, output) {
            (Some(input), Some(output)) => Connection::new(input, output),
            _ => {
                trace!("genome {}: gene addition without endpoints", self.id);
                return None;
            }
        };

        if let Some(existing) = self.genes.values_mut().find(|g| g.connection() == connection) {
            existing.set_status(ConnectionStatus::Enabled);
            return Some(existing.innovation());
        }

        if self.path_exists(connection) {
            trace!(
                "genome {}: gene {} rejected, would create a cycle",
                self.id,
                connection
            );
            return None;
        }

        let gene_id = history.next_gene_id(connection);
        if self.genes.contains_key(&gene_id) {
            return None;
        }
        self.genes
            .insert(gene_id, ConnectionGene::new(gene_id, connection, 0.0));
        Some(gene_id)
    }

    /// Disables a randomly-chosen gene. Genes are never
    /// removed by this mutation.
    ///
    /// Returns the disabled gene's innovation number, or
    /// `None` if the genome has no genes.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(1, &config, &mut rng);
    ///
    /// let disabled = genome.mutate_delete_gene(&mut rng).unwrap();
    ///
    /// assert_eq!(genome.genes().count(), 2);
    /// assert!(!genome.gene(disabled).unwrap().enabled());
    /// ```
    pub fn mutate_delete_gene<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Innovation> {
        let gene = self.genes.values_mut().choose(rng)?;
        gene.set_status(ConnectionStatus::Disabled);
        Some(gene.innovation())
    }

    /// Returns `true` if `connection.input` is reachable from
    /// `connection.output` following the genome's genes, enabled
    /// or not. A gene between them would then close a cycle.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{Connection, GeneticConfig, NNGenome};
    ///
    /// let config = GeneticConfig::default();
    /// let genome = NNGenome::new(1, &config, &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// assert!(genome.path_exists(Connection::new(3, 1)));
    /// assert!(genome.path_exists(Connection::new(3, 3)));
    /// assert!(!genome.path_exists(Connection::new(1, 3)));
    /// ```
    pub fn path_exists(&self, connection: Connection) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![connection.output];
        while let Some(node) = stack.pop() {
            if node == connection.input {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.extend(
                self.genes
                    .values()
                    .filter(|g| g.input() == node && !visited.contains(&g.output()))
                    .map(|g| g.output()),
            );
        }
        false
    }

    /// Returns the genome's nodes in an order in which every
    /// gene's input precedes its output, or `None` if the
    /// genes form a cycle. Disabled genes are considered.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut genome = NNGenome::new(1, &config, &mut rng);
    /// genome.mutate_add_node(&mut History::new(&config), &mut rng);
    ///
    /// let order = genome.topological_order().unwrap();
    /// let position = |id| order.iter().position(|n| *n == id).unwrap();
    /// assert!(genome.genes().all(|g| position(g.input()) < position(g.output())));
    /// ```
    pub fn topological_order(&self) -> Option<Vec<Innovation>> {
        let mut in_degree: BTreeMap<Innovation, usize> =
            self.nodes.keys().map(|id| (*id, 0)).collect();
        for gene in self.genes.values() {
            *in_degree.entry(gene.output()).or_insert(0) += 1;
            in_degree.entry(gene.input()).or_insert(0);
        }

        let mut ready: BTreeSet<Innovation> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(node) = ready.iter().next().copied() {
            ready.remove(&node);
            order.push(node);
            for gene in self.genes.values().filter(|g| g.input() == node) {
                if let Some(degree) = in_degree.get_mut(&gene.output()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(gene.output());
                    }
                }
            }
        }

        if order.len() == in_degree.len() {
            Some(order)
        } else {
            None
        }
    }

    /// Combines two genomes into a child with id `child_id`.
    ///
    /// The fitter parent (`parent1` on ties) is the _better_ one.
    /// Every gene of the better parent is inherited; where the other
    /// parent has a gene with the same innovation number, the whole
    /// gene is taken from either parent at random. Genes only present
    /// in the worse parent are discarded. The child's nodes are those
    /// referenced by its genes, plus the better parent's sensors and
    /// outputs.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let mut history = History::new(&config);
    ///
    /// let mut better = NNGenome::new(1, &config, &mut rng);
    /// let worse = NNGenome::new(2, &config, &mut rng);
    /// better.mutate_add_node(&mut history, &mut rng);
    /// better.set_fitness(10.0);
    ///
    /// let child = NNGenome::mate(&better, &worse, 3, &mut rng);
    ///
    /// assert_eq!(child.id(), 3);
    /// assert_eq!(child.genes().count(), better.genes().count());
    /// assert_eq!(child.nodes().count(), better.nodes().count());
    /// for gene in child.genes() {
    ///     let id = gene.innovation();
    ///     assert!(
    ///         better.gene(id) == Some(gene) || worse.gene(id) == Some(gene)
    ///     );
    /// }
    /// ```
    pub fn mate<R: Rng + ?Sized>(
        parent1: &NNGenome,
        parent2: &NNGenome,
        child_id: GenomeId,
        rng: &mut R,
    ) -> NNGenome {
        let (better, worse) = if parent2.fitness > parent1.fitness {
            (parent2, parent1)
        } else {
            (parent1, parent2)
        };

        let genes: BTreeMap<_, _> = better
            .genes
            .iter()
            .map(|(id, gene)| {
                let inherited = match worse.genes.get(id) {
                    Some(other) if rng.gen::<bool>() => other,
                    _ => gene,
                };
                (*id, inherited.clone())
            })
            .collect();

        let mut nodes: BTreeMap<_, _> = better
            .nodes
            .iter()
            .filter(|(_, n)| n.node_type() != NodeType::Hidden)
            .map(|(id, n)| (*id, *n))
            .collect();
        for gene in genes.values() {
            for id in [gene.input(), gene.output()] {
                if let Some(node) = better.nodes.get(&id).or_else(|| worse.nodes.get(&id)) {
                    nodes.insert(id, *node);
                }
            }
        }

        NNGenome {
            id: child_id,
            nodes,
            genes,
            fitness: f32::MIN,
        }
    }

    /// Calculates the _genetic distance_ between `first` and `second`.
    ///
    /// Genes present in only one genome count as disjoint. For
    /// genes present in both, the absolute weight difference is
    /// accumulated, plus 1 if their statuses differ. The weighted
    /// sum is divided by the gene count of the larger genome.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    ///
    /// const DISJOINT_FACTOR: f32 = 1.0;
    /// const WEIGHT_FACTOR: f32 = 0.5;
    ///
    /// let config = GeneticConfig {
    ///     fully_connected: false,
    ///     disjoint_gene_factor: DISJOINT_FACTOR,
    ///     common_weight_factor: WEIGHT_FACTOR,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    ///
    /// let mut genome1 = NNGenome::new(1, &config, &mut rng);
    /// let mut genome2 = NNGenome::new(2, &config, &mut rng);
    ///
    /// // Common gene, weight difference of 2.0.
    /// genome1.add_gene(1, 1, 3, 1.0).unwrap();
    /// genome2.add_gene(1, 1, 3, -1.0).unwrap();
    ///
    /// // Disjoint gene.
    /// genome1.add_gene(2, 2, 3, 3.0).unwrap();
    ///
    /// assert_eq!(
    ///     NNGenome::genetic_distance(&genome1, &genome2, &config),
    ///     (DISJOINT_FACTOR * 1.0 + WEIGHT_FACTOR * 2.0) / 2.0
    /// );
    /// assert_eq!(NNGenome::genetic_distance(&genome1, &genome1, &config), 0.0);
    /// ```
    pub fn genetic_distance(first: &NNGenome, second: &NNGenome, config: &GeneticConfig) -> f32 {
        let mut disjoint = 0usize;
        let mut weight_difference = 0.0;
        let ids: BTreeSet<Innovation> = first.genes.keys().chain(second.genes.keys()).copied().collect();
        for id in ids {
            match (first.genes.get(&id), second.genes.get(&id)) {
                (Some(g1), Some(g2)) => {
                    weight_difference += (g1.weight() - g2.weight()).abs();
                    if g1.status() != g2.status() {
                        weight_difference += 1.0;
                    }
                }
                _ => disjoint += 1,
            }
        }

        let n = first.genes.len().max(second.genes.len()).max(1) as f32;
        (config.disjoint_gene_factor * disjoint as f32 + config.common_weight_factor * weight_difference)
            / n
    }

    /// Returns the genome's id.
    pub fn id(&self) -> GenomeId {
        self.id
    }

    /// Returns the gene with the given innovation number, if present.
    pub fn gene(&self, id: Innovation) -> Option<&ConnectionGene> {
        self.genes.get(&id)
    }

    /// Returns the node with the given innovation number, if present.
    pub fn node(&self, id: Innovation) -> Option<&NodeGene> {
        self.nodes.get(&id)
    }

    /// Returns the gene joining the endpoints of `connection`, if present.
    pub fn gene_between(&self, connection: Connection) -> Option<&ConnectionGene> {
        self.genes.values().find(|g| g.connection() == connection)
    }

    /// Returns an iterator over the genome's genes,
    /// in ascending innovation order.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let genome = NNGenome::new(1, &GeneticConfig::default(), &mut ChaCha8Rng::seed_from_u64(0));
    ///
    /// for gene in genome.genes() {
    ///     println!("{}", gene);
    /// }
    /// ```
    pub fn genes(&self) -> impl Iterator<Item = &ConnectionGene> {
        self.genes.values()
    }

    /// Returns a mutable iterator over the genome's genes,
    /// in ascending innovation order.
    pub fn genes_mut(&mut self) -> impl Iterator<Item = &mut ConnectionGene> {
        self.genes.values_mut()
    }

    /// Returns an iterator over the genome's nodes,
    /// in ascending innovation order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeGene> {
        self.nodes.values()
    }

    /// Sets the genome's fitness.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns the genome's fitness. Genomes start
    /// with the lowest finite `f32` until evaluated.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

impl Genome for NNGenome {
    type Config = GeneticConfig;
    type InnovationHistory = History;

    fn new<R: Rng>(id: GenomeId, config: &GeneticConfig, rng: &mut R) -> Self {
        Self::new(id, config, rng)
    }

    fn id(&self) -> GenomeId {
        self.id
    }

    fn genetic_distance(first: &Self, second: &Self, config: &GeneticConfig) -> f32 {
        Self::genetic_distance(first, second, config)
    }

    fn mate<R: Rng>(parent1: &Self, parent2: &Self, child_id: GenomeId, rng: &mut R) -> Self {
        Self::mate(parent1, parent2, child_id, rng)
    }

    fn mutate<R: Rng>(&mut self, history: &mut History, config: &GeneticConfig, rng: &mut R) {
        Self::mutate(self, history, config, rng)
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }
}

impl fmt::Display for NNGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genome {} ({}) {{Genes: [", self.id, self.fitness)?;
        let mut first = true;
        for gene in self.genes.values() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", gene)?;
        }
        write!(f, "], Nodes: [")?;
        first = true;
        for node in self.nodes.values() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", node)?;
        }
        write!(f, "]}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn unconnected() -> GeneticConfig {
        GeneticConfig {
            fully_connected: false,
            ..GeneticConfig::default()
        }
    }

    fn all_mutations() -> GeneticConfig {
        GeneticConfig {
            node_addition_mutation_chance: 0.5,
            node_deletion_mutation_chance: 0.2,
            gene_addition_mutation_chance: 1.0,
            gene_deletion_mutation_chance: 0.3,
            weight_nudge_chance: 0.5,
            weight_reset_chance: 0.1,
            ..GeneticConfig::default()
        }
    }

    fn assert_referenced_nodes_exist(genome: &NNGenome) {
        for gene in genome.genes() {
            assert!(genome.node(gene.input()).is_some(), "{}", genome);
            assert!(genome.node(gene.output()).is_some(), "{}", genome);
        }
    }

    #[test]
    fn new_fully_connected() {
        for input_count in 1..6 {
            for output_count in 1..6 {
                let config = GeneticConfig {
                    input_count: NonZeroUsize::new(input_count).unwrap(),
                    output_count: NonZeroUsize::new(output_count).unwrap(),
                    ..GeneticConfig::default()
                };

                let genome = NNGenome::new(1, &config, &mut rng());
                assert_eq!(genome.genes.len(), input_count * output_count);
                assert_eq!(genome.fitness(), f32::MIN);
                assert_eq!(
                    *genome.nodes.keys().max().unwrap(),
                    input_count + output_count
                );
                for g in genome.genes() {
                    let o = g.output() - input_count - 1;
                    assert_eq!(g.innovation(), o * input_count + g.input());
                    assert!(g.enabled());
                }
            }
        }
    }

    #[test]
    fn new_without_random_weights() {
        let config = GeneticConfig {
            initial_random_weights: false,
            ..GeneticConfig::default()
        };
        let genome = NNGenome::new(1, &config, &mut rng());
        assert!(genome.genes().all(|g| g.weight() == 0.0));
    }

    #[test]
    fn new_unconnected() {
        let genome = NNGenome::new(1, &unconnected(), &mut rng());
        assert_eq!(genome.genes.len(), 0);
        assert_eq!(genome.nodes.len(), 3);
    }

    #[test]
    fn add_gene_errors() {
        let mut genome = NNGenome::new(1, &GeneticConfig::default(), &mut rng());
        genome.add_node(4, NodeType::Hidden).unwrap();

        assert_eq!(
            genome.add_gene(1, 2, 4, 0.0).unwrap_err(),
            GeneValidityError::DuplicateGeneID(1)
        );
        assert_eq!(
            genome.add_gene(9, 1, 3, 0.0).unwrap_err(),
            GeneValidityError::DuplicateGeneWithEndpoints(1, (1, 3))
        );
        assert_eq!(
            genome.add_gene(9, 1, 7, 0.0).unwrap_err(),
            GeneValidityError::NonexistantEndpoints(1, 7)
        );
        assert_eq!(
            genome.add_gene(9, 4, 2, 0.0).unwrap_err(),
            GeneValidityError::SensorEndpoint(2)
        );
        assert_eq!(
            genome.add_gene(9, 3, 4, 0.0).unwrap_err(),
            GeneValidityError::OutputSource(3)
        );
        assert_eq!(
            genome.add_gene(9, 4, 4, 0.0).unwrap_err(),
            GeneValidityError::Cycle(4, 4)
        );
    }

    #[test]
    fn degenerate_mutations_are_no_ops() {
        let mut genome = NNGenome {
            id: 1,
            nodes: BTreeMap::new(),
            genes: BTreeMap::new(),
            fitness: 0.0,
        };
        let config = GeneticConfig::default();
        let mut history = History::new(&config);
        let mut rng = rng();

        assert_eq!(genome.mutate_add_node(&mut history, &mut rng), None);
        assert_eq!(genome.mutate_delete_node(&mut rng), None);
        assert_eq!(genome.mutate_add_gene(&mut history, &mut rng), None);
        assert_eq!(genome.mutate_delete_gene(&mut rng), None);
        genome.mutate(&mut history, &all_mutations(), &mut rng);
        assert_eq!(genome.genes().count(), 0);
    }

    #[test]
    fn mutate_applies_structural_operators() {
        let config = GeneticConfig {
            node_addition_mutation_chance: 1.0,
            ..GeneticConfig::zero()
        };
        let mut rng = rng();
        let mut genome = NNGenome::new(1, &GeneticConfig::default(), &mut rng);
        let mut history = History::new(&GeneticConfig::default());

        genome.mutate(&mut history, &config, &mut rng);
        assert_eq!(
            genome
                .nodes()
                .filter(|n| n.node_type() == NodeType::Hidden)
                .count(),
            1
        );
        assert_eq!(genome.genes().count(), 4);
        assert_eq!(genome.genes().filter(|g| !g.enabled()).count(), 1);

        let config = GeneticConfig {
            node_deletion_mutation_chance: 1.0,
            ..GeneticConfig::zero()
        };
        genome.mutate(&mut history, &config, &mut rng);
        assert!(genome.nodes().all(|n| n.node_type() != NodeType::Hidden));
        assert_eq!(genome.genes().count(), 2);
        assert_referenced_nodes_exist(&genome);
    }

    #[test]
    fn mutate_add_node_same_split_same_innovations() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(1).unwrap(),
            ..GeneticConfig::default()
        };
        let mut rng = rng();
        let mut history = History::new(&config);
        let mut genome1 = NNGenome::new(1, &config, &mut rng);
        let mut genome2 = NNGenome::new(2, &config, &mut rng);

        let node1 = genome1.mutate_add_node(&mut history, &mut rng);
        let node2 = genome2.mutate_add_node(&mut history, &mut rng);
        assert_eq!(node1, node2);
        assert_eq!(
            genome1.genes.keys().collect::<Vec<_>>(),
            genome2.genes.keys().collect::<Vec<_>>()
        );

        let split_gene = genome1.gene(1).unwrap();
        assert!(!split_gene.enabled());
        let incoming = genome1.gene(2).unwrap();
        let outgoing = genome1.gene(3).unwrap();
        assert_eq!(incoming.weight(), 1.0);
        assert_eq!(outgoing.weight(), split_gene.weight());
    }

    #[test]
    fn mutate_add_node_twice_in_epoch_aborts() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(1).unwrap(),
            ..GeneticConfig::default()
        };
        let mut rng = rng();
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(1, &config, &mut rng);
        assert_eq!(genome.mutate_add_node(&mut history, &mut rng), Some(3));

        // Leave gene 1 as the only split candidate, whose
        // innovations in this epoch point at node 3 again.
        genome.genes.remove(&2);
        genome.genes.remove(&3);
        let before = genome.clone();
        assert_eq!(genome.mutate_add_node(&mut history, &mut rng), None);
        assert_eq!(genome, before);

        history.reset_indexers();
        assert_eq!(genome.mutate_add_node(&mut history, &mut rng), Some(4));
    }

    #[test]
    fn mutate_add_gene_reenables_existing() {
        let config = GeneticConfig {
            input_count: NonZeroUsize::new(1).unwrap(),
            ..GeneticConfig::default()
        };
        let mut rng = rng();
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(1, &config, &mut rng);
        genome.mutate_delete_gene(&mut rng).unwrap();
        assert!(!genome.gene(1).unwrap().enabled());

        // A single sensor and output: the only valid pair is 1 -> 2.
        assert_eq!(genome.mutate_add_gene(&mut history, &mut rng), Some(1));
        assert!(genome.gene(1).unwrap().enabled());
        assert_eq!(genome.genes().count(), 1);
    }

    #[test]
    fn mutate_delete_gene_keeps_gene() {
        let mut rng = rng();
        let mut genome = NNGenome::new(1, &GeneticConfig::default(), &mut rng);
        for _ in 0..10 {
            genome.mutate_delete_gene(&mut rng);
        }
        assert_eq!(genome.genes().count(), 2);
        assert!(genome.genes().all(|g| !g.enabled()));
    }

    #[test]
    fn mutation_sequences_stay_acyclic() {
        let config = all_mutations();
        let mut rng = rng();
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(1, &config, &mut rng);
        for _ in 0..300 {
            genome.mutate(&mut history, &config, &mut rng);
            history.reset_indexers();
            assert!(genome.topological_order().is_some(), "{}", genome);
            assert_referenced_nodes_exist(&genome);
            assert!(genome
                .genes()
                .all(|g| (config.min_weight..=config.max_weight).contains(&g.weight())));
        }
    }

    #[test]
    fn topological_order_detects_cycle() {
        let mut genome = NNGenome::new(1, &unconnected(), &mut rng());
        genome.add_node(4, NodeType::Hidden).unwrap();
        genome.add_node(5, NodeType::Hidden).unwrap();
        genome.add_gene(1, 4, 5, 1.0).unwrap();
        // Bypass the cycle check.
        genome
            .genes
            .insert(2, ConnectionGene::new(2, Connection::new(5, 4), 1.0));
        assert_eq!(genome.topological_order(), None);
    }

    #[test]
    fn mate_takes_whole_genes() {
        let config = GeneticConfig::default();
        let mut rng = rng();
        let mut better = NNGenome::new(1, &config, &mut rng);
        let mut worse = NNGenome::new(2, &config, &mut rng);
        worse.mutate_delete_gene(&mut rng);
        worse.genes_mut().for_each(|g| g.set_weight(0.75));
        better.set_fitness(2.0);
        worse.set_fitness(1.0);

        for child_id in 3..50 {
            let child = NNGenome::mate(&worse, &better, child_id, &mut rng);
            for gene in child.genes() {
                let from_better = better.gene(gene.innovation()).unwrap();
                let from_worse = worse.gene(gene.innovation()).unwrap();
                assert!(gene == from_better || gene == from_worse);
            }
        }
    }

    #[test]
    fn mate_discards_worse_only_genes() {
        let config = GeneticConfig::default();
        let mut rng = rng();
        let mut history = History::new(&config);
        let better = NNGenome::new(1, &config, &mut rng);
        let mut worse = NNGenome::new(2, &config, &mut rng);
        worse.mutate_add_node(&mut history, &mut rng).unwrap();

        // Equal fitness: the first argument is the better parent.
        let child = NNGenome::mate(&better, &worse, 3, &mut rng);
        assert_eq!(child.genes().count(), 2);
        assert_eq!(child.nodes().count(), 3);
        assert_referenced_nodes_exist(&child);
    }

    #[test]
    fn genetic_distance_status_difference() {
        let config = GeneticConfig::default();
        let mut rng = rng();
        let genome1 = NNGenome::new(1, &config, &mut rng);
        let mut genome2 = genome1.clone();
        genome2.genes_mut().for_each(|g| g.set_status(ConnectionStatus::Disabled));

        // Two common genes, each with a status difference of 1.
        assert_eq!(
            NNGenome::genetic_distance(&genome1, &genome2, &config),
            config.common_weight_factor * 2.0 / 2.0
        );
    }

    #[test]
    fn genetic_distance_empty_genomes() {
        let config = unconnected();
        let mut rng = rng();
        let genome1 = NNGenome::new(1, &config, &mut rng);
        let genome2 = NNGenome::new(2, &config, &mut rng);
        assert_eq!(NNGenome::genetic_distance(&genome1, &genome2, &config), 0.0);
    }

    #[test]
    fn serde_round_trip() {
        let mut genome = NNGenome::new(1, &GeneticConfig::default(), &mut rng());
        genome.set_fitness(1.5);
        let json = serde_json::to_string(&genome).unwrap();
        let parsed: NNGenome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genome);
    }

    #[test]
    fn display() {
        let mut genome = NNGenome::new(7, &GeneticConfig::default(), &mut rng());
        genome.genes_mut().for_each(|g| g.set_weight(0.5));
        genome.set_fitness(2.0);
        assert_eq!(
            genome.to_string(),
            "Genome 7 (2) {Genes: [1[1->3, 0.500], 2[2->3, 0.500]], Nodes: [1[Sensor], 2[Sensor], 3[Output]]}"
        );
    }
}
