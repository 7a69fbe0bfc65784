use crate::genomics::{Connection, GeneticConfig};
use crate::Innovation;

use ahash::RandomState;
use rocketneat::InnovationHistory;
use serde::{Deserialize, Serialize};

use std::collections::hash_map::HashMap;

/// A `History` keeps track of gene and node innovations in a
/// population, in order to make sure identical mutations
/// are assigned the same innovation numbers.
///
/// Both kinds of innovation are keyed by a [`Connection`]:
/// for gene innovations it is the pair of nodes being joined,
/// and for node innovations it is the connection being split.
///
/// Innovation numbers are only shared within a single
/// mutation epoch. [`reset_indexers`] starts a new one,
/// after which repeated requests receive fresh numbers.
///
/// [`reset_indexers`]: History::reset_indexers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    last_gene_innovation: Innovation,
    last_node_innovation: Innovation,
    genes_by_connection: HashMap<Connection, Innovation, RandomState>,
    nodes_by_connection: HashMap<Connection, Innovation, RandomState>,
}

impl InnovationHistory for History {
    type Config = GeneticConfig;

    fn new(config: &GeneticConfig) -> History {
        Self::new(config)
    }

    fn reset_indexers(&mut self) {
        Self::reset_indexers(self)
    }
}

impl History {
    /// Creates a new History using the specified configuration.
    ///
    /// Sensor and output nodes take the node innovation numbers
    /// `1..=input_count + output_count`, and initially generated
    /// genes, if the genome is fully connected, take the gene
    /// innovation numbers `1..=input_count ⨯ output_count`.
    /// The `History` continues numbering from there.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{GeneticConfig, History};
    ///
    /// let history = History::new(&GeneticConfig::default());
    ///
    /// assert_eq!(history.max_node_innovation(), 3);
    /// assert_eq!(history.max_gene_innovation(), 2);
    /// ```
    pub fn new(config: &GeneticConfig) -> History {
        let inputs = config.input_count.get();
        let outputs = config.output_count.get();
        History {
            last_gene_innovation: if config.fully_connected {
                inputs * outputs
            } else {
                0
            },
            last_node_innovation: inputs + outputs,
            genes_by_connection: HashMap::default(),
            nodes_by_connection: HashMap::default(),
        }
    }

    /// Returns the innovation number of a new node splitting
    /// `split`, or the number previously assigned to the same
    /// split in this epoch.
    pub fn next_node_id(&mut self, split: Connection) -> Innovation {
        let last = &mut self.last_node_innovation;
        *self.nodes_by_connection.entry(split).or_insert_with(|| {
            *last += 1;
            *last
        })
    }

    /// Returns the innovation number of a new gene joining
    /// the endpoints of `connection`, or the number previously
    /// assigned to the same connection in this epoch.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{Connection, GeneticConfig, History};
    ///
    /// let mut history = History::new(&GeneticConfig::default());
    ///
    /// let first = history.next_gene_id(Connection::new(1, 3));
    /// assert_eq!(history.next_gene_id(Connection::new(1, 3)), first);
    ///
    /// history.reset_indexers();
    /// assert!(history.next_gene_id(Connection::new(1, 3)) > first);
    /// ```
    pub fn next_gene_id(&mut self, connection: Connection) -> Innovation {
        let last = &mut self.last_gene_innovation;
        *self
            .genes_by_connection
            .entry(connection)
            .or_insert_with(|| {
                *last += 1;
                *last
            })
    }

    /// Starts a new mutation epoch, forgetting which
    /// structural mutations were seen during the last one.
    /// Innovation counters are kept.
    pub fn reset_indexers(&mut self) {
        self.genes_by_connection.clear();
        self.nodes_by_connection.clear();
    }

    /// Returns the highest gene innovation number generated.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{GeneticConfig, History};
    ///
    /// let config = GeneticConfig {
    ///     fully_connected: false,
    ///     ..GeneticConfig::default()
    /// };
    /// let history = History::new(&config);
    ///
    /// assert_eq!(history.max_gene_innovation(), 0);
    /// ```
    pub fn max_gene_innovation(&self) -> Innovation {
        self.last_gene_innovation
    }

    /// Returns the highest node innovation number generated.
    pub fn max_node_innovation(&self) -> Innovation {
        self.last_node_innovation
    }

    /// Returns an iterator over this epoch's gene
    /// innovations, in the format `(connection, gene innovation)`.
    /// No ordering is guaranteed.
    pub fn gene_innovation_history(&self) -> impl Iterator<Item = (&Connection, &Innovation)> {
        self.genes_by_connection.iter()
    }

    /// Returns an iterator over this epoch's node
    /// innovations, in the format `(split connection, new node)`.
    /// No ordering is guaranteed.
    pub fn node_innovation_history(&self) -> impl Iterator<Item = (&Connection, &Innovation)> {
        self.nodes_by_connection.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_after_initial_structure() {
        let config = GeneticConfig {
            input_count: std::num::NonZeroUsize::new(3).unwrap(),
            output_count: std::num::NonZeroUsize::new(2).unwrap(),
            ..GeneticConfig::default()
        };
        let mut history = History::new(&config);
        assert_eq!(history.next_gene_id(Connection::new(1, 4)), 7);
        assert_eq!(history.next_node_id(Connection::new(1, 4)), 6);
    }

    #[test]
    fn node_and_gene_caches_are_separate() {
        let mut history = History::new(&GeneticConfig::default());
        let c = Connection::new(1, 3);
        let node = history.next_node_id(c);
        let gene = history.next_gene_id(c);
        assert_eq!(node, 4);
        assert_eq!(gene, 3);
        assert_eq!(history.next_node_id(c), node);
        assert_eq!(history.next_gene_id(c), gene);
        assert_eq!(history.gene_innovation_history().count(), 1);
        assert_eq!(history.node_innovation_history().count(), 1);
    }

    #[test]
    fn reset_keeps_counters() {
        let mut history = History::new(&GeneticConfig::default());
        let c = Connection::new(2, 3);
        let before = history.next_node_id(c);
        history.reset_indexers();
        assert_eq!(history.node_innovation_history().count(), 0);
        assert_eq!(history.next_node_id(c), before + 1);
        assert_eq!(history.max_node_innovation(), before + 1);
    }
}
