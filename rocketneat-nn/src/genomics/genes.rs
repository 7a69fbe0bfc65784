use crate::genomics::GeneticConfig;
use crate::Innovation;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The structural key of a connection gene:
/// the pair of nodes it joins. Used to look up
/// historical markings, not as an entity itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub input: Innovation,
    pub output: Innovation,
}

impl Connection {
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::Connection;
    ///
    /// let connection = Connection::new(1, 3);
    /// assert_eq!((connection.input, connection.output), (1, 3));
    /// ```
    pub fn new(input: Innovation, output: Innovation) -> Connection {
        Connection { input, output }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}->{:?}", self.input, self.output)
    }
}

/// Whether a connection gene takes part
/// in network evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Enabled,
    Disabled,
}

/// Connection genes are the principal components of
/// genomes. They are created between two nodes, and
/// become network connections in the genome's phenotype.
///
/// A connection gene is never removed from a genome
/// by mutation; deletion disables it instead.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ConnectionGene {
    id: Innovation,
    connection: Connection,
    weight: f32,
    status: ConnectionStatus,
}

impl ConnectionGene {
    /// Returns a new _enabled_ gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{Connection, ConnectionGene};
    ///
    /// let gene = ConnectionGene::new(42, Connection::new(3, 9), 2.0);
    /// ```
    pub fn new(id: Innovation, connection: Connection, weight: f32) -> ConnectionGene {
        ConnectionGene {
            id,
            connection,
            weight,
            status: ConnectionStatus::Enabled,
        }
    }

    /// Returns a random weight. Uses a uniform distribution
    /// over the range [`min_weight`, `max_weight`].
    pub(super) fn random_weight<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> f32 {
        if config.min_weight < config.max_weight {
            rng.gen_range(config.min_weight..=config.max_weight)
        } else {
            config.min_weight
        }
    }

    /// Randomizes the gene's weight. Uses a uniform
    /// distribution over the range [[`min_weight`], [`max_weight`]].
    ///
    /// [`min_weight`]: crate::genomics::GeneticConfig::min_weight
    /// [`max_weight`]: crate::genomics::GeneticConfig::max_weight
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{Connection, ConnectionGene, GeneticConfig};
    ///
    /// let mut gene = ConnectionGene::new(42, Connection::new(3, 9), 2.0);
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    ///
    /// gene.randomize_weight(
    ///     &GeneticConfig {
    ///         min_weight: -5.0,
    ///         max_weight: 5.0,
    ///         ..GeneticConfig::zero()
    ///     },
    ///     &mut rng,
    /// );
    ///
    /// assert!(gene.weight().abs() <= 5.0);
    /// ```
    pub fn randomize_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        self.weight = Self::random_weight(config, rng);
    }

    /// Nudges the gene's weight by a random amount. Uses
    /// a uniform distribution over the range ±[`weight_mutation_power`],
    /// then clamps the result into [[`min_weight`], [`max_weight`]].
    /// An empty or NaN range leaves the nudged weight unclamped.
    ///
    /// [`weight_mutation_power`]: crate::genomics::GeneticConfig::weight_mutation_power
    /// [`min_weight`]: crate::genomics::GeneticConfig::min_weight
    /// [`max_weight`]: crate::genomics::GeneticConfig::max_weight
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{Connection, ConnectionGene, GeneticConfig};
    ///
    /// let mut gene = ConnectionGene::new(42, Connection::new(3, 9), 4.5);
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    ///
    /// gene.nudge_weight(
    ///     &GeneticConfig {
    ///         weight_mutation_power: 2.5,
    ///         min_weight: -5.0,
    ///         max_weight: 5.0,
    ///         ..GeneticConfig::zero()
    ///     },
    ///     &mut rng,
    /// );
    ///
    /// assert!((gene.weight() - 4.5).abs() <= 2.5);
    /// assert!(gene.weight() <= 5.0);
    /// ```
    pub fn nudge_weight<R: Rng + ?Sized>(&mut self, config: &GeneticConfig, rng: &mut R) {
        self.weight += rng.gen_range(-1.0..=1.0f32) * config.weight_mutation_power;
        if config.min_weight <= config.max_weight {
            self.weight = self.weight.clamp(config.min_weight, config.max_weight);
        }
    }

    /// Returns the gene's innovation number.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{Connection, ConnectionGene};
    ///
    /// let gene = ConnectionGene::new(42, Connection::new(3, 9), 2.0);
    ///
    /// assert_eq!(gene.innovation(), 42);
    /// ```
    pub fn innovation(&self) -> Innovation {
        self.id
    }

    /// Returns the pair of nodes joined by the gene.
    pub fn connection(&self) -> Connection {
        self.connection
    }

    /// Returns the gene's input node's innovation number.
    pub fn input(&self) -> Innovation {
        self.connection.input
    }

    /// Returns the gene's output node's innovation number.
    pub fn output(&self) -> Innovation {
        self.connection.output
    }

    /// Returns the gene's weight.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Sets the gene's weight
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{Connection, ConnectionGene};
    ///
    /// let mut gene = ConnectionGene::new(42, Connection::new(3, 9), 2.0);
    /// gene.set_weight(-5.0);
    ///
    /// assert_eq!(gene.weight(), -5.0);
    /// ```
    pub fn set_weight(&mut self, w: f32) {
        self.weight = w;
    }

    /// Returns the gene's status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Returns `true` if the gene takes part in evaluation.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{Connection, ConnectionGene, ConnectionStatus};
    ///
    /// let mut gene = ConnectionGene::new(42, Connection::new(3, 9), 2.0);
    /// assert!(gene.enabled());
    ///
    /// gene.set_status(ConnectionStatus::Disabled);
    /// assert!(!gene.enabled());
    /// ```
    pub fn enabled(&self) -> bool {
        self.status == ConnectionStatus::Enabled
    }

    /// Sets the gene's status.
    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disabled = self.status == ConnectionStatus::Disabled;
        write!(
            f,
            "{}{:?}[{}, {:.3}]{}",
            if disabled { "(" } else { "" },
            self.id,
            self.connection,
            self.weight,
            if disabled { ")" } else { "" },
        )
    }
}
