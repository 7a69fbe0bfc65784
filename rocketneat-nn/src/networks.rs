//! Feed-forward evaluation of [`NNGenome`]s.
//!
//! [`NNGenome`]: crate::genomics::NNGenome

use crate::genomics::{ActivationError, NNGenome, NodeType};
use crate::Innovation;

use ahash::RandomState;

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Steepened logistic function, `1 / (1 + e^(-4.9x))`.
///
/// # Examples
/// ```
/// use rocketneat_nn::networks::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert!(sigmoid(10.0) > 0.999);
/// ```
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-4.9 * x).exp())
}

/// A feed-forward network compiled from a genome.
///
/// Only enabled genes take part in evaluation. Each node's
/// value is the sigmoid of the weighted sum of its inputs;
/// nodes without incoming genes evaluate to their supplied
/// input if they are sensors, or to 0 otherwise.
///
/// The network holds no state between activations, so it
/// must be rebuilt if its genome changes.
#[derive(Clone, Debug)]
pub struct Network {
    node_types: HashMap<Innovation, NodeType, RandomState>,
    dependencies: HashMap<Innovation, Vec<(Innovation, f32)>, RandomState>,
    sensors: Vec<Innovation>,
    outputs: Vec<Innovation>,
}

impl From<&NNGenome> for Network {
    /// Generates a new network from the passed genome.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{GeneticConfig, NNGenome};
    /// use rocketneat_nn::networks::Network;
    ///
    /// let genome = NNGenome::new(1, &GeneticConfig::default(), &mut ChaCha8Rng::seed_from_u64(0));
    /// let network = Network::from(&genome);
    ///
    /// assert_eq!(network.sensors(), &[1, 2]);
    /// assert_eq!(network.outputs(), &[3]);
    /// ```
    fn from(genome: &NNGenome) -> Network {
        let mut dependencies: HashMap<_, Vec<_>, RandomState> = HashMap::default();
        // Genes are visited in ascending innovation order,
        // which fixes the summation order.
        for gene in genome.genes().filter(|g| g.enabled()) {
            dependencies
                .entry(gene.output())
                .or_default()
                .push((gene.input(), gene.weight()));
        }

        let nodes_of = |node_type: NodeType| -> Vec<Innovation> {
            genome
                .nodes()
                .filter(|n| n.node_type() == node_type)
                .map(|n| n.innovation())
                .collect()
        };

        Network {
            node_types: genome
                .nodes()
                .map(|n| (n.innovation(), n.node_type()))
                .collect(),
            dependencies,
            sensors: nodes_of(NodeType::Sensor),
            outputs: nodes_of(NodeType::Output),
        }
    }
}

impl Network {
    /// Computes the value of every output node for the given
    /// sensor values, keyed by node innovation number.
    ///
    /// Activation is a pure function of the network and `inputs`.
    ///
    /// # Errors
    ///
    /// Returns an error if `inputs` lacks a value for any of the
    /// network's sensors, or holds one for a node that is not
    /// a sensor.
    ///
    /// # Examples
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use rocketneat_nn::genomics::{ActivationError, GeneticConfig, NNGenome};
    /// use rocketneat_nn::networks::Network;
    /// use std::collections::HashMap;
    ///
    /// let mut genome = NNGenome::new(1, &GeneticConfig::default(), &mut ChaCha8Rng::seed_from_u64(0));
    /// genome.genes_mut().for_each(|g| g.set_weight(1.0));
    /// let network = Network::from(&genome);
    ///
    /// let inputs: HashMap<_, _> = [(1, 0.0), (2, 0.0)].into_iter().collect();
    /// assert_eq!(network.activate(&inputs).unwrap()[&3], 0.5);
    ///
    /// let missing: HashMap<_, _> = [(1, 0.0)].into_iter().collect();
    /// assert_eq!(network.activate(&missing), Err(ActivationError::MissingInput(2)));
    /// ```
    pub fn activate<S: BuildHasher>(
        &self,
        inputs: &HashMap<Innovation, f32, S>,
    ) -> Result<BTreeMap<Innovation, f32>, ActivationError> {
        if let Some(missing) = self.sensors.iter().find(|s| !inputs.contains_key(*s)) {
            return Err(ActivationError::MissingInput(*missing));
        }
        if let Some(unknown) = inputs
            .keys()
            .filter(|id| self.node_types.get(*id) != Some(&NodeType::Sensor))
            .min()
        {
            return Err(ActivationError::UnknownNode(*unknown));
        }

        let mut memo = HashMap::with_hasher(RandomState::new());
        Ok(self
            .outputs
            .iter()
            .map(|output| (*output, self.value_of(*output, inputs, &mut memo)))
            .collect())
    }

    /// Computes a node's value, visiting each
    /// node at most once per activation.
    fn value_of<S: BuildHasher>(
        &self,
        node: Innovation,
        inputs: &HashMap<Innovation, f32, S>,
        memo: &mut HashMap<Innovation, f32, RandomState>,
    ) -> f32 {
        if let Some(value) = memo.get(&node) {
            return *value;
        }
        let value = match self.dependencies.get(&node) {
            Some(dependencies) if !dependencies.is_empty() => {
                let mut sum = 0.0;
                for (input, weight) in dependencies {
                    sum += weight * self.value_of(*input, inputs, memo);
                }
                sigmoid(sum)
            }
            _ => match self.node_types.get(&node) {
                Some(NodeType::Sensor) => inputs.get(&node).copied().unwrap_or(0.0),
                _ => 0.0,
            },
        };
        memo.insert(node, value);
        value
    }

    /// Returns the network's sensor ids, in ascending order.
    pub fn sensors(&self) -> &[Innovation] {
        &self.sensors
    }

    /// Returns the network's output ids, in ascending order.
    pub fn outputs(&self) -> &[Innovation] {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ConnectionStatus, GeneticConfig, History};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit_weight_genome() -> NNGenome {
        let mut genome = NNGenome::new(
            1,
            &GeneticConfig::default(),
            &mut ChaCha8Rng::seed_from_u64(0),
        );
        genome.genes_mut().for_each(|g| g.set_weight(1.0));
        genome
    }

    fn inputs(a: f32, b: f32) -> HashMap<Innovation, f32> {
        [(1, a), (2, b)].into_iter().collect()
    }

    #[test]
    fn zero_inputs_give_half() {
        let network = Network::from(&unit_weight_genome());
        let outputs = network.activate(&inputs(0.0, 0.0)).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[&3], 0.5);
    }

    #[test]
    fn weighted_sum() {
        let network = Network::from(&unit_weight_genome());
        let outputs = network.activate(&inputs(0.25, -0.5)).unwrap();
        assert_eq!(outputs[&3], sigmoid(0.25 - 0.5));
    }

    #[test]
    fn disabled_genes_are_ignored() {
        let mut genome = unit_weight_genome();
        genome
            .genes_mut()
            .for_each(|g| g.set_status(ConnectionStatus::Disabled));
        let network = Network::from(&genome);
        for (a, b) in [(0.0, 0.0), (1.0, -1.0), (5.0, 3.0)] {
            assert_eq!(network.activate(&inputs(a, b)).unwrap()[&3], 0.0);
        }
    }

    #[test]
    fn hidden_node() {
        let config = GeneticConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut genome = unit_weight_genome();
        let mut history = History::new(&config);
        let hidden = genome.mutate_add_node(&mut history, &mut rng).unwrap();
        let network = Network::from(&genome);

        let split = genome
            .genes()
            .find(|g| !g.enabled())
            .map(|g| g.input())
            .unwrap();
        let other = if split == 1 { 2 } else { 1 };
        let values = inputs(0.3, 0.7);
        let hidden_value = sigmoid(values[&split]);
        let expected = sigmoid(values[&other] + hidden_value);

        assert_eq!(hidden, 4);
        assert!((network.activate(&values).unwrap()[&3] - expected).abs() < 1e-6);
    }

    #[test]
    fn activation_is_pure() {
        let network = Network::from(&unit_weight_genome());
        let first = network.activate(&inputs(0.1, 0.9)).unwrap();
        let second = network.activate(&inputs(0.1, 0.9)).unwrap();
        assert_eq!(first[&3].to_bits(), second[&3].to_bits());
    }

    #[test]
    fn unknown_input() {
        let network = Network::from(&unit_weight_genome());
        let mut values = inputs(0.0, 0.0);
        values.insert(3, 1.0);
        assert_eq!(
            network.activate(&values),
            Err(ActivationError::UnknownNode(3))
        );
    }
}
