use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// A NodeType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Input nodes. Their value is supplied
    /// externally at activation time.
    Sensor,
    /// Hidden nodes.
    Hidden,
    /// Output nodes.
    Output,
}

/// Nodes are the structural elements of genomes
/// between which connection genes are created.
///
/// Nodes are immutable once created, and are
/// cloned by value when copied between genomes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct NodeGene {
    id: Innovation,
    node_type: NodeType,
}

impl NodeGene {
    /// Generate a new node with the passed parameters.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{NodeGene, NodeType};
    ///
    /// let node = NodeGene::new(5, NodeType::Hidden);
    /// ```
    pub fn new(id: Innovation, node_type: NodeType) -> NodeGene {
        NodeGene { id, node_type }
    }

    /// Returns the node's innovation number.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{NodeGene, NodeType};
    ///
    /// let node = NodeGene::new(5, NodeType::Hidden);
    ///
    /// assert_eq!(node.innovation(), 5);
    /// ```
    pub fn innovation(&self) -> Innovation {
        self.id
    }

    /// Returns the node's node type.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::{NodeGene, NodeType};
    ///
    /// let node = NodeGene::new(5, NodeType::Hidden);
    ///
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    /// ```
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Whether a connection gene may start at this node.
    pub(crate) fn can_be_source(&self) -> bool {
        self.node_type != NodeType::Output
    }

    /// Whether a connection gene may end at this node.
    pub(crate) fn can_be_target(&self) -> bool {
        self.node_type != NodeType::Sensor
    }
}

impl fmt::Display for NodeGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{:?}]", self.id, self.node_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_roles() {
        let sensor = NodeGene::new(1, NodeType::Sensor);
        let hidden = NodeGene::new(2, NodeType::Hidden);
        let output = NodeGene::new(3, NodeType::Output);

        assert!(sensor.can_be_source() && !sensor.can_be_target());
        assert!(hidden.can_be_source() && hidden.can_be_target());
        assert!(!output.can_be_source() && output.can_be_target());
    }

    #[test]
    fn display() {
        assert_eq!(NodeGene::new(7, NodeType::Output).to_string(), "7[Output]");
    }
}
