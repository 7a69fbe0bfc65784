use crate::Innovation;

use std::error::Error;
use std::fmt;

/// An error type indicating the gene being
/// added to a genome is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneValidityError {
    /// The gene's ID is a duplicate.
    DuplicateGeneID(Innovation),
    /// The gene's endpoints do not exist.
    NonexistantEndpoints(Innovation, Innovation),
    /// The gene has the same endpoints as another with a different ID.
    DuplicateGeneWithEndpoints(Innovation, (Innovation, Innovation)),
    /// The gene's output is a SENSOR node, which is not allowed.
    SensorEndpoint(Innovation),
    /// The gene's input is an OUTPUT node, which is not allowed.
    OutputSource(Innovation),
    /// The gene would close a cycle.
    Cycle(Innovation, Innovation),
}

/// An error type indicating the node being
/// added to a genome is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValidityError {
    /// The node's ID is a duplicate.
    DuplicateNodeID(Innovation),
}

/// An error type indicating a network
/// could not be activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// No value was supplied for the sensor with this ID.
    MissingInput(Innovation),
    /// A value was supplied for a node that is not a sensor
    /// of the network.
    UnknownNode(Innovation),
}

impl fmt::Display for GeneValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateGeneID(gene_id) => {
                write!(f, "duplicate gene insertion with id {}", gene_id)
            }
            Self::NonexistantEndpoints(input, output) => write!(
                f,
                "gene insertion between nonexistant endpoint(s) {} -> {}",
                input, output
            ),
            Self::DuplicateGeneWithEndpoints(duplicate_id, (input, output)) => write!(
                f,
                "gene insertion with endpoints {} -> {} and id {} shadows gene with same endpoints",
                input, output, duplicate_id,
            ),
            Self::SensorEndpoint(id) => write!(
                f,
                "gene insertion with sensor node as output endpoint with id {}",
                id
            ),
            Self::OutputSource(id) => write!(
                f,
                "gene insertion with output node as input endpoint with id {}",
                id
            ),
            Self::Cycle(input, output) => write!(
                f,
                "gene insertion between {} -> {} would create a cycle",
                input, output
            ),
        }
    }
}

impl fmt::Display for NodeValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeID(id) => write!(f, "duplicate node insertion with id {}", id),
        }
    }
}

impl fmt::Display for ActivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(id) => write!(f, "no input supplied for sensor node {}", id),
            Self::UnknownNode(id) => write!(f, "input supplied for unknown sensor node {}", id),
        }
    }
}

impl Error for GeneValidityError {}
impl Error for NodeValidityError {}
impl Error for ActivationError {}
