use rocketneat::{ConfigError, ValidateConfig};
use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for genome generation
/// and inter-genome operations.
///
/// # Note
/// All quantities expressing probabilities
/// must be in the range [0.0, 1.0]. This is
/// checked by [`validate`] when a population
/// is created.
///
/// [`validate`]: ValidateConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of inputs in a genome.
    pub input_count: NonZeroUsize,
    /// Number of outputs in a genome.
    pub output_count: NonZeroUsize,
    /// Lower bound of gene weights.
    pub min_weight: f32,
    /// Upper bound of gene weights.
    pub max_weight: f32,
    /// Whether new genomes start with a gene
    /// between every input-output pair.
    pub fully_connected: bool,
    /// Whether initial genes are given random weights.
    /// If not, they start at 0.
    pub initial_random_weights: bool,
    /// Chance of a node addition mutation.
    pub node_addition_mutation_chance: f32,
    /// Chance of a hidden node deletion mutation.
    pub node_deletion_mutation_chance: f32,
    /// Chance of a gene addition mutation.
    pub gene_addition_mutation_chance: f32,
    /// Chance of a gene being disabled.
    pub gene_deletion_mutation_chance: f32,
    /// Chance, per gene, of its weight being nudged.
    pub weight_nudge_chance: f32,
    /// Multiplier of the uniform [-1, 1] weight nudge.
    pub weight_mutation_power: f32,
    /// Chance, per gene, of its weight being reset.
    pub weight_reset_chance: f32,
    /// Weight of disjoint genes in genetic distance.
    pub disjoint_gene_factor: f32,
    /// Weight of common gene differences in genetic distance.
    pub common_weight_factor: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, false, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to fill in unused values during
    /// configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use rocketneat_nn::genomics::GeneticConfig;
    ///
    /// let cfg1 = GeneticConfig::zero();
    ///
    /// let cfg2 = GeneticConfig {
    ///     // Specify some values here...
    ///     fully_connected: true,
    ///     node_addition_mutation_chance: 1.0,
    ///     // Default the rest...
    ///     ..GeneticConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            // SAFETY: 1 is a valid NonZeroUsize. Replace this with
            // NonZeroUsize::new(1).unwrap() once const Option::unwrap
            // becomes stable.
            input_count: unsafe { NonZeroUsize::new_unchecked(1) },
            output_count: unsafe { NonZeroUsize::new_unchecked(1) },
            min_weight: 0.0,
            max_weight: 0.0,
            fully_connected: false,
            initial_random_weights: false,
            node_addition_mutation_chance: 0.0,
            node_deletion_mutation_chance: 0.0,
            gene_addition_mutation_chance: 0.0,
            gene_deletion_mutation_chance: 0.0,
            weight_nudge_chance: 0.0,
            weight_mutation_power: 0.0,
            weight_reset_chance: 0.0,
            disjoint_gene_factor: 0.0,
            common_weight_factor: 0.0,
        }
    }
}

impl Default for GeneticConfig {
    /// Two fully connected inputs, one output,
    /// weights in [-1, 1].
    fn default() -> Self {
        GeneticConfig {
            // SAFETY: 2 and 1 are valid NonZeroUsizes.
            input_count: unsafe { NonZeroUsize::new_unchecked(2) },
            output_count: unsafe { NonZeroUsize::new_unchecked(1) },
            min_weight: -1.0,
            max_weight: 1.0,
            fully_connected: true,
            initial_random_weights: true,
            node_addition_mutation_chance: 0.2,
            node_deletion_mutation_chance: 0.1,
            gene_addition_mutation_chance: 0.3,
            gene_deletion_mutation_chance: 0.1,
            weight_nudge_chance: 0.8,
            weight_mutation_power: 0.1,
            weight_reset_chance: 0.5,
            disjoint_gene_factor: 1.0,
            common_weight_factor: 0.5,
        }
    }
}

impl ValidateConfig for GeneticConfig {
    /// # Examples
    /// ```
    /// use rocketneat::{ConfigError, ValidateConfig};
    /// use rocketneat_nn::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     min_weight: 1.0,
    ///     max_weight: -1.0,
    ///     ..GeneticConfig::default()
    /// };
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::InvalidWeightRange { min: 1.0, max: -1.0 })
    /// );
    /// ```
    fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("min_weight", self.min_weight)?;
        ConfigError::check_finite("max_weight", self.max_weight)?;
        if self.min_weight > self.max_weight {
            return Err(ConfigError::InvalidWeightRange {
                min: self.min_weight,
                max: self.max_weight,
            });
        }
        for (field, value) in [
            (
                "node_addition_mutation_chance",
                self.node_addition_mutation_chance,
            ),
            (
                "node_deletion_mutation_chance",
                self.node_deletion_mutation_chance,
            ),
            (
                "gene_addition_mutation_chance",
                self.gene_addition_mutation_chance,
            ),
            (
                "gene_deletion_mutation_chance",
                self.gene_deletion_mutation_chance,
            ),
            ("weight_nudge_chance", self.weight_nudge_chance),
            ("weight_reset_chance", self.weight_reset_chance),
        ] {
            ConfigError::check_unit(field, value)?;
        }
        ConfigError::check_non_negative("weight_mutation_power", self.weight_mutation_power)?;
        ConfigError::check_non_negative("disjoint_gene_factor", self.disjoint_gene_factor)?;
        ConfigError::check_non_negative("common_weight_factor", self.common_weight_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GeneticConfig::default().validate().is_ok());
        assert!(GeneticConfig::zero().validate().is_ok());
    }

    #[test]
    fn chance_out_of_range() {
        let config = GeneticConfig {
            weight_reset_chance: -0.1,
            ..GeneticConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                field: "weight_reset_chance",
                value: -0.1
            })
        );
    }

    #[test]
    fn nan_weight_bound() {
        let config = GeneticConfig {
            max_weight: f32::NAN,
            ..GeneticConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "max_weight"
            })
        );
    }
}
