use super::ConfigError;
use crate::ValidateConfig;

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities or
/// fractions must be in the range [0.0, 1.0].
/// This is checked by [`validate`] when a
/// population is created.
///
/// [`validate`]: ValidateConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub distance_threshold: f32,
    /// Top n of each species which is copied
    /// as-is to the next generation.
    pub elitism: usize,
    /// Top % of each species which can participate
    /// in mating.
    pub survival_threshold: f32,
    /// Smallest number of offspring a surviving
    /// species is allotted.
    pub min_species_size: usize,
    /// Number of generations without a fitness increase
    /// before a species is considered _stagnated_ and
    /// removed.
    pub stagnation_threshold: NonZeroUsize,
    /// Number of top species which are never
    /// removed for stagnation.
    pub species_elitism: usize,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use rocketneat::PopulationConfig;
    ///
    /// let cfg1 = PopulationConfig::zero();
    ///
    /// let cfg2 = PopulationConfig {
    ///     // Specify some values here...
    ///     survival_threshold: 0.5,
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 1 is a valid NonZeroUsize. Replace this with
            // NonZeroUsize::new(1).unwrap() once const Option::unwrap
            // becomes stable.
            size: unsafe { NonZeroUsize::new_unchecked(1) },
            distance_threshold: 0.0,
            elitism: 0,
            survival_threshold: 0.0,
            min_species_size: 0,
            // SAFETY: see above.
            stagnation_threshold: unsafe { NonZeroUsize::new_unchecked(1) },
            species_elitism: 0,
        }
    }
}

impl Default for PopulationConfig {
    /// 150 genomes, a distance threshold of 3,
    /// 20% survivors and species stagnating after
    /// 15 generations.
    fn default() -> Self {
        PopulationConfig {
            // SAFETY: 150 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(150) },
            distance_threshold: 3.0,
            elitism: 0,
            survival_threshold: 0.2,
            min_species_size: 1,
            // SAFETY: 15 is a valid NonZeroUsize.
            stagnation_threshold: unsafe { NonZeroUsize::new_unchecked(15) },
            species_elitism: 0,
        }
    }
}

impl ValidateConfig for PopulationConfig {
    /// # Examples
    /// ```
    /// use rocketneat::{ConfigError, PopulationConfig, ValidateConfig};
    ///
    /// assert!(PopulationConfig::default().validate().is_ok());
    ///
    /// let config = PopulationConfig {
    ///     survival_threshold: 1.2,
    ///     ..PopulationConfig::default()
    /// };
    /// assert!(matches!(
    ///     config.validate(),
    ///     Err(ConfigError::OutOfUnitRange { field: "survival_threshold", .. })
    /// ));
    /// ```
    fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_non_negative("distance_threshold", self.distance_threshold)?;
        ConfigError::check_unit("survival_threshold", self.survival_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_valid() {
        assert!(PopulationConfig::zero().validate().is_ok());
    }

    #[test]
    fn negative_distance_threshold() {
        let config = PopulationConfig {
            distance_threshold: -1.0,
            ..PopulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "distance_threshold",
                value: -1.0
            })
        );
    }

    #[test]
    fn infinite_distance_threshold() {
        let config = PopulationConfig {
            distance_threshold: f32::INFINITY,
            ..PopulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
