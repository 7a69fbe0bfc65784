use std::error::Error;
use std::fmt;

/// Invalid configuration values, reported
/// before any evolution takes place.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A probability (or fraction) outside of `[0, 1]`.
    OutOfUnitRange { field: &'static str, value: f32 },
    /// A value that must not be negative.
    Negative { field: &'static str, value: f32 },
    /// A NaN or infinite value.
    NonFinite { field: &'static str },
    /// A weight range whose minimum exceeds its maximum.
    InvalidWeightRange { min: f32, max: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfUnitRange { field, value } => {
                write!(f, "{} must be in the range [0, 1] (got {})", field, value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} must not be negative (got {})", field, value)
            }
            Self::NonFinite { field } => write!(f, "{} must be a finite number", field),
            Self::InvalidWeightRange { min, max } => write!(
                f,
                "minimum weight {} is greater than maximum weight {}",
                min, max
            ),
        }
    }
}

impl Error for ConfigError {}

impl ConfigError {
    /// Checks that `value` is a finite probability.
    ///
    /// # Examples
    /// ```
    /// use rocketneat::ConfigError;
    ///
    /// assert!(ConfigError::check_unit("chance", 0.5).is_ok());
    /// assert_eq!(
    ///     ConfigError::check_unit("chance", 1.5),
    ///     Err(ConfigError::OutOfUnitRange { field: "chance", value: 1.5 })
    /// );
    /// ```
    pub fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
        Self::check_finite(field, value)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(Self::OutOfUnitRange { field, value });
        }
        Ok(())
    }

    /// Checks that `value` is finite and not negative.
    pub fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
        Self::check_finite(field, value)?;
        if value < 0.0 {
            return Err(Self::Negative { field, value });
        }
        Ok(())
    }

    /// Checks that `value` is neither NaN nor infinite.
    pub fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NonFinite { field })
        }
    }
}

/// Errors arising while driving a population
/// through its generational lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvolutionError {
    /// The population has not been seeded yet.
    Uninitialized,
    /// `init` was called on an already seeded population.
    AlreadyInitialized,
    /// Every species was removed for stagnation, or no
    /// species remained after speciation. Unrecoverable.
    Extinction { generation: usize },
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "population has not been initialized"),
            Self::AlreadyInitialized => write!(f, "population has already been initialized"),
            Self::Extinction { generation } => {
                write!(f, "population went extinct at generation {}", generation)
            }
        }
    }
}

impl Error for EvolutionError {}
