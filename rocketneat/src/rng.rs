//! The random source shared by every stage of evolution.
//!
//! A single generator is owned by the population and lent
//! out to mutation, crossover and speciation in a fixed
//! order, so seeding it reproduces a whole run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The generator type owned by a [`Population`].
///
/// [`Population`]: crate::Population
pub type NeatRng = ChaCha8Rng;

/// Returns a generator seeded with `seed`.
///
/// # Examples
/// ```
/// use rand::Rng;
/// use rocketneat::rng;
///
/// let a: u32 = rng::seeded(3).gen();
/// let b: u32 = rng::seeded(3).gen();
/// assert_eq!(a, b);
/// ```
pub fn seeded(seed: u64) -> NeatRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Returns a generator seeded from the operating system.
pub fn from_entropy() -> NeatRng {
    ChaCha8Rng::from_entropy()
}

/// Returns `true` with probability `chance`.
///
/// A `chance` of 0 never succeeds, and one of 1
/// always does.
///
/// # Examples
/// ```
/// use rocketneat::rng;
///
/// let mut r = rng::seeded(0);
/// assert!(rng::chance(&mut r, 1.0));
/// assert!(!rng::chance(&mut r, 0.0));
/// ```
pub fn chance<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}
