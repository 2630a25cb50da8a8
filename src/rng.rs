//! Defines the hashing RNG that drives the built-in Perlin generator.
//! This does not use the `rand` crate: lattice corners need a stateless hash, not a stream.

use bevy_math::{IVec2, UVec2};

/// A seeded RNG inspired by [FxHash](https://crates.io/crates/fxhash).
/// This is similar to a hash function, but does not use std's hash traits, as those produce `u64` outputs only.
///
/// This stores the seed of the RNG.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoiseRng(pub u32);

/// Represents something that can be used as an input to [`NoiseRng::rand_u32`].
pub trait NoiseRngInput {
    /// Collapses these values into a single [`u32`] to be put through the RNG.
    fn collapse_for_rng(self) -> u32;
}

impl NoiseRng {
    /// This is a large prime number with even bit distribution.
    /// This lets us use it as a multiplier in the rng.
    const KEY: u32 = 249_222_277;
    /// Collapses the second lattice coordinate into the first.
    const COEFFICIENT_KEY: u32 = 189_221_569;

    /// Deterministically changes the seed significantly.
    #[inline(always)]
    pub fn re_seed(&mut self) {
        self.0 = Self::KEY.wrapping_mul(self.0 ^ Self::COEFFICIENT_KEY);
    }

    /// Based on `input`, generates a random `u32`.
    /// Most of the entropy ends up in the high bits.
    #[inline(always)]
    pub fn rand_u32(&self, input: impl NoiseRngInput) -> u32 {
        let i = input.collapse_for_rng();
        let a = i.wrapping_mul(Self::KEY);
        (a ^ i ^ self.0).wrapping_mul(Self::KEY)
    }
}

impl NoiseRngInput for u32 {
    #[inline(always)]
    fn collapse_for_rng(self) -> u32 {
        self
    }
}

impl NoiseRngInput for UVec2 {
    #[inline(always)]
    fn collapse_for_rng(self) -> u32 {
        self.x
            .wrapping_add(self.y.wrapping_mul(NoiseRng::COEFFICIENT_KEY))
    }
}

impl NoiseRngInput for IVec2 {
    #[inline(always)]
    fn collapse_for_rng(self) -> u32 {
        self.as_uvec2().collapse_for_rng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = NoiseRng(1337);
        let b = NoiseRng(1337);
        for x in -4..4 {
            for y in -4..4 {
                let p = IVec2::new(x, y);
                assert_eq!(a.rand_u32(p), b.rand_u32(p));
            }
        }
    }

    #[test]
    fn neighbours_differ() {
        let rng = NoiseRng(1337);
        let origin = rng.rand_u32(IVec2::ZERO);
        assert_ne!(origin, rng.rand_u32(IVec2::X));
        assert_ne!(origin, rng.rand_u32(IVec2::Y));
        assert_ne!(rng.rand_u32(IVec2::X), rng.rand_u32(IVec2::Y));
    }

    #[test]
    fn re_seed_changes_output() {
        let mut rng = NoiseRng(1337);
        let before = rng.rand_u32(IVec2::new(3, 9));
        rng.re_seed();
        assert_ne!(rng.0, 1337);
        assert_ne!(before, rng.rand_u32(IVec2::new(3, 9)));
    }
}
