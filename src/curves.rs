//! Fade curves used to blend lattice corners in [`Perlin`](crate::perlin::Perlin).

use bevy_math::{Curve, curve::Interval};
use serde::{Deserialize, Serialize};

/// Smoothstep interpolation. This has a smooth derivative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Smoothstep;

impl Curve<f32> for Smoothstep {
    #[inline]
    fn domain(&self) -> Interval {
        Interval::UNIT
    }

    #[inline]
    fn sample_unchecked(&self, t: f32) -> f32 {
        t * t * (t * (-2.0) + 3.0)
    }
}

/// Ken Perlin's quintic fade, `6t^5 - 15t^4 + 10t^3`. This has a smooth second derivative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Quintic;

impl Curve<f32> for Quintic {
    #[inline]
    fn domain(&self) -> Interval {
        Interval::UNIT
    }

    #[inline]
    fn sample_unchecked(&self, t: f32) -> f32 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }
}

/// Selects the fade curve of the built-in generator.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FadeCurve {
    /// [`Smoothstep`].
    Smoothstep,
    /// [`Quintic`].
    #[default]
    Quintic,
}

impl FadeCurve {
    /// Samples the selected curve at `t` in `[0, 1]`.
    #[inline]
    pub fn sample(self, t: f32) -> f32 {
        match self {
            Self::Smoothstep => Smoothstep.sample_unchecked(t),
            Self::Quintic => Quintic.sample_unchecked(t),
        }
    }
}
