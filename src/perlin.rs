//! Generates the Perlin noise grid every method is benchmarked on.
//!
//! Two generators are available:
//! - [`Fbm`] layers octaves of the built-in [`Perlin`] lattice noise.
//! - [`FastNoiseLite`] from the `fastnoise-lite` crate, configured for fractal Perlin noise.
//!
//! Both are deterministic for a given [`NoiseConfig`].

use bevy_math::{IVec2, Vec2, VectorSpace};
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use ndarray::{Array2, Zip};
use tracing::debug;

use crate::{
    config::{NoiseBackend, NoiseConfig},
    curves::FadeCurve,
    grid::Dims,
    rng::NoiseRng,
};

/// A table of normalized gradient vectors, four along the axes and four along the diagonals.
/// Indexed by the top three bits of a corner hash, since that is where [`NoiseRng`] puts the most entropy.
const GRADIENT_TABLE: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(core::f32::consts::FRAC_1_SQRT_2, core::f32::consts::FRAC_1_SQRT_2),
    Vec2::new(-core::f32::consts::FRAC_1_SQRT_2, core::f32::consts::FRAC_1_SQRT_2),
    Vec2::new(core::f32::consts::FRAC_1_SQRT_2, -core::f32::consts::FRAC_1_SQRT_2),
    Vec2::new(-core::f32::consts::FRAC_1_SQRT_2, -core::f32::consts::FRAC_1_SQRT_2),
];

/// Single-octave 2D gradient noise on the integer lattice.
/// Output is in `(-1, 1)` and is exactly 0 on lattice points.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Perlin {
    /// The curve blending the four corner contributions.
    pub fade: FadeCurve,
}

impl Perlin {
    #[inline]
    fn corner(cell: IVec2, offset: Vec2, delta: IVec2, seeds: NoiseRng) -> f32 {
        let id = seeds.rand_u32(cell.wrapping_add(delta));
        GRADIENT_TABLE[(id >> 29) as usize].dot(offset - delta.as_vec2())
    }

    /// Samples the noise at `loc` using `seeds` to pick corner gradients.
    #[inline]
    pub fn sample(&self, loc: Vec2, seeds: NoiseRng) -> f32 {
        let floored = loc.floor();
        let offset = loc - floored;
        let cell = floored.as_ivec2();

        // points
        let ld = Self::corner(cell, offset, IVec2::new(0, 0), seeds);
        let lu = Self::corner(cell, offset, IVec2::new(0, 1), seeds);
        let rd = Self::corner(cell, offset, IVec2::new(1, 0), seeds);
        let ru = Self::corner(cell, offset, IVec2::new(1, 1), seeds);
        let mix = offset.map(|t| self.fade.sample(t));

        // lerp
        let l = ld.lerp(lu, mix.y);
        let r = rd.lerp(ru, mix.y);
        l.lerp(r, mix.x)
    }
}

/// Fractal brownian motion over [`Perlin`].
///
/// Each octave multiplies the frequency by `lacunarity` and the amplitude by `persistence`,
/// and draws its gradients from a re-seeded [`NoiseRng`].
/// The sum is divided by the total amplitude so the result stays in `(-1, 1)`.
/// Octaves whose sample position no longer fits in an `f32` are skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fbm {
    /// The noise of each octave.
    pub perlin: Perlin,
    /// The seed of the first octave.
    pub seed: NoiseRng,
    /// Number of octaves.
    pub octaves: u32,
    /// Frequency of the first octave, in cycles per grid cell.
    pub frequency: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub persistence: f32,
}

impl Fbm {
    /// Builds the generator described by `config`.
    pub fn from_config(config: &NoiseConfig) -> Self {
        Self {
            perlin: Perlin { fade: config.fade },
            seed: NoiseRng(config.seed),
            octaves: config.octaves,
            frequency: config.frequency,
            lacunarity: config.lacunarity,
            persistence: config.persistence,
        }
    }

    /// Samples the layered noise at grid coordinates `(x, y)`.
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut seeds = self.seed;
        let mut loc = Vec2::new(x, y) * self.frequency;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut weight = 0.0;
        for _ in 0..self.octaves {
            if !loc.is_finite() {
                break;
            }
            total += amplitude * self.perlin.sample(loc, seeds);
            weight += amplitude;
            loc *= self.lacunarity;
            amplitude *= self.persistence;
            seeds.re_seed();
        }
        if weight > 0.0 { total / weight } else { 0.0 }
    }
}

/// Produces source grids from a [`NoiseConfig`].
pub enum NoiseGenerator {
    /// The built-in [`Fbm`] generator.
    Native(Fbm),
    /// The `fastnoise-lite` generator.
    FastNoise(Box<FastNoiseLite>),
}

impl NoiseGenerator {
    /// Builds the generator selected by `config.backend`.
    pub fn from_config(config: &NoiseConfig) -> Self {
        match config.backend {
            NoiseBackend::Native => Self::Native(Fbm::from_config(config)),
            NoiseBackend::FastnoiseLite => {
                let mut noise = FastNoiseLite::with_seed(config.seed as i32);
                noise.set_noise_type(Some(NoiseType::Perlin));
                noise.set_fractal_type(Some(FractalType::FBm));
                noise.set_frequency(Some(config.frequency));
                noise.set_fractal_octaves(Some(config.octaves as i32));
                noise.set_fractal_lacunarity(Some(config.lacunarity));
                noise.set_fractal_gain(Some(config.persistence));
                Self::FastNoise(Box::new(noise))
            }
        }
    }

    /// Samples the noise for the cell at `row`, `col`.
    #[inline]
    pub fn sample(&self, row: usize, col: usize) -> f32 {
        match self {
            Self::Native(fbm) => fbm.sample(row as f32, col as f32),
            Self::FastNoise(noise) => noise.get_noise_2d(row as f32, col as f32),
        }
    }

    /// Fills a fresh `dims` grid, sampling cells in parallel.
    pub fn generate(&self, dims: Dims) -> Array2<f32> {
        debug!(rows = dims.rows, cols = dims.cols, "generating noise grid");
        let mut grid = Array2::zeros(dims.source_shape());
        Zip::indexed(&mut grid).par_for_each(|(row, col), value| {
            *value = self.sample(row, col);
        });
        grid
    }
}
