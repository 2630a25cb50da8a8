//! Source and destination grids, and the filter-and-scale rule every method implements.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::{
    error::{BenchError, Result},
    perlin::NoiseGenerator,
};

/// Number of channels in each destination cell. Only channel 0 carries data.
pub const CHANNELS: usize = 3;

/// The factor positive source values are scaled by.
pub const SCALE: f32 = 255.0;

/// The value a cell gets when its source value fails the filter.
pub const BASELINE: u8 = 0;

/// The size of a source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl Dims {
    /// Creates [`Dims`] of `rows` by `cols`.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Shape of the source grid.
    pub const fn source_shape(self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Shape of the destination grid.
    pub const fn destination_shape(self) -> (usize, usize, usize) {
        (self.rows, self.cols, CHANNELS)
    }

    /// Number of cells.
    pub const fn cells(self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if `(row, col)` lies inside the grid.
    pub const fn contains(self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }
}

impl core::fmt::Display for Dims {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Only values strictly above zero pass the filter.
#[inline(always)]
pub fn passes(value: f32) -> bool {
    value > 0.0
}

/// Scales a value that passed the filter. Truncates toward zero and saturates at `u8::MAX`.
#[inline(always)]
pub fn scale(value: f32) -> u8 {
    (value * SCALE) as u8
}

/// The filter-and-scale rule for a single cell.
#[inline(always)]
pub fn filter_scale(value: f32) -> u8 {
    if passes(value) { scale(value) } else { BASELINE }
}

/// Generates the source grid with `noise` and an all-zero destination grid of matching shape.
pub fn create_base_arrays(dims: Dims, noise: &NoiseGenerator) -> (Array2<f32>, Array3<u8>) {
    let source = noise.generate(dims);
    let destination = Array3::zeros(dims.destination_shape());
    (source, destination)
}

/// The expected destination for `source`, computed cell by cell.
pub fn reference_output(source: ArrayView2<'_, f32>) -> Array3<u8> {
    let (rows, cols) = source.dim();
    let mut expected = Array3::zeros((rows, cols, CHANNELS));
    for ((row, col), &value) in source.indexed_iter() {
        expected[[row, col, 0]] = filter_scale(value);
    }
    expected
}

/// Checks that `destination` is `(rows, cols, 3)` for a `(rows, cols)` source.
pub fn check_shapes(source: ArrayView2<'_, f32>, destination: ArrayView3<'_, u8>) -> Result<Dims> {
    let (rows, cols) = source.dim();
    let (d_rows, d_cols, d_channels) = destination.dim();
    if (d_rows, d_cols, d_channels) != (rows, cols, CHANNELS) {
        return Err(BenchError::ShapeMismatch {
            input: [rows, cols],
            expected: [rows, cols, CHANNELS],
            actual: [d_rows, d_cols, d_channels],
        });
    }
    Ok(Dims::new(rows, cols))
}
