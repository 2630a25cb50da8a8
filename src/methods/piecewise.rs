//! An ordered list of (condition, function) pieces with a default for cells no piece claims.

use ndarray::{Array2, ArrayView2, ArrayViewMut3, s};

use super::Method;
use crate::{
    error::Result,
    grid::{BASELINE, SCALE, passes},
};

pub(super) const SUMMARY: &str =
    "Evaluates the first matching (condition, function) piece per cell, else the baseline.";

/// A condition and the function applied to cells that meet it.
pub type Piece = (fn(f32) -> bool, fn(f32) -> f32);

fn positive_multiplier(value: f32) -> f32 {
    value * SCALE
}

/// Applies the first piece whose condition holds; cells matching none get `otherwise`.
pub fn piecewise(source: ArrayView2<'_, f32>, pieces: &[Piece], otherwise: f32) -> Array2<f32> {
    source.mapv(|value| {
        pieces
            .iter()
            .find(|(condition, _)| condition(value))
            .map_or(otherwise, |(_, function)| function(value))
    })
}

/// `piecewise(source, [source > 0], [x * 255], otherwise 0)`.
#[derive(Debug, Clone)]
pub struct Piecewise {
    pieces: Vec<Piece>,
}

impl Default for Piecewise {
    fn default() -> Self {
        Self {
            pieces: vec![(passes, positive_multiplier)],
        }
    }
}

impl Method for Piecewise {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let values = piecewise(source, &self.pieces, f32::from(BASELINE));
        destination
            .slice_mut(s![.., .., 0])
            .zip_mut_with(&values, |cell, &value| *cell = value as u8);
        Ok(())
    }
}
