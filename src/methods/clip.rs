//! Clips the source at zero from below, then scales.

use ndarray::{ArrayView2, ArrayViewMut3, s};

use super::Method;
use crate::{error::Result, grid::SCALE};

pub(super) const SUMMARY: &str =
    "Clips negative values to zero with `mapv`, then scales the whole array.";

/// `clip(source, 0, None) * 255`. Values at or below zero land on zero, which casts to the baseline.
#[derive(Debug, Default, Clone, Copy)]
pub struct Clip;

impl Method for Clip {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let clipped = source.mapv(|v| v.max(0.0)) * SCALE;
        destination
            .slice_mut(s![.., .., 0])
            .assign(&clipped.mapv(|v| v as u8));
        Ok(())
    }
}
