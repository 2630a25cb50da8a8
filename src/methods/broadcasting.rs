//! Whole-array arithmetic: a 0/1 mask times the source times a broadcast scalar.

use ndarray::{ArrayView2, ArrayViewMut3, s};

use super::Method;
use crate::{
    error::Result,
    grid::{SCALE, passes},
};

pub(super) const SUMMARY: &str =
    "Multiplies a 0/1 mask by the source and a broadcast scalar; no explicit loops.";

/// Computes `(source > 0) * source * 255` as array expressions, then casts into channel 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct Broadcasting;

impl Method for Broadcasting {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let mask = source.mapv(|v| f32::from(u8::from(passes(v))));
        let scaled = mask * &source * SCALE;
        destination
            .slice_mut(s![.., .., 0])
            .zip_mut_with(&scaled, |cell, &value| *cell = value as u8);
        Ok(())
    }
}
