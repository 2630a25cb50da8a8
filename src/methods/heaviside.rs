//! The Heaviside step of the source, times the source, times the scale.

use ndarray::{ArrayView2, ArrayViewMut3, s};

use super::Method;
use crate::{error::Result, grid::SCALE};

pub(super) const SUMMARY: &str =
    "Multiplies the Heaviside step of the source by the source and the scale.";

/// The Heaviside step function: 0 below zero, `at_zero` at zero, 1 above.
#[inline]
pub fn heaviside(value: f32, at_zero: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value == 0.0 {
        at_zero
    } else {
        0.0
    }
}

/// Computes `heaviside(source, 0) * source * 255` with array arithmetic.
#[derive(Debug, Default, Clone, Copy)]
pub struct Heaviside;

impl Method for Heaviside {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let step = source.mapv(|v| heaviside(v, 0.0));
        let scaled = step * &source * SCALE;
        destination
            .slice_mut(s![.., .., 0])
            .zip_mut_with(&scaled, |cell, &value| *cell = value as u8);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::testing::assert_matches_reference;

    #[test]
    fn step_values() {
        assert_eq!(heaviside(-2.0, 0.5), 0.0);
        assert_eq!(heaviside(0.0, 0.5), 0.5);
        assert_eq!(heaviside(3.0, 0.5), 1.0);
    }

    #[test]
    fn matches_reference() {
        assert_matches_reference(Heaviside);
    }
}
