//! A tight loop over the raw contiguous buffers, left for the compiler to vectorise.

use ndarray::{ArrayView2, ArrayViewMut3, Axis, Zip};

use super::Method;
use crate::{
    error::Result,
    grid::{CHANNELS, filter_scale},
};

pub(super) const SUMMARY: &str =
    "Runs a compiled loop over the contiguous source and destination slices.";

/// Writes channel 0 of each `CHANNELS`-wide destination cell from the matching source value.
#[inline(never)]
pub fn kernel(source: &[f32], destination: &mut [u8]) {
    for (cell, &value) in destination.chunks_exact_mut(CHANNELS).zip(source) {
        cell[0] = filter_scale(value);
    }
}

/// Uses [`kernel`] on standard-layout arrays and falls back to a lane-wise [`Zip`] otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct SliceKernel;

impl Method for SliceKernel {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        if let (Some(input), Some(output)) = (source.as_slice(), destination.as_slice_mut()) {
            kernel(input, output);
            return Ok(());
        }
        Zip::from(destination.lanes_mut(Axis(2)))
            .and(&source)
            .for_each(|mut cell, &value| cell[0] = filter_scale(value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3, s};

    use super::*;
    use crate::{grid::reference_output, methods::testing::assert_matches_reference};

    #[test]
    fn matches_reference() {
        assert_matches_reference(SliceKernel);
    }

    #[test]
    fn non_contiguous_views_use_the_fallback() {
        let full = Array2::from_shape_fn((6, 4), |(r, c)| (r as f32 - 2.5) * 0.1 + c as f32 * 0.05);
        let source = full.slice(s![..;2, ..]);
        assert!(source.as_slice().is_none());

        let mut destination = Array3::zeros((3, 4, CHANNELS));
        SliceKernel
            .process(source, destination.view_mut())
            .unwrap();
        assert_eq!(destination, reference_output(source));
    }
}
