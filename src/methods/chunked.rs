//! Splits the grid into row blocks and processes the blocks in parallel.

use ndarray::{ArrayView2, ArrayViewMut3, Axis, azip};
use rayon::prelude::*;

use super::{Method, SetupContext};
use crate::{error::Result, grid::filter_scale};

pub(super) const SUMMARY: &str =
    "Processes blocks of rows in parallel, like a chunked array with a threaded scheduler.";

/// Pairs source and destination row blocks of `chunk_rows` rows and fills each block on the
/// global `rayon` pool.
#[derive(Debug, Clone, Copy)]
pub struct Chunked {
    chunk_rows: usize,
}

impl Default for Chunked {
    fn default() -> Self {
        Self { chunk_rows: 256 }
    }
}

impl Method for Chunked {
    fn setup(&mut self, ctx: &SetupContext) -> Result<()> {
        self.chunk_rows = ctx.chunk_rows.max(1);
        Ok(())
    }

    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        source
            .axis_chunks_iter(Axis(0), self.chunk_rows)
            .into_par_iter()
            .zip(destination.axis_chunks_iter_mut(Axis(0), self.chunk_rows))
            .for_each(|(block, mut out)| {
                azip!((mut cell in out.lanes_mut(Axis(2)), &value in &block) {
                    cell[0] = filter_scale(value);
                });
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3};

    use super::*;
    use crate::{
        grid::{Dims, reference_output},
        methods::testing::assert_matches_reference,
    };

    #[test]
    fn matches_reference() {
        assert_matches_reference(Chunked::default());
    }

    #[test]
    fn uneven_last_block() {
        let source = Array2::from_shape_fn((7, 3), |(r, c)| r as f32 * 0.1 - c as f32 * 0.2);
        let mut method = Chunked::default();
        method
            .setup(&SetupContext {
                chunk_rows: 3,
                ..SetupContext::new(Dims::new(7, 3))
            })
            .unwrap();
        let mut destination = Array3::zeros((7, 3, 3));
        method.process(source.view(), destination.view_mut()).unwrap();
        assert_eq!(destination, reference_output(source.view()));
    }
}
