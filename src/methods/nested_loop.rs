//! Two indexed `for` loops over rows and columns.

use ndarray::{ArrayView2, ArrayViewMut3};

use super::Method;
use crate::{error::Result, grid::filter_scale};

pub(super) const SUMMARY: &str = "Indexes every cell in two nested loops; the baseline.";

/// Visits every cell through `[[row, col]]` indexing, writing the whole `(value, 0, 0)` cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct NestedLoop;

impl Method for NestedLoop {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let (rows, cols) = source.dim();
        for row in 0..rows {
            for col in 0..cols {
                let value = filter_scale(source[[row, col]]);
                destination[[row, col, 0]] = value;
                destination[[row, col, 1]] = 0;
                destination[[row, col, 2]] = 0;
            }
        }
        Ok(())
    }
}
