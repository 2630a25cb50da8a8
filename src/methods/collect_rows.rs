//! Builds every row as a fresh `Vec` of cells with iterator adapters, then copies the result in.

use ndarray::{Array3, ArrayView2, ArrayViewMut3};

use super::Method;
use crate::{
    error::Result,
    grid::{CHANNELS, filter_scale},
};

pub(super) const SUMMARY: &str =
    "Collects `(value, 0, 0)` cells row by row into nested vectors, then reshapes.";

/// The iterator-pipeline counterpart of a nested list comprehension.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectRows;

impl Method for CollectRows {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let rows: Vec<Vec<[u8; CHANNELS]>> = source
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&value| [filter_scale(value), 0, 0]).collect())
            .collect();
        let cells: Vec<u8> = rows.into_iter().flatten().flatten().collect();
        let built = Array3::from_shape_vec(destination.raw_dim(), cells)?;
        destination.assign(&built);
        Ok(())
    }
}
