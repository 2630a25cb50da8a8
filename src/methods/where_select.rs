//! Elementwise select between two branches, the `azip!` counterpart of a `where` call.

use ndarray::{ArrayView2, ArrayViewMut3, azip, s};

use super::Method;
use crate::{
    error::Result,
    grid::{BASELINE, passes, scale},
};

pub(super) const SUMMARY: &str =
    "Selects the scaled value or the baseline per cell with a single `azip!` pass.";

/// Zips channel 0 with the source and picks one of two branches per cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhereSelect;

impl Method for WhereSelect {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let mut channel = destination.slice_mut(s![.., .., 0]);
        azip!((cell in &mut channel, &value in &source) {
            *cell = if passes(value) { scale(value) } else { BASELINE };
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::testing::assert_matches_reference;

    #[test]
    fn matches_reference() {
        assert_matches_reference(WhereSelect);
    }
}
