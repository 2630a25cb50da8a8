//! A scalar function lifted over the array, called through dynamic dispatch per cell.

use ndarray::{ArrayView2, ArrayViewMut3, s};

use super::Method;
use crate::{error::Result, grid::filter_scale};

pub(super) const SUMMARY: &str =
    "Maps a boxed scalar closure over every cell; one dynamic call per element.";

/// Holds the per-cell rule as a `Box<dyn Fn>` so every element pays for an indirect call.
pub struct Vectorize {
    function: Box<dyn Fn(f32) -> u8 + Send>,
}

impl Vectorize {
    /// Lifts `function` over whole arrays.
    pub fn new(function: impl Fn(f32) -> u8 + Send + 'static) -> Self {
        Self {
            function: Box::new(function),
        }
    }
}

impl Default for Vectorize {
    fn default() -> Self {
        Self::new(filter_scale)
    }
}

impl Method for Vectorize {
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let function = &self.function;
        let values = source.map(|&value| function(value));
        destination.slice_mut(s![.., .., 0]).assign(&values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::testing::assert_matches_reference;

    #[test]
    fn matches_reference() {
        assert_matches_reference(Vectorize::default());
    }
}
