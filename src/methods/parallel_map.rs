//! Maps every row to a fresh vector of cells on a dedicated worker pool, then gathers them.

use ndarray::{ArrayView1, ArrayView2, ArrayView3, ArrayViewMut3, Axis};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::debug;

use super::{Method, SetupContext};
use crate::{
    error::{BenchError, Result},
    grid::{CHANNELS, filter_scale},
};

pub(super) const SUMMARY: &str =
    "Dispatches one job per row to a dedicated worker pool and gathers the returned rows.";

fn process_row(row: ArrayView1<'_, f32>) -> Vec<[u8; CHANNELS]> {
    row.iter().map(|&value| [filter_scale(value), 0, 0]).collect()
}

/// Owns a `rayon` pool with one worker per job, built during setup.
#[derive(Debug, Default)]
pub struct ParallelMap {
    pool: Option<ThreadPool>,
}

impl Method for ParallelMap {
    fn setup(&mut self, ctx: &SetupContext) -> Result<()> {
        debug!(jobs = ctx.jobs, "building worker pool");
        self.pool = Some(ThreadPoolBuilder::new().num_threads(ctx.jobs).build()?);
        Ok(())
    }

    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        mut destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| BenchError::Config("parallel_map ran before its worker pool was set up".into()))?;
        let rows: Vec<Vec<[u8; CHANNELS]>> = pool.install(|| {
            source
                .axis_iter(Axis(0))
                .into_par_iter()
                .map(process_row)
                .collect()
        });
        let cells: Vec<u8> = rows.into_iter().flatten().flatten().collect();
        let shape = destination.raw_dim();
        destination.assign(&ArrayView3::from_shape(shape, &cells)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Array3};

    use super::*;
    use crate::methods::testing::assert_matches_reference;

    #[test]
    fn matches_reference() {
        assert_matches_reference(ParallelMap::default());
    }

    #[test]
    fn process_requires_setup() {
        let source = Array2::<f32>::zeros((2, 2));
        let mut destination = Array3::<u8>::zeros((2, 2, 3));
        let err = ParallelMap::default()
            .process(source.view(), destination.view_mut())
            .unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }
}
