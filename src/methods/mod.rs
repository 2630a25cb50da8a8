//! The filter-and-scale methods under comparison.
//!
//! Every method turns a `(rows, cols)` source grid into a `(rows, cols, 3)` destination where
//! channel 0 holds [`filter_scale`](crate::grid::filter_scale) of the source cell and the other
//! channels hold 0. They differ only in how they express that with `ndarray` and `rayon`.
//!
//! A method is registered by listing its module in the `methods!` invocation below.

use ndarray::{ArrayView2, ArrayViewMut3};
use regex::Regex;

use crate::{
    error::{BenchError, Result},
    grid::Dims,
};

/// State a method may prepare before it is timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupContext {
    /// Size of the grids the method will process.
    pub dims: Dims,
    /// Rows per block for block-parallel methods.
    pub chunk_rows: usize,
    /// Worker count for methods that own a worker pool.
    pub jobs: usize,
}

impl SetupContext {
    /// A context for `dims` with one block per 256 rows and one job per logical CPU.
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            chunk_rows: 256,
            jobs: num_cpus::get(),
        }
    }
}

/// One way of applying the filter-and-scale rule.
pub trait Method: Send {
    /// Prepares anything `process` needs. Runs once per benchmark and is never timed.
    fn setup(&mut self, _ctx: &SetupContext) -> Result<()> {
        Ok(())
    }

    /// Writes the filtered and scaled `source` into `destination`.
    ///
    /// The destination shape is checked by the caller. Methods may assume channels 1 and 2 are
    /// already zero and leave them alone.
    fn process(
        &mut self,
        source: ArrayView2<'_, f32>,
        destination: ArrayViewMut3<'_, u8>,
    ) -> Result<()>;
}

/// A registered method.
#[derive(Debug, Clone, Copy)]
pub struct MethodDef {
    /// Unique identifier, also the module name.
    pub id: &'static str,
    /// One-line description of the idiom.
    pub summary: &'static str,
    /// Creates a fresh, not yet set up, instance.
    pub build: fn() -> Box<dyn Method>,
}

impl MethodDef {
    /// Creates a fresh instance of this method.
    pub fn instantiate(&self) -> Box<dyn Method> {
        (self.build)()
    }
}

macro_rules! methods {
    ($($module:ident => $ty:ident),* $(,)?) => {
        $(pub mod $module;)*

        /// Every registered method, sorted by id.
        static REGISTRY: &[MethodDef] = &[
            $(MethodDef {
                id: stringify!($module),
                summary: $module::SUMMARY,
                build: || Box::new($module::$ty::default()),
            },)*
        ];
    };
}

methods! {
    broadcasting => Broadcasting,
    chunked => Chunked,
    clip => Clip,
    collect_rows => CollectRows,
    heaviside => Heaviside,
    nested_loop => NestedLoop,
    parallel_map => ParallelMap,
    piecewise => Piecewise,
    slice_kernel => SliceKernel,
    vectorize => Vectorize,
    where_select => WhereSelect,
}

/// All registered methods, sorted by id.
pub fn registry() -> &'static [MethodDef] {
    REGISTRY
}

/// Looks up a method by id.
pub fn find(id: &str) -> Result<&'static MethodDef> {
    REGISTRY
        .iter()
        .find(|def| def.id == id)
        .ok_or_else(|| BenchError::UnknownMethod(id.to_string()))
}

/// The methods whose id matches `filter`.
pub fn select(filter: &Regex) -> Vec<&'static MethodDef> {
    REGISTRY
        .iter()
        .filter(|def| filter.is_match(def.id))
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use ndarray::{Array2, Array3, array};

    use super::*;
    use crate::grid::reference_output;

    /// A grid covering positive, negative, zero, and saturating values.
    pub fn sample_source() -> Array2<f32> {
        array![
            [0.2807, -0.2807, 0.0, 1.0, -1.0],
            [0.5, 0.999, -0.001, 0.001, 1.25],
            [-0.0, 0.75, 0.1, -0.5, 0.33],
        ]
    }

    /// Sets `method` up and checks it produces the reference output for [`sample_source`].
    pub fn assert_matches_reference(mut method: impl Method) {
        let source = sample_source();
        let dims = Dims::new(source.nrows(), source.ncols());
        let ctx = SetupContext {
            chunk_rows: 2,
            jobs: 2,
            ..SetupContext::new(dims)
        };
        method.setup(&ctx).unwrap();
        let mut destination = Array3::zeros(dims.destination_shape());
        method
            .process(source.view(), destination.view_mut())
            .unwrap();
        assert_eq!(destination, reference_output(source.view()));

        // A second call over the same destination must give the same result.
        method
            .process(source.view(), destination.view_mut())
            .unwrap();
        assert_eq!(destination, reference_output(source.view()));
    }
}
