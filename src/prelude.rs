//! Contains common imports

pub use crate::{
    config::{BenchConfig, NoiseBackend, OutputFormat, Probe},
    error::{BenchError, Result},
    grid::{Dims, create_base_arrays, filter_scale, reference_output},
    methods::{Method, MethodDef, SetupContext, registry},
    perlin::NoiseGenerator,
    report::Report,
    runner::{Clock, RunSettings, Runner, ScriptedClock, WallClock},
};
