//! Times every selected method under one protocol.
//!
//! For each method the destination is zeroed, `setup` runs once, `warmup` calls run untimed,
//! and then `trials` calls are timed one by one. The samples feed the average, the optional
//! [`Profile`] and, after the last call, the optional [`Verification`].

use core::time::Duration;
use std::{collections::VecDeque, time::Instant};

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut3};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::{
    config::{NoiseConfig, RunnerConfig},
    error::{BenchError, Result},
    grid::{BASELINE, check_shapes, reference_output},
    methods::{Method, MethodDef, SetupContext},
    profile::{Profile, millis},
    report::{BenchResult, Report, ReportMeta},
    verify::Verification,
};

/// A source of monotonic timestamps.
pub trait Clock {
    /// Time elapsed since some fixed origin.
    fn now(&mut self) -> Duration;
}

/// Reads [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    #[inline]
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Replays a fixed sequence of readings, then repeats the last one forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClock {
    readings: VecDeque<Duration>,
    last: Duration,
}

impl ScriptedClock {
    /// A clock returning `readings` in order.
    pub fn new(readings: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            last: Duration::ZERO,
        }
    }

    /// A clock whose consecutive start and stop readings are `intervals` apart, so timed call
    /// `i` measures `intervals[i]`.
    pub fn from_intervals(intervals: impl IntoIterator<Item = Duration>) -> Self {
        let mut elapsed = Duration::ZERO;
        let mut readings = Vec::new();
        for interval in intervals {
            readings.push(elapsed);
            elapsed += interval;
            readings.push(elapsed);
        }
        Self::new(readings)
    }
}

impl Clock for ScriptedClock {
    fn now(&mut self) -> Duration {
        if let Some(reading) = self.readings.pop_front() {
            self.last = reading;
        }
        self.last
    }
}

/// The timing protocol applied to every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Timed calls per method.
    pub trials: u32,
    /// Untimed calls per method before timing.
    pub warmup: u32,
    /// Compute a [`Profile`] from the samples.
    pub profile: bool,
    /// Compare the final destination with the reference output.
    pub verify: bool,
    /// Cell whose channel 0 is checked explicitly during verification.
    pub probe: Option<[usize; 2]>,
}

impl From<&RunnerConfig> for RunSettings {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            trials: config.trials,
            warmup: config.warmup,
            profile: config.profile,
            verify: config.verify,
            probe: config.probe.cell(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from(&RunnerConfig::default())
    }
}

/// The timed trials of one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTiming {
    /// Sum of all trials.
    #[serde(with = "millis")]
    pub total: Duration,
    /// Mean time per trial.
    #[serde(with = "millis")]
    pub average: Duration,
    /// Every trial, in the order they ran.
    #[serde(skip)]
    pub samples: Vec<Duration>,
}

impl MethodTiming {
    /// Sums `samples` and averages them.
    pub fn from_samples(samples: Vec<Duration>) -> Self {
        let total: Duration = samples.iter().sum();
        let average = match u32::try_from(samples.len()) {
            Ok(0) => Duration::ZERO,
            Ok(count) => total / count,
            Err(_) => Duration::from_secs_f64(total.as_secs_f64() / samples.len() as f64),
        };
        Self {
            total,
            average,
            samples,
        }
    }
}

/// Runs the full protocol for one method and returns its timing.
///
/// The destination is zeroed first. Errors from `setup` or `process` are returned as is.
pub fn benchmark(
    method: &mut dyn Method,
    ctx: &SetupContext,
    source: ArrayView2<'_, f32>,
    mut destination: ArrayViewMut3<'_, u8>,
    settings: &RunSettings,
    clock: &mut dyn Clock,
) -> Result<MethodTiming> {
    if settings.trials == 0 {
        return Err(BenchError::Config("trials must be at least 1".into()));
    }
    check_shapes(source, destination.view())?;
    destination.fill(BASELINE);

    method.setup(ctx)?;
    for _ in 0..settings.warmup {
        method.process(source, destination.view_mut())?;
    }

    let mut samples = Vec::with_capacity(settings.trials as usize);
    for _ in 0..settings.trials {
        let start = clock.now();
        method.process(source, destination.view_mut())?;
        samples.push(clock.now().saturating_sub(start));
    }
    Ok(MethodTiming::from_samples(samples))
}

/// Benchmarks methods one after another against a single source grid.
pub struct Runner<C = WallClock> {
    source: Array2<f32>,
    destination: Array3<u8>,
    settings: RunSettings,
    context: SetupContext,
    meta: ReportMeta,
    clock: C,
    progress: bool,
}

impl Runner {
    /// Creates a runner timing with the [`WallClock`].
    ///
    /// `destination` must be `(rows, cols, 3)` for a `(rows, cols)` `source`.
    pub fn new(
        source: Array2<f32>,
        destination: Array3<u8>,
        settings: RunSettings,
        context: SetupContext,
    ) -> Result<Self> {
        let dims = check_shapes(source.view(), destination.view())?;
        Ok(Self {
            source,
            destination,
            settings,
            context: SetupContext { dims, ..context },
            meta: ReportMeta {
                dims,
                trials: settings.trials,
                warmup: settings.warmup,
                threads: rayon::current_num_threads(),
                backend: None,
                seed: None,
            },
            clock: WallClock::default(),
            progress: false,
        })
    }
}

impl<C: Clock> Runner<C> {
    /// Replaces the clock.
    pub fn with_clock<D: Clock>(self, clock: D) -> Runner<D> {
        Runner {
            source: self.source,
            destination: self.destination,
            settings: self.settings,
            context: self.context,
            meta: self.meta,
            clock,
            progress: self.progress,
        }
    }

    /// Shows a progress bar across methods on stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.progress = show;
        self
    }

    /// Records which noise produced the source grid in the report.
    pub fn with_noise(mut self, noise: &NoiseConfig) -> Self {
        self.meta.backend = Some(noise.backend);
        self.meta.seed = Some(noise.seed);
        self
    }

    /// The destination as the last method left it.
    pub fn destination(&self) -> ArrayView3<'_, u8> {
        self.destination.view()
    }

    /// Benchmarks `methods` in order and ranks them.
    ///
    /// The first failing method aborts the run with a [`BenchError::Method`].
    pub fn run_all(&mut self, methods: &[&MethodDef]) -> Result<Report> {
        if self.settings.trials == 0 {
            return Err(BenchError::Config("trials must be at least 1".into()));
        }
        info!(
            methods = methods.len(),
            dims = %self.meta.dims,
            trials = self.settings.trials,
            warmup = self.settings.warmup,
            "benchmark started"
        );
        let reference = self
            .settings
            .verify
            .then(|| reference_output(self.source.view()));

        let pb = if self.progress {
            let pb = ProgressBar::new(methods.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut results = Vec::with_capacity(methods.len());
        for def in methods {
            pb.set_message(def.id);
            let result = self
                .run_one(def, reference.as_ref())
                .map_err(|err| err.in_method(def.id));
            match result {
                Ok(result) => results.push(result),
                Err(err) => {
                    pb.abandon();
                    return Err(err);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let report = Report::new(self.meta.clone(), results);
        info!(
            overall_s = report.overall.as_secs_f64(),
            "benchmark finished"
        );
        Ok(report)
    }

    fn run_one(&mut self, def: &MethodDef, reference: Option<&Array3<u8>>) -> Result<BenchResult> {
        let span = info_span!("method", id = def.id);
        let _enter = span.enter();

        let mut method = def.instantiate();
        let timing = benchmark(
            method.as_mut(),
            &self.context,
            self.source.view(),
            self.destination.view_mut(),
            &self.settings,
            &mut self.clock,
        )?;
        debug!(
            average_ms = timing.average.as_secs_f64() * 1e3,
            total_s = timing.total.as_secs_f64(),
            "timed"
        );

        let profile = if self.settings.profile {
            Profile::from_samples(&timing.samples)
        } else {
            None
        };
        let verification = reference.map(|expected| {
            Verification::compare(expected.view(), self.destination.view(), self.settings.probe)
        });
        if let Some(verification) = verification.filter(|v| !v.passed()) {
            warn!(
                mismatches = verification.mismatches,
                "output disagrees with the reference"
            );
        }

        Ok(BenchResult {
            id: def.id,
            summary: def.summary,
            timing,
            relative: 1.0,
            profile,
            verification,
        })
    }
}
