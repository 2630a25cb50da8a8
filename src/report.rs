//! Ranks benchmark results and renders them as text, Markdown, or JSON.

use core::{fmt::Write as _, time::Duration};

use serde::Serialize;

use crate::{
    config::{NoiseBackend, OutputFormat},
    error::Result,
    grid::Dims,
    profile::{Profile, millis},
    runner::MethodTiming,
    verify::Verification,
};

const SEPARATOR_WIDTH: usize = 100;

/// What was benchmarked and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    /// Size of the source grid.
    pub dims: Dims,
    /// Timed calls per method.
    pub trials: u32,
    /// Untimed calls per method before timing.
    pub warmup: u32,
    /// Size of the global worker pool.
    pub threads: usize,
    /// Noise generator of the source grid, when known.
    pub backend: Option<NoiseBackend>,
    /// Noise seed of the source grid, when known.
    pub seed: Option<u32>,
}

/// The outcome of benchmarking one method.
#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    /// Method id.
    pub id: &'static str,
    /// Method summary.
    pub summary: &'static str,
    /// Timed trials.
    #[serde(flatten)]
    pub timing: MethodTiming,
    /// Average time divided by the fastest method's average time.
    pub relative: f64,
    /// Per-call statistics, when profiling was on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// Comparison with the reference output, when verification was on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

impl BenchResult {
    /// `Some(passed)` if the output was verified, `None` if verification was off.
    pub fn verified(&self) -> Option<bool> {
        self.verification.map(|verification| verification.passed())
    }
}

/// Results of one run, fastest method first.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// What was benchmarked.
    pub meta: ReportMeta,
    /// One entry per method, ascending by average time.
    pub results: Vec<BenchResult>,
    /// Sum of the timed trials of every method.
    #[serde(with = "millis")]
    pub overall: Duration,
}

impl Report {
    /// Ranks `results` by average time and fills in their relative slowdown.
    ///
    /// Ties keep their input order.
    pub fn new(meta: ReportMeta, mut results: Vec<BenchResult>) -> Self {
        results.sort_by(|a, b| a.timing.average.cmp(&b.timing.average));
        let fastest = results
            .first()
            .map_or(Duration::ZERO, |result| result.timing.average);
        for result in &mut results {
            result.relative = relative(result.timing.average, fastest);
        }
        let overall = results.iter().map(|result| result.timing.total).sum();
        Self {
            meta,
            results,
            overall,
        }
    }

    /// Number of methods whose output failed verification.
    pub fn verification_failures(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.verified() == Some(false))
            .count()
    }

    /// Renders the report in `format`.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Markdown => self.render_markdown(),
            OutputFormat::Json => self.render_json()?,
        })
    }

    /// The fixed-width table: one line per method with its average in milliseconds and its
    /// total in seconds.
    pub fn render_text(&self) -> String {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let header = format!("{} | Runs: {}", self.meta.dims, self.meta.trials);
        let mut out = String::new();

        let _ = writeln!(out, "{separator}");
        let _ = writeln!(out, "{:<40}{header:>60}", "-> Benchmark started");
        let _ = writeln!(out, "{separator}");
        for result in &self.results {
            let _ = writeln!(
                out,
                "{:<50}{:>35.4} ms{:>10.2} s",
                result.id,
                as_millis(result.timing.average),
                result.timing.total.as_secs_f64(),
            );
            if let Some(profile) = &result.profile {
                let _ = writeln!(
                    out,
                    "    {} calls | mean {:.4} ms | median {:.4} ms | min {:.4} ms | max {:.4} ms | std dev {:.4} ms | p95 {:.4} ms",
                    profile.calls,
                    as_millis(profile.mean),
                    as_millis(profile.median),
                    as_millis(profile.min),
                    as_millis(profile.max),
                    as_millis(profile.std_dev),
                    as_millis(profile.p95),
                );
            }
            if let Some(verification) = result.verification.filter(|v| !v.passed()) {
                let _ = writeln!(out, "    {}", describe_failure(&verification));
            }
        }
        let _ = writeln!(out, "{separator}");
        let _ = writeln!(
            out,
            "{:<50}{:>48.2} s",
            "Total Runtime: ",
            self.overall.as_secs_f64()
        );
        let _ = writeln!(out, "{separator}");
        out
    }

    /// A Markdown table with rank, average, total, relative slowdown and verification status.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "**{}** | Runs: {} | Warmup: {} | Threads: {}\n",
            self.meta.dims, self.meta.trials, self.meta.warmup, self.meta.threads
        );
        let _ = writeln!(
            out,
            "| Rank | Method | Average (ms) | Total (s) | Relative | Verified |"
        );
        let _ = writeln!(out, "|---:|---|---:|---:|---:|:---:|");
        for (rank, result) in self.results.iter().enumerate() {
            let verified = match result.verified() {
                Some(true) => "yes",
                Some(false) => "**no**",
                None => "-",
            };
            let _ = writeln!(
                out,
                "| {} | `{}` | {:.4} | {:.2} | {:.2}x | {verified} |",
                rank + 1,
                result.id,
                as_millis(result.timing.average),
                result.timing.total.as_secs_f64(),
                result.relative,
            );
        }
        let _ = writeln!(
            out,
            "\nTotal runtime: {:.2} s",
            self.overall.as_secs_f64()
        );
        out
    }

    /// Pretty-printed JSON. Durations are fractional milliseconds.
    pub fn render_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

fn relative(average: Duration, fastest: Duration) -> f64 {
    if fastest.is_zero() {
        if average.is_zero() { 1.0 } else { f64::INFINITY }
    } else {
        average.as_nanos() as f64 / fastest.as_nanos() as f64
    }
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1e6
}

fn describe_failure(verification: &Verification) -> String {
    let mut message = format!(
        "verification failed: {} mismatched values",
        verification.mismatches
    );
    if let Some(first) = verification.first_mismatch {
        let _ = write!(
            message,
            ", first at ({}, {}, {}): expected {}, got {}",
            first.row, first.col, first.channel, first.expected, first.actual
        );
    }
    if let Some(probe) = verification.probe.filter(|probe| !probe.matches()) {
        let _ = write!(
            message,
            "; probe ({}, {}) expected {}, got {}",
            probe.row, probe.col, probe.expected, probe.actual
        );
    }
    message
}
