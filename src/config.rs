//! Configuration loading from `filterbench.toml`.
//!
//! The file is optional. When no path is given it is discovered by walking up from the
//! current directory. Every field has a default, and CLI flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    curves::FadeCurve,
    error::{BenchError, Result},
    grid::Dims,
};

/// Name of the configuration file looked for during discovery.
pub const CONFIG_FILE_NAME: &str = "filterbench.toml";

/// Complete benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// Size of the source grid.
    #[serde(default)]
    pub grid: GridConfig,
    /// How the source grid is generated.
    #[serde(default)]
    pub noise: NoiseConfig,
    /// Timing protocol.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Which methods run and how they are set up.
    #[serde(default)]
    pub methods: MethodsConfig,
    /// Report output.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Size of the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Number of rows.
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Number of columns.
    #[serde(default = "default_cols")]
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

impl GridConfig {
    /// The configured grid size.
    pub fn dims(&self) -> Dims {
        Dims::new(self.rows, self.cols)
    }
}

fn default_rows() -> usize {
    2560
}
fn default_cols() -> usize {
    1440
}

/// Which noise implementation generates the source grid.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseBackend {
    /// The built-in fractal Perlin generator.
    #[default]
    Native,
    /// The `fastnoise-lite` crate.
    FastnoiseLite,
}

/// Parameters of the fractal Perlin noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    /// Generator implementation.
    #[serde(default)]
    pub backend: NoiseBackend,
    /// Seed of the first octave.
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Number of octaves.
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    /// Frequency of the first octave, in cycles per cell.
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Frequency multiplier between octaves.
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    /// Fade curve of the built-in generator.
    #[serde(default)]
    pub fade: FadeCurve,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            backend: NoiseBackend::default(),
            seed: default_seed(),
            octaves: default_octaves(),
            frequency: default_frequency(),
            lacunarity: default_lacunarity(),
            persistence: default_persistence(),
            fade: FadeCurve::default(),
        }
    }
}

fn default_seed() -> u32 {
    1337
}
fn default_octaves() -> u32 {
    25
}
fn default_frequency() -> f32 {
    0.01
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_persistence() -> f32 {
    0.5
}

/// The timing protocol applied to every method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Number of timed calls per method.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Number of untimed calls before timing starts.
    #[serde(default = "default_warmup")]
    pub warmup: u32,
    /// Collect per-call statistics.
    #[serde(default)]
    pub profile: bool,
    /// Compare every method's output with the reference rule.
    #[serde(default = "default_verify")]
    pub verify: bool,
    /// A cell whose value is checked explicitly during verification.
    #[serde(default)]
    pub probe: Probe,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            warmup: default_warmup(),
            profile: false,
            verify: default_verify(),
            probe: Probe::default(),
        }
    }
}

fn default_trials() -> u32 {
    1000
}
fn default_warmup() -> u32 {
    1
}
fn default_verify() -> bool {
    true
}

/// The cell checked during verification, written as `true`, `false` or `[row, col]`.
///
/// `true` checks [`Probe::DEFAULT_CELL`] when it lies inside the grid. An explicit cell must lie
/// inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probe {
    /// Check the default cell (`true`) or no cell (`false`).
    Enabled(bool),
    /// Check this `[row, col]`.
    Cell([usize; 2]),
}

impl Default for Probe {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl Probe {
    /// The cell checked when none is configured.
    pub const DEFAULT_CELL: [usize; 2] = [20, 70];

    /// The cell to check, if any.
    pub fn cell(self) -> Option<[usize; 2]> {
        match self {
            Self::Enabled(true) => Some(Self::DEFAULT_CELL),
            Self::Enabled(false) => None,
            Self::Cell(cell) => Some(cell),
        }
    }
}

/// Method selection and method-specific setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodsConfig {
    /// Regular expression selecting method ids.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Rows per block for the `chunked` method.
    #[serde(default = "default_chunk_rows")]
    pub chunk_rows: usize,
    /// Worker count for the `parallel_map` method. Defaults to the logical CPU count.
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for MethodsConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            chunk_rows: default_chunk_rows(),
            jobs: None,
        }
    }
}

fn default_filter() -> String {
    ".*".to_string()
}
fn default_chunk_rows() -> usize {
    256
}

/// Report format.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Fixed-width plain text.
    #[default]
    Text,
    /// A Markdown table.
    Markdown,
    /// Pretty-printed JSON.
    Json,
}

/// Report output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl BenchConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Finds `filterbench.toml` in `start` or one of its ancestors.
    pub fn find_file(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Loads the discovered configuration, or the defaults if there is none.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match Self::find_file(&cwd) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Rejects values no benchmark can run with.
    pub fn validate(&self) -> Result<()> {
        let dims = self.grid.dims();
        if dims.rows == 0 || dims.cols == 0 {
            return Err(BenchError::Config(format!(
                "grid must have at least one row and one column, got {dims}"
            )));
        }
        if self.runner.trials == 0 {
            return Err(BenchError::Config("trials must be at least 1".into()));
        }
        if self.noise.octaves == 0 {
            return Err(BenchError::Config("octaves must be at least 1".into()));
        }
        if !(self.noise.frequency > 0.0 && self.noise.frequency.is_finite()) {
            return Err(BenchError::Config(format!(
                "frequency must be a positive number, got {}",
                self.noise.frequency
            )));
        }
        if !(self.noise.lacunarity > 0.0 && self.noise.lacunarity.is_finite()) {
            return Err(BenchError::Config(format!(
                "lacunarity must be a positive number, got {}",
                self.noise.lacunarity
            )));
        }
        if self.noise.backend == NoiseBackend::FastnoiseLite {
            // fastnoise-lite keeps scaling past f32::MAX and then samples NaN.
            let octaves = i32::try_from(self.noise.octaves - 1).unwrap_or(i32::MAX);
            let reach = dims.rows.max(dims.cols) as f32
                * self.noise.frequency
                * self.noise.lacunarity.powi(octaves);
            if !reach.is_finite() {
                return Err(BenchError::Config(format!(
                    "{} octaves at lacunarity {} overflow the fastnoise-lite sample range",
                    self.noise.octaves, self.noise.lacunarity
                )));
            }
        }
        if self.methods.chunk_rows == 0 {
            return Err(BenchError::Config("chunk_rows must be at least 1".into()));
        }
        if self.methods.jobs == Some(0) {
            return Err(BenchError::Config("jobs must be at least 1".into()));
        }
        if let Probe::Cell([row, col]) = self.runner.probe {
            if !dims.contains(row, col) {
                return Err(BenchError::Config(format!(
                    "probe cell ({row}, {col}) lies outside the {dims} grid"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_setup() {
        let config = BenchConfig::default();
        assert_eq!(config.grid.dims(), Dims::new(2560, 1440));
        assert_eq!(config.runner.trials, 1000);
        assert_eq!(config.runner.warmup, 1);
        assert_eq!(config.runner.probe.cell(), Some([20, 70]));
        assert_eq!(config.noise.seed, 1337);
        assert_eq!(config.noise.octaves, 25);
        assert_eq!(config.output.format, OutputFormat::Text);
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = BenchConfig::from_toml(
            r#"
            [grid]
            rows = 64

            [noise]
            backend = "fastnoise-lite"
            fade = "smoothstep"

            [runner]
            trials = 5
            profile = true

            [methods]
            filter = "loop|kernel"

            [output]
            format = "markdown"
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.dims(), Dims::new(64, 1440));
        assert_eq!(config.noise.backend, NoiseBackend::FastnoiseLite);
        assert_eq!(config.noise.fade, FadeCurve::Smoothstep);
        assert_eq!(config.noise.seed, 1337);
        assert_eq!(config.runner.trials, 5);
        assert!(config.runner.profile);
        assert!(config.runner.verify);
        assert_eq!(config.methods.filter, "loop|kernel");
        assert_eq!(config.methods.chunk_rows, 256);
        assert_eq!(config.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn default_checked_cell_is_optional_on_small_grids() {
        let mut config = BenchConfig::default();
        config.grid.rows = 16;
        config.grid.cols = 16;
        config.validate().unwrap();
        assert_eq!(config.runner.probe.cell(), Some([20, 70]));
    }

    #[test]
    fn checked_cell_accepts_bool_or_coordinates() {
        let off = BenchConfig::from_toml("[runner]\nprobe = false\n").unwrap();
        assert_eq!(off.runner.probe, Probe::Enabled(false));
        assert_eq!(off.runner.probe.cell(), None);

        let cell = BenchConfig::from_toml("[runner]\nprobe = [3, 4]\n").unwrap();
        assert_eq!(cell.runner.probe.cell(), Some([3, 4]));

        let on = BenchConfig::from_toml("[runner]\nprobe = true\n").unwrap();
        assert_eq!(on.runner.probe, Probe::default());

        assert!(BenchConfig::from_toml("[runner]\nprobe = []\n").is_err());
    }

    #[test]
    fn octave_overflow_is_only_rejected_for_fastnoise() {
        let mut config = BenchConfig::default();
        config.noise.octaves = 200;
        config.validate().unwrap();

        config.noise.backend = NoiseBackend::FastnoiseLite;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("200 octaves"));

        config.noise.octaves = 25;
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BenchConfig::from_toml("[runner]\ntrails = 5\n").unwrap_err();
        assert!(matches!(err, BenchError::Toml(_)));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = BenchConfig::default();
        config.runner.trials = 0;
        assert!(matches!(config.validate(), Err(BenchError::Config(_))));

        let mut config = BenchConfig::default();
        config.grid.rows = 10;
        config.runner.probe = Probe::Cell([20, 70]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("probe cell (20, 70)"));

        let mut config = BenchConfig::default();
        config.noise.frequency = 0.0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.methods.jobs = Some(0);
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.noise.lacunarity = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn discovery_walks_up_directories() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(BenchConfig::find_file(&nested), None);

        let file = root.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file, "[runner]\ntrials = 3\n").unwrap();
        assert_eq!(BenchConfig::find_file(&nested), Some(file.clone()));
        assert_eq!(BenchConfig::load(&file).unwrap().runner.trials, 3);
    }
}
