//! Command line interface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use filterbench::{
    config::{BenchConfig, NoiseBackend, OutputFormat, Probe},
    error::Result,
};

/// Times different ways of filtering and scaling a Perlin noise grid.
#[derive(Debug, Parser)]
#[command(name = "filterbench", version, about, long_about = None)]
pub struct Cli {
    /// What to do. Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub args: RunArgs,
}

/// Subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Benchmark the selected methods and print the ranked table
    Run,
    /// List the registered methods; `*` marks the ones the filter selects
    List,
}

/// Options shared by every subcommand. Each one overrides the configuration file.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Configuration file [default: nearest filterbench.toml]
    #[arg(short, long, global = true, env = "FILTERBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Rows of the source grid
    #[arg(long, global = true)]
    pub rows: Option<usize>,

    /// Columns of the source grid
    #[arg(long, global = true)]
    pub cols: Option<usize>,

    /// Timed calls per method
    #[arg(short = 'n', long, global = true)]
    pub trials: Option<u32>,

    /// Untimed calls per method before timing
    #[arg(long, global = true)]
    pub warmup: Option<u32>,

    /// Noise seed
    #[arg(long, global = true)]
    pub seed: Option<u32>,

    /// Noise octaves
    #[arg(long, global = true)]
    pub octaves: Option<u32>,

    /// Frequency of the first noise octave
    #[arg(long, global = true)]
    pub frequency: Option<f32>,

    /// Noise generator
    #[arg(long, value_enum, global = true)]
    pub backend: Option<NoiseBackend>,

    /// Regular expression selecting method ids
    #[arg(short, long, global = true)]
    pub filter: Option<String>,

    /// Report format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Collect per-call statistics for every method
    #[arg(long, visible_alias = "debug", global = true)]
    pub profile: bool,

    /// Skip comparing outputs with the reference
    #[arg(long, global = true)]
    pub no_verify: bool,

    /// Cell whose channel 0 is checked during verification [default: 20,70 when it fits]
    #[arg(long, value_name = "ROW,COL", value_parser = parse_cell, global = true)]
    pub probe: Option<[usize; 2]>,

    /// Do not check a single cell during verification
    #[arg(long, global = true, conflicts_with = "probe")]
    pub no_probe: bool,

    /// Worker count for parallel_map [default: logical CPUs]
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Rows per block for chunked
    #[arg(long, global = true)]
    pub chunk_rows: Option<usize>,

    /// Size of the global worker pool [default: logical CPUs]
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl RunArgs {
    /// Loads the configuration file, applies the overrides and validates the result.
    pub fn load_config(&self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::discover()?,
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Overrides the values of `config` that were given on the command line.
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(rows) = self.rows {
            config.grid.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.grid.cols = cols;
        }
        if let Some(trials) = self.trials {
            config.runner.trials = trials;
        }
        if let Some(warmup) = self.warmup {
            config.runner.warmup = warmup;
        }
        if let Some(seed) = self.seed {
            config.noise.seed = seed;
        }
        if let Some(octaves) = self.octaves {
            config.noise.octaves = octaves;
        }
        if let Some(frequency) = self.frequency {
            config.noise.frequency = frequency;
        }
        if let Some(backend) = self.backend {
            config.noise.backend = backend;
        }
        if let Some(filter) = &self.filter {
            config.methods.filter.clone_from(filter);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
        if self.profile {
            config.runner.profile = true;
        }
        if self.no_verify {
            config.runner.verify = false;
        }
        if let Some(cell) = self.probe {
            config.runner.probe = Probe::Cell(cell);
        }
        if self.no_probe {
            config.runner.probe = Probe::Enabled(false);
        }
        if self.jobs.is_some() {
            config.methods.jobs = self.jobs;
        }
        if let Some(chunk_rows) = self.chunk_rows {
            config.methods.chunk_rows = chunk_rows;
        }
    }

    /// The default log directive when `FILTERBENCH_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn parse_cell(text: &str) -> core::result::Result<[usize; 2], String> {
    let (row, col) = text
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got `{text}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|err| format!("`{part}`: {err}"))
    };
    Ok([parse(row)?, parse(col)?])
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use filterbench::{curves::FadeCurve, grid::Dims};

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("filterbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_runs_with_the_configuration() {
        let cli = parse(&[]);
        assert_eq!(cli.command, None);
        let mut config = BenchConfig::default();
        cli.args.apply(&mut config);
        assert_eq!(config, BenchConfig::default());
        assert_eq!(cli.args.log_level(), "warn");
    }

    #[test]
    fn flags_override_the_configuration() {
        let cli = parse(&[
            "run",
            "--rows",
            "64",
            "--cols",
            "32",
            "-n",
            "5",
            "--warmup",
            "0",
            "--backend",
            "fastnoise-lite",
            "--seed",
            "7",
            "--debug",
            "--no-verify",
            "--format",
            "json",
            "-o",
            "out.json",
            "-j",
            "3",
            "--chunk-rows",
            "16",
        ]);
        assert_eq!(cli.command, Some(Command::Run));

        let mut config = BenchConfig::default();
        cli.args.apply(&mut config);
        assert_eq!(config.grid.dims(), Dims::new(64, 32));
        assert_eq!(config.runner.trials, 5);
        assert_eq!(config.runner.warmup, 0);
        assert!(config.runner.profile);
        assert!(!config.runner.verify);
        assert_eq!(config.noise.backend, NoiseBackend::FastnoiseLite);
        assert_eq!(config.noise.seed, 7);
        assert_eq!(config.noise.fade, FadeCurve::Quintic);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.path, Some(PathBuf::from("out.json")));
        assert_eq!(config.methods.jobs, Some(3));
        assert_eq!(config.methods.chunk_rows, 16);
    }

    #[test]
    fn options_work_after_list() {
        let cli = parse(&["list", "--filter", "^clip$", "-vv"]);
        assert_eq!(cli.command, Some(Command::List));
        assert_eq!(cli.args.filter.as_deref(), Some("^clip$"));
        assert_eq!(cli.args.log_level(), "trace");
    }

    #[test]
    fn small_grids_load_with_the_default_checked_cell() {
        let config = parse(&["--rows", "16", "--cols", "16", "-n", "2"])
            .args
            .load_config()
            .unwrap();
        assert_eq!(config.grid.dims(), Dims::new(16, 16));
        assert_eq!(config.runner.probe, Probe::default());
    }

    #[test]
    fn checked_cell_can_be_moved_or_disabled() {
        let mut config = BenchConfig::default();
        parse(&["--probe", "3, 4"]).args.apply(&mut config);
        assert_eq!(config.runner.probe.cell(), Some([3, 4]));

        parse(&["--no-probe"]).args.apply(&mut config);
        assert_eq!(config.runner.probe.cell(), None);

        let err = parse(&["--rows", "16", "--cols", "16", "--probe", "20,70"])
            .args
            .load_config()
            .unwrap_err();
        assert!(err.is_config());

        assert!(Cli::try_parse_from(["filterbench", "--probe", "20"]).is_err());
        assert!(Cli::try_parse_from(["filterbench", "--probe", "1,2", "--no-probe"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["filterbench", "-v", "-q"]).is_err());
        assert_eq!(parse(&["-q"]).args.log_level(), "error");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["filterbench", "--format", "html"]).is_err());
        assert!(Cli::try_parse_from(["filterbench", "--rows", "-3"]).is_err());
    }

    #[test]
    fn explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(&path, "[grid]\nrows = 40\ncols = 80\n\n[runner]\ntrials = 2\n").unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let cli = parse(&["--config", &path_arg, "--cols", "100"]);
        let config = cli.args.load_config().unwrap();
        assert_eq!(config.grid.dims(), Dims::new(40, 100));
        assert_eq!(config.runner.trials, 2);

        let cli = parse(&["--config", &path_arg, "-n", "0"]);
        assert!(cli.args.load_config().unwrap_err().is_config());
    }
}
