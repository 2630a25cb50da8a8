//! Command line entry point of `filterbench`.

use std::{fs, process};

use clap::Parser;
use filterbench::{
    config::BenchConfig,
    error::BenchError,
    grid::create_base_arrays,
    methods::{self, SetupContext},
    perlin::NoiseGenerator,
    runner::{RunSettings, Runner},
};
use regex::Regex;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Command, RunArgs};

fn main() {
    let cli = Cli::parse();

    // FILTERBENCH_LOG takes precedence over -v and -q
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FILTERBENCH_LOG")
                .unwrap_or_else(|_| EnvFilter::new(cli.args.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(exit_code(&e));
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<BenchError>() {
        Some(BenchError::Verification { .. }) => 4,
        Some(BenchError::Io(_)) => 3,
        Some(e) if e.is_config() => 2,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.args.load_config()?;
    match cli.command.unwrap_or(Command::Run) {
        Command::List => list(&config),
        Command::Run => bench(&cli.args, &config),
    }
}

fn list(config: &BenchConfig) -> anyhow::Result<()> {
    let filter = Regex::new(&config.methods.filter).map_err(BenchError::from)?;
    for def in methods::registry() {
        let mark = if filter.is_match(def.id) { '*' } else { ' ' };
        println!("{mark} {:<14} {}", def.id, def.summary);
    }
    Ok(())
}

fn bench(args: &RunArgs, config: &BenchConfig) -> anyhow::Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(BenchError::from)?;
    }

    let filter = Regex::new(&config.methods.filter).map_err(BenchError::from)?;
    let selected = methods::select(&filter);
    if selected.is_empty() {
        return Err(BenchError::Config(format!(
            "no method matches the filter `{}`",
            config.methods.filter
        ))
        .into());
    }
    let dims = config.grid.dims();
    info!(
        methods = selected.len(),
        trials = config.runner.trials,
        threads = rayon::current_num_threads(),
        "configuration"
    );

    let noise = NoiseGenerator::from_config(&config.noise);
    let (source, destination) = create_base_arrays(dims, &noise);
    let context = SetupContext {
        dims,
        chunk_rows: config.methods.chunk_rows,
        jobs: config.methods.jobs.unwrap_or_else(num_cpus::get),
    };

    let mut runner = Runner::new(
        source,
        destination,
        RunSettings::from(&config.runner),
        context,
    )?
    .with_noise(&config.noise)
    .with_progress(!args.quiet);
    let report = runner.run_all(&selected)?;

    let rendered = report.render(config.output.format)?;
    match &config.output.path {
        Some(path) => {
            fs::write(path, rendered).map_err(BenchError::from)?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }

    match report.verification_failures() {
        0 => Ok(()),
        failed => Err(BenchError::Verification { failed }.into()),
    }
}
