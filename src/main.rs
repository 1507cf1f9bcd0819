//! heatbench CLI entry point

use anyhow::{Context, Result};
use heatbench::bench;
use heatbench::config::cli::{Cli, RunMode};
use heatbench::config::{toml, SuiteConfig};
use heatbench::distributed::{Coordinator, WorkerAgent};
use heatbench::grid::Grid;
use heatbench::solver::{sequential, threaded};
use std::time::Duration;

fn main() -> Result<()> {
    println!("heatbench v{}", env!("CARGO_PKG_VERSION"));
    println!("2D heat diffusion benchmark suite");
    println!();

    let cli = Cli::parse_args();
    cli.validate()?;

    match cli.mode {
        RunMode::Sequential => run_sequential(&cli),
        RunMode::Parallel => run_parallel(&cli),
        RunMode::Coordinator => run_coordinator(&cli),
        RunMode::Worker => run_worker(&cli),
        RunMode::Bench => run_bench(&cli),
    }
}

/// Run one grid in-process on a single thread
fn run_sequential(cli: &Cli) -> Result<()> {
    let run = cli.run_config()?;
    println!("{}", run);

    let (elapsed, grid) = sequential::run(&run);
    print_summary("sequential", elapsed, &grid);
    Ok(())
}

/// Run one grid in-process across worker threads
fn run_parallel(cli: &Cli) -> Result<()> {
    let run = cli.run_config()?;
    let threads = cli.threads.unwrap_or_else(threaded::default_threads);
    println!("{}", run);
    println!("Threads: {}", threads);

    let (elapsed, grid) = threaded::run(&run, threads);
    print_summary("parallel", elapsed, &grid);
    Ok(())
}

/// Host a distributed run and wait for workers to dial in
fn run_coordinator(cli: &Cli) -> Result<()> {
    let config = cli.coordinator_config()?;
    println!("{}", config);

    let runtime =
        tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let (elapsed, grid) = runtime.block_on(async {
        let coordinator = Coordinator::bind(config).await?;
        coordinator.run().await
    })?;
    print_summary("distributed", elapsed, &grid);
    Ok(())
}

/// Serve one distributed run as a worker
fn run_worker(cli: &Cli) -> Result<()> {
    let config = cli.worker_config();
    println!("{}", config);

    let runtime =
        tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(WorkerAgent::new(config).run())
}

/// Run the benchmark matrix
fn run_bench(cli: &Cli) -> Result<()> {
    let base = match cli.config.as_deref() {
        Some(path) => toml::parse_suite_file(path)?,
        None => SuiteConfig::default(),
    };
    let suite = cli.suite_config(base)?;
    println!("{}", suite);
    println!();

    bench::run_suite(&suite)
}

fn print_summary(label: &str, elapsed: Duration, grid: &Grid) {
    let (min, max) = grid.min_max();
    println!();
    println!("Runtime ({}): {:.4} s", label, elapsed.as_secs_f64());
    println!("Final grid -> min: {:.2}, max: {:.2}", min, max);
}
