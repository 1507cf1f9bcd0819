//! Benchmark suite driver
//!
//! Runs the full matrix of (grid size) x (approach) x (parallelism) cells,
//! appending one CSV row per cell as it completes. Sequential and threaded
//! cells run in-process. Distributed cells spawn real worker processes from
//! the current executable and run the coordinator in-process, so the wire
//! protocol is measured exactly as a hand-launched run would see it.
//!
//! A failed cell is reported and skipped; the rest of the matrix still runs.

use crate::config::{CoordinatorConfig, RunConfig, SuiteConfig};
use crate::distributed::Coordinator;
use crate::output::{Approach, BenchRecord, CsvWriter, SuiteReport};
use crate::solver::{sequential, threaded};
use crate::util::time::{format_duration, Stopwatch};
use crate::Result;
use anyhow::Context;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// How long a stopped worker process gets to exit before being killed
const WORKER_GRACE: Duration = Duration::from_secs(5);

/// Run the whole benchmark matrix
pub fn run_suite(suite: &SuiteConfig) -> Result<()> {
    suite.validate()?;

    let suite_timer = Stopwatch::start();
    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let mut writer = CsvWriter::create(&suite.output)
        .with_context(|| format!("Failed to create results file {}", suite.output.display()))?;
    let mut records = Vec::new();

    println!("Writing results to {}", suite.output.display());
    for &[nx, ny] in &suite.sizes {
        let run = RunConfig {
            nx,
            ny,
            iterations: suite.iterations,
            hot: suite.hot_region_for(nx, ny),
        };
        println!();
        println!("=== Grid {}x{}, {} iterations ===", nx, ny, suite.iterations);

        let (elapsed, _) = sequential::run(&run);
        let record = BenchRecord {
            approach: Approach::Sequential,
            nx,
            ny,
            iterations: suite.iterations,
            n_threads: None,
            n_workers: None,
            runtime_seconds: elapsed.as_secs_f64(),
        };
        println!("  sequential: {:.6} s", record.runtime_seconds);
        writer.append(&record)?;
        records.push(record);

        for &threads in &suite.threads {
            let (elapsed, _) = threaded::run(&run, threads);
            let record = BenchRecord {
                approach: Approach::ParallelThreads,
                nx,
                ny,
                iterations: suite.iterations,
                n_threads: Some(threads),
                n_workers: None,
                runtime_seconds: elapsed.as_secs_f64(),
            };
            println!(
                "  parallel_threads (threads={}): {:.6} s",
                threads, record.runtime_seconds
            );
            writer.append(&record)?;
            records.push(record);
        }

        if suite.skip_distributed {
            continue;
        }
        for &workers in &suite.workers {
            match distributed_cell(&runtime, &run, workers) {
                Ok(seconds) => {
                    let record = BenchRecord {
                        approach: Approach::DistributedSockets,
                        nx,
                        ny,
                        iterations: suite.iterations,
                        n_threads: None,
                        n_workers: Some(workers),
                        runtime_seconds: seconds,
                    };
                    println!(
                        "  distributed_sockets (workers={}): {:.6} s",
                        workers, record.runtime_seconds
                    );
                    writer.append(&record)?;
                    records.push(record);
                }
                Err(e) => {
                    eprintln!("  ⚠️  distributed_sockets (workers={}) failed: {:#}", workers, e);
                }
            }
        }
    }

    if let Some(path) = &suite.json_report {
        let report = SuiteReport::new(suite.clone(), records);
        report
            .write(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!();
        println!("Report written to {}", path.display());
    }

    println!();
    println!(
        "Benchmark complete in {}. Results in {}",
        format_duration(suite_timer.elapsed()),
        suite.output.display()
    );
    Ok(())
}

/// Measure one distributed cell
///
/// The coordinator binds port 0 first, then workers are pointed at whatever
/// port the OS handed out. That way no port is ever picked and released
/// before use, and workers connect on their first attempt.
fn distributed_cell(runtime: &Runtime, run: &RunConfig, workers: usize) -> Result<f64> {
    let config = CoordinatorConfig {
        run: run.clone(),
        workers,
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let coordinator = runtime.block_on(Coordinator::bind(config))?;
    let port = coordinator.local_addr()?.port();

    let mut children: Vec<Child> = Vec::with_capacity(workers);
    for _ in 0..workers {
        match launch_worker(port) {
            Ok(child) => children.push(child),
            Err(e) => {
                for child in children {
                    let _ = reap_worker(child, WORKER_GRACE);
                }
                return Err(e);
            }
        }
    }

    // Reap before surfacing any coordinator error, or dead cells would
    // leave worker processes behind.
    let result = runtime.block_on(coordinator.run());
    for child in children {
        if let Err(e) = reap_worker(child, WORKER_GRACE) {
            eprintln!("  ⚠️  Failed to reap a worker process: {:#}", e);
        }
    }

    let (elapsed, _grid) = result?;
    Ok(elapsed.as_secs_f64())
}

/// Launch one worker process against the given port
fn launch_worker(port: u16) -> Result<Child> {
    let exe_path = std::env::current_exe().context("Failed to get current executable path")?;

    let mut cmd = Command::new(&exe_path);
    cmd.arg("--mode").arg("worker");
    cmd.arg("--host").arg("127.0.0.1");
    cmd.arg("--port").arg(port.to_string());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd.spawn().context("Failed to spawn worker process")?;
    Ok(child)
}

/// Wait for a worker to exit, killing it once the grace period runs out
///
/// Workers exit on their own after a Stop message, so the kill path only
/// runs when a cell failed partway.
fn reap_worker(mut child: Child, grace: Duration) -> Result<()> {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait()? {
            Some(_status) => return Ok(()),
            None if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(50));
            }
            None => {
                child.kill()?;
                child.wait()?;
                return Ok(());
            }
        }
    }
}
