//! Configuration module
//!
//! Handles CLI argument parsing, TOML suite files, and validation.

pub mod cli;
pub mod toml;

use crate::error::HeatError;
use crate::grid::{Grid, HotRegion};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Parameters for a single solver run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Grid rows
    pub nx: usize,
    /// Grid columns
    pub ny: usize,
    /// Fixed iteration count (no convergence criterion)
    pub iterations: usize,
    /// Optional hot region seeded before iteration 0
    pub hot: Option<HotRegion>,
}

impl RunConfig {
    /// Build the initial grid: zero-filled, then hot-region seeded
    pub fn build_grid(&self) -> Grid {
        let mut grid = Grid::new(self.nx, self.ny);
        if let Some(hot) = &self.hot {
            hot.apply(&mut grid);
        }
        grid
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} grid, {} iterations{}",
            self.nx,
            self.ny,
            self.iterations,
            if self.hot.is_some() {
                ", hot region seeded"
            } else {
                ""
            }
        )
    }
}

/// Distributed master configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    pub run: RunConfig,
    /// Exact number of worker connections to accept
    pub workers: usize,
    /// Bind address
    pub host: String,
    /// Bind port (0 picks an ephemeral port)
    pub port: u16,
}

impl CoordinatorConfig {
    /// Reject configurations the distributed path cannot run
    ///
    /// The local solvers tolerate degenerate grids (they return them
    /// unchanged), but a coordinator with no interior rows would accept
    /// workers it cannot feed, so it refuses up front.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(
                HeatError::InvalidConfig("worker count must be positive".into()).into(),
            );
        }
        if self.run.nx < 3 || self.run.ny < 3 {
            return Err(HeatError::InvalidConfig(format!(
                "distributed runs need at least a 3x3 grid, got {}x{}",
                self.run.nx, self.run.ny
            ))
            .into());
        }
        Ok(())
    }
}

impl fmt::Display for CoordinatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} across {} workers on {}:{}",
            self.run, self.workers, self.host, self.port
        )
    }
}

/// Bounded retry for the worker's initial connect
///
/// Fixed attempt count with a fixed delay between attempts. The default
/// matches the reference deployment (20 attempts x 200 ms, about 4 seconds
/// of patience); tests drop it to one attempt so refusal is immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 20,
            delay: Duration::from_millis(200),
        }
    }
}

/// Worker process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Coordinator address to dial
    pub host: String,
    pub port: u16,
    pub retry: RetryPolicy,
}

impl fmt::Display for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coordinator at {}:{}", self.host, self.port)
    }
}

/// Benchmark suite configuration
///
/// Loadable from a TOML file; every field has a default so a partial file
/// (or none at all) still describes a full matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Grid sizes as [nx, ny] pairs
    #[serde(default = "default_sizes")]
    pub sizes: Vec<[usize; 2]>,

    /// Iterations per cell
    #[serde(default = "default_suite_iterations")]
    pub iterations: usize,

    /// Thread counts to test for the parallel strategy
    #[serde(default = "default_thread_counts")]
    pub threads: Vec<usize>,

    /// Worker counts to test for the distributed strategy
    #[serde(default = "default_worker_counts")]
    pub workers: Vec<usize>,

    /// Skip the distributed cells entirely
    #[serde(default)]
    pub skip_distributed: bool,

    /// CSV output path
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Optional JSON report path
    #[serde(default)]
    pub json_report: Option<PathBuf>,

    /// Seed the centered hot region in every cell
    #[serde(default)]
    pub hot: bool,

    #[serde(default = "default_hot_value")]
    pub hot_value: f64,

    #[serde(default = "default_hot_fraction")]
    pub hot_fraction: f64,
}

fn default_sizes() -> Vec<[usize; 2]> {
    vec![[50, 50], [100, 100], [200, 200]]
}

fn default_suite_iterations() -> usize {
    100
}

fn default_thread_counts() -> Vec<usize> {
    vec![1, 2, 4]
}

fn default_worker_counts() -> Vec<usize> {
    vec![1, 2]
}

fn default_output() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_hot_value() -> f64 {
    100.0
}

fn default_hot_fraction() -> f64 {
    0.1
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            iterations: default_suite_iterations(),
            threads: default_thread_counts(),
            workers: default_worker_counts(),
            skip_distributed: false,
            output: default_output(),
            json_report: None,
            hot: false,
            hot_value: default_hot_value(),
            hot_fraction: default_hot_fraction(),
        }
    }
}

impl SuiteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(HeatError::InvalidConfig("no grid sizes to benchmark".into()).into());
        }
        if self.threads.is_empty() {
            return Err(HeatError::InvalidConfig("no thread counts to benchmark".into()).into());
        }
        if !self.skip_distributed && self.workers.is_empty() {
            return Err(HeatError::InvalidConfig(
                "no worker counts to benchmark (use skip_distributed to drop them)".into(),
            )
            .into());
        }
        if !self.skip_distributed {
            for &[nx, ny] in &self.sizes {
                if nx < 3 || ny < 3 {
                    return Err(HeatError::InvalidConfig(format!(
                        "size {}x{} is too small for the distributed strategy",
                        nx, ny
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// The hot region for one cell, or None when seeding is off
    pub fn hot_region_for(&self, nx: usize, ny: usize) -> Option<HotRegion> {
        self.hot
            .then(|| HotRegion::centered(nx, ny, self.hot_fraction, self.hot_value))
    }
}

impl fmt::Display for SuiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<String> = self
            .sizes
            .iter()
            .map(|[nx, ny]| format!("{}x{}", nx, ny))
            .collect();
        write!(
            f,
            "sizes [{}], {} iterations, threads {:?}, workers {:?}{}",
            sizes.join(", "),
            self.iterations,
            self.threads,
            self.workers,
            if self.skip_distributed {
                " (distributed skipped)"
            } else {
                ""
            }
        )
    }
}

/// Parse a comma-separated size list like `50x50,100x100`
pub fn parse_size_list(text: &str) -> Result<Vec<[usize; 2]>> {
    let mut sizes = Vec::new();
    for item in text.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (nx, ny) = item.split_once('x').ok_or_else(|| {
            HeatError::InvalidConfig(format!("size '{}' is not of the form NxM", item))
        })?;
        let nx = nx.trim().parse::<usize>().map_err(|_| {
            HeatError::InvalidConfig(format!("size '{}' has a non-numeric row count", item))
        })?;
        let ny = ny.trim().parse::<usize>().map_err(|_| {
            HeatError::InvalidConfig(format!("size '{}' has a non-numeric column count", item))
        })?;
        sizes.push([nx, ny]);
    }
    if sizes.is_empty() {
        return Err(HeatError::InvalidConfig(format!("no sizes in '{}'", text)).into());
    }
    Ok(sizes)
}

/// Parse a comma-separated count list like `1,2,4`
pub fn parse_count_list(text: &str) -> Result<Vec<usize>> {
    let mut counts = Vec::new();
    for item in text.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let n = item.parse::<usize>().map_err(|_| {
            HeatError::InvalidConfig(format!("'{}' is not a valid count", item))
        })?;
        counts.push(n);
    }
    if counts.is_empty() {
        return Err(HeatError::InvalidConfig(format!("no counts in '{}'", text)).into());
    }
    Ok(counts)
}
