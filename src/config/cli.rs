//! CLI argument parsing using clap

use crate::config::{
    parse_count_list, parse_size_list, CoordinatorConfig, RetryPolicy, RunConfig, SuiteConfig,
    WorkerConfig,
};
use crate::error::HeatError;
use crate::grid::HotRegion;
use crate::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Single-threaded reference solver (default)
    Sequential,
    /// Multi-threaded solver, interior rows split across OS threads
    Parallel,
    /// Distributed master: accept workers and drive the run
    Coordinator,
    /// Remote compute agent: connect to a coordinator and serve iterations
    Worker,
    /// Full benchmark suite over all strategies
    Bench,
}

/// heatbench - distributed 2D heat-diffusion benchmark suite
#[derive(Parser, Debug)]
#[command(name = "heatbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: sequential, parallel, coordinator, worker, or bench
    #[arg(long, value_enum, default_value = "sequential")]
    pub mode: RunMode,

    // === Grid Options ===
    /// Grid rows
    #[arg(long, default_value = "200")]
    pub nx: usize,

    /// Grid columns
    #[arg(long, default_value = "200")]
    pub ny: usize,

    /// Number of Jacobi iterations
    #[arg(short = 'i', long, default_value = "200")]
    pub iterations: usize,

    // === Hot Region Options ===
    /// Seed the default centered hot square before iteration 0
    #[arg(long)]
    pub hot: bool,

    /// Explicit hot rectangle as row0,row1,col0,col1 (inclusive, clamped)
    #[arg(long, value_name = "R0,R1,C0,C1")]
    pub hot_rect: Option<String>,

    /// Temperature of the hot region
    #[arg(long, default_value = "100.0")]
    pub hot_value: f64,

    /// Side of the centered hot square as a fraction of each dimension
    #[arg(long, default_value = "0.1")]
    pub hot_fraction: f64,

    // === Parallel Options ===
    /// Worker threads for parallel mode (default: half the cores)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    // === Distributed Options ===
    /// Number of workers the coordinator waits for
    #[arg(short = 'w', long, default_value = "2")]
    pub workers: usize,

    /// Coordinator bind address, or the address a worker dials
    #[arg(long)]
    pub host: Option<String>,

    /// Coordinator port (bind for coordinator, dial for worker)
    #[arg(short = 'p', long, default_value = "5000")]
    pub port: u16,

    /// Worker connect attempts before giving up
    #[arg(long, default_value = "20")]
    pub connect_attempts: usize,

    /// Delay between worker connect attempts, in milliseconds
    #[arg(long, default_value = "200")]
    pub connect_delay_ms: u64,

    // === Bench Options ===
    /// Comma-separated grid sizes for bench mode (default: 50x50,100x100,200x200)
    #[arg(long, value_name = "NxM,...")]
    pub sizes: Option<String>,

    /// Comma-separated thread counts for bench mode (default: 1,2,4)
    #[arg(long)]
    pub thread_counts: Option<String>,

    /// Comma-separated worker counts for bench mode (default: 1,2)
    #[arg(long)]
    pub worker_counts: Option<String>,

    /// Skip the distributed cells in bench mode
    #[arg(long)]
    pub skip_distributed: bool,

    /// Iterations per bench cell (default: 100)
    #[arg(long)]
    pub bench_iterations: Option<usize>,

    /// CSV output path for bench mode (default: results.csv)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Optional JSON report path for bench mode
    #[arg(long)]
    pub json_report: Option<PathBuf>,

    /// TOML suite file for bench mode; explicit CLI flags take precedence
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.hot && self.hot_rect.is_some() {
            anyhow::bail!("--hot and --hot-rect are mutually exclusive");
        }
        if !(self.hot_fraction > 0.0 && self.hot_fraction <= 1.0) {
            anyhow::bail!(
                "--hot-fraction must be in (0, 1], got {}",
                self.hot_fraction
            );
        }
        if self.connect_attempts == 0 {
            anyhow::bail!("--connect-attempts must be at least 1");
        }
        if let Some(rect) = &self.hot_rect {
            parse_hot_rect(rect, self.hot_value)?;
        }
        Ok(())
    }

    /// The hot region selected by the flags, if any
    pub fn hot_region(&self, nx: usize, ny: usize) -> Result<Option<HotRegion>> {
        if let Some(rect) = &self.hot_rect {
            return Ok(Some(parse_hot_rect(rect, self.hot_value)?));
        }
        if self.hot {
            return Ok(Some(HotRegion::centered(
                nx,
                ny,
                self.hot_fraction,
                self.hot_value,
            )));
        }
        Ok(None)
    }

    /// Run parameters for the local solver modes
    pub fn run_config(&self) -> Result<RunConfig> {
        Ok(RunConfig {
            nx: self.nx,
            ny: self.ny,
            iterations: self.iterations,
            hot: self.hot_region(self.nx, self.ny)?,
        })
    }

    /// Coordinator parameters (bind side)
    pub fn coordinator_config(&self) -> Result<CoordinatorConfig> {
        Ok(CoordinatorConfig {
            run: self.run_config()?,
            workers: self.workers,
            host: self.host.clone().unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port,
        })
    }

    /// Worker parameters (dial side)
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            host: self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string()),
            port: self.port,
            retry: RetryPolicy {
                attempts: self.connect_attempts,
                delay: Duration::from_millis(self.connect_delay_ms),
            },
        }
    }

    /// Suite parameters for bench mode, merged over `base`
    ///
    /// `base` is the TOML-loaded configuration (or the defaults); any flag
    /// the user set on the command line wins over it.
    pub fn suite_config(&self, base: SuiteConfig) -> Result<SuiteConfig> {
        let mut suite = base;

        if let Some(sizes) = &self.sizes {
            suite.sizes = parse_size_list(sizes)?;
        }
        if let Some(threads) = &self.thread_counts {
            suite.threads = parse_count_list(threads)?;
        }
        if let Some(workers) = &self.worker_counts {
            suite.workers = parse_count_list(workers)?;
        }
        if let Some(iterations) = self.bench_iterations {
            suite.iterations = iterations;
        }
        if let Some(output) = &self.output {
            suite.output = output.clone();
        }
        if self.skip_distributed {
            suite.skip_distributed = true;
        }
        if self.json_report.is_some() {
            suite.json_report = self.json_report.clone();
        }
        if self.hot {
            suite.hot = true;
        }
        // Shared solver flags keep their concrete defaults, so a value that
        // differs from the default is the user speaking.
        if self.hot_value != 100.0 {
            suite.hot_value = self.hot_value;
        }
        if self.hot_fraction != 0.1 {
            suite.hot_fraction = self.hot_fraction;
        }

        suite.validate()?;
        Ok(suite)
    }
}

/// Parse `r0,r1,c0,c1` into a hot region with the given value
fn parse_hot_rect(text: &str, value: f64) -> Result<HotRegion> {
    let parts: Vec<&str> = text.split(',').map(|s| s.trim()).collect();
    if parts.len() != 4 {
        return Err(HeatError::InvalidConfig(format!(
            "--hot-rect needs four comma-separated indices, got '{}'",
            text
        ))
        .into());
    }
    let mut coords = [0usize; 4];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        *slot = part.parse::<usize>().map_err(|_| {
            HeatError::InvalidConfig(format!("--hot-rect index '{}' is not a number", part))
        })?;
    }
    Ok(HotRegion {
        row0: coords[0],
        row1: coords[1],
        col0: coords[2],
        col1: coords[3],
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_from(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("heatbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_match_reference_cli() {
        let cli = cli_from(&[]);
        assert_eq!(cli.mode, RunMode::Sequential);
        assert_eq!((cli.nx, cli.ny, cli.iterations), (200, 200, 200));
        assert_eq!(cli.workers, 2);
        assert_eq!(cli.port, 5000);
        assert_eq!(cli.connect_attempts, 20);
        assert_eq!(cli.connect_delay_ms, 200);
        assert_eq!(cli.hot_value, 100.0);
        assert_eq!(cli.hot_fraction, 0.1);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_coordinator_and_worker_address_defaults_differ() {
        let cli = cli_from(&["--mode", "coordinator"]);
        assert_eq!(cli.coordinator_config().unwrap().host, "0.0.0.0");

        let cli = cli_from(&["--mode", "worker"]);
        assert_eq!(cli.worker_config().host, "127.0.0.1");
    }

    #[test]
    fn test_explicit_host_overrides_both_defaults() {
        let cli = cli_from(&["--mode", "worker", "--host", "10.0.0.7"]);
        assert_eq!(cli.worker_config().host, "10.0.0.7");
    }

    #[test]
    fn test_hot_flag_builds_centered_region() {
        let cli = cli_from(&["--hot", "--nx", "100", "--ny", "100"]);
        let hot = cli.hot_region(100, 100).unwrap().unwrap();
        assert_eq!((hot.row0, hot.row1), (45, 54));
        assert_eq!(hot.value, 100.0);
    }

    #[test]
    fn test_no_hot_flags_means_no_seeding() {
        let cli = cli_from(&[]);
        assert!(cli.hot_region(200, 200).unwrap().is_none());
    }

    #[test]
    fn test_hot_rect_parses_inclusive_rectangle() {
        let cli = cli_from(&["--hot-rect", "2,4,1,3", "--hot-value", "50.0"]);
        let hot = cli.hot_region(10, 10).unwrap().unwrap();
        assert_eq!(
            (hot.row0, hot.row1, hot.col0, hot.col1, hot.value),
            (2, 4, 1, 3, 50.0)
        );
    }

    #[test]
    fn test_hot_and_hot_rect_are_mutually_exclusive() {
        let cli = cli_from(&["--hot", "--hot-rect", "1,2,1,2"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_malformed_hot_rect_is_rejected() {
        let cli = cli_from(&["--hot-rect", "1,2,3"]);
        assert!(cli.validate().is_err());

        let cli = cli_from(&["--hot-rect", "a,b,c,d"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_zero_connect_attempts_rejected() {
        let cli = cli_from(&["--connect-attempts", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_suite_config_passes_base_through_untouched() {
        let cli = cli_from(&["--mode", "bench"]);
        let suite = cli.suite_config(SuiteConfig::default()).unwrap();
        assert_eq!(suite, SuiteConfig::default());
    }

    #[test]
    fn test_suite_config_cli_overrides_base() {
        let cli = cli_from(&[
            "--mode",
            "bench",
            "--sizes",
            "8x8,16x16",
            "--thread-counts",
            "2",
            "--worker-counts",
            "1",
            "--bench-iterations",
            "5",
            "--skip-distributed",
        ]);
        let suite = cli.suite_config(SuiteConfig::default()).unwrap();
        assert_eq!(suite.sizes, vec![[8, 8], [16, 16]]);
        assert_eq!(suite.threads, vec![2]);
        assert_eq!(suite.workers, vec![1]);
        assert_eq!(suite.iterations, 5);
        assert!(suite.skip_distributed);
    }

    #[test]
    fn test_retry_policy_from_flags() {
        let cli = cli_from(&[
            "--mode",
            "worker",
            "--connect-attempts",
            "1",
            "--connect-delay-ms",
            "10",
        ]);
        let config = cli.worker_config();
        assert_eq!(config.retry.attempts, 1);
        assert_eq!(config.retry.delay, Duration::from_millis(10));
    }
}
