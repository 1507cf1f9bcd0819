//! heatbench - Distributed 2D heat diffusion benchmark suite
//!
//! heatbench runs the same Jacobi stencil simulation under three execution
//! strategies and measures how they compare.
//!
//! # Architecture
//!
//! - **Sequential solver**: one thread over the whole grid
//! - **Threaded solver**: scoped threads over disjoint row bands
//! - **Distributed solver**: TCP coordinator scattering row blocks to
//!   worker processes, length-prefixed MessagePack on the wire
//! - **Benchmark driver**: runs the size/approach/parallelism matrix and
//!   writes CSV and JSON results
//!
//! All strategies produce bit-for-bit identical grids, which is what makes
//! their runtimes comparable.

pub mod bench;
pub mod config;
pub mod distributed;
pub mod error;
pub mod grid;
pub mod output;
pub mod partition;
pub mod solver;
pub mod stencil;
pub mod util;

// Re-export commonly used types
pub use config::{RunConfig, SuiteConfig};
pub use error::HeatError;
pub use grid::Grid;

/// Result type used throughout heatbench
pub type Result<T> = anyhow::Result<T>;
