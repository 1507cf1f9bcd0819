//! Result output formats
//!
//! Benchmark results leave the process in two shapes:
//!
//! - `csv`: one row per measured cell, appended and flushed as the suite
//!   runs, so an interrupted suite keeps everything measured so far
//! - `json`: a full report written once at the end, carrying the suite
//!   configuration and environment alongside the records

pub mod csv;
pub mod json;

// Re-export key types
pub use csv::{Approach, BenchRecord, CsvWriter};
pub use json::SuiteReport;
