//! CSV results table
//!
//! One row per measured cell of the benchmark matrix. The format is flat on
//! purpose: every approach shares the same columns, and columns that do not
//! apply to an approach are left empty rather than overloaded.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Execution strategy a record was measured under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Sequential,
    ParallelThreads,
    DistributedSockets,
}

impl Approach {
    /// Label used in CSV rows and progress output
    pub fn label(&self) -> &'static str {
        match self {
            Approach::Sequential => "sequential",
            Approach::ParallelThreads => "parallel_threads",
            Approach::DistributedSockets => "distributed_sockets",
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One measured cell of the benchmark matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRecord {
    pub approach: Approach,
    pub nx: usize,
    pub ny: usize,
    pub iterations: usize,
    /// Thread count, only for the threaded approach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_threads: Option<usize>,
    /// Worker count, only for the distributed approach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_workers: Option<usize>,
    pub runtime_seconds: f64,
}

/// CSV writer for benchmark records
pub struct CsvWriter {
    file: File,
}

impl CsvWriter {
    /// Create the results file and write the header row
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path)?;
        writeln!(
            file,
            "approach,nx,ny,iterations,n_threads,n_workers,runtime_seconds"
        )?;
        Ok(Self { file })
    }

    /// Append one record and flush it to disk
    pub fn append(&mut self, record: &BenchRecord) -> Result<()> {
        let n_threads = record
            .n_threads
            .map(|n| n.to_string())
            .unwrap_or_default();
        let n_workers = record
            .n_workers
            .map(|n| n.to_string())
            .unwrap_or_default();
        writeln!(
            self.file,
            "{},{},{},{},{},{},{:.6}",
            record.approach.label(),
            record.nx,
            record.ny,
            record.iterations,
            n_threads,
            n_workers,
            record.runtime_seconds
        )?;
        self.file.flush()?;
        Ok(())
    }
}
