//! JSON suite report
//!
//! The CSV table answers "how fast was each cell"; the JSON report answers
//! "what exactly ran". It captures the full suite configuration and the
//! environment next to the records, so a results file found months later
//! still explains itself.

use crate::config::SuiteConfig;
use crate::output::csv::BenchRecord;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Full report for one benchmark suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// When the suite finished
    pub timestamp: DateTime<Utc>,
    /// Machine the suite ran on, when it can be determined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Configuration the suite ran with
    pub suite: SuiteConfig,
    /// One record per completed cell, in execution order
    pub records: Vec<BenchRecord>,
}

impl SuiteReport {
    /// Assemble a report for a finished suite
    pub fn new(suite: SuiteConfig, records: Vec<BenchRecord>) -> Self {
        Self {
            timestamp: Utc::now(),
            hostname: hostname::get().ok().and_then(|h| h.into_string().ok()),
            suite,
            records,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::csv::Approach;
    use tempfile::tempdir;

    fn sample_records() -> Vec<BenchRecord> {
        vec![
            BenchRecord {
                approach: Approach::Sequential,
                nx: 50,
                ny: 50,
                iterations: 100,
                n_threads: None,
                n_workers: None,
                runtime_seconds: 0.5,
            },
            BenchRecord {
                approach: Approach::DistributedSockets,
                nx: 50,
                ny: 50,
                iterations: 100,
                n_threads: None,
                n_workers: Some(2),
                runtime_seconds: 1.25,
            },
        ]
    }

    #[test]
    fn report_round_trips_through_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        let report = SuiteReport::new(SuiteConfig::default(), sample_records());
        report.write(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: SuiteReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.records, report.records);
        assert_eq!(parsed.suite, report.suite);
        assert_eq!(parsed.timestamp, report.timestamp);
    }

    #[test]
    fn inapplicable_parallelism_fields_are_omitted() {
        let report = SuiteReport::new(SuiteConfig::default(), sample_records());
        let json = serde_json::to_string(&report).unwrap();
        // The sequential record carries neither parallelism field.
        assert_eq!(json.matches("n_threads").count(), 0);
        assert_eq!(json.matches("n_workers").count(), 1);
    }
}
