//! TOML suite file parsing

use crate::config::SuiteConfig;
use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Parse a TOML suite file
pub fn parse_suite_file(path: &Path) -> Result<SuiteConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read suite file: {}", path.display()))?;

    parse_suite_string(&contents)
        .with_context(|| format!("Failed to parse suite file: {}", path.display()))
}

/// Parse a TOML suite configuration from a string
pub fn parse_suite_string(contents: &str) -> Result<SuiteConfig> {
    let suite: SuiteConfig =
        ::toml::from_str(contents).context("Failed to parse TOML suite configuration")?;

    Ok(suite)
}
