//! Generic TOML configuration parsing.

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::ChartDocError;

/// Parse a TOML file into `T`.
///
/// Read failures are reported with the file path as context; parse failures
/// become [`ChartDocError::ConfigParseError`] naming the file.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content).map_err(|e| ChartDocError::ConfigParseError {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(config)
}
