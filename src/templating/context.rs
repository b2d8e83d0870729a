//! Render context for chart documentation templates.
//!
//! Every chart template is rendered with these top-level variables:
//!
//! - `chart`: the `Chart.yaml` metadata, camelCase keys, every field present
//!   (`null` or empty when not set)
//! - `values`: the parsed `values.yaml` (an empty object when absent)
//! - `valuesRows`: flattened `values.yaml` rows with `key`, `type` and `default`
//! - `valuesYaml`: the raw `values.yaml` text

use anyhow::{Context, Result};
use serde_json::to_value;
use tera::Context as TeraContext;

use crate::chart::ChartDocumentationInfo;

/// Context key for chart metadata.
pub const CHART_KEY: &str = "chart";
/// Context key for parsed values.
pub const VALUES_KEY: &str = "values";
/// Context key for flattened values rows.
pub const VALUES_ROWS_KEY: &str = "valuesRows";
/// Context key for the raw values text.
pub const VALUES_YAML_KEY: &str = "valuesYaml";

/// Build the Tera context used to render `info`'s documentation.
pub fn build_chart_context(info: &ChartDocumentationInfo) -> Result<TeraContext> {
    let chart = to_value(&info.metadata).with_context(|| {
        format!("Failed to serialize chart metadata for {}", info.chart_directory.display())
    })?;
    let rows = to_value(info.values_rows()).context("Failed to serialize values rows")?;

    let mut context = TeraContext::new();
    context.insert(CHART_KEY, &chart);
    context.insert(VALUES_KEY, &info.values);
    context.insert(VALUES_ROWS_KEY, &rows);
    context.insert(VALUES_YAML_KEY, &info.values_raw);
    Ok(context)
}
