//! Chart metadata consumed by the documentation templates.
//!
//! A chart is a directory containing a `Chart.yaml` file and, optionally, a
//! `values.yaml` file with default configuration values. This module reads
//! both into a [`ChartDocumentationInfo`] and exposes the flattened values
//! rows used by the default values table.
//!
//! Only the fields templates commonly need are modelled; unknown `Chart.yaml`
//! keys are ignored.

pub mod discovery;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{CHART_FILE_NAME, VALUES_FILE_NAME};
use crate::core::ChartDocError;

pub use discovery::find_chart_directories;

/// A chart maintainer entry from `Chart.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    /// Maintainer name
    pub name: String,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Homepage
    #[serde(default)]
    pub url: Option<String>,
}

/// A chart dependency entry from `Chart.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDependency {
    /// Dependency chart name
    pub name: String,
    /// Version constraint
    #[serde(default)]
    pub version: Option<String>,
    /// Chart repository URL
    #[serde(default)]
    pub repository: Option<String>,
    /// Alias used in values
    #[serde(default)]
    pub alias: Option<String>,
    /// Condition that enables the dependency
    #[serde(default)]
    pub condition: Option<String>,
}

/// The subset of `Chart.yaml` rendered into documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart name
    pub name: String,
    /// Chart version
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,
    /// Version of the packaged application
    #[serde(default, deserialize_with = "scalar_string")]
    pub app_version: Option<String>,
    /// One-line description
    #[serde(default)]
    pub description: Option<String>,
    /// `application` or `library`
    #[serde(default, rename = "type")]
    pub chart_type: Option<String>,
    /// Project homepage
    #[serde(default)]
    pub home: Option<String>,
    /// Source code URLs
    #[serde(default)]
    pub sources: Vec<String>,
    /// Search keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Maintainers
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    /// Chart dependencies
    #[serde(default)]
    pub dependencies: Vec<ChartDependency>,
    /// Supported Kubernetes version range
    #[serde(default, deserialize_with = "scalar_string")]
    pub kube_version: Option<String>,
    /// Whether the chart is deprecated
    #[serde(default)]
    pub deprecated: bool,
}

/// Accept unquoted numbers and booleans where a version string is expected.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(serde::de::Error::custom("expected a scalar version string")),
    }
}

/// One row of the flattened values table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueRow {
    /// Dotted key path, e.g. `image.repository`
    pub key: String,
    /// YAML-ish type name (`string`, `int`, `bool`, `list`, `object`, ...)
    #[serde(rename = "type")]
    pub value_type: String,
    /// Default value rendered as compact JSON
    pub default: String,
}

/// Everything chartdoc knows about one chart.
#[derive(Debug, Clone)]
pub struct ChartDocumentationInfo {
    /// Directory containing `Chart.yaml`
    pub chart_directory: PathBuf,
    /// Parsed `Chart.yaml`
    pub metadata: ChartMetadata,
    /// Parsed `values.yaml` (an empty object when absent)
    pub values: Value,
    /// Raw `values.yaml` text (empty when absent)
    pub values_raw: String,
}

impl ChartDocumentationInfo {
    /// Load chart metadata and default values from `chart_directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if `Chart.yaml` is missing or malformed, or if
    /// `values.yaml` exists but cannot be read or parsed.
    pub fn load(chart_directory: &Path) -> Result<Self> {
        let chart_file = chart_directory.join(CHART_FILE_NAME);
        if !chart_file.is_file() {
            return Err(ChartDocError::ChartNotFound {
                path: chart_directory.display().to_string(),
            }
            .into());
        }

        let chart_text = std::fs::read_to_string(&chart_file)
            .with_context(|| format!("Failed to read {}", chart_file.display()))?;
        let metadata: ChartMetadata = serde_yaml::from_str(&chart_text).map_err(|e| {
            ChartDocError::ChartMetadataParseError {
                file: chart_file.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let values_file = chart_directory.join(VALUES_FILE_NAME);
        let (values, values_raw) = if values_file.is_file() {
            let raw = std::fs::read_to_string(&values_file)
                .with_context(|| format!("Failed to read {}", values_file.display()))?;
            let parsed: Option<Value> = serde_yaml::from_str(&raw).map_err(|e| {
                ChartDocError::ChartMetadataParseError {
                    file: values_file.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            (parsed.unwrap_or_else(|| Value::Object(Default::default())), raw)
        } else {
            (Value::Object(Default::default()), String::new())
        };

        tracing::debug!(
            "Loaded chart {} ({}) from {}",
            metadata.name,
            metadata.version.as_deref().unwrap_or("unversioned"),
            chart_directory.display()
        );

        Ok(Self {
            chart_directory: chart_directory.to_path_buf(),
            metadata,
            values,
            values_raw,
        })
    }

    /// Flatten the chart's values into table rows sorted by key.
    ///
    /// Nested objects are descended into; lists and empty objects are leaves.
    pub fn values_rows(&self) -> Vec<ValueRow> {
        let mut rows = Vec::new();
        if let Value::Object(map) = &self.values {
            for (key, value) in map {
                flatten_value(key, value, &mut rows);
            }
        }
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }
}

fn flatten_value(key: &str, value: &Value, rows: &mut Vec<ValueRow>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (child, child_value) in map {
                flatten_value(&format!("{key}.{child}"), child_value, rows);
            }
        }
        _ => rows.push(ValueRow {
            key: key.to_string(),
            value_type: value_type_name(value).to_string(),
            default: serde_json::to_string(value).unwrap_or_default(),
        }),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "string",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
