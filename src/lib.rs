//! chartdoc - documentation generator for charts
//!
//! chartdoc finds every chart (a directory with a `Chart.yaml`) below a search
//! root and renders a Markdown document for it from Tera templates. Built-in
//! default templates describe the chart's metadata and values table; template
//! files next to a chart, or shared ones below the search root, can override any
//! of them by name.
//!
//! # Architecture Overview
//!
//! For every chart:
//! 1. [`chart`] loads `Chart.yaml` and `values.yaml`
//! 2. [`templating::TemplateResolver`] turns template specifiers into files
//! 3. [`templating::TemplateComposer`] builds a per-chart template scope from the
//!    default definitions and the chart's files
//! 4. [`templating::build_chart_context`] exposes chart data to the templates
//! 5. [`document`] renders and writes the result
//!
//! The [`cli`] renders charts concurrently; each render owns its own template
//! scope and include-depth counters.
//!
//! # Modules
//!
//! - [`chart`] - Chart metadata and discovery
//! - [`cli`] - Command-line interface
//! - [`config`] - `chartdoc.toml` and command-line overrides
//! - [`constants`] - Shared defaults
//! - [`core`] - Error types and user-facing error reporting
//! - [`document`] - Per-chart render and write pipeline
//! - [`templating`] - Template resolution, composition, converters and `include`
//! - [`utils`] - File system helpers
//!
//! # Example template
//!
//! ```text
//! {% define "chart.header" %}# {{ chart.name | upper }}{% enddefine %}
//! {% include "chart.defaultTemplate" %}
//!
//! ## Raw values
//! {{ values | toYaml }}
//! ```

pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod document;
pub mod templating;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
