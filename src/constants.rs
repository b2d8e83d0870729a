//! Global constants used throughout the chartdoc codebase.
//!
//! Names of well-known templates, default file names, and the limits that
//! bound template execution live here so they can be shared between the
//! templating engine, the configuration layer, and the CLI.

/// Maximum number of nested `include` invocations of a single named template.
///
/// This is a depth bound, not cycle detection: a template that includes
/// itself runs this many nested times before the next invocation fails.
pub const MAX_INCLUDE_DEPTH: usize = 1000;

/// Name of the built-in template rendered when a chart has no usable template file.
pub const DEFAULT_TEMPLATE_NAME: &str = "chart.defaultTemplate";

/// Directive appended to a chart's template text when any template file was missing.
pub const FALLBACK_DIRECTIVE: &str = r#"{% include "chart.defaultTemplate" %}"#;

/// Template file looked up in each chart directory when none is configured.
pub const DEFAULT_TEMPLATE_FILE: &str = "README.md.tera";

/// Output file written into each chart directory when none is configured.
pub const DEFAULT_OUTPUT_FILE: &str = "README.md";

/// Optional configuration file looked up in the chart search root.
pub const CONFIG_FILE_NAME: &str = "chartdoc.toml";

/// Chart metadata file that marks a directory as a chart.
pub const CHART_FILE_NAME: &str = "Chart.yaml";

/// Default values file read next to [`CHART_FILE_NAME`].
pub const VALUES_FILE_NAME: &str = "values.yaml";

/// Stack size for threads that render charts (256 MiB).
///
/// Every nested `include` re-enters the Tera renderer, so a chain that
/// approaches [`MAX_INCLUDE_DEPTH`] needs far more stack than the default
/// 2 MiB thread stack provides.
pub const RENDER_THREAD_STACK_SIZE: usize = 256 * 1024 * 1024;
