//! Tera-based templating for chart documentation.
//!
//! Each chart gets its own template scope containing the built-in default
//! definitions, overlaid with the definitions and main body found in the
//! chart's template files.
//!
//! # Template files
//!
//! Named sub-templates are declared with define blocks; everything outside
//! them forms the chart's main template:
//!
//! ```text
//! {% define "chart.header" %}# {{ chart.name }}{% enddefine %}
//! {% include "chart.defaultTemplate" %}
//! ```
//!
//! Template files are located with [`TemplateResolver`]. When any requested
//! file is missing, the chart falls back to `chart.defaultTemplate`.
//!
//! # Functions and filters
//!
//! - `toYaml` / `fromYaml`: YAML conversion; `fromYaml` reports failures as an
//!   `Error` key instead of aborting the render
//! - `toHTML`: Markdown to HTML with heading ids and links opening in a new tab
//! - `include(name=..., data=...)`: render a named template with `data` and
//!   return its output, bounded per name by [`InclusionGuard`]
//!
//! Tera's own `{% include "name" %}` tag also works and shares the caller's
//! context.

pub mod composer;
pub mod context;
pub mod defaults;
pub mod error;
pub mod filters;
pub mod guard;
pub mod registry;
pub mod resolver;
pub mod sections;

pub use composer::{ChartTemplate, TemplateComposer};
pub use context::build_chart_context;
pub use defaults::{DefaultTemplates, TemplateStore};
pub use error::TemplateError;
pub use filters::{from_yaml, to_html, to_yaml};
pub use guard::InclusionGuard;
pub use resolver::{SpecifierKind, TemplateResolver};
