//! Built-in default template definitions.
//!
//! The defaults are compiled into the binary and parsed into every chart's
//! template scope before the chart's own template files, so a chart can use
//! or override any of them. The store must always define
//! [`DEFAULT_TEMPLATE_NAME`](crate::constants::DEFAULT_TEMPLATE_NAME), which
//! the fallback directive renders.

/// A read-only collection of named template sources.
pub trait TemplateStore: Send + Sync {
    /// All `(file name, contents)` pairs in the order they should be parsed.
    fn sources(&self) -> Vec<(&str, &str)>;
}

const EMBEDDED: &[(&str, &str)] = &[
    ("header.tera", include_str!("../../templates/header.tera")),
    ("badges.tera", include_str!("../../templates/badges.tera")),
    ("sections.tera", include_str!("../../templates/sections.tera")),
    ("values.tera", include_str!("../../templates/values.tera")),
    ("default.tera", include_str!("../../templates/default.tera")),
];

/// Default templates embedded from the crate's `templates/` directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTemplates;

impl TemplateStore for DefaultTemplates {
    fn sources(&self) -> Vec<(&str, &str)> {
        EMBEDDED.to_vec()
    }
}
