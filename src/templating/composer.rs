//! Composition of a chart's documentation template.
//!
//! [`TemplateComposer::compose`] builds one [`ChartTemplate`] per chart:
//!
//! 1. an empty scope cell named after the chart directory is created,
//! 2. a fresh [`InclusionGuard`] is created for this chart only,
//! 3. the converters and `include` are registered, bound to the cell and guard,
//! 4. the built-in default definitions are parsed,
//! 5. the chart's own template text is resolved and parsed on top,
//! 6. the finished Tera instance is published into the cell.
//!
//! Definitions are added in that order, so a chart-provided definition
//! replaces a default one with the same name, and within the chart's files the
//! last definition of a name wins.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread;

use tera::{Context as TeraContext, Tera};

use super::defaults::{DefaultTemplates, TemplateStore};
use super::error::{TemplateError, format_tera_error};
use super::guard::InclusionGuard;
use super::registry::{FunctionRegistry, ScopeCell, ScopeHandle};
use super::resolver::TemplateResolver;
use super::sections::split_sections;
use crate::constants::{MAX_INCLUDE_DEPTH, RENDER_THREAD_STACK_SIZE};

/// Label used for default template sources in error messages.
const DEFAULTS_SOURCE: &str = "<defaults>";

/// A composed, ready-to-render documentation template for one chart.
pub struct ChartTemplate {
    name: String,
    scope: ScopeCell,
    guard: Arc<InclusionGuard>,
    files: Vec<PathBuf>,
    used_fallback: bool,
}

impl std::fmt::Debug for ChartTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartTemplate")
            .field("name", &self.name)
            .field("files", &self.files)
            .field("used_fallback", &self.used_fallback)
            .finish_non_exhaustive()
    }
}

impl ChartTemplate {
    /// Name of the main template (the chart directory).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template files the chart text was read from.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Whether the fallback directive was appended to the chart text.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Whether the scope contains a template called `name`.
    pub fn has_template(&self, name: &str) -> bool {
        self.tera().is_some_and(|tera| tera.get_template_names().any(|n| n == name))
    }

    /// Current include depth of `name` in this chart's guard.
    pub fn include_depth(&self, name: &str) -> usize {
        self.guard.depth(name)
    }

    /// Render the main template.
    pub fn render(&self, context: &TeraContext) -> Result<String, TemplateError> {
        self.render_template(&self.name, context)
    }

    /// Render any template of the scope by name.
    ///
    /// Nested `include` calls re-enter the renderer on the same thread, so the
    /// render runs on a thread with [`RENDER_THREAD_STACK_SIZE`] bytes of stack
    /// and a chain of [`InclusionGuard::max_depth`] includes fits regardless of
    /// the caller's own stack.
    pub fn render_template(
        &self,
        template: &str,
        context: &TeraContext,
    ) -> Result<String, TemplateError> {
        let tera = self.tera().ok_or_else(|| TemplateError::ScopeUnavailable {
            scope: self.name.clone(),
        })?;
        let render_failed = |message: String| TemplateError::Render {
            template: template.to_string(),
            message,
        };

        thread::scope(|scope| -> Result<String, TemplateError> {
            let worker = thread::Builder::new()
                .name("chartdoc-render".to_string())
                .stack_size(RENDER_THREAD_STACK_SIZE)
                .spawn_scoped(scope, || tera.render(template, context))
                .map_err(|e| render_failed(format!("failed to start render thread: {e}")))?;

            match worker.join() {
                Ok(result) => result.map_err(|e| render_failed(format_tera_error(&e))),
                Err(_) => Err(render_failed("render thread panicked".to_string())),
            }
        })
    }

    fn tera(&self) -> Option<&Tera> {
        self.scope.get()
    }
}

/// Builds [`ChartTemplate`]s from default definitions and chart template files.
pub struct TemplateComposer {
    defaults: Box<dyn TemplateStore>,
    max_include_depth: usize,
}

impl Default for TemplateComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateComposer {
    /// Composer using the embedded default templates and [`MAX_INCLUDE_DEPTH`].
    pub fn new() -> Self {
        Self {
            defaults: Box::new(DefaultTemplates),
            max_include_depth: MAX_INCLUDE_DEPTH,
        }
    }

    /// Replace the default template store.
    #[must_use]
    pub fn with_defaults(mut self, defaults: impl TemplateStore + 'static) -> Self {
        self.defaults = Box::new(defaults);
        self
    }

    /// Bound the nesting of `include` calls per template name.
    #[must_use]
    pub fn with_max_include_depth(mut self, max_include_depth: usize) -> Self {
        self.max_include_depth = max_include_depth;
        self
    }

    /// Compose the documentation template for the chart in `chart_directory`.
    ///
    /// `specifiers` are resolved with [`TemplateResolver`]; an unreadable
    /// template file or a syntax error in any source aborts composition.
    pub fn compose<S: AsRef<str>>(
        &self,
        chart_directory: &Path,
        search_root: &Path,
        specifiers: &[S],
    ) -> Result<ChartTemplate, TemplateError> {
        let name = chart_directory.display().to_string();

        let scope: ScopeCell = Arc::new(OnceLock::new());
        let guard = Arc::new(InclusionGuard::new(self.max_include_depth));

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        FunctionRegistry::new(ScopeHandle::new(name.as_str(), &scope), Arc::clone(&guard))
            .register(&mut tera);

        for (file, text) in self.defaults.sources() {
            parse_into(&mut tera, &name, text, &format!("{DEFAULTS_SOURCE}/{file}"))?;
        }

        let chart_text = TemplateResolver::new(chart_directory, search_root).load(specifiers)?;
        let chart_source = if chart_text.files.is_empty() {
            name.clone()
        } else {
            let files: Vec<String> =
                chart_text.files.iter().map(|f| f.display().to_string()).collect();
            format!("{} ({})", name, files.join(", "))
        };
        parse_into(&mut tera, &name, &chart_text.text, &chart_source)?;

        if scope.set(tera).is_err() {
            return Err(TemplateError::ScopeUnavailable {
                scope: name,
            });
        }

        tracing::debug!(
            "Composed template for chart {} from {} file(s){}",
            name,
            chart_text.files.len(),
            if chart_text.used_fallback { " with default fallback" } else { "" }
        );

        Ok(ChartTemplate {
            name,
            scope,
            guard,
            files: chart_text.files,
            used_fallback: chart_text.used_fallback,
        })
    }
}

/// Parse `text` into `tera`: every definition under its own name, the main body
/// under `main_name` unless it is blank.
fn parse_into(
    tera: &mut Tera,
    main_name: &str,
    text: &str,
    source_name: &str,
) -> Result<(), TemplateError> {
    let sections = split_sections(text, source_name)?;

    for (name, body) in &sections.definitions {
        add_template(tera, name, body, source_name)?;
    }

    if sections.has_main_body() {
        add_template(tera, main_name, &sections.main, source_name)?;
    }

    Ok(())
}

fn add_template(
    tera: &mut Tera,
    name: &str,
    body: &str,
    source_name: &str,
) -> Result<(), TemplateError> {
    tera.add_raw_template(name, body).map_err(|e| TemplateError::Parse {
        source_name: source_name.to_string(),
        template: name.to_string(),
        message: format_tera_error(&e),
    })
}
