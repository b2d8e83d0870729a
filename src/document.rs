//! Documentation generation for a single chart.
//!
//! [`DocumentRenderer`] runs the per-chart pipeline: load `Chart.yaml` and
//! `values.yaml`, compose the chart's template, build the render context,
//! render, and write the result next to `Chart.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chart::ChartDocumentationInfo;
use crate::config::Config;
use crate::core::ChartDocError;
use crate::templating::{TemplateComposer, build_chart_context};
use crate::utils::fs::{read_optional, safe_write};

/// A rendered documentation file that has not been written yet.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Chart directory the document belongs to
    pub chart_directory: PathBuf,
    /// Chart name from `Chart.yaml`
    pub chart_name: String,
    /// Destination path
    pub output_path: PathBuf,
    /// Rendered text
    pub content: String,
    /// Whether the default template stood in for missing template files
    pub used_fallback: bool,
}

/// What happened when a document was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or its content changed
    Written,
    /// The file already had exactly this content
    Unchanged,
}

/// Renders chart documentation according to a [`Config`].
pub struct DocumentRenderer {
    config: Config,
    composer: TemplateComposer,
}

impl DocumentRenderer {
    /// Renderer using the embedded default templates.
    pub fn new(config: Config) -> Self {
        let composer = TemplateComposer::new().with_max_include_depth(config.max_include_depth);
        Self {
            config,
            composer,
        }
    }

    /// Render the documentation for the chart in `chart_directory`.
    ///
    /// Relative template specifiers are resolved against `search_root`.
    pub fn render_chart(&self, chart_directory: &Path, search_root: &Path) -> Result<RenderedDocument> {
        let info = ChartDocumentationInfo::load(chart_directory)?;
        self.render_info(&info, search_root)
    }

    /// Render the documentation for already-loaded chart information.
    pub fn render_info(
        &self,
        info: &ChartDocumentationInfo,
        search_root: &Path,
    ) -> Result<RenderedDocument> {
        let chart = info.chart_directory.display().to_string();

        let template = self
            .composer
            .compose(&info.chart_directory, search_root, &self.config.template_files)
            .map_err(ChartDocError::from)
            .with_context(|| format!("Failed to compose templates for chart {chart}"))?;

        let context = build_chart_context(info)?;
        let content = template
            .render(&context)
            .map_err(ChartDocError::from)
            .with_context(|| format!("Failed to render documentation for chart {chart}"))?;

        Ok(RenderedDocument {
            chart_directory: info.chart_directory.clone(),
            chart_name: info.metadata.name.clone(),
            output_path: info.chart_directory.join(&self.config.output_file),
            content,
            used_fallback: template.used_fallback(),
        })
    }
}

impl RenderedDocument {
    /// Write the document to [`RenderedDocument::output_path`], skipping the
    /// write when the file already holds the same content.
    pub fn write(&self) -> Result<WriteOutcome> {
        if read_optional(&self.output_path)?.as_deref() == Some(self.content.as_str()) {
            tracing::debug!("{} is up to date", self.output_path.display());
            return Ok(WriteOutcome::Unchanged);
        }

        safe_write(&self.output_path, &self.content).map_err(|e| {
            tracing::error!("Failed to write {}: {e:#}", self.output_path.display());
            ChartDocError::FileSystemError {
                operation: "write documentation".to_string(),
                path: self.output_path.display().to_string(),
            }
        })?;
        tracing::info!("Generated documentation for chart {}", self.chart_directory.display());
        Ok(WriteOutcome::Written)
    }
}
