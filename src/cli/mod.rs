//! Command-line interface for chartdoc.
//!
//! chartdoc has a single mode of operation: discover every chart below the
//! search root, render its documentation template and write the result into
//! the chart directory.
//!
//! ```bash
//! # Document every chart below ./charts
//! chartdoc --chart-search-root charts
//!
//! # Use a shared template, print instead of writing
//! chartdoc -t ./templates/common.tera -t README.md.tera --dry-run
//! ```
//!
//! Charts are rendered concurrently, one blocking task each. A chart that
//! fails is logged and skipped; the run then ends with an error once every
//! chart has been processed.


use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use crate::chart::find_chart_directories;
use crate::config::{Config, ConfigOverrides};
use crate::core::ChartDocError;
use crate::document::{DocumentRenderer, RenderedDocument, WriteOutcome};

/// Logging settings derived from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Tracing filter directive; `None` defers to `RUST_LOG`
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Uses the configured level, then `RUST_LOG`, then `info`. Safe to call
    /// more than once; later calls are ignored.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Generate Markdown documentation for charts from templates.
#[derive(Parser, Debug)]
#[command(
    name = "chartdoc",
    about = "Generate documentation for charts from templates",
    version,
    long_about = "chartdoc renders a documentation file for every chart found below the search root, \
                  combining built-in default templates with templates found next to each chart."
)]
pub struct Cli {
    /// Directory to search recursively for charts
    #[arg(short = 'c', long, default_value = ".")]
    chart_search_root: PathBuf,

    /// Template files to use, in order. Paths starting with ./ or ../ are
    /// relative to the search root, bare file names to each chart directory
    #[arg(short = 't', long = "template-files", value_name = "FILE")]
    template_files: Vec<String>,

    /// Name of the generated file inside each chart directory
    #[arg(short = 'o', long, value_name = "FILE")]
    output_file: Option<String>,

    /// Print generated documents to stdout instead of writing them
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Maximum nesting of `include` calls per template name
    #[arg(long, value_name = "N")]
    max_include_depth: Option<usize>,

    /// Configuration file (defaults to chartdoc.toml in the search root)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `chartdoc_cli=trace`
    #[arg(short = 'l', long, env = "CHARTDOC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Only log errors
    #[arg(short, long, conflicts_with = "log_level")]
    quiet: bool,
}

impl Cli {
    /// Set up logging and run.
    pub async fn execute(self) -> Result<()> {
        self.build_config().init_logging();
        self.run().await
    }

    /// Logging settings for this invocation.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.quiet {
            Some("error".to_string())
        } else {
            self.log_level.clone()
        };

        CliConfig {
            log_level,
        }
    }

    /// Resolve the effective configuration: CLI flags over the config file over defaults.
    pub fn resolve_config(&self) -> Result<Config> {
        let config = Config::load(&self.chart_search_root, self.config.as_deref())?
            .with_overrides(ConfigOverrides {
                template_files: self.template_files.clone(),
                output_file: self.output_file.clone(),
                max_include_depth: self.max_include_depth,
            });
        config.validate()?;
        Ok(config)
    }

    /// Render every chart below the search root without touching logging.
    pub async fn run(self) -> Result<()> {
        let search_root = self.chart_search_root.clone();
        if !search_root.is_dir() {
            return Err(ChartDocError::FileSystemError {
                operation: "read chart search root".to_string(),
                path: search_root.display().to_string(),
            }
            .into());
        }

        let config = self.resolve_config()?;
        tracing::debug!("Effective configuration: {:?}", config);

        let charts = find_chart_directories(&search_root, &config.ignore)?;
        if charts.is_empty() {
            tracing::warn!("No charts found below {}", search_root.display());
            return Ok(());
        }
        tracing::info!("Found {} chart(s) below {}", charts.len(), search_root.display());

        let renderer = Arc::new(DocumentRenderer::new(config));
        let results = render_all(&renderer, &charts, &search_root, self.dry_run).await;

        let total = results.len();
        let mut failed = 0;
        for (chart, result) in charts.iter().zip(results) {
            match result {
                Ok(document) => {
                    if self.dry_run {
                        print_document(&document);
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("Chart {} failed: {:#}", chart.display(), e);
                }
            }
        }

        if failed > 0 {
            return Err(ChartDocError::ChartsFailed {
                failed,
                total,
            }
            .into());
        }
        Ok(())
    }
}

/// Render (and unless `dry_run`, write) every chart concurrently.
///
/// Results are returned in the order of `charts`.
async fn render_all(
    renderer: &Arc<DocumentRenderer>,
    charts: &[PathBuf],
    search_root: &Path,
    dry_run: bool,
) -> Vec<Result<RenderedDocument>> {
    let tasks = charts.iter().map(|chart| {
        let renderer = Arc::clone(renderer);
        let chart = chart.clone();
        let search_root = search_root.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<RenderedDocument> {
            let document = renderer.render_chart(&chart, &search_root)?;
            if !dry_run && document.write()? == WriteOutcome::Unchanged {
                tracing::info!("Documentation for chart {} is unchanged", chart.display());
            }
            Ok(document)
        })
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.context("Render task panicked or was cancelled").and_then(|r| r))
        .collect()
}

fn print_document(document: &RenderedDocument) {
    println!("==> {} <==", document.output_path.display());
    println!("{}", document.content);
}
