//! Resolution of a chart's template files.
//!
//! Each configured template specifier is classified and turned into a concrete
//! path:
//!
//! | Specifier            | Example                 | Resolved against        |
//! |----------------------|-------------------------|-------------------------|
//! | relative path        | `./_templates.tera`     | chart search root       |
//! | bare file name       | `README.md.tera`        | chart directory         |
//! | anything else        | `/opt/docs/base.tera`   | used as given           |
//!
//! Specifiers that do not resolve to an existing file are skipped; when any
//! was skipped the fallback directive is appended so the chart still renders
//! the built-in default template.

use std::path::{Component, Path, PathBuf};

use super::error::TemplateError;
use crate::constants::FALLBACK_DIRECTIVE;

/// How a template specifier is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Starts with `./` or `../`; joined onto the search root
    Relative,
    /// A single file name; joined onto the chart directory
    BareFilename,
    /// Anything else; used verbatim
    Verbatim,
}

impl SpecifierKind {
    /// Classify a specifier string.
    pub fn classify(specifier: &str) -> Self {
        let path = Path::new(specifier);
        let mut components = path.components();
        match (components.next(), components.next()) {
            (Some(Component::CurDir | Component::ParentDir), _) => SpecifierKind::Relative,
            (Some(Component::Normal(_)), None) => SpecifierKind::BareFilename,
            _ => SpecifierKind::Verbatim,
        }
    }

    /// Turn a specifier of this kind into a candidate path.
    pub fn resolve(self, specifier: &str, chart_directory: &Path, search_root: &Path) -> PathBuf {
        match self {
            SpecifierKind::Relative => search_root.join(specifier),
            SpecifierKind::BareFilename => chart_directory.join(specifier),
            SpecifierKind::Verbatim => PathBuf::from(specifier),
        }
    }
}

/// Template files found for one chart, in specifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTemplateSet {
    /// Existing template files
    pub files: Vec<PathBuf>,
    /// Whether any specifier did not resolve to an existing file
    pub had_missing: bool,
}

/// Concatenated template text for one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartTemplateText {
    /// Contents of every resolved file, plus the fallback directive if needed
    pub text: String,
    /// Files the text was read from
    pub files: Vec<PathBuf>,
    /// Whether the fallback directive was appended
    pub used_fallback: bool,
}

/// Resolves and concatenates template files for a chart.
#[derive(Debug, Clone)]
pub struct TemplateResolver<'a> {
    chart_directory: &'a Path,
    search_root: &'a Path,
}

impl<'a> TemplateResolver<'a> {
    /// Create a resolver for the chart in `chart_directory`, found under `search_root`.
    pub fn new(chart_directory: &'a Path, search_root: &'a Path) -> Self {
        Self {
            chart_directory,
            search_root,
        }
    }

    /// Classify every specifier and keep the ones that point at existing files.
    ///
    /// A file whose existence cannot be determined (for example because a
    /// parent directory is not searchable) is an error, not a missing file.
    pub fn resolve<S: AsRef<str>>(
        &self,
        specifiers: &[S],
    ) -> Result<ResolvedTemplateSet, TemplateError> {
        let mut resolved = ResolvedTemplateSet::default();

        for specifier in specifiers {
            let specifier = specifier.as_ref();
            let candidate = SpecifierKind::classify(specifier).resolve(
                specifier,
                self.chart_directory,
                self.search_root,
            );

            match candidate.try_exists() {
                Ok(true) => resolved.files.push(candidate),
                Ok(false) => {
                    tracing::debug!(
                        "Did not find template file {} for chart {}, using default template",
                        specifier,
                        self.chart_directory.display()
                    );
                    resolved.had_missing = true;
                }
                Err(source) => {
                    tracing::error!(
                        "Cannot access template file {} for chart {}: {}",
                        candidate.display(),
                        self.chart_directory.display(),
                        source
                    );
                    return Err(TemplateError::FileRead {
                        path: candidate,
                        source,
                    });
                }
            }
        }

        Ok(resolved)
    }

    /// Resolve the specifiers and concatenate the template files in order.
    ///
    /// Fails only when a file cannot be checked for existence or cannot be read.
    pub fn load<S: AsRef<str>>(&self, specifiers: &[S]) -> Result<ChartTemplateText, TemplateError> {
        let resolved = self.resolve(specifiers)?;
        tracing::debug!(
            "Using template files {:?} for chart {}",
            resolved.files,
            self.chart_directory.display()
        );

        let mut text = String::new();
        for file in &resolved.files {
            let contents = std::fs::read_to_string(file).map_err(|source| {
                tracing::error!(
                    "Failed to read documentation template for chart {}: {}",
                    self.chart_directory.display(),
                    source
                );
                TemplateError::FileRead {
                    path: file.clone(),
                    source,
                }
            })?;
            text.push_str(&contents);
        }

        if resolved.had_missing {
            text.push_str(FALLBACK_DIRECTIVE);
        }

        Ok(ChartTemplateText {
            text,
            files: resolved.files,
            used_fallback: resolved.had_missing,
        })
    }
}
