//! Template error handling for chartdoc
//!
//! This module provides the structured error type shared by template
//! resolution, composition, and rendering, together with the helper that
//! flattens Tera's nested error chains into a readable message.

use std::path::PathBuf;

use thiserror::Error;

/// Text every recursion-limit message contains, used to recognise the failure
/// after Tera has wrapped it in its own errors.
pub const RECURSION_MARKER: &str = "nested reference name";

/// Errors raised while resolving, composing, or rendering chart templates.
///
/// Only the conversion functions (`toYaml`, `fromYaml`) swallow their own
/// failures; everything else surfaces here.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A template file that exists on disk could not be read.
    #[error("Failed to read template file {}", .path.display())]
    FileRead {
        /// Absolute path of the unreadable template file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Template text could not be parsed.
    #[error("Template syntax error in '{template}' ({source_name}): {message}")]
    Parse {
        /// Where the text came from (default template file or chart directory)
        source_name: String,
        /// Named sub-template or main template that failed to parse
        template: String,
        /// Cleaned-up parser message
        message: String,
    },

    /// A named template was included more deeply than the configured bound.
    #[error(
        "Unable to execute template: rendering template has a nested reference name: {name} (limit {max_depth})"
    )]
    RecursionLimitExceeded {
        /// Template whose nesting exceeded the bound
        name: String,
        /// Configured maximum depth
        max_depth: usize,
    },

    /// An included template started rendering but failed part-way.
    #[error("Failed to include template '{name}': {message}")]
    IncludeFailed {
        /// Template that was being included
        name: String,
        /// Output produced before the failure
        partial_output: String,
        /// Cleaned-up render message
        message: String,
    },

    /// Rendering a composed chart template failed.
    #[error("Failed to render template '{template}': {message}")]
    Render {
        /// Template being rendered
        template: String,
        /// Cleaned-up render message
        message: String,
    },

    /// The `include` function ran against a scope that is not (or no longer) available.
    #[error("Template scope '{scope}' is not available for include")]
    ScopeUnavailable {
        /// Name of the scope
        scope: String,
    },
}

impl TemplateError {
    /// Returns `true` when this error, or the error that caused a failed include,
    /// is a recursion-limit failure.
    pub fn is_recursion_limit(&self) -> bool {
        match self {
            TemplateError::RecursionLimitExceeded {
                ..
            } => true,
            TemplateError::IncludeFailed {
                message,
                ..
            }
            | TemplateError::Render {
                message,
                ..
            } => message.contains(RECURSION_MARKER),
            _ => false,
        }
    }
}

/// Format a Tera error by walking its whole source chain.
///
/// Tera nests the interesting part of a failure (the pest parse error, the
/// message returned by a custom function) several levels deep. This collects
/// every level, drops empty and duplicate lines, and joins them with arrows.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages: Vec<String> = Vec::new();
    let mut current: Option<&dyn Error> = Some(error);
    while let Some(err) = current {
        let cleaned = err.to_string().trim().to_string();
        if !cleaned.is_empty() && !messages.contains(&cleaned) {
            messages.push(cleaned);
        }
        current = err.source();
    }

    if messages.is_empty() {
        "Template error (no details available)".to_string()
    } else {
        messages.join("\n  → ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursion_limit_detection() {
        let direct = TemplateError::RecursionLimitExceeded {
            name: "self".to_string(),
            max_depth: 3,
        };
        assert!(direct.is_recursion_limit());

        let wrapped = TemplateError::Render {
            template: "chart".to_string(),
            message: direct.to_string(),
        };
        assert!(wrapped.is_recursion_limit());

        let other = TemplateError::Render {
            template: "chart".to_string(),
            message: "Variable `foo` not found".to_string(),
        };
        assert!(!other.is_recursion_limit());
    }

    #[test]
    fn test_format_tera_error_includes_source_chain() {
        let inner = tera::Error::msg("inner cause");
        let outer = tera::Error::chain("outer failure", inner);

        let formatted = format_tera_error(&outer);
        assert!(formatted.contains("outer failure"));
        assert!(formatted.contains("inner cause"));
        assert!(formatted.contains("→"));
    }

    #[test]
    fn test_file_read_display_names_path() {
        let error = TemplateError::FileRead {
            path: PathBuf::from("/charts/demo/README.md.tera"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("/charts/demo/README.md.tera"));
    }
}
