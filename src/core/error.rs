//! Error handling for chartdoc
//!
//! This module provides the strongly-typed [`ChartDocError`] used across the
//! crate and the user-facing [`ErrorContext`] wrapper that the CLI prints.
//!
//! Use [`user_friendly_error`] to turn any [`anyhow::Error`] into an
//! [`ErrorContext`] with a suggestion attached where one is known.
//!
//! ```rust,no_run
//! use chartdoc_cli::core::{ChartDocError, user_friendly_error};
//!
//! let error = ChartDocError::ChartNotFound {
//!     path: "charts/missing".to_string(),
//! };
//! user_friendly_error(anyhow::Error::from(error)).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// The main error type for chartdoc operations.
#[derive(Error, Debug)]
pub enum ChartDocError {
    /// A directory expected to hold a chart has no `Chart.yaml`.
    #[error("No Chart.yaml found in {path}")]
    ChartNotFound {
        /// Directory that was searched
        path: String,
    },

    /// `Chart.yaml` or `values.yaml` is not valid YAML for its schema.
    #[error("Failed to parse {file}: {reason}")]
    ChartMetadataParseError {
        /// File that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// Configuration values are inconsistent or out of range.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// The configuration file is not valid TOML for the config schema.
    #[error("Failed to parse configuration file {file}: {reason}")]
    ConfigParseError {
        /// Configuration file path
        file: String,
        /// Parser message
        reason: String,
    },

    /// A filesystem operation on a known path failed.
    #[error("File system error: {operation} failed for {path}")]
    FileSystemError {
        /// Operation being attempted
        operation: String,
        /// Path involved
        path: String,
    },

    /// Documentation for a chart could not be generated.
    #[error("Failed to render documentation for chart {chart}: {reason}")]
    RenderFailed {
        /// Chart directory
        chart: String,
        /// Underlying failure
        reason: String,
    },

    /// One or more charts failed during a run.
    #[error("{failed} of {total} chart(s) failed to render")]
    ChartsFailed {
        /// Number of failed charts
        failed: usize,
        /// Number of charts processed
        total: usize,
    },

    /// Standard I/O failure.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Template resolution, composition, or rendering failure.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// A [`ChartDocError`] paired with optional details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ChartDocError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ChartDocError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// Recognises [`ChartDocError`], [`TemplateError`], [`std::io::Error`] and
/// [`toml::de::Error`]; anything else is reported with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = message_with_chain(&error);

    let error = match error.downcast::<ChartDocError>() {
        Ok(chartdoc_error) => return create_error_context(chartdoc_error, message),
        Err(error) => error,
    };

    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        let context = ErrorContext::new(ChartDocError::Other {
            message,
        });
        return template_context(context, template_error.is_recursion_limit());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ChartDocError::Other {
                    message,
                })
                .with_suggestion("Check file ownership and permissions of the chart directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ChartDocError::Other {
                    message,
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(ChartDocError::ConfigParseError {
            file: crate::constants::CONFIG_FILE_NAME.to_string(),
            reason: message,
        })
        .with_suggestion("Check the TOML syntax of your configuration file");
    }

    ErrorContext::new(ChartDocError::Other {
        message,
    })
}

fn message_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn template_context(context: ErrorContext, recursion: bool) -> ErrorContext {
    if recursion {
        context
            .with_suggestion(
                "Check for templates that include themselves, or raise --max-include-depth if the nesting is intended",
            )
            .with_details("Each named template may be nested only up to the configured include depth")
    } else {
        context.with_suggestion(
            "Check template syntax: variables use {{ var }}, control flow uses {% %}, named templates use {% define \"name\" %}...{% enddefine %}",
        )
    }
}

/// Attach suggestions for a specific [`ChartDocError`].
///
/// Errors that arrived wrapped in anyhow context are re-reported with the whole
/// chain so the context lines are not lost.
fn create_error_context(error: ChartDocError, message: String) -> ErrorContext {
    match error {
        ChartDocError::ChartNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Point --chart-search-root at a directory containing Chart.yaml files"),
        ChartDocError::ChartMetadataParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the YAML syntax of Chart.yaml and values.yaml"),
        ChartDocError::ConfigError {
            ..
        }
        | ChartDocError::ConfigParseError {
            ..
        } => ErrorContext::new(error).with_suggestion(format!(
            "Check the keys and values in {}",
            crate::constants::CONFIG_FILE_NAME
        )),
        ChartDocError::Template(template_error) => {
            let recursion = template_error.is_recursion_limit();
            template_context(
                ErrorContext::new(ChartDocError::Other {
                    message,
                }),
                recursion,
            )
        }
        ChartDocError::ChartsFailed {
            ..
        } => ErrorContext::new(error)
            .with_details("The failing charts are listed in the log output above"),
        other => {
            if message == other.to_string() {
                ErrorContext::new(other)
            } else {
                ErrorContext::new(ChartDocError::Other {
                    message,
                })
            }
        }
    }
}
