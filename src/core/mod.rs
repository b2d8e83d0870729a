//! Core types for chartdoc
//!
//! Holds the crate-wide error type ([`ChartDocError`]) and the user-facing
//! error reporting used by the CLI ([`ErrorContext`], [`user_friendly_error`]).
//! Template-specific failures live in [`crate::templating::TemplateError`] and
//! convert into [`ChartDocError::Template`].

pub mod error;

pub use error::{ChartDocError, ErrorContext, user_friendly_error};
