//! Configuration for chartdoc runs.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags ([`ConfigOverrides`])
//! 2. an optional `chartdoc.toml`, either passed with `--config` or found in
//!    the chart search root
//! 3. built-in defaults
//!
//! ```toml
//! template_files = ["README.md.tera"]
//! output_file = "README.md"
//! max_include_depth = 1000
//! ignore = ["charts/vendored/*"]
//! ```

mod parser;

pub use parser::parse_config;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_OUTPUT_FILE, DEFAULT_TEMPLATE_FILE, MAX_INCLUDE_DEPTH,
};
use crate::core::ChartDocError;

/// Effective settings for a documentation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Template specifiers resolved for every chart, in order
    pub template_files: Vec<String>,
    /// File name written into each chart directory
    pub output_file: String,
    /// Maximum nesting of `include` per template name
    pub max_include_depth: usize,
    /// Glob patterns, relative to the search root, of directories to skip
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_files: vec![DEFAULT_TEMPLATE_FILE.to_string()],
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            max_include_depth: MAX_INCLUDE_DEPTH,
            ignore: Vec::new(),
        }
    }
}

/// Values supplied on the command line; `None` or empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--template-files`
    pub template_files: Vec<String>,
    /// `--output-file`
    pub output_file: Option<String>,
    /// `--max-include-depth`
    pub max_include_depth: Option<usize>,
}

impl Config {
    /// Load `chartdoc.toml`.
    ///
    /// An explicit path must exist. Without one, `search_root/chartdoc.toml` is
    /// used when present and the defaults otherwise.
    pub fn load(search_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = search_root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, search_root.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        tracing::debug!("Loading configuration from {}", path.display());
        let config: Self = parse_config(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if !overrides.template_files.is_empty() {
            self.template_files = overrides.template_files;
        }
        if let Some(output_file) = overrides.output_file {
            self.output_file = output_file;
        }
        if let Some(depth) = overrides.max_include_depth {
            self.max_include_depth = depth;
        }
        self
    }

    /// Reject settings that cannot produce a document.
    pub fn validate(&self) -> Result<(), ChartDocError> {
        if self.template_files.is_empty() {
            return Err(ChartDocError::ConfigError {
                message: "template_files must list at least one template file".to_string(),
            });
        }
        if self.output_file.trim().is_empty() {
            return Err(ChartDocError::ConfigError {
                message: "output_file must not be empty".to_string(),
            });
        }
        if Path::new(&self.output_file).components().count() != 1 {
            return Err(ChartDocError::ConfigError {
                message: format!("output_file '{}' must be a plain file name", self.output_file),
            });
        }
        if self.max_include_depth == 0 {
            return Err(ChartDocError::ConfigError {
                message: "max_include_depth must be at least 1".to_string(),
            });
        }
        for pattern in &self.ignore {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ChartDocError::ConfigError {
                    message: format!("invalid ignore pattern '{pattern}': {e}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path(), None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.template_files, vec!["README.md.tera"]);
        assert_eq!(config.output_file, "README.md");
        assert_eq!(config.max_include_depth, 1000);
    }

    #[test]
    fn test_file_in_search_root_is_used() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "template_files = [\"docs.tera\", \"../shared.tera\"]\nmax_include_depth = 10\n",
        )
        .unwrap();

        let config = Config::load(temp.path(), None).unwrap();
        assert_eq!(config.template_files, vec!["docs.tera", "../shared.tera"]);
        assert_eq!(config.max_include_depth, 10);
        assert_eq!(config.output_file, "README.md");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "templates = []\n").unwrap();

        let err = Config::load(temp.path(), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChartDocError>(),
            Some(ChartDocError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(temp.path(), Some(&temp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config {
            template_files: vec!["file.tera".to_string()],
            output_file: "DOCS.md".to_string(),
            max_include_depth: 10,
            ignore: vec![],
        }
        .with_overrides(ConfigOverrides {
            template_files: vec!["cli.tera".to_string()],
            output_file: None,
            max_include_depth: Some(3),
        });

        assert_eq!(config.template_files, vec!["cli.tera"]);
        assert_eq!(config.output_file, "DOCS.md");
        assert_eq!(config.max_include_depth, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let nested_output = Config {
            output_file: "docs/README.md".to_string(),
            ..Config::default()
        };
        assert!(nested_output.validate().is_err());

        let zero_depth = Config {
            max_include_depth: 0,
            ..Config::default()
        };
        assert!(zero_depth.validate().is_err());

        let bad_glob = Config {
            ignore: vec!["[".to_string()],
            ..Config::default()
        };
        assert!(bad_glob.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_template_list_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "template_files = []\n").unwrap();

        let err = Config::load(temp.path(), None).unwrap_err();
        match err.downcast_ref::<ChartDocError>() {
            Some(ChartDocError::ConfigError {
                message,
            }) => assert!(message.contains("template_files"), "got {message}"),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
