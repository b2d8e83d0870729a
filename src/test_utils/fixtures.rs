//! On-disk chart fixtures
//!
//! ```rust,no_run
//! use chartdoc_cli::test_utils::ChartFixture;
//!
//! let fixture = ChartFixture::new("charts/demo")
//!     .chart_yaml("name: demo\nversion: 1.0.0\n")
//!     .values_yaml("replicaCount: 1\n")
//!     .template("README.md.tera", "# {{ chart.name }}\n")
//!     .build();
//! assert!(fixture.chart_dir().join("Chart.yaml").exists());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::constants::{CHART_FILE_NAME, VALUES_FILE_NAME};

/// A temporary search root holding one or more charts.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ChartFixture {
    temp: TempDir,
    chart_dir: PathBuf,
}

/// Builder for the first chart of a [`ChartFixture`].
#[derive(Debug, Clone)]
pub struct ChartFixtureBuilder {
    relative_dir: String,
    chart_yaml: Option<String>,
    values_yaml: Option<String>,
    templates: Vec<(String, String)>,
}

impl ChartFixture {
    /// Start a fixture whose first chart lives at `relative_dir` under a fresh
    /// temporary search root.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(relative_dir: &str) -> ChartFixtureBuilder {
        ChartFixtureBuilder {
            relative_dir: relative_dir.to_string(),
            chart_yaml: None,
            values_yaml: None,
            templates: Vec::new(),
        }
    }

    /// The temporary search root.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Directory of the chart the fixture was built with.
    pub fn chart_dir(&self) -> PathBuf {
        self.chart_dir.clone()
    }

    /// Add another chart with the given `Chart.yaml` text and return its directory.
    pub fn add_chart(&self, relative_dir: &str, chart_yaml: &str) -> PathBuf {
        let dir = self.root().join(relative_dir);
        fs::create_dir_all(&dir).expect("create chart directory");
        fs::write(dir.join(CHART_FILE_NAME), chart_yaml).expect("write Chart.yaml");
        dir
    }

    /// Write `contents` to `relative_path` under the search root, creating parents.
    pub fn write(&self, relative_path: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Read a file relative to the search root.
    pub fn read(&self, relative_path: &str) -> String {
        fs::read_to_string(self.root().join(relative_path)).expect("read fixture file")
    }
}

impl ChartFixtureBuilder {
    /// `Chart.yaml` content (defaults to a name derived from the directory).
    pub fn chart_yaml(mut self, text: &str) -> Self {
        self.chart_yaml = Some(text.to_string());
        self
    }

    /// `values.yaml` content (omitted by default).
    pub fn values_yaml(mut self, text: &str) -> Self {
        self.values_yaml = Some(text.to_string());
        self
    }

    /// A template file inside the chart directory.
    pub fn template(mut self, file: &str, text: &str) -> Self {
        self.templates.push((file.to_string(), text.to_string()));
        self
    }

    /// Create the files on disk.
    pub fn build(self) -> ChartFixture {
        let temp = TempDir::new().expect("create temp dir");
        let chart_dir = temp.path().join(&self.relative_dir);
        fs::create_dir_all(&chart_dir).expect("create chart directory");

        let chart_yaml = self.chart_yaml.unwrap_or_else(|| {
            let name = Path::new(&self.relative_dir)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("chart");
            format!("name: {name}\nversion: 0.1.0\n")
        });
        fs::write(chart_dir.join(CHART_FILE_NAME), chart_yaml).expect("write Chart.yaml");

        if let Some(values) = self.values_yaml {
            fs::write(chart_dir.join(VALUES_FILE_NAME), values).expect("write values.yaml");
        }
        for (file, text) in self.templates {
            fs::write(chart_dir.join(file), text).expect("write template");
        }

        ChartFixture {
            temp,
            chart_dir,
        }
    }
}
