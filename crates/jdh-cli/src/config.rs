//! `.jdh.toml` configuration
//!
//! Configuration files can be placed in:
//! - User home directory: `~/.jdh.toml` (user defaults)
//! - Project directory: `./.jdh.toml` (project defaults)
//! - Custom location via `--config` (replaces the project file)
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments
//! 2. Project config or `--config` file
//! 3. User config
//! 4. Built-in defaults

use anyhow::{Context, Result};
use colored::Colorize;
use jdh_chart::DEFAULT_CONVERTER;
use jdh_notebook::{DEFAULT_AUTHORS, DEFAULT_KEYWORDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".jdh.toml";

/// Default source description file written by `scan` and `prepare`
pub const DEFAULT_DESCRIPTIONS_FILE: &str = "figure_cells.json";

/// Configuration file structure for `.jdh.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Defaults for `scan` and `prepare`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<ScanConfig>,

    /// Defaults for `anonymize` and `prepare --anonymize`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymize: Option<AnonymizeConfig>,

    /// Defaults for `export-chart`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tag substrings marking cells that need a source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Source description file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeConfig {
    /// Author surnames, redacted as Author1, Author2, ... in this order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Converter executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,

    /// Default PNG scale factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    /// Vega-Lite version passed to the converter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vl_version: Option<String>,
}

/// Keep `base` unless `overlay` sets the field
fn overlay<T>(base: &mut Option<T>, overlay: Option<T>) {
    if overlay.is_some() {
        *base = overlay;
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load a config file if it exists, warning instead of failing on errors
    fn load_optional(path: &Path, label: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!(
                    "{} Failed to load {label} config from {}: {e:#}",
                    "Warning:".yellow().bold(),
                    path.display()
                );
                None
            }
        }
    }

    /// Path of the user config, if a home directory is known
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Discover and merge configuration
    ///
    /// An explicit `--config` file must load; user and project files that
    /// fail to parse only produce a warning.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let user = Self::user_config_path().and_then(|path| Self::load_optional(&path, "user"));
        let project = match explicit {
            Some(path) => Some(Self::load_from_file(path)?),
            None => Self::load_optional(Path::new(CONFIG_FILE_NAME), "project"),
        };
        Ok(Self::merge(user, project))
    }

    /// Merge configs field by field: project over user over defaults
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = Self::default();
        for config in [user_config, project_config].into_iter().flatten() {
            merged.apply(config);
        }
        merged
    }

    fn apply(&mut self, other: Self) {
        if let Some(scan) = other.scan {
            let target = self.scan.get_or_insert_with(ScanConfig::default);
            overlay(&mut target.keywords, scan.keywords);
            overlay(&mut target.output, scan.output);
        }
        if let Some(anonymize) = other.anonymize {
            let target = self.anonymize.get_or_insert_with(AnonymizeConfig::default);
            overlay(&mut target.authors, anonymize.authors);
        }
        if let Some(chart) = other.chart {
            let target = self.chart.get_or_insert_with(ChartConfig::default);
            overlay(&mut target.converter, chart.converter);
            overlay(&mut target.scale, chart.scale);
            overlay(&mut target.vl_version, chart.vl_version);
        }
    }

    /// Every setting filled with its built-in default
    pub fn defaults() -> Self {
        Self {
            scan: Some(ScanConfig {
                keywords: Some(DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect()),
                output: Some(PathBuf::from(DEFAULT_DESCRIPTIONS_FILE)),
            }),
            anonymize: Some(AnonymizeConfig {
                authors: Some(DEFAULT_AUTHORS.iter().map(ToString::to_string).collect()),
            }),
            chart: Some(ChartConfig {
                converter: Some(DEFAULT_CONVERTER.to_string()),
                scale: Some(1.0),
                vl_version: None,
            }),
        }
    }

    /// This config on top of the built-in defaults
    pub fn effective(&self) -> Self {
        let mut effective = Self::defaults();
        effective.apply(self.clone());
        effective
    }

    pub fn scan_keywords(&self) -> Vec<String> {
        self.scan
            .as_ref()
            .and_then(|s| s.keywords.clone())
            .unwrap_or_else(|| DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect())
    }

    pub fn descriptions_path(&self) -> PathBuf {
        self.scan
            .as_ref()
            .and_then(|s| s.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTIONS_FILE))
    }

    pub fn authors(&self) -> Vec<String> {
        self.anonymize
            .as_ref()
            .and_then(|a| a.authors.clone())
            .unwrap_or_else(|| DEFAULT_AUTHORS.iter().map(ToString::to_string).collect())
    }

    pub fn chart_converter(&self) -> String {
        self.chart
            .as_ref()
            .and_then(|c| c.converter.clone())
            .unwrap_or_else(|| DEFAULT_CONVERTER.to_string())
    }

    pub fn chart_scale(&self) -> f64 {
        self.chart.as_ref().and_then(|c| c.scale).unwrap_or(1.0)
    }

    pub fn vl_version(&self) -> Option<String> {
        self.chart.as_ref().and_then(|c| c.vl_version.clone())
    }
}

/// Commented template written by `jdh config init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# jdh configuration file

# Default settings for scan and prepare
[scan]
# Tag substrings that mark cells needing a source (case-sensitive)
# keywords = ["figure", "table", "cover"]

# Source description file
# output = "figure_cells.json"

# Default settings for anonymize
[anonymize]
# Author surnames, replaced by Author1, Author2, ... in this order
# authors = ["LeBlanc", "Wieringa"]

# Default settings for export-chart
[chart]
# Converter executable (https://github.com/vega/vl-convert)
# converter = "vl-convert"

# PNG resolution multiplier
# scale = 1.0

# Vega-Lite version
# vl_version = "5.16"
"#;
