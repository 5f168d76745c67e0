//! Configuration loading and parsing
//!
//! Everything here is optional; command-line arguments override the file.

use anyhow::{bail, Context, Result};
use nmap_report::LoaderConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub results: ResultsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// Report files or directories, used when `--reports` is not given
    #[serde(default)]
    pub reports: Vec<PathBuf>,
    /// `extension` and `lenient` keys
    #[serde(flatten)]
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    /// File name prefix for the timestamped default output
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsConfig {
    /// Choices offered in the "Flagged" dropdown
    #[serde(default = "default_flag_values")]
    pub flag_values: Vec<String>,
    /// Value every "Flagged" cell starts with
    #[serde(default = "default_flag")]
    pub flag_default: String,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            flag_values: default_flag_values(),
            flag_default: default_flag(),
        }
    }
}

fn default_prefix() -> String {
    "Report".to_string()
}

fn default_flag_values() -> Vec<String> {
    vec!["Y".to_string(), "N".to_string(), "N/A".to_string()]
}

fn default_flag() -> String {
    "N/A".to_string()
}

impl AppConfig {
    /// Loader settings derived from the `[input]` section
    pub fn loader_config(&self) -> LoaderConfig {
        let loader = &self.input.loader;
        loader.clone().with_extension(loader.extension.as_str())
    }

    fn validate(&self) -> Result<()> {
        let results = &self.results;
        if results.flag_values.is_empty() {
            bail!("results.flag_values must not be empty");
        }
        if !results.flag_values.contains(&results.flag_default) {
            bail!(
                "results.flag_default {:?} is not one of {:?}",
                results.flag_default,
                results.flag_values
            );
        }
        if self.output.prefix.is_empty() {
            bail!("output.prefix must not be empty");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
///
/// Relative report paths are taken relative to the config file's directory.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    if let Some(base) = path.parent() {
        for report in config.input.reports.iter_mut() {
            if report.is_relative() {
                *report = base.join(&*report);
            }
        }
    }

    Ok(config)
}
