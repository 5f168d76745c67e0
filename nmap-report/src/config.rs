//! Loader configuration types
//!
//! This module defines the small amount of configuration the report loader needs.
//! Everything about the output workbook lives in the application layer.

use serde::Deserialize;

/// Configuration for the report loader
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoaderConfig {
    /// File extension (without the dot) that marks a report file
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Retry with the incomplete parser when the strict parse fails
    #[serde(default = "default_true", alias = "lenient")]
    pub lenient_fallback: bool,
}

fn default_extension() -> String {
    "xml".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            lenient_fallback: true,
        }
    }
}

impl LoaderConfig {
    /// Create a new loader configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the report file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Builder method: enable or disable the lenient fallback parse
    pub fn with_lenient_fallback(mut self, enabled: bool) -> Self {
        self.lenient_fallback = enabled;
        self
    }

    /// Check if a file name carries the report extension
    pub fn matches_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_loader_config_builder() {
        let config = LoaderConfig::new()
            .with_extension(".nmap")
            .with_lenient_fallback(false);

        assert_eq!(config.extension, "nmap");
        assert!(!config.lenient_fallback);
    }

    #[test]
    fn test_extension_matching() {
        let config = LoaderConfig::new();

        assert!(config.matches_extension(Path::new("scans/a.xml")));
        assert!(!config.matches_extension(Path::new("scans/notes.txt")));
        assert!(!config.matches_extension(Path::new("scans/xml")));
    }
}
