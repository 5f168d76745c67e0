//! Report loader API
//!
//! This module provides the primary interface for the library. The
//! ReportLoader resolves input paths and turns each report file into a
//! [`ScanReport`] tagged with its source file name.

use crate::config::LoaderConfig;
use crate::parser::{IncompleteParser, ReportParser, StrictParser};
use crate::types::{ReportError, Result, ScanReport};
use std::path::{Path, PathBuf};

/// The main loader struct - entry point for reading reports
#[derive(Debug, Clone, Default)]
pub struct ReportLoader {
    config: LoaderConfig,
}

impl ReportLoader {
    /// Create a loader with default settings (`.xml`, lenient fallback on)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with explicit configuration
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Expand input paths into the list of report files to load
    ///
    /// Files must carry the report extension. Directories contribute their
    /// direct children with that extension, in listing order. Anything else
    /// is a usage error and nothing is returned.
    ///
    /// # Example
    /// ```no_run
    /// use nmap_report::ReportLoader;
    /// use std::path::PathBuf;
    ///
    /// let loader = ReportLoader::new();
    /// let files = loader.resolve_paths(&[PathBuf::from("scans/")]).unwrap();
    /// ```
    pub fn resolve_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() && self.config.matches_extension(path) {
                files.push(path.clone());
            } else if path.is_dir() {
                let before = files.len();
                for entry in std::fs::read_dir(path)? {
                    let child = entry?.path();
                    if child.is_file() && self.config.matches_extension(&child) {
                        files.push(child);
                    }
                }
                log::debug!(
                    "Found {} report(s) in directory {:?}",
                    files.len() - before,
                    path
                );
            } else {
                return Err(ReportError::InvalidInput(path.clone()));
            }
        }

        Ok(files)
    }

    /// Parse one report file
    ///
    /// A strict parse is tried first. If it fails and the lenient fallback is
    /// enabled, the file is re-read with [`IncompleteParser`]. A second failure
    /// is returned to the caller.
    pub fn load_file(&self, path: &Path) -> Result<ScanReport> {
        log::info!("Loading report: {:?}", path);

        let xml = match String::from_utf8(std::fs::read(path)?) {
            Ok(xml) => xml,
            // A scan cut off mid-write can end inside a multi-byte character
            Err(e) if self.config.lenient_fallback => {
                log::warn!("{:?} is not valid UTF-8, replacing the broken bytes", path);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
            Err(e) => {
                let e = std::io::Error::new(std::io::ErrorKind::InvalidData, e);
                return Err(e.into());
            }
        };

        let mut report = match StrictParser.parse(&xml) {
            Ok(report) => report,
            Err(e) if self.config.lenient_fallback => {
                log::warn!("{:?} is malformed ({}), retrying in incomplete mode", path, e);
                IncompleteParser.parse(&xml)?
            }
            Err(e) => return Err(e),
        };

        report.source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::info!(
            "Loaded {:?}: {} hosts, {} services",
            report.source,
            report.hosts.len(),
            report.service_count()
        );

        Ok(report)
    }

    /// Resolve paths and load every report, in argument order
    pub fn load_all(&self, paths: &[PathBuf]) -> Result<Vec<ScanReport>> {
        self.resolve_paths(paths)?
            .iter()
            .map(|file| self.load_file(file))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_creation() {
        let loader = ReportLoader::new();
        assert_eq!(loader.config().extension, "xml");
        assert!(loader.config().lenient_fallback);
    }

    #[test]
    fn test_missing_path_is_usage_error() {
        let loader = ReportLoader::new();
        let result = loader.resolve_paths(&[PathBuf::from("definitely/not/here.xml")]);
        assert!(matches!(result, Err(ReportError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = ReportLoader::new();
        let result = loader.load_file(Path::new("definitely/not/here.xml"));
        assert!(matches!(result, Err(ReportError::IoError(_))));
    }
}
