//! nmap Report Library
//!
//! Loads nmap XML scan reports into a small, read-only object model.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on loading:
//! - Resolves report files from explicit paths or directories
//! - Parses each file strictly, falling back to a lenient parser for
//!   interrupted scans
//! - Tags every report with the file it came from
//!
//! The library does NOT:
//! - Write spreadsheets or any other output
//! - Merge or deduplicate hosts across reports
//!
//! Workbook generation lives in the application layer (nmap-xlsx).
//!
//! # Example Usage
//!
//! ```no_run
//! use nmap_report::{LoaderConfig, ReportLoader};
//! use std::path::PathBuf;
//!
//! let loader = ReportLoader::with_config(LoaderConfig::new().with_lenient_fallback(true));
//! let reports = loader.load_all(&[PathBuf::from("scans/")]).unwrap();
//!
//! for report in &reports {
//!     println!("{}: {} hosts", report.source, report.hosts.len());
//! }
//! ```

// Public modules
pub mod config;
pub mod loader;
pub mod parser;
pub mod types;

// Re-export main types for convenience
pub use config::LoaderConfig;
pub use loader::ReportLoader;
pub use parser::{IncompleteParser, ReportParser, StrictParser};
pub use types::{
    DetectionInfo, Host, HostStatus, OsClass, OsMatch, ReportError, Result, ScanReport, Service,
    Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
