//! Core types for the nmap report library
//!
//! This module defines the object model produced by parsing an nmap XML report.
//! Reports are immutable once parsed; consumers only read from them.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while loading reports
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("\"{}\" not a file or a directory.", .0.display())]
    InvalidInput(PathBuf),

    #[error("Failed to parse nmap XML: {0}")]
    XmlParseError(String),

    #[error("Failed to parse incomplete nmap XML: {0}")]
    IncompleteParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One parsed nmap XML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Base name of the file this report was loaded from
    pub source: String,
    /// Scanner name (normally "nmap")
    pub scanner: String,
    /// Full command line the scan was started with
    pub commandline: String,
    /// Scanner version
    pub version: String,
    /// Scan type from the first `<scaninfo>` element (e.g. "syn")
    pub scan_type: String,
    /// Scan start, Unix seconds
    pub started: i64,
    /// Scan end, Unix seconds (0 when the run never finished)
    pub endtime: i64,
    /// Elapsed seconds as reported by the scanner
    pub elapsed: Option<f64>,
    /// Run-finished summary line, if the scanner wrote one
    pub summary: Option<String>,
    pub hosts_total: u32,
    pub hosts_up: u32,
    pub hosts_down: u32,
    /// Hosts in document order
    pub hosts: Vec<Host>,
    /// True if the report was recovered with the lenient parser
    pub incomplete: bool,
}

impl ScanReport {
    /// Scan start as a UTC timestamp
    pub fn started_at(&self) -> Option<Timestamp> {
        DateTime::from_timestamp(self.started, 0)
    }

    /// Scan end as a UTC timestamp
    pub fn ended_at(&self) -> Option<Timestamp> {
        DateTime::from_timestamp(self.endtime, 0)
    }

    /// Total number of services across all hosts
    pub fn service_count(&self) -> usize {
        self.hosts.iter().map(|h| h.services.len()).sum()
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.summary {
            Some(summary) => write!(f, "{}", summary),
            None => write!(
                f,
                "{}: {} IP addresses ({} hosts up) scanned{}",
                if self.source.is_empty() { "nmap report" } else { self.source.as_str() },
                self.hosts_total,
                self.hosts_up,
                if self.incomplete { " (incomplete)" } else { "" }
            ),
        }
    }
}

/// Host reachability as reported by `<status state=...>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostStatus {
    Up,
    Down,
    #[default]
    Unknown,
}

impl HostStatus {
    pub fn from_state(state: &str) -> Self {
        match state {
            "up" => HostStatus::Up,
            "down" => HostStatus::Down,
            _ => HostStatus::Unknown,
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Up => write!(f, "up"),
            HostStatus::Down => write!(f, "down"),
            HostStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A scanned target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Host {
    /// Primary address (ipv4, then ipv6, then mac)
    pub address: String,
    pub status: HostStatus,
    /// Hostnames in document order (may be empty)
    pub hostnames: Vec<String>,
    /// Services in document order
    pub services: Vec<Service>,
    /// OS fingerprint matches in document order
    pub os_matches: Vec<OsMatch>,
}

impl Host {
    /// First hostname, or an empty string if the host has none
    pub fn display_hostname(&self) -> &str {
        self.hostnames.first().map(String::as_str).unwrap_or("")
    }

    /// All OS class guesses across every OS match, in document order
    pub fn os_class_probabilities(&self) -> impl Iterator<Item = &OsClass> + '_ {
        self.os_matches.iter().flat_map(|m| m.classes.iter())
    }

    pub fn is_up(&self) -> bool {
        self.status == HostStatus::Up
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_hostname() {
            "" => write!(f, "{} - {}", self.address, self.status),
            name => write!(f, "{} ({}) - {}", self.address, name, self.status),
        }
    }
}

/// An `<osmatch>` entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsMatch {
    pub name: String,
    pub accuracy: u8,
    pub classes: Vec<OsClass>,
}

/// An `<osclass>` guess
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsClass {
    pub vendor: String,
    pub osfamily: String,
    /// OS generation, empty if the scanner did not guess one
    pub osgen: String,
    /// Device type (e.g. "general purpose")
    pub os_type: String,
    /// Accuracy percentage, 0-100
    pub accuracy: u8,
}

impl fmt::Display for OsClass {
    /// `Vendor, Family(Gen)`, with the generation omitted when empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.vendor, self.osfamily)?;
        if !self.osgen.is_empty() {
            write!(f, "({})", self.osgen)?;
        }
        Ok(())
    }
}

/// A service detected on one host/port/protocol
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Service {
    pub port: u16,
    /// Transport protocol ("tcp", "udp", "sctp")
    pub protocol: String,
    /// Port state ("open", "closed", "filtered", ...)
    pub state: String,
    /// Why the state was chosen (e.g. "syn-ack")
    pub reason: String,
    /// Service name guess, empty if none
    pub service: String,
    /// Tunnel type ("ssl") or empty
    pub tunnel: String,
    pub detection: DetectionInfo,
}

/// Fingerprinting data from the `<service>` element
///
/// Every key is optional. The accessors fall back to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionInfo {
    pub method: Option<String>,
    /// Confidence on a 0-10 scale, as written by the scanner
    pub conf: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub extrainfo: Option<String>,
}

impl DetectionInfo {
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or("")
    }

    pub fn product(&self) -> &str {
        self.product.as_deref().unwrap_or("")
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    pub fn extrainfo(&self) -> &str {
        self.extrainfo.as_deref().unwrap_or("")
    }

    /// Confidence as a fraction (`conf / 10`), 0.0 when absent or not numeric
    pub fn confidence(&self) -> f64 {
        let Some(conf) = self.conf.as_deref() else {
            return 0.0;
        };
        match conf.trim().parse::<f64>() {
            Ok(value) => value / 10.0,
            Err(_) => {
                log::warn!("Ignoring non-numeric service confidence {:?}", conf);
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_class(osgen: &str) -> OsClass {
        OsClass {
            vendor: "Linux".to_string(),
            osfamily: "Linux".to_string(),
            osgen: osgen.to_string(),
            os_type: "general purpose".to_string(),
            accuracy: 95,
        }
    }

    #[test]
    fn test_confidence_scaling() {
        let info = DetectionInfo {
            conf: Some("7".to_string()),
            ..Default::default()
        };
        assert!((info.confidence() - 0.7).abs() < f64::EPSILON);
        assert_eq!(DetectionInfo::default().confidence(), 0.0);

        let bogus = DetectionInfo {
            conf: Some("high".to_string()),
            ..Default::default()
        };
        assert_eq!(bogus.confidence(), 0.0);
    }

    #[test]
    fn test_display_hostname() {
        let mut host = Host {
            address: "10.0.0.1".to_string(),
            status: HostStatus::Up,
            hostnames: vec!["a.example.com".to_string(), "b.example.com".to_string()],
            ..Default::default()
        };
        assert_eq!(host.display_hostname(), "a.example.com");
        assert_eq!(host.to_string(), "10.0.0.1 (a.example.com) - up");

        host.hostnames.clear();
        assert_eq!(host.display_hostname(), "");
        assert_eq!(host.to_string(), "10.0.0.1 - up");
    }

    #[test]
    fn test_os_class_display() {
        assert_eq!(os_class("3.X").to_string(), "Linux, Linux(3.X)");
        assert_eq!(os_class("").to_string(), "Linux, Linux");
    }

    #[test]
    fn test_os_class_probabilities_flatten_matches() {
        let host = Host {
            os_matches: vec![
                OsMatch {
                    name: "Linux 3.2 - 4.9".to_string(),
                    accuracy: 95,
                    classes: vec![os_class("3.X"), os_class("4.X")],
                },
                OsMatch {
                    name: "Linux 2.6.32".to_string(),
                    accuracy: 90,
                    classes: vec![os_class("2.6.X")],
                },
            ],
            ..Default::default()
        };
        let gens: Vec<&str> = host
            .os_class_probabilities()
            .map(|c| c.osgen.as_str())
            .collect();
        assert_eq!(gens, vec!["3.X", "4.X", "2.6.X"]);
    }

    #[test]
    fn test_host_status_from_state() {
        assert_eq!(HostStatus::from_state("up"), HostStatus::Up);
        assert_eq!(HostStatus::from_state("down"), HostStatus::Down);
        assert_eq!(HostStatus::from_state("skipped"), HostStatus::Unknown);
    }

    #[test]
    fn test_report_display_fallback() {
        let report = ScanReport {
            source: "scan.xml".to_string(),
            hosts_total: 4,
            hosts_up: 2,
            ..Default::default()
        };
        assert_eq!(report.to_string(), "scan.xml: 4 IP addresses (2 hosts up) scanned");

        let finished = ScanReport {
            summary: Some("Nmap done; 1 IP address (1 host up)".to_string()),
            ..report
        };
        assert_eq!(finished.to_string(), "Nmap done; 1 IP address (1 host up)");
    }
}
