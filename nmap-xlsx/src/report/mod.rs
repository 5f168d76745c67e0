//! Workbook generation
//!
//! Builds the three sheets of the triage workbook. Sheets are generated in a
//! fixed order; within a sheet, reports are appended in input order.

pub mod hosts;
pub mod results;
pub mod summary;
pub mod workbook;

pub use workbook::{
    resolve_output_path, CellStyle, CellValue, Column, Formats, ReportWorkbook, Sheet,
};

use crate::config::ResultsConfig;
use anyhow::{Context, Result};
use nmap_report::ScanReport;
use std::fmt;

/// The sheets of the workbook, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Summary,
    Hosts,
    Results,
}

impl SheetKind {
    pub const ALL: [SheetKind; 3] = [SheetKind::Summary, SheetKind::Hosts, SheetKind::Results];

    pub fn name(&self) -> &'static str {
        match self {
            SheetKind::Summary => "Summary",
            SheetKind::Hosts => "Hosts",
            SheetKind::Results => "Results",
        }
    }

    /// Append one report's rows to a sheet of this kind
    pub fn generate(
        &self,
        formats: &Formats,
        sheet: &mut Sheet,
        report: &ScanReport,
        results_config: &ResultsConfig,
    ) -> Result<()> {
        match self {
            SheetKind::Summary => summary::generate(formats, sheet, report),
            SheetKind::Hosts => hosts::generate(formats, sheet, report),
            SheetKind::Results => results::generate(formats, sheet, report, results_config),
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Populate every sheet from `reports` (outer loop: sheet, inner loop: report)
pub fn write_sheets(
    workbook: &mut ReportWorkbook,
    reports: &[ScanReport],
    results_config: &ResultsConfig,
) -> Result<()> {
    for kind in SheetKind::ALL {
        let mut sheet = workbook
            .add_sheet(kind.name())
            .with_context(|| format!("Failed to create sheet {}", kind))?;

        for report in reports {
            kind.generate(workbook.formats(), &mut sheet, report, results_config)
                .with_context(|| format!("Failed to write {} rows for {}", kind, report.source))?;
        }

        log::info!("Sheet {}: {} rows", kind, sheet.lastrow);
        workbook.push_sheet(sheet);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmap_report::{Host, HostStatus, Service};

    fn report(source: &str, services_per_host: &[usize]) -> ScanReport {
        let hosts: Vec<Host> = services_per_host
            .iter()
            .enumerate()
            .map(|(i, &count)| Host {
                address: format!("10.0.0.{}", i + 1),
                status: HostStatus::Up,
                services: (0..count)
                    .map(|p| Service {
                        port: 1000 + p as u16,
                        protocol: "tcp".to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
            .collect();

        ScanReport {
            source: source.to_string(),
            hosts_total: hosts.len() as u32,
            hosts,
            ..Default::default()
        }
    }

    #[test]
    fn test_sheet_order_and_names() {
        let names: Vec<&str> = SheetKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["Summary", "Hosts", "Results"]);
    }

    #[test]
    fn test_row_counts_per_sheet() {
        let reports = vec![report("a.xml", &[2, 0, 3]), report("b.xml", &[1])];
        let config = ResultsConfig::default();
        let workbook = ReportWorkbook::new("unused.xlsx".into());

        let mut counts = Vec::new();
        for kind in SheetKind::ALL {
            let mut sheet = workbook.add_sheet(kind.name()).unwrap();
            for report in &reports {
                kind.generate(workbook.formats(), &mut sheet, report, &config).unwrap();
            }
            counts.push(sheet.lastrow);
        }

        // Summary: one per report, Hosts: sum of hosts, Results: sum of services
        assert_eq!(counts, vec![2, 4, 6]);
    }

    #[test]
    fn test_write_sheets_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.xlsx");
        let reports = vec![report("a.xml", &[1, 2])];

        let mut workbook = ReportWorkbook::new(path.clone());
        write_sheets(&mut workbook, &reports, &ResultsConfig::default()).unwrap();
        assert!(!path.exists());

        workbook.close().unwrap();
        assert!(path.exists());
    }
}
