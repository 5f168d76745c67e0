//! "Summary" sheet: one row per report

use super::{CellStyle, CellValue, Column, Formats, Sheet};
use anyhow::Result;
use nmap_report::{ScanReport, Timestamp};

pub type SummaryColumn = Column<fn(&ScanReport) -> CellValue>;

pub const COLUMNS: &[SummaryColumn] = &[
    Column {
        header: "Source",
        value: |r| r.source.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Command",
        value: |r| r.commandline.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Version",
        value: |r| r.version.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Scan Type",
        value: |r| r.scan_type.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Started",
        value: |r| format_timestamp(r.started_at()).into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Completed",
        value: |r| format_timestamp(r.ended_at()).into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Hosts Total",
        value: |r| r.hosts_total.into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Hosts Up",
        value: |r| r.hosts_up.into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Hosts Down",
        value: |r| r.hosts_down.into(),
        style: CellStyle::Plain,
    },
];

/// Write the header and this report's summary row
pub fn generate(formats: &Formats, sheet: &mut Sheet, report: &ScanReport) -> Result<()> {
    if !sheet.has_header() {
        sheet.write_header(COLUMNS, &formats.bold)?;
    }
    sheet.append_row(row_values(report), formats)?;
    Ok(())
}

pub fn row_values(report: &ScanReport) -> Vec<(CellValue, CellStyle)> {
    COLUMNS.iter().map(|c| ((c.value)(report), c.style)).collect()
}

/// `YYYY-MM-DD HH:MM:SS (UTC)`, empty for an out-of-range timestamp
fn format_timestamp(timestamp: Option<Timestamp>) -> String {
    timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S (UTC)").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportWorkbook;
    use std::path::PathBuf;

    fn report() -> ScanReport {
        ScanReport {
            source: "scan.xml".to_string(),
            commandline: "nmap -sS 10.0.0.0/24".to_string(),
            version: "7.94".to_string(),
            scan_type: "syn".to_string(),
            started: 1700000000,
            endtime: 1700000120,
            hosts_total: 256,
            hosts_up: 3,
            hosts_down: 253,
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_row_values() {
        let values: Vec<CellValue> = row_values(&report()).into_iter().map(|(v, _)| v).collect();

        assert_eq!(
            values,
            vec![
                CellValue::from("scan.xml"),
                CellValue::from("nmap -sS 10.0.0.0/24"),
                CellValue::from("7.94"),
                CellValue::from("syn"),
                CellValue::from("2023-11-14 22:13:20 (UTC)"),
                CellValue::from("2023-11-14 22:15:20 (UTC)"),
                CellValue::Number(256.0),
                CellValue::Number(3.0),
                CellValue::Number(253.0),
            ]
        );
    }

    #[test]
    fn test_one_row_per_report() {
        let workbook = ReportWorkbook::new(PathBuf::from("unused.xlsx"));
        let mut sheet = workbook.add_sheet("Summary").unwrap();

        for _ in 0..3 {
            generate(workbook.formats(), &mut sheet, &report()).unwrap();
        }
        assert_eq!(sheet.lastrow, 3);
    }

    #[test]
    fn test_headers() {
        let headers: Vec<&str> = COLUMNS.iter().map(|c| c.header).collect();
        assert_eq!(
            headers,
            vec![
                "Source", "Command", "Version", "Scan Type", "Started", "Completed",
                "Hosts Total", "Hosts Up", "Hosts Down"
            ]
        );
    }
}
