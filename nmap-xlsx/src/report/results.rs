//! "Results" sheet: one row per (host, service) for manual triage
//!
//! The last two columns are left for the analyst: "Flagged" gets a dropdown
//! validation seeded with a default value, "Notes" starts empty.

use super::{CellStyle, CellValue, Column, Formats, Sheet};
use crate::config::ResultsConfig;
use anyhow::Result;
use nmap_report::{Host, ScanReport, Service};
use rust_xlsxwriter::ColNum;

/// What each results row is extracted from
pub struct ResultRow<'a> {
    pub host: &'a Host,
    pub service: &'a Service,
    pub flag_default: &'a str,
}

pub type ResultColumn = Column<for<'a> fn(&ResultRow<'a>) -> CellValue>;

pub const COLUMNS: &[ResultColumn] = &[
    Column {
        header: "Host",
        value: |r| r.host.display_hostname().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "IP",
        value: |r| r.host.address.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Port",
        value: |r| r.service.port.into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Protocol",
        value: |r| r.service.protocol.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Status",
        value: |r| r.service.state.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Service",
        value: |r| r.service.service.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Tunnel",
        value: |r| r.service.tunnel.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Method",
        value: |r| r.service.detection.method().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Confidence",
        value: |r| r.service.detection.confidence().into(),
        style: CellStyle::Percent,
    },
    Column {
        header: "Reason",
        value: |r| r.service.reason.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Product",
        value: |r| r.service.detection.product().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Version",
        value: |r| r.service.detection.version().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Extra",
        value: |r| r.service.detection.extrainfo().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Flagged",
        value: |r| r.flag_default.into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Notes",
        value: |_| "".into(),
        style: CellStyle::Plain,
    },
];

/// Column N: the triage dropdown
pub const FLAGGED_COL: ColNum = 13;

/// Write the header and one row per service of every host in `report`
pub fn generate(
    formats: &Formats,
    sheet: &mut Sheet,
    report: &ScanReport,
    config: &ResultsConfig,
) -> Result<()> {
    if !sheet.has_header() {
        // Notes stays outside the filter range
        sheet.autofilter(FLAGGED_COL)?;
        sheet.freeze_header()?;
        sheet.add_list_validation(FLAGGED_COL, &config.flag_values)?;
        sheet.write_header(COLUMNS, &formats.bold)?;
    }

    println!("[+] Processing {}", report);
    for host in &report.hosts {
        println!("[+] Processing {}", host);
        for service in &host.services {
            let row = ResultRow {
                host,
                service,
                flag_default: &config.flag_default,
            };
            sheet.append_row(row_values(&row), formats)?;
        }
    }
    Ok(())
}

pub fn row_values(row: &ResultRow<'_>) -> Vec<(CellValue, CellStyle)> {
    COLUMNS.iter().map(|c| ((c.value)(row), c.style)).collect()
}
