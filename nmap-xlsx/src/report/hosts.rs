//! "Hosts" sheet: one row per host

use super::{CellStyle, CellValue, Column, Formats, Sheet};
use anyhow::Result;
use nmap_report::{Host, ScanReport};
use rust_xlsxwriter::ColNum;

pub type HostColumn = Column<fn(&Host) -> CellValue>;

pub const COLUMNS: &[HostColumn] = &[
    Column {
        header: "Host",
        value: |h| h.display_hostname().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "IP",
        value: |h| h.address.as_str().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Status",
        value: |h| h.status.to_string().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "Services",
        value: |h| h.services.len().into(),
        style: CellStyle::Plain,
    },
    Column {
        header: "OS",
        value: |h| os_class_string(h).into(),
        style: CellStyle::Plain,
    },
];

/// Write the header and one row per host of `report`
pub fn generate(formats: &Formats, sheet: &mut Sheet, report: &ScanReport) -> Result<()> {
    if !sheet.has_header() {
        sheet.autofilter((COLUMNS.len() - 1) as ColNum)?;
        sheet.freeze_header()?;
        sheet.write_header(COLUMNS, &formats.bold)?;
    }

    for host in &report.hosts {
        sheet.append_row(row_values(host), formats)?;
    }
    Ok(())
}

pub fn row_values(host: &Host) -> Vec<(CellValue, CellStyle)> {
    COLUMNS.iter().map(|c| ((c.value)(host), c.style)).collect()
}

/// Every OS class guess as `Vendor, Family(Gen) (NN%)`, joined with ` | `
pub fn os_class_string(host: &Host) -> String {
    host.os_class_probabilities()
        .map(|class| format!("{} ({}%)", class, class.accuracy))
        .collect::<Vec<_>>()
        .join(" | ")
}
