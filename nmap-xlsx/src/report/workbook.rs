//! XLSX workbook writer
//!
//! Wraps rust_xlsxwriter with the pieces the sheet generators share: the
//! bold/percent formats, a per-sheet row cursor, and header/row helpers
//! driven by column tables.

use chrono::{DateTime, Local};
use rust_xlsxwriter::{ColNum, DataValidation, Format, RowNum, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

/// Last row index of an XLSX worksheet (1,048,576 rows)
pub const MAX_ROW: RowNum = 1_048_575;

const XLSX_EXTENSION: &str = ".xlsx";

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value.into())
    }
}

impl From<u16> for CellValue {
    fn from(value: u16) -> Self {
        CellValue::Number(value.into())
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Which shared format a data cell uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Plain,
    Percent,
}

/// One column of a sheet: header text, value extractor, and cell style
///
/// `F` is the extractor's fn-pointer type, e.g. `fn(&Host) -> CellValue`.
/// The same table writes the header row and every data row.
pub struct Column<F> {
    pub header: &'static str,
    pub value: F,
    pub style: CellStyle,
}

/// Formats registered once per workbook
#[derive(Debug, Clone)]
pub struct Formats {
    pub bold: Format,
    pub percent: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            bold: Format::new().set_bold(),
            percent: Format::new().set_num_format("0%"),
        }
    }

    pub fn for_style(&self, style: CellStyle) -> Option<&Format> {
        match style {
            CellStyle::Plain => None,
            CellStyle::Percent => Some(&self.percent),
        }
    }
}

/// A named worksheet plus its row cursor
///
/// `lastrow` is the index of the last row written. Row 0 is the header, so
/// after generation it also equals the number of data rows.
pub struct Sheet {
    name: String,
    worksheet: Worksheet,
    has_header: bool,
    pub lastrow: RowNum,
}

impl Sheet {
    fn new(name: &str) -> Result<Self, XlsxError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name)?;
        Ok(Self {
            name: name.to_string(),
            worksheet,
            has_header: false,
            lastrow: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once a header row has been written
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Write a single cell, with an optional format
    pub fn write_cell(
        &mut self,
        row: RowNum,
        col: ColNum,
        value: &CellValue,
        format: Option<&Format>,
    ) -> Result<(), XlsxError> {
        match (value, format) {
            (CellValue::Text(text), Some(format)) => {
                self.worksheet.write_string_with_format(row, col, text, format)?;
            }
            (CellValue::Text(text), None) => {
                self.worksheet.write_string(row, col, text)?;
            }
            (CellValue::Number(number), Some(format)) => {
                self.worksheet.write_number_with_format(row, col, *number, format)?;
            }
            (CellValue::Number(number), None) => {
                self.worksheet.write_number(row, col, *number)?;
            }
        }
        Ok(())
    }

    /// Write the column headers in bold on row 0
    pub fn write_header<F>(
        &mut self,
        columns: &[Column<F>],
        bold: &Format,
    ) -> Result<(), XlsxError> {
        for (col, column) in columns.iter().enumerate() {
            self.write_cell(0, col as ColNum, &CellValue::from(column.header), Some(bold))?;
        }
        self.has_header = true;
        Ok(())
    }

    /// Write one data row below `lastrow` and advance the cursor
    pub fn append_row<I>(&mut self, cells: I, formats: &Formats) -> Result<(), XlsxError>
    where
        I: IntoIterator<Item = (CellValue, CellStyle)>,
    {
        let row = self.lastrow + 1;
        for (col, (value, style)) in cells.into_iter().enumerate() {
            self.write_cell(row, col as ColNum, &value, formats.for_style(style))?;
        }
        self.lastrow = row;
        Ok(())
    }

    /// Autofilter over the header row, columns `0..=last_col`
    pub fn autofilter(&mut self, last_col: ColNum) -> Result<(), XlsxError> {
        self.worksheet.autofilter(0, 0, 0, last_col)?;
        Ok(())
    }

    /// Keep the header row visible while scrolling
    pub fn freeze_header(&mut self) -> Result<(), XlsxError> {
        self.worksheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    /// Dropdown list on `col`, from the first data row to the last sheet row
    pub fn add_list_validation(&mut self, col: ColNum, values: &[String]) -> Result<(), XlsxError> {
        let validation = DataValidation::new().allow_list_strings(values)?;
        self.worksheet.add_data_validation(1, col, MAX_ROW, col, &validation)?;
        Ok(())
    }
}

/// The output workbook
///
/// Nothing is written to disk until [`ReportWorkbook::close`].
pub struct ReportWorkbook {
    workbook: Workbook,
    path: PathBuf,
    formats: Formats,
}

impl ReportWorkbook {
    pub fn new(path: PathBuf) -> Self {
        Self {
            workbook: Workbook::new(),
            path,
            formats: Formats::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn formats(&self) -> &Formats {
        &self.formats
    }

    /// Create a named sheet; it joins the workbook via [`Self::push_sheet`]
    pub fn add_sheet(&self, name: &str) -> Result<Sheet, XlsxError> {
        Sheet::new(name)
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        log::debug!("Adding sheet {:?} with {} data rows", sheet.name(), sheet.lastrow);
        self.workbook.push_worksheet(sheet.worksheet);
    }

    /// Save the workbook to disk and return its path
    pub fn close(mut self) -> Result<PathBuf, XlsxError> {
        self.workbook.save(&self.path)?;
        log::info!("Workbook saved: {:?}", self.path);
        Ok(self.path)
    }
}

/// Output path: the explicit one, or `<prefix>_YYYYMMDD_HHMMSS`, always ending in `.xlsx`
pub fn resolve_output_path(explicit: Option<&Path>, prefix: &str, now: DateTime<Local>) -> PathBuf {
    let mut path = match explicit {
        Some(path) => path.as_os_str().to_os_string(),
        None => format!("{}_{}", prefix, now.format("%Y%m%d_%H%M%S")).into(),
    };

    if !path.to_string_lossy().ends_with(XLSX_EXTENSION) {
        path.push(XLSX_EXTENSION);
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
    }

    #[test]
    fn test_default_output_path() {
        let path = resolve_output_path(None, "Report", fixed_now());
        assert_eq!(path, PathBuf::from("Report_20240309_070502.xlsx"));

        let name = resolve_output_path(None, "Report", Local::now());
        let name = name.to_string_lossy();
        assert!(name.starts_with("Report_"));
        assert!(name.ends_with(".xlsx"));
        let stamp = &name["Report_".len()..name.len() - ".xlsx".len()];
        assert_eq!(stamp.len(), 15);
        assert!(stamp
            .chars()
            .enumerate()
            .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() }));
    }

    #[test]
    fn test_explicit_output_path_gets_extension() {
        assert_eq!(
            resolve_output_path(Some(Path::new("foo")), "Report", fixed_now()),
            PathBuf::from("foo.xlsx")
        );
        assert_eq!(
            resolve_output_path(Some(Path::new("foo.xlsx")), "Report", fixed_now()),
            PathBuf::from("foo.xlsx")
        );
        assert_eq!(
            resolve_output_path(Some(Path::new("out/scan.v2")), "Report", fixed_now()),
            PathBuf::from("out/scan.v2.xlsx")
        );
    }

    #[test]
    fn test_append_row_advances_cursor() {
        let workbook = ReportWorkbook::new(PathBuf::from("unused.xlsx"));
        let mut sheet = workbook.add_sheet("Data").unwrap();
        assert_eq!(sheet.lastrow, 0);

        let columns = [Column {
            header: "Value",
            value: (),
            style: CellStyle::Plain,
        }];
        assert!(!sheet.has_header());
        sheet.write_header(&columns, &workbook.formats().bold).unwrap();
        assert!(sheet.has_header());
        assert_eq!(sheet.lastrow, 0);

        for n in 0..3u32 {
            sheet
                .append_row([(CellValue::from(n), CellStyle::Plain)], workbook.formats())
                .unwrap();
        }
        assert_eq!(sheet.lastrow, 3);
        assert_eq!(sheet.name(), "Data");
    }

    #[test]
    fn test_invalid_sheet_name_is_rejected() {
        let workbook = ReportWorkbook::new(PathBuf::from("unused.xlsx"));
        assert!(workbook.add_sheet("bad[name]").is_err());
    }

    #[test]
    fn test_close_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut workbook = ReportWorkbook::new(path.clone());
        let mut sheet = workbook.add_sheet("Results").unwrap();
        sheet.freeze_header().unwrap();
        sheet.autofilter(2).unwrap();
        sheet
            .add_list_validation(1, &["Y".to_string(), "N".to_string()])
            .unwrap();
        workbook.push_sheet(sheet);

        assert!(!path.exists());
        let written = workbook.close().unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
    }
}
