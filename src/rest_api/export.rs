//! # Spreadsheet Export
//!
//! Builds the `.xlsx` workbook served by the download endpoint.

use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::db::ArkRecord;

use super::errors::{RestError, RestResult};

/// File name offered to the browser
pub const EXPORT_FILENAME: &str = "ark_data.xlsx";

/// MIME type of an Office Open XML workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Name of the single worksheet
pub const SHEET_NAME: &str = "Sheet";

/// Header row, in column order
pub const EXPORT_HEADERS: [&str; 5] = ["ARK", "Original Identifier", "Project", "URL", "Path"];

/// Cells written for one record, in `EXPORT_HEADERS` order.
/// `valid` and `validation_date` are not exported.
pub fn export_row(record: &ArkRecord) -> [Option<&str>; 5] {
    [
        Some(record.ark.as_str()),
        record.original_identifier.as_deref(),
        record.project.as_deref(),
        record.url.as_deref(),
        record.path.as_deref(),
    ]
}

/// `Content-Disposition` value for the download
pub fn content_disposition() -> String {
    format!("attachment; filename=\"{}\"", EXPORT_FILENAME)
}

/// Write the header row and one row per record; return the workbook bytes.
/// NULL fields are left as empty cells.
pub fn build_workbook(records: &[ArkRecord]) -> RestResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = u32::try_from(index + 1)
            .map_err(|_| RestError::Export(format!("too many rows: {}", records.len())))?;
        for (col, cell) in export_row(record).into_iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    debug!("Built workbook: {} rows, {} bytes", records.len(), buffer.len());
    Ok(buffer)
}
