//! Saving exported results to disk

use crate::api::ExtractionResult;
use crate::error::{Error, Result};
use crate::results::{canonical_fields, render};
use rust_xlsxwriter::{Format, Workbook};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const SHEET_NAME: &str = "Extracted Data";
const MAX_COLUMN_WIDTH: usize = 60;
/// Excel's hard limit on characters in one cell
pub const MAX_CELL_CHARS: usize = 32_767;
const TRUNCATED_MARKER: &str = " [truncated]";

/// Where an exported workbook came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    /// Blob produced by the backend for an unedited result set
    Server,
    /// Workbook written locally from the edited buffer
    EditedBuffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub source: ExportSource,
}

/// `extracted_data_<resultId>.xlsx`
pub fn export_file_name(result_id: &str) -> String {
    let safe: String = result_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("extracted_data_{}.xlsx", safe)
}

/// Save a server-produced spreadsheet blob into `dir`.
pub fn save_blob(dir: &Path, result_id: &str, bytes: &[u8]) -> Result<ExportedFile> {
    let path = dir.join(export_file_name(result_id));
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved exported results");
    Ok(ExportedFile {
        path,
        source: ExportSource::Server,
    })
}

/// Write the successful documents of `results` as a workbook in `dir`.
///
/// Layout: a `filename` column followed by the canonical fields, one row
/// per successful document; cells hold the single-line rendering.
pub fn write_workbook(
    dir: &Path,
    result_id: &str,
    results: &[ExtractionResult],
) -> Result<ExportedFile> {
    let rows: Vec<&ExtractionResult> = results.iter().filter(|r| r.is_success()).collect();
    if rows.is_empty() {
        return Err(Error::export("No successful results to export"));
    }

    let fields = canonical_fields(results);
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let headers: Vec<&str> = std::iter::once("filename")
        .chain(fields.iter().map(|f| f.name.as_str()))
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, column(col)?, *header, &header_format)?;
    }

    for (row_offset, result) in rows.iter().enumerate() {
        let row = u32::try_from(row_offset + 1)
            .map_err(|_| Error::export("Too many rows to export"))?;
        sheet.write_string(row, 0, fit_cell(&result.filename))?;
        widths[0] = widths[0].max(result.filename.chars().count());
        let Some(data) = result.fields() else {
            continue;
        };
        for (col, field) in fields.iter().enumerate() {
            if let Some(value) = data.get(&field.name).filter(|v| !v.is_null()) {
                let text = render(value).to_inline();
                widths[col + 1] = widths[col + 1].max(text.chars().count());
                sheet.write_string(row, column(col + 1)?, fit_cell(&text))?;
            }
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width).clamp(8, MAX_COLUMN_WIDTH) + 2;
        sheet.set_column_width(column(col)?, width as f64)?;
    }

    let path = dir.join(export_file_name(result_id));
    workbook.save(&path)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote edited results");
    Ok(ExportedFile {
        path,
        source: ExportSource::EditedBuffer,
    })
}

/// Clamp `text` to the cell limit, cutting on a char boundary and
/// ending with a marker.
fn fit_cell(text: &str) -> Cow<'_, str> {
    let keep = MAX_CELL_CHARS - TRUNCATED_MARKER.chars().count();
    match text.char_indices().nth(MAX_CELL_CHARS) {
        None => Cow::Borrowed(text),
        Some(_) => {
            let cut = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
            Cow::Owned(format!("{}{}", &text[..cut], TRUNCATED_MARKER))
        }
    }
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| Error::export("Too many columns to export"))
}
