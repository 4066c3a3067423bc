//! Client-side upload validation
//!
//! Advisory checks run before any network call; the server stays
//! authoritative.

use crate::error::{Error, Result};
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// A local file selected for upload
#[derive(Debug, Clone, PartialEq)]
pub struct PdfUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk and sniff its MIME type.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let mime_type = sniff_mime(&file_name, &bytes).to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// `application/pdf` only for a `.pdf` name whose payload carries the PDF header.
pub fn sniff_mime(file_name: &str, bytes: &[u8]) -> &'static str {
    let has_pdf_extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if has_pdf_extension && bytes.starts_with(b"%PDF") {
        PDF_MIME
    } else {
        "application/octet-stream"
    }
}

/// Validate one file. Empty = valid.
pub fn validate_file(file: &PdfUpload) -> Vec<String> {
    let mut errors = Vec::new();

    if file.mime_type != PDF_MIME {
        errors.push("Only PDF files are allowed".to_string());
    }

    if file.size() > MAX_UPLOAD_BYTES {
        errors.push("File size must be less than 16MB".to_string());
    }

    errors
}

/// Validate a selection: exactly one acceptable PDF.
///
/// Each rejected file is reported as `"<name>: reason, reason"`.
pub fn validate_selection(files: &[PdfUpload]) -> Result<&PdfUpload> {
    let Some((first, extra)) = files.split_first() else {
        return Err(Error::validation(["Please select a file"]));
    };

    let mut rejections = Vec::new();

    let first_errors = validate_file(first);
    if !first_errors.is_empty() {
        rejections.push(format!("{}: {}", first.file_name, first_errors.join(", ")));
    }

    for file in extra {
        let mut reasons = vec!["Too many files".to_string()];
        reasons.extend(validate_file(file));
        rejections.push(format!("{}: {}", file.file_name, reasons.join(", ")));
    }

    if rejections.is_empty() {
        Ok(first)
    } else {
        Err(Error::Validation { errors: rejections })
    }
}

/// Human-readable size, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
