//! Spreadsheet format detection from content.
//!
//! Hosted "download" links routinely lie about the file type (generic
//! filenames, `application/octet-stream`), so the leading bytes decide and the
//! filename is only consulted when they are inconclusive.

use serde::Serialize;

/// ZIP local file header: modern OOXML workbooks.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE2 compound file header: legacy BIFF workbooks.
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Filename used when neither the response nor the URL names the file.
pub const DEFAULT_FILENAME: &str = "arquivo.xlsx";

/// Binary spreadsheet formats we can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    /// Zip-based Office Open XML workbook.
    Xlsx,
    /// Legacy OLE2/BIFF workbook.
    Xls,
}

impl SheetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    /// The decoder tried when this one fails.
    pub fn other(&self) -> Self {
        match self {
            Self::Xlsx => Self::Xls,
            Self::Xls => Self::Xlsx,
        }
    }
}

impl std::fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the format decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionBasis {
    ZipMagic,
    Ole2Magic,
    Extension,
    Default,
}

/// Decide the format of `content`, consulting `filename` only when the
/// magic number is unrecognized.
pub fn detect_format(content: &[u8], filename: Option<&str>) -> (SheetFormat, DetectionBasis) {
    if content.starts_with(ZIP_MAGIC) {
        return (SheetFormat::Xlsx, DetectionBasis::ZipMagic);
    }
    if content.starts_with(OLE2_MAGIC) {
        return (SheetFormat::Xls, DetectionBasis::Ole2Magic);
    }

    let lower = filename.unwrap_or_default().to_lowercase();
    if lower.ends_with(".xls") {
        (SheetFormat::Xls, DetectionBasis::Extension)
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xlsm") {
        (SheetFormat::Xlsx, DetectionBasis::Extension)
    } else {
        (SheetFormat::Xlsx, DetectionBasis::Default)
    }
}

/// Last path segment of `url`, ignoring query and fragment.
pub fn filename_from_url(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Filename hint: Content-Disposition, then URL, then [`DEFAULT_FILENAME`].
pub fn resolve_filename(content_disposition: Option<String>, url: &str) -> String {
    content_disposition
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
