//! Workbook decoding via calamine.

use std::io::{Cursor, Read, Seek};
use std::panic::{catch_unwind, AssertUnwindSafe};

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};
use thiserror::Error;

use super::format::SheetFormat;
use crate::models::{Cell, Table};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read xlsx: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("failed to read xls: {0}")]
    Xls(#[from] calamine::XlsError),
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("decoder panicked: {0}")]
    Panicked(String),
    #[error("{primary}; fallback {fallback}")]
    BothFailed {
        primary: Box<DecodeError>,
        fallback: Box<DecodeError>,
    },
}

/// A successfully decoded first worksheet.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub table: Table,
    /// Decoder that produced the table.
    pub format: SheetFormat,
    /// True when the preferred decoder failed and the other one succeeded.
    pub fell_back: bool,
}

/// Decode the first worksheet of `content` as `format`.
pub fn decode_table(content: &[u8], format: SheetFormat) -> Result<Table, DecodeError> {
    // calamine has panicked on malformed workbooks before; keep that contained
    let result = catch_unwind(AssertUnwindSafe(|| -> Result<Table, DecodeError> {
        match format {
            SheetFormat::Xlsx => {
                let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(content))?;
                first_sheet(&mut workbook)
            }
            SheetFormat::Xls => {
                let mut workbook: Xls<_> = Xls::new(Cursor::new(content))?;
                first_sheet(&mut workbook)
            }
        }
    }));

    result.unwrap_or_else(|payload| Err(DecodeError::Panicked(panic_message(payload.as_ref()))))
}

/// Decode with `preferred`, retrying once with the other decoder.
pub fn decode_with_fallback(content: &[u8], preferred: SheetFormat) -> Result<Decoded, DecodeError> {
    let primary = match decode_table(content, preferred) {
        Ok(table) => {
            return Ok(Decoded {
                table,
                format: preferred,
                fell_back: false,
            })
        }
        Err(e) => e,
    };

    let fallback = preferred.other();
    tracing::debug!("{} decoder failed ({}), trying {}", preferred, primary, fallback);

    match decode_table(content, fallback) {
        Ok(table) => Ok(Decoded {
            table,
            format: fallback,
            fell_back: true,
        }),
        Err(e) => Err(DecodeError::BothFailed {
            primary: Box::new(primary),
            fallback: Box::new(e),
        }),
    }
}

fn first_sheet<RS, R>(workbook: &mut R) -> Result<Table, DecodeError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    DecodeError: From<R::Error>,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoWorksheet)??;
    Ok(range_to_table(&range))
}

/// First row is the header, the rest are data rows.
fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };
    let header = header.iter().map(to_cell).collect();
    let data = rows.map(|row| row.iter().map(to_cell).collect()).collect();
    Table::from_header_and_rows(header, data)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => data
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(data.to_string())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
