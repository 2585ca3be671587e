//! Spreadsheet row sources: xls/xlsx binary containers and OpenDocument, sharing
//! one row-extraction strategy over calamine ranges.
//!
//! Only the first sheet of a workbook is read. The first row supplies the headers,
//! captured as literal strings through the same cell coercion used for data cells.
//! Extraction stops at the first fully-empty row; a row counts as present when any
//! of its cells is non-empty.

use std::io::Cursor;

use bytes::Bytes;
use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};

use crate::error::{IngestError, IngestResult};

use super::{RowSource, Rows, WorkbookKind};

pub(super) fn open(payload: Bytes, kind: WorkbookKind) -> IngestResult<RowSource> {
    let cursor = Cursor::new(payload);
    let range = match kind {
        WorkbookKind::Xls => {
            first_sheet_range(Xls::new(cursor).map_err(calamine::Error::from)?)?
        }
        WorkbookKind::Xlsx => {
            first_sheet_range(Xlsx::new(cursor).map_err(calamine::Error::from)?)?
        }
        WorkbookKind::Ods => {
            first_sheet_range(Ods::new(cursor).map_err(calamine::Error::from)?)?
        }
    };
    Ok(extract(&range))
}

fn first_sheet_range<R>(mut workbook: R) -> IngestResult<Range<Data>>
where
    R: Reader<Cursor<Bytes>>,
    calamine::Error: From<R::Error>,
{
    let sheets = workbook.sheet_names();
    let first = sheets
        .first()
        .ok_or_else(|| IngestError::SourceRead {
            message: "workbook has no sheets".to_string(),
        })?
        .clone();
    workbook
        .worksheet_range(&first)
        .map_err(|e| IngestError::Spreadsheet(calamine::Error::from(e)))
}

fn extract(range: &Range<Data>) -> RowSource {
    let mut sheet_rows = range.rows();

    let headers: Vec<String> = match sheet_rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };
    let width = headers.len();

    let mut records: Vec<Vec<String>> = Vec::new();
    for row in sheet_rows {
        // Structural scan limit: the first fully-empty row ends the data.
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            break;
        }
        let mut cells: Vec<String> = row.iter().take(width).map(cell_to_string).collect();
        cells.resize(width, String::new());
        records.push(cells);
    }

    RowSource {
        headers,
        rows: Rows::buffered(records),
    }
}

/// Coerce any cell to its literal string form.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_string(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => float_to_string(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

/// Numeric cells with no fractional part render as integer-looking literals.
fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}
