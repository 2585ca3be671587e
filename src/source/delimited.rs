//! Delimited-text row source (comma, tab, or semicolon separated).
//!
//! The first record is the header; the reader runs in flexible mode so ragged rows
//! are data, not decode errors. Rows shorter than the header are padded with empty
//! cells (trailing columns are missing), longer rows are truncated to header width.

use std::io::Cursor;

use bytes::Bytes;

use crate::error::IngestResult;

use super::{Delimiter, RowSource, Rows};

pub(super) fn open(payload: Bytes, delimiter: Delimiter) -> IngestResult<RowSource> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(Cursor::new(payload));

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let width = headers.len();

    Ok(RowSource {
        headers,
        rows: Rows::Delimited(DelimitedRows {
            records: reader.into_records(),
            width,
        }),
    })
}

/// Lazy record iterator normalizing every row to header width.
pub struct DelimitedRows {
    records: csv::StringRecordsIntoIter<Cursor<Bytes>>,
    width: usize,
}

impl Iterator for DelimitedRows {
    type Item = IngestResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let mut cells: Vec<String> = record
            .iter()
            .take(self.width)
            .map(str::to_owned)
            .collect();
        cells.resize(self.width, String::new());
        Some(Ok(cells))
    }
}
