//! Row sources: format-routed access to headers plus a lazy row sequence.
//!
//! A [`RowSource`] turns a buffered byte payload tagged with a declared media type
//! into an ordered header list and an iterator of rows (cell strings, positionally
//! aligned to the header). Sources are format-pure: they do no type inference and
//! no persistence.
//!
//! [`RowSource::open`] is cheaply repeatable: it reads only the buffered payload,
//! never a live transport, so the bounded inference sample and the full load each
//! open their own instance. Callers that cannot re-read the transport buffer the
//! payload once ([`bytes::Bytes`]) and feed both passes from that buffer.

pub mod delimited;
pub mod spreadsheet;

use bytes::Bytes;

use crate::error::{IngestError, IngestResult};

/// Field separator for a delimited-text source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Semicolon,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
            Self::Semicolon => b';',
        }
    }
}

/// Container format for a spreadsheet source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookKind {
    /// Legacy binary workbook.
    Xls,
    /// Office Open XML workbook.
    Xlsx,
    /// OpenDocument spreadsheet.
    Ods,
}

/// Row-source variant selected by the format router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited(Delimiter),
    Workbook(WorkbookKind),
}

impl SourceFormat {
    /// Route a declared media type to a source variant.
    ///
    /// Matching is by prefix, so content-type parameters (`; charset=...`) are
    /// tolerated. Unrecognized or empty types fail closed with
    /// [`IngestError::FormatUnsupported`]; no row source is constructed for them.
    pub fn from_media_type(media_type: &str) -> IngestResult<Self> {
        if media_type.starts_with("text/comma-separated-values") {
            Ok(Self::Delimited(Delimiter::Comma))
        } else if media_type.starts_with("text/tab-separated-values") {
            Ok(Self::Delimited(Delimiter::Tab))
        } else if media_type.starts_with("text/semicolon-separated-values") {
            Ok(Self::Delimited(Delimiter::Semicolon))
        } else if media_type.starts_with("application/xlsx") {
            Ok(Self::Workbook(WorkbookKind::Xlsx))
        } else if media_type.starts_with("application/xls") {
            Ok(Self::Workbook(WorkbookKind::Xls))
        } else if media_type.starts_with("application/ods") {
            Ok(Self::Workbook(WorkbookKind::Ods))
        } else {
            Err(IngestError::FormatUnsupported {
                media_type: media_type.to_owned(),
            })
        }
    }
}

/// Headers plus a lazy row sequence for one container format.
pub struct RowSource {
    headers: Vec<String>,
    rows: Rows,
}

impl RowSource {
    /// Open a row source over a buffered payload using the routed format.
    pub fn open(payload: Bytes, format: SourceFormat) -> IngestResult<Self> {
        match format {
            SourceFormat::Delimited(delimiter) => delimited::open(payload, delimiter),
            SourceFormat::Workbook(kind) => spreadsheet::open(payload, kind),
        }
    }

    /// Header names in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Consume the source, yielding its data-row iterator.
    pub fn into_rows(self) -> Rows {
        self.rows
    }

    /// Read at most `limit` rows, returning headers plus the materialized sample.
    pub fn sample(self, limit: usize) -> IngestResult<(Vec<String>, Vec<Vec<String>>)> {
        let Self { headers, rows } = self;
        let mut sample = Vec::new();
        for row in rows.take(limit) {
            sample.push(row?);
        }
        Ok((headers, sample))
    }
}

/// Iterator over data rows; every row is normalized to header width (short rows are
/// padded with empty cells, long rows truncated).
pub enum Rows {
    /// Lazily decoded delimited-text records.
    Delimited(delimited::DelimitedRows),
    /// Rows extracted eagerly from a spreadsheet range (also used by tests).
    Buffered(std::vec::IntoIter<Vec<String>>),
}

impl Rows {
    /// An in-memory row sequence.
    pub fn buffered(records: Vec<Vec<String>>) -> Self {
        Self::Buffered(records.into_iter())
    }
}

impl Iterator for Rows {
    type Item = IngestResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Delimited(rows) => rows.next(),
            Self::Buffered(rows) => rows.next().map(Ok),
        }
    }
}
