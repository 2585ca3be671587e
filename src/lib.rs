//! `tabimport` points at a remote tabular data file (delimited text, Excel
//! workbook, or OpenDocument spreadsheet), discovers its structure, and loads its
//! rows into a PostgreSQL table for downstream visualization.
//!
//! The pipeline:
//!
//! 1. [`fetch`]: download and buffer the remote payload with its declared media type
//! 2. [`source`]: route the media type to a row source ([`source::SourceFormat`])
//!    and read headers plus a lazy row sequence
//! 3. [`inference`]: infer one [`types::ColumnType`] per column from a bounded
//!    sample (at most [`inference::SAMPLE_ROW_LIMIT`] rows)
//! 4. [`loader`]: re-read the full sequence, convert cells to
//!    [`types::CellValue`]s under the inferred schema, and submit fixed-size
//!    batches to a [`loader::RowSink`]
//! 5. [`superset`]: register the destination table with the visualization service
//!
//! [`server`] exposes the preview/confirm/import flow over HTTP and [`import`]
//! orchestrates the background full load; [`dataset`] tracks per-import state.
//!
//! ## Example: infer a schema from a delimited payload
//!
//! ```rust
//! use bytes::Bytes;
//! use tabimport::inference::{SAMPLE_ROW_LIMIT, infer_columns};
//! use tabimport::source::{RowSource, SourceFormat};
//! use tabimport::types::{ColumnType, TypeTable};
//!
//! # fn main() -> Result<(), tabimport::IngestError> {
//! let payload =
//!     Bytes::from_static(b"id,active,when\n1,true,2021-01-01\n2,false,2021-01-02\n");
//! let format = SourceFormat::from_media_type("text/comma-separated-values; charset=utf-8")?;
//! let source = RowSource::open(payload, format)?;
//! let (headers, sample) = source.sample(SAMPLE_ROW_LIMIT)?;
//!
//! let columns = infer_columns(&headers, &sample, &TypeTable::default());
//! assert_eq!(columns[0].column_type, ColumnType::Integer);
//! assert_eq!(columns[1].column_type, ColumnType::Boolean);
//! assert_eq!(columns[2].column_type, ColumnType::Date);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod import;
pub mod inference;
pub mod loader;
pub mod server;
pub mod source;
pub mod superset;
pub mod types;

pub use error::{IngestError, IngestResult};
