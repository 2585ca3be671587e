use thiserror::Error;

/// Convenience result type for import operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Error type shared across fetch, row sources, inference, and loading.
///
/// Every failure path in an import yields exactly one of these variants, with enough
/// context (row index, column name, media type) to diagnose without re-running.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The declared media type does not map to any row source variant.
    #[error("unsupported media type '{media_type}'")]
    FormatUnsupported { media_type: String },

    /// Delimited-text decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet container error (xls/xlsx/ods).
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The byte stream behind a row source was structurally unreadable.
    #[error("source read error: {message}")]
    SourceRead { message: String },

    /// A cell failed to parse under its column's inferred type during full load.
    #[error("failed to convert value at row {row} column '{column}': {message} (raw='{raw}')")]
    Conversion {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Destination write failure.
    #[error("sink error: {0}")]
    Sink(#[from] sqlx::Error),

    /// Remote file retrieval failure (bad status, missing metadata).
    #[error("fetch error: {message}")]
    Fetch { message: String },

    /// HTTP transport failure talking to the origin or the visualization service.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Visualization-service API failure.
    #[error("superset error: {message}")]
    Superset { message: String },
}
