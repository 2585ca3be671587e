//! Per-import dataset state: source identity, discovered metadata, and lifecycle.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::ColumnInfo;

const TABLE_NAME_PREFIX: &str = "dataset_";
const TABLE_NAME_DIGEST_LEN: usize = 10;

/// Coarse lifecycle of one import.
///
/// `Ready` after header/sample discovery, `InProgress` once the full load starts,
/// `Complete` and `Error` terminal and mutually exclusive. Transitions are driven
/// by the orchestration layer, never by the ingestion core itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Ready,
    InProgress,
    Complete,
    Error,
}

/// Per-import state record tracking source identity, discovered metadata, and
/// lifecycle status.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetHandle {
    /// Origin site, when the file was addressed as site + locator.
    pub site_url: Option<String>,
    /// File locator within the origin site.
    pub file_id: Option<String>,
    /// Resolved download URL for the file.
    pub file_url: String,
    /// File name discovered from the origin's response headers.
    pub file_name: String,
    /// Human-readable file size for preview display.
    pub file_size: String,
    /// Columns inferred from the bounded sample, in header order.
    pub columns: Vec<ColumnInfo>,
    /// Visualization-service dataset id, once registered.
    pub dataset_id: Option<i64>,
    /// Rows written by the completed full load.
    pub rows_written: Option<u64>,
    pub status: ImportStatus,
    /// Failure message for the terminal `Error` state.
    pub error: Option<String>,
}

impl DatasetHandle {
    pub fn new(
        site_url: Option<String>,
        file_id: Option<String>,
        file_url: impl Into<String>,
    ) -> Self {
        Self {
            site_url,
            file_id,
            file_url: file_url.into(),
            file_name: String::new(),
            file_size: String::new(),
            columns: Vec::new(),
            dataset_id: None,
            rows_written: None,
            status: ImportStatus::Ready,
            error: None,
        }
    }

    /// Destination table name for this import.
    pub fn table_name(&self) -> String {
        derive_table_name(&self.file_url)
    }
}

/// Derive the destination table name deterministically from the source identity,
/// so re-imports of the same file land on the same table.
pub fn derive_table_name(file_url: &str) -> String {
    let digest = hex::encode(Sha256::digest(file_url.as_bytes()));
    format!("{TABLE_NAME_PREFIX}{}", &digest[..TABLE_NAME_DIGEST_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_is_deterministic_and_prefixed() {
        let a = derive_table_name("https://example.org/api/access/datafile/42");
        let b = derive_table_name("https://example.org/api/access/datafile/42");
        assert_eq!(a, b);
        assert!(a.starts_with(TABLE_NAME_PREFIX));
        assert_eq!(a.len(), TABLE_NAME_PREFIX.len() + TABLE_NAME_DIGEST_LEN);
    }

    #[test]
    fn table_name_differs_per_source() {
        assert_ne!(
            derive_table_name("https://example.org/a"),
            derive_table_name("https://example.org/b")
        );
    }
}
