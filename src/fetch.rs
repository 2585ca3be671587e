//! Remote file retrieval: buffer the payload once and capture declared metadata.

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};

use crate::error::{IngestError, IngestResult};

/// Fallback used when the origin does not declare a file name.
const DEFAULT_FILE_NAME: &str = "unknown-file.tab";

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// A fully-buffered remote file plus the metadata needed for routing and display.
///
/// The body is held in memory so row sources can be opened from it repeatedly;
/// the transport itself is never re-read within one pass.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Declared media type from the `Content-Type` header, parameters included.
    pub media_type: String,
    /// File name from `Content-Disposition`, or [`DEFAULT_FILE_NAME`].
    pub file_name: String,
    /// Declared size in bytes, when the origin sent `Content-Length`.
    pub size_bytes: Option<u64>,
    /// The buffered payload.
    pub body: Bytes,
}

impl RemoteFile {
    /// Human-readable size for preview display.
    pub fn display_size(&self) -> String {
        match self.size_bytes {
            None => "unknown".to_string(),
            Some(n) if n >= GB => format!("{} GB", n / GB),
            Some(n) if n >= MB => format!("{} MB", n / MB),
            Some(n) if n >= KB => format!("{} KB", n / KB),
            Some(n) => format!("{n} bytes"),
        }
    }
}

/// Download `url`, buffering the whole body.
///
/// Non-success status or a missing `Content-Type` is a fetch failure: without a
/// declared media type the format router has nothing to route on.
pub async fn fetch_remote_file(client: &Client, url: &str) -> IngestResult<RemoteFile> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::Fetch {
            message: format!("{url}: status code {status}"),
        });
    }
    let media_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| IngestError::Fetch {
            message: format!("{url}: no content type declared"),
        })?;
    let file_name = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_file_name)
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
    let size_bytes = response.content_length();
    let body = response.bytes().await?;

    Ok(RemoteFile {
        media_type,
        file_name,
        size_bytes,
        body,
    })
}

/// Extract the `filename` parameter from a `Content-Disposition` header value.
fn disposition_file_name(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"').to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_file_name_parses_quoted_and_bare() {
        assert_eq!(
            disposition_file_name("attachment; filename=\"survey.tab\""),
            Some("survey.tab".to_string())
        );
        assert_eq!(
            disposition_file_name("attachment; filename=data.csv"),
            Some("data.csv".to_string())
        );
        assert_eq!(disposition_file_name("inline"), None);
    }

    #[test]
    fn display_size_humanizes() {
        let file = |n| RemoteFile {
            media_type: String::new(),
            file_name: String::new(),
            size_bytes: n,
            body: Bytes::new(),
        };
        assert_eq!(file(Some(512)).display_size(), "512 bytes");
        assert_eq!(file(Some(4 * 1024)).display_size(), "4 KB");
        assert_eq!(file(Some(3 * 1024 * 1024)).display_size(), "3 MB");
        assert_eq!(file(None).display_size(), "unknown");
    }
}
