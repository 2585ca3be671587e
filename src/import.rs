//! Import orchestration: sample-and-infer preview, then the full background load.
//!
//! The two phases read the source independently: preview buffers one download and
//! samples it; the full load fetches the file again rather than assuming the first
//! response body is replayable. The schema inferred during preview is authoritative
//! for the load.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::dataset::{DatasetHandle, ImportStatus};
use crate::error::IngestResult;
use crate::fetch::fetch_remote_file;
use crate::inference::{SAMPLE_ROW_LIMIT, infer_columns};
use crate::loader::{PgTableSink, drop_table, load_rows};
use crate::source::{RowSource, SourceFormat};
use crate::superset::SupersetClient;
use crate::types::{ColumnInfo, TypeTable};

/// Discover file metadata and inferred column types for a remote file.
///
/// Fetches and buffers the payload, routes its declared media type, reads the
/// header plus a bounded sample, and fills the handle's discovered fields. Fails
/// before anything touches the database.
pub async fn preview(
    client: &reqwest::Client,
    table: &TypeTable,
    handle: &mut DatasetHandle,
) -> IngestResult<()> {
    let file = fetch_remote_file(client, &handle.file_url).await?;
    let format = SourceFormat::from_media_type(&file.media_type)?;
    let source = RowSource::open(file.body.clone(), format)?;
    let (headers, sample) = source.sample(SAMPLE_ROW_LIMIT)?;

    handle.file_name = file.file_name.clone();
    handle.file_size = file.display_size();
    handle.columns = infer_columns(&headers, &sample, table);
    info!(
        url = %handle.file_url,
        file = %handle.file_name,
        columns = handle.columns.len(),
        "previewed remote file"
    );
    Ok(())
}

/// Run the full import for a previously previewed handle.
///
/// Fresh fetch, table creation, batched load, dataset registration; the handle
/// lands in `Complete` on success. On any failure the destination table is
/// dropped so no partial table lingers, and the handle lands in `Error` with the
/// failure message. Runs to completion or failure; there is no mid-load abort.
pub async fn run_import(
    pool: PgPool,
    client: reqwest::Client,
    superset: Arc<Mutex<SupersetClient>>,
    table: TypeTable,
    handle: Arc<RwLock<DatasetHandle>>,
) {
    let (file_url, schema, table_name) = {
        let h = handle.read().await;
        (h.file_url.clone(), h.columns.clone(), h.table_name())
    };

    match import_table(&pool, &client, &superset, &table, &file_url, &schema, &table_name).await
    {
        Ok((rows, dataset_id)) => {
            info!(table = %table_name, rows, dataset_id, "import complete");
            let mut h = handle.write().await;
            h.rows_written = Some(rows);
            h.dataset_id = Some(dataset_id);
            h.status = ImportStatus::Complete;
        }
        Err(e) => {
            error!(table = %table_name, error = %e, "import failed");
            if let Err(drop_err) = drop_table(&pool, &table_name).await {
                error!(table = %table_name, error = %drop_err, "table teardown failed");
            }
            let mut h = handle.write().await;
            h.error = Some(e.to_string());
            h.status = ImportStatus::Error;
        }
    }
}

async fn import_table(
    pool: &PgPool,
    client: &reqwest::Client,
    superset: &Mutex<SupersetClient>,
    table: &TypeTable,
    file_url: &str,
    schema: &[ColumnInfo],
    table_name: &str,
) -> IngestResult<(u64, i64)> {
    let file = fetch_remote_file(client, file_url).await?;
    let format = SourceFormat::from_media_type(&file.media_type)?;
    let source = RowSource::open(file.body.clone(), format)?;

    let mut sink = PgTableSink::new(pool, table_name, schema);
    sink.create_table().await?;
    let rows = load_rows(source.into_rows(), schema, table, &mut sink).await?;

    let dataset_id = superset.lock().await.create_dataset(table_name).await?;
    Ok((rows, dataset_id))
}
