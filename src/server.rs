//! HTTP front end: preview a remote file, start its import, poll status, list
//! charts.
//!
//! The preview/confirm/import flow is tracked in an in-memory map of
//! [`DatasetHandle`]s keyed by derived table name. The import itself runs as a
//! detached background task; clients poll the status endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use tracing::error;

use crate::config::Config;
use crate::dataset::{DatasetHandle, ImportStatus, derive_table_name};
use crate::error::IngestError;
use crate::import;
use crate::superset::SupersetClient;
use crate::types::TypeTable;

type SharedHandle = Arc<RwLock<DatasetHandle>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub http: reqwest::Client,
    pub superset: Arc<Mutex<SupersetClient>>,
    pub config: Arc<Config>,
    pub type_table: Arc<TypeTable>,
    imports: Arc<RwLock<HashMap<String, SharedHandle>>>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let http = reqwest::Client::new();
        let superset = SupersetClient::new(http.clone(), config.superset.clone());
        Self {
            db,
            http,
            superset: Arc::new(Mutex::new(superset)),
            config: Arc::new(config),
            type_table: Arc::new(TypeTable::default()),
            imports: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/import", get(preview_import).post(start_import))
        .route("/import/status", get(import_status))
        .route("/import/charts", get(import_charts))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    #[serde(rename = "siteUrl")]
    site_url: Option<String>,
    #[serde(rename = "fileid")]
    file_id: Option<String>,
    #[serde(rename = "fileUrl")]
    file_url: Option<String>,
}

/// `GET /import`: fetch, sample, and infer a remote file; returns the handle
/// snapshot for preview rendering. Previews are cached per derived table name.
async fn preview_import(
    State(state): State<AppState>,
    Query(params): Query<PreviewParams>,
) -> Result<Response, ApiError> {
    let (site_url, file_id, file_url) = resolve_file_url(&state, params)?;
    let name = derive_table_name(&file_url);

    if let Some(existing) = state.imports.read().await.get(&name) {
        return Ok(handle_response(&name, &*existing.read().await));
    }

    let mut handle = DatasetHandle::new(site_url, file_id, file_url);
    // A table already registered with the visualization service means a previous
    // import completed; surface it instead of re-importing.
    if let Some(dataset_id) = state.superset.lock().await.find_dataset(&name).await? {
        handle.dataset_id = Some(dataset_id);
        handle.status = ImportStatus::Complete;
    }
    import::preview(&state.http, &state.type_table, &mut handle).await?;

    let response = handle_response(&name, &handle);
    state
        .imports
        .write()
        .await
        .insert(name, Arc::new(RwLock::new(handle)));
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct StartImportRequest {
    #[serde(rename = "datasetName")]
    dataset_name: String,
}

/// `POST /import`: start the background full load for a previewed file.
async fn start_import(
    State(state): State<AppState>,
    Json(request): Json<StartImportRequest>,
) -> Result<Response, ApiError> {
    let handle = lookup_handle(&state, &request.dataset_name).await?;

    handle.write().await.status = ImportStatus::InProgress;
    tokio::spawn(import::run_import(
        state.db.clone(),
        state.http.clone(),
        state.superset.clone(),
        state.type_table.as_ref().clone(),
        handle,
    ));

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "name": request.dataset_name, "status": "in_progress" })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    name: String,
}

/// `GET /import/status`: snapshot of a tracked import.
async fn import_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Response, ApiError> {
    let handle = lookup_handle(&state, &params.name).await?;
    let snapshot = handle.read().await;
    Ok(handle_response(&params.name, &snapshot))
}

/// `GET /import/charts`: charts saved against a completed import's dataset.
async fn import_charts(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Response, ApiError> {
    let handle = lookup_handle(&state, &params.name).await?;
    let dataset_id = {
        let snapshot = handle.read().await;
        snapshot.dataset_id.ok_or_else(|| {
            ApiError::not_found("import has no registered dataset yet")
        })?
    };
    let charts = state.superset.lock().await.chart_urls(dataset_id).await?;
    Ok((StatusCode::OK, Json(json!({ "charts": charts }))).into_response())
}

async fn lookup_handle(state: &AppState, name: &str) -> Result<SharedHandle, ApiError> {
    state
        .imports
        .read()
        .await
        .get(name)
        .cloned()
        .ok_or_else(|| ApiError::not_found("no previewed import under that name"))
}

/// Resolve the download URL from either an explicit `fileUrl` or a
/// `siteUrl`+`fileid` pair (site aliases applied first).
fn resolve_file_url(
    state: &AppState,
    params: PreviewParams,
) -> Result<(Option<String>, Option<String>, String), ApiError> {
    match (params.site_url, params.file_id, params.file_url) {
        (Some(site), Some(id), _) => {
            let site = state
                .config
                .site_url_aliases
                .get(&site)
                .cloned()
                .unwrap_or(site);
            let url = format!("{}/api/access/datafile/{id}", site.trim_end_matches('/'));
            Ok((Some(site), Some(id), url))
        }
        (_, _, Some(url)) => Ok((None, None, url)),
        _ => Err(ApiError::bad_request(
            "fileUrl or siteUrl+fileid is required",
        )),
    }
}

fn handle_response(name: &str, handle: &DatasetHandle) -> Response {
    (StatusCode::OK, Json(json!({ "name": name, "data": handle }))).into_response()
}

/// HTTP-facing error wrapper mapping [`IngestError`] kinds to status codes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        let status = match &e {
            // Unroutable media type surfaces as "file not valid".
            IngestError::FormatUnsupported { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IngestError::Fetch { .. } => StatusCode::BAD_REQUEST,
            IngestError::Http(_) | IngestError::Superset { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %e, "request failed");
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": { "message": self.message, "status": self.status.as_u16() }
        }));
        (self.status, body).into_response()
    }
}
