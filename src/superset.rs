//! Superset REST client: dataset registration and chart listing for imports.
//!
//! Talks to the Superset v1 API. Access tokens are short-lived, so every
//! operation exchanges the configured refresh token for a fresh access token
//! before issuing its request.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::SupersetConfig;
use crate::error::{IngestError, IngestResult};

/// A saved chart attached to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLink {
    pub name: String,
    /// Standalone render URL for embedding.
    pub url: String,
}

/// Client for the visualization service's dataset and chart APIs.
pub struct SupersetClient {
    client: Client,
    config: SupersetConfig,
    access_token: Option<String>,
}

impl SupersetClient {
    pub fn new(client: Client, config: SupersetConfig) -> Self {
        Self {
            client,
            config,
            access_token: None,
        }
    }

    /// Register `table_name` as a dataset; returns the new dataset id.
    pub async fn create_dataset(&mut self, table_name: &str) -> IngestResult<i64> {
        self.refresh_access_token().await?;

        let payload = json!({
            "database": self.config.database_id,
            "schema": self.config.schema,
            "table_name": table_name,
        });
        let response = self
            .client
            .post(self.api_url("dataset/"))
            .bearer_auth(self.bearer())
            .json(&payload)
            .send()
            .await?;
        let body = read_json(response, StatusCode::CREATED, "dataset creation").await?;

        body.get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| IngestError::Superset {
                message: "dataset creation returned no id".to_string(),
            })
    }

    /// Look up the dataset registered for `table_name`, if any.
    pub async fn find_dataset(&mut self, table_name: &str) -> IngestResult<Option<i64>> {
        self.refresh_access_token().await?;

        let query = json!({
            "columns": ["id"],
            "filters": [{ "col": "table_name", "opr": "eq", "value": table_name }],
        });
        let response = self
            .client
            .get(self.api_url("dataset/"))
            .query(&[("q", query.to_string())])
            .bearer_auth(self.bearer())
            .send()
            .await?;
        let body = read_json(response, StatusCode::OK, "dataset lookup").await?;

        if body.get("count").and_then(Value::as_i64) == Some(1) {
            Ok(body["result"][0]["id"].as_i64())
        } else {
            Ok(None)
        }
    }

    /// Most recently saved charts (first page of 20) for a dataset.
    pub async fn chart_urls(&mut self, dataset_id: i64) -> IngestResult<Vec<ChartLink>> {
        self.refresh_access_token().await?;

        let query = json!({
            "columns": ["slice_name", "url"],
            "filters": [{ "col": "datasource_id", "opr": "eq", "value": dataset_id }],
            "order_column": "last_saved_at",
            "order_direction": "desc",
            "page": 0,
            "page_size": 20,
        });
        let response = self
            .client
            .get(self.api_url("chart/"))
            .query(&[("q", query.to_string())])
            .bearer_auth(self.bearer())
            .send()
            .await?;
        let body = read_json(response, StatusCode::OK, "chart listing").await?;

        let charts = body
            .get("result")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some(ChartLink {
                            name: item.get("slice_name")?.as_str()?.to_owned(),
                            url: format!("{}&standalone=1", item.get("url")?.as_str()?),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(charts)
    }

    /// Exchange the configured refresh token for a fresh access token.
    async fn refresh_access_token(&mut self) -> IngestResult<()> {
        let response = self
            .client
            .post(self.api_url("security/refresh"))
            .bearer_auth(&self.config.refresh_token)
            .send()
            .await?;
        let body = read_json(response, StatusCode::OK, "token refresh").await?;

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| IngestError::Superset {
                message: "token refresh returned no access_token".to_string(),
            })?;
        self.access_token = Some(token.to_owned());
        Ok(())
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or_default()
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v1/{path}",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Decode a Superset response, treating a non-JSON body as its own message and an
/// unexpected status as an API failure.
async fn read_json(
    response: reqwest::Response,
    expected: StatusCode,
    context: &str,
) -> IngestResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value =
        serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": text }));
    if status != expected {
        let message = body
            .get("message")
            .map(Value::to_string)
            .unwrap_or_default();
        return Err(IngestError::Superset {
            message: format!("{context}: {status} {message}"),
        });
    }
    Ok(body)
}
