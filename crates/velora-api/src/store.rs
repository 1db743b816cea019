//! HTTP client for the remote asset host.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use velora_core::compress::ImageFile;
use velora_core::lifecycle::AssetStore;
use velora_core::models::{AssetFolder, AssetPage, AssetRecord, DeleteOutcome};
use velora_core::{Error, Result};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct HttpAssetStore {
    client: reqwest::Client,
    config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl HttpAssetStore {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.asset_host_url)
    }

    async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Storage(format!(
            "Asset host {what} failed with HTTP {status}: {}",
            compact_body(&body)
        )))
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(&self, file: ImageFile, folder: AssetFolder) -> Result<AssetRecord> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|error| Error::Storage(format!("Invalid upload content type: {error}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.as_str());

        let response = self
            .client
            .post(self.endpoint("/image/upload"))
            .basic_auth(
                &self.config.asset_host_key,
                Some(&self.config.asset_host_secret),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|error| Error::Storage(format!("Asset upload failed: {}", sanitize(&error))))?;

        let response = Self::check_status(response, "upload").await?;
        response
            .json::<AssetRecord>()
            .await
            .map_err(|error| Error::Storage(format!("Asset upload parse failed: {}", sanitize(&error))))
    }

    async fn list(&self, folder: AssetFolder, cursor: Option<&str>) -> Result<AssetPage> {
        let mut request = self
            .client
            .get(self.endpoint("/resources/image"))
            .basic_auth(
                &self.config.asset_host_key,
                Some(&self.config.asset_host_secret),
            )
            .query(&[("prefix", folder.as_str())])
            .query(&[("max_results", self.config.gallery_page_size)]);
        if let Some(cursor) = cursor {
            request = request.query(&[("next_cursor", cursor)]);
        }

        let response = request.send().await.map_err(|error| {
            Error::Storage(format!("Asset listing failed: {}", sanitize(&error)))
        })?;

        let response = Self::check_status(response, "listing").await?;
        response.json::<AssetPage>().await.map_err(|error| {
            Error::Storage(format!("Asset listing parse failed: {}", sanitize(&error)))
        })
    }

    async fn delete(&self, public_id: &str) -> Result<DeleteOutcome> {
        let body = serde_json::json!({ "public_id": public_id });
        let response = self
            .client
            .post(self.endpoint("/image/destroy"))
            .basic_auth(
                &self.config.asset_host_key,
                Some(&self.config.asset_host_secret),
            )
            .json(&body)
            .send()
            .await
            .map_err(|error| Error::Storage(format!("Asset delete failed: {}", sanitize(&error))))?;

        let response = Self::check_status(response, "delete").await?;
        let payload = response.json::<DestroyResponse>().await.map_err(|error| {
            Error::Storage(format!("Asset delete parse failed: {}", sanitize(&error)))
        })?;
        destroy_outcome(&payload.result)
    }
}

/// Map the host's destroy result to an outcome.
///
/// "not found" counts as a successful delete: the asset is gone either way,
/// so retrying an interrupted cascade stays safe.
fn destroy_outcome(result: &str) -> Result<DeleteOutcome> {
    match result {
        "ok" | "not found" => Ok(DeleteOutcome::Deleted),
        other => Err(Error::Storage(format!(
            "Asset host rejected delete: {other}"
        ))),
    }
}

fn sanitize(error: &impl std::fmt::Display) -> String {
    error.to_string().replace('\n', " ").trim().to_string()
}

fn compact_body(body: &str) -> String {
    body.trim().chars().take(180).collect()
}
