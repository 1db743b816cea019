//! Folder-scoped gallery endpoints for the admin back office.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use velora_core::compress::{compress_image, CompressionProfile};
use velora_core::lifecycle::AssetStore;
use velora_core::models::{AssetFolder, AssetPage, AssetRecord};

use crate::articles::read_image_field;
use crate::error::AppError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Opaque continuation cursor from the previous page.
    next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    uploaded: Vec<AssetRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    public_ids: Vec<String>,
}

pub async fn list_gallery(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AssetPage>, AppError> {
    let folder = parse_folder(&folder)?;
    let page = state.store.list(folder, query.next.as_deref()).await?;
    Ok(Json(page))
}

/// Upload one or more images into a folder.
///
/// Every part must be an image; a single non-image part rejects the whole
/// request before anything is uploaded. Uploads then run one at a time so a
/// mid-batch failure reports exactly which files made it.
pub async fn upload_gallery(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let folder = parse_folder(&folder)?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::bad_request(format!("Malformed multipart body: {error}")))?
    {
        files.push(read_image_field(field, state.config.max_upload_bytes).await?);
    }
    if files.is_empty() {
        return Err(AppError::bad_request("No files to upload"));
    }

    let profile = folder_profile(folder);
    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        let compressed = compress_image(file, profile.options());
        let record = state.store.upload(compressed, folder).await.map_err(|error| {
            tracing::warn!(%folder, uploaded = uploaded.len(), %error, "Gallery upload aborted mid-batch");
            AppError::from(error)
        })?;
        uploaded.push(record);
    }

    tracing::info!(%folder, count = uploaded.len(), "Uploaded gallery images");
    Ok(Json(UploadResponse { uploaded }))
}

/// Delete one or more assets by public identifier.
pub async fn delete_gallery(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let folder = parse_folder(&folder)?;

    let mut public_ids = request.public_ids;
    if let Some(single) = request.public_id {
        public_ids.push(single);
    }
    public_ids.retain(|id| !id.trim().is_empty());
    if public_ids.is_empty() {
        return Err(AppError::bad_request("No public_id to delete"));
    }

    for public_id in &public_ids {
        state.store.delete(public_id).await?;
    }

    tracing::info!(%folder, count = public_ids.len(), "Deleted gallery images");
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Admin-user portraits get the avatar envelope; every other folder holds
/// gallery imagery.
const fn folder_profile(folder: AssetFolder) -> CompressionProfile {
    match folder {
        AssetFolder::AdminUser => CompressionProfile::Avatar,
        _ => CompressionProfile::Gallery,
    }
}

fn parse_folder(raw: &str) -> Result<AssetFolder, AppError> {
    raw.parse::<AssetFolder>()
        .map_err(|_| AppError::bad_request(format!("Unknown gallery folder: {raw}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn folder_paths_parse_to_known_folders() {
        assert_eq!(parse_folder("review").unwrap(), AssetFolder::Review);
        assert_eq!(parse_folder("admin-user").unwrap(), AssetFolder::AdminUser);
        assert!(parse_folder("attic").is_err());
    }

    #[test]
    fn admin_user_uploads_use_the_avatar_envelope() {
        assert_eq!(
            folder_profile(AssetFolder::AdminUser),
            CompressionProfile::Avatar
        );
        assert_eq!(
            folder_profile(AssetFolder::Review),
            CompressionProfile::Gallery
        );
    }

    #[test]
    fn delete_request_accepts_single_and_batch_forms() {
        let single: DeleteRequest = serde_json::from_str(r#"{"public_id": "review/a"}"#).unwrap();
        assert_eq!(single.public_id.as_deref(), Some("review/a"));
        assert!(single.public_ids.is_empty());

        let batch: DeleteRequest =
            serde_json::from_str(r#"{"public_ids": ["review/a", "review/b"]}"#).unwrap();
        assert_eq!(batch.public_ids.len(), 2);
    }
}
