//! Admin and public article endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use velora_core::compress::{compress_image, CompressionProfile, ImageFile};
use velora_core::lifecycle::{self, ArticleWrite, ContentWrite, ImageSlot};
use velora_core::models::{Article, ArticleDraft, ArticleId};

use crate::error::AppError;
use crate::routes::AppState;

/// Article fields carried in the `article` part of a create request.
#[derive(Debug, Default, Deserialize)]
struct ArticleMeta {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    contents: Vec<ContentMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentMeta {
    #[serde(default)]
    image: String,
    #[serde(default)]
    text: String,
}

pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    let articles = state.db.list_articles().await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, AppError> {
    let id = parse_article_id(&id)?;
    let article = state
        .db
        .get_article(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.as_str()))?;
    Ok(Json(article))
}

/// Create an article from a multipart request.
///
/// The `article` part carries the document fields as JSON; a `cover` part
/// and any number of `content-{index}` parts carry raw image files for the
/// matching slots. Files are compressed server-side before upload.
pub async fn create_article(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let write = parse_article_multipart(multipart, state.config.max_upload_bytes).await?;
    let article = lifecycle::create_article(&state.db, state.store.as_ref(), write).await?;
    tracing::info!(article_id = %article.id, href = article.href, "Created article");
    Ok((StatusCode::CREATED, Json(article)))
}

/// Replace an article document wholesale.
///
/// Image slots in the body are delivery URLs already uploaded through the
/// gallery endpoints; assets no longer referenced are cleaned up after the
/// write.
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ArticleDraft>,
) -> Result<Json<Article>, AppError> {
    let id = parse_article_id(&id)?;
    let article = lifecycle::update_article(&state.db, state.store.as_ref(), id, draft).await?;
    tracing::info!(article_id = %article.id, "Updated article");
    Ok(Json(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_article_id(&id)?;
    lifecycle::delete_article(&state.db, state.store.as_ref(), id).await?;
    tracing::info!(article_id = %id, "Deleted article");
    Ok(Json(serde_json::json!({ "ok": true })))
}

fn parse_article_id(raw: &str) -> Result<ArticleId, AppError> {
    raw.parse::<ArticleId>()
        .map_err(|_| AppError::bad_request(format!("Invalid article id: {raw}")))
}

async fn parse_article_multipart(
    mut multipart: Multipart,
    max_upload_bytes: u64,
) -> Result<ArticleWrite, AppError> {
    let mut meta: Option<ArticleMeta> = None;
    let mut cover: Option<ImageFile> = None;
    let mut content_files: Vec<(usize, ImageFile)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::bad_request(format!("Malformed multipart body: {error}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "article" {
            let raw = field.text().await.map_err(|error| {
                AppError::bad_request(format!("Unreadable article part: {error}"))
            })?;
            meta = Some(
                serde_json::from_str(&raw)
                    .map_err(|error| AppError::bad_request(format!("Invalid article JSON: {error}")))?,
            );
            continue;
        }

        let slot = if name == "cover" {
            None
        } else if let Some(index) = name.strip_prefix("content-") {
            Some(index.parse::<usize>().map_err(|_| {
                AppError::bad_request(format!("Invalid content part name: {name}"))
            })?)
        } else {
            continue;
        };

        let file = read_image_field(field, max_upload_bytes).await?;
        match slot {
            None => cover = Some(file),
            Some(index) => content_files.push((index, file)),
        }
    }

    let meta = meta.ok_or_else(|| AppError::bad_request("Missing article part"))?;

    let mut contents: Vec<ContentWrite> = meta
        .contents
        .into_iter()
        .map(|block| ContentWrite {
            image: url_slot(block.image),
            text: block.text,
        })
        .collect();
    for (index, file) in content_files {
        if index >= contents.len() {
            return Err(AppError::bad_request(format!(
                "Content part index {index} has no matching block"
            )));
        }
        contents[index].image =
            ImageSlot::File(compress_image(file, CompressionProfile::Gallery.options()));
    }

    let cover = match cover {
        Some(file) => ImageSlot::File(compress_image(file, CompressionProfile::Cover.options())),
        None => url_slot(meta.image),
    };

    Ok(ArticleWrite {
        title: meta.title,
        description: meta.description,
        author: meta.author,
        date: meta.date,
        cover,
        contents,
    })
}

fn url_slot(url: String) -> ImageSlot {
    if url.trim().is_empty() {
        ImageSlot::Empty
    } else {
        ImageSlot::Url(url)
    }
}

/// Read one multipart file field, enforcing the image gate and size cap.
pub async fn read_image_field(
    field: axum::extract::multipart::Field<'_>,
    max_upload_bytes: u64,
) -> Result<ImageFile, AppError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(AppError::unsupported_media(format!(
            "Expected an image file, got {content_type:?}"
        )));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|error| AppError::bad_request(format!("Unreadable file part: {error}")))?;
    if bytes.len() as u64 > max_upload_bytes {
        return Err(AppError::bad_request(format!(
            "File {file_name} exceeds the {max_upload_bytes} byte upload limit"
        )));
    }

    Ok(ImageFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}
