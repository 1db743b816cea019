//! Image lifecycle orchestration for article writes.
//!
//! Keeps asset-host state consistent with document state across create,
//! update, and delete. The document write and the asset-host calls are
//! separate network round trips with no cross-service transaction: a crash
//! between them can leak an orphaned asset, but readers never see a broken
//! link (the document is only ever written with URLs whose uploads already
//! succeeded, and old assets are only deleted after the document stopped
//! referencing them).

use async_trait::async_trait;
use futures::future::{join_all, try_join_all};

use crate::compress::ImageFile;
use crate::error::{Error, Result};
use crate::models::{
    Article, ArticleDraft, ArticleId, AssetFolder, AssetPage, AssetRecord, ContentBlock,
    DeleteOutcome,
};
use crate::publicid::extract_public_id;
use crate::services::DatabaseService;

/// Remote asset host operations the lifecycle depends on.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload image bytes into a folder, returning the host's record.
    async fn upload(&self, file: ImageFile, folder: AssetFolder) -> Result<AssetRecord>;

    /// One page of a folder listing, newest first. Passing the previous
    /// page's cursor continues the sequence; an absent `next_cursor` in the
    /// response signals end of list.
    async fn list(&self, folder: AssetFolder, cursor: Option<&str>) -> Result<AssetPage>;

    /// Delete an asset by public identifier. Idempotent: deleting an
    /// already-absent asset reports [`DeleteOutcome::Deleted`].
    async fn delete(&self, public_id: &str) -> Result<DeleteOutcome>;
}

/// One image slot in an incoming article write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSlot {
    /// No image for this slot.
    #[default]
    Empty,
    /// An already-uploaded delivery URL.
    Url(String),
    /// Raw bytes still to be uploaded.
    File(ImageFile),
}

/// One incoming content block: an image slot plus its text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentWrite {
    pub image: ImageSlot,
    pub text: String,
}

/// An incoming article create, as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleWrite {
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub cover: ImageSlot,
    pub contents: Vec<ContentWrite>,
}

/// A changed image slot between two article revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChange {
    pub old_url: String,
    pub new_url: String,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Cover,
    Content(usize),
}

/// Create an article, uploading every raw-file slot first.
///
/// All file slots upload concurrently and fail-fast: a single failed upload
/// aborts the whole create and no document is persisted. The document is
/// written once, after every upload succeeded.
pub async fn create_article<S: AssetStore>(
    db: &DatabaseService,
    store: &S,
    write: ArticleWrite,
) -> Result<Article> {
    // Validate before any side effect.
    ArticleDraft {
        title: write.title.clone(),
        description: write.description.clone(),
        ..ArticleDraft::default()
    }
    .validate()?;

    let mut uploads: Vec<(Slot, ImageFile)> = Vec::new();
    if let ImageSlot::File(file) = &write.cover {
        uploads.push((Slot::Cover, file.clone()));
    }
    for (index, block) in write.contents.iter().enumerate() {
        if let ImageSlot::File(file) = &block.image {
            uploads.push((Slot::Content(index), file.clone()));
        }
    }

    let uploaded = try_join_all(uploads.into_iter().map(|(slot, file)| async move {
        let record = store.upload(file, AssetFolder::Articles).await?;
        Ok::<_, Error>((slot, record.secure_url))
    }))
    .await?;

    let mut cover_url = match &write.cover {
        ImageSlot::Url(url) => url.clone(),
        ImageSlot::Empty | ImageSlot::File(_) => String::new(),
    };
    let mut content_urls: Vec<String> = write
        .contents
        .iter()
        .map(|block| match &block.image {
            ImageSlot::Url(url) => url.clone(),
            ImageSlot::Empty | ImageSlot::File(_) => String::new(),
        })
        .collect();
    for (slot, url) in uploaded {
        match slot {
            Slot::Cover => cover_url = url,
            Slot::Content(index) => content_urls[index] = url,
        }
    }

    let draft = ArticleDraft {
        title: write.title,
        description: write.description,
        author: write.author,
        date: write.date,
        image: cover_url,
        contents: write
            .contents
            .into_iter()
            .zip(content_urls)
            .map(|(block, image)| ContentBlock {
                image,
                text: block.text,
            })
            .collect(),
    };

    let article = Article::create(draft)?;
    db.create_article(&article).await?;
    Ok(article)
}

/// Replace an article document and clean up stale assets best-effort.
///
/// Incoming image slots are URLs already uploaded by the caller. Stale-asset
/// deletions run after the document write is confirmed; failures are logged
/// and enqueued for the deletion sweeper, never surfaced to the caller.
pub async fn update_article<S: AssetStore>(
    db: &DatabaseService,
    store: &S,
    id: ArticleId,
    draft: ArticleDraft,
) -> Result<Article> {
    let existing = db
        .get_article(&id)
        .await?
        .ok_or_else(|| Error::NotFound(id.as_str()))?;

    let updated = Article::replace(&existing, draft)?;
    db.update_article(&updated).await?;

    for change in collect_image_changes(&existing, &updated) {
        if let Some(public_id) = extract_public_id(&change.old_url) {
            delete_best_effort(db, store, &public_id).await;
        }
    }

    Ok(updated)
}

/// Delete an article and every asset it references.
///
/// Asset deletions are independent of each other and all attempted before
/// the document delete; the document delete proceeds unconditionally once
/// the article was found, so a failed asset delete can leak an orphaned
/// asset but never leaves an orphaned document reference.
pub async fn delete_article<S: AssetStore>(
    db: &DatabaseService,
    store: &S,
    id: ArticleId,
) -> Result<()> {
    let article = db
        .get_article(&id)
        .await?
        .ok_or_else(|| Error::NotFound(id.as_str()))?;

    let public_ids = collect_article_public_ids(&article);
    join_all(
        public_ids
            .iter()
            .map(|public_id| delete_best_effort(db, store, public_id)),
    )
    .await;

    db.delete_article(&id).await?;
    Ok(())
}

/// Collect the image slots that changed between two article revisions.
///
/// Cover and content slots are compared position by position; a change is
/// recorded only when both the old and the new slot hold a URL and they
/// differ. Content blocks are matched by index, not by stable identity, so
/// reordering blocks is indistinguishable from replacing their images.
#[must_use]
pub fn collect_image_changes(existing: &Article, updated: &Article) -> Vec<ImageChange> {
    let mut changes = Vec::new();

    if !existing.image.is_empty() && !updated.image.is_empty() && existing.image != updated.image {
        changes.push(ImageChange {
            old_url: existing.image.clone(),
            new_url: updated.image.clone(),
        });
    }

    let max_len = existing.contents.len().max(updated.contents.len());
    for index in 0..max_len {
        let old_image = existing
            .contents
            .get(index)
            .map_or("", |block| block.image.as_str());
        let new_image = updated
            .contents
            .get(index)
            .map_or("", |block| block.image.as_str());
        if !old_image.is_empty() && !new_image.is_empty() && old_image != new_image {
            changes.push(ImageChange {
                old_url: old_image.to_string(),
                new_url: new_image.to_string(),
            });
        }
    }

    changes
}

/// Resolve every asset URL an article references to a public identifier.
///
/// Unresolvable URLs mean "nothing to delete" and are skipped.
#[must_use]
pub fn collect_article_public_ids(article: &Article) -> Vec<String> {
    let mut public_ids = Vec::new();
    if let Some(public_id) = extract_public_id(&article.image) {
        public_ids.push(public_id);
    }
    for block in &article.contents {
        if let Some(public_id) = extract_public_id(&block.image) {
            public_ids.push(public_id);
        }
    }
    public_ids
}

async fn delete_best_effort<S: AssetStore>(db: &DatabaseService, store: &S, public_id: &str) {
    match store.delete(public_id).await {
        Ok(DeleteOutcome::Deleted) => {}
        Err(error) => {
            tracing::warn!(public_id, %error, "Asset delete failed, enqueueing for retry");
            if let Err(enqueue_error) = db.enqueue_pending_deletion(public_id).await {
                tracing::warn!(public_id, %enqueue_error, "Failed to enqueue pending deletion");
            }
        }
    }
}
