//! Shared database service wrapper used across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    ArticleRepository, Database, PendingDeletion, PendingDeletionRepository,
    SqliteArticleRepository,
};
use crate::models::{Article, ArticleId};
use crate::Result;

/// Thread-safe service for DB and repository operations.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(db_path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// List articles, date descending.
    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.list()
    }

    /// Fetch an article by id.
    pub async fn get_article(&self, id: &ArticleId) -> Result<Option<Article>> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.get(id)
    }

    /// Persist a new article document.
    pub async fn create_article(&self, article: &Article) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.create(article)
    }

    /// Replace an existing article document in full.
    pub async fn update_article(&self, article: &Article) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.update(article)
    }

    /// Delete an article document.
    pub async fn delete_article(&self, id: &ArticleId) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.delete(id)
    }

    /// Enqueue a stale asset for durable deletion retry.
    pub async fn enqueue_pending_deletion(&self, public_id: &str) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.enqueue(public_id)
    }

    /// Oldest pending deletions, up to `limit`.
    pub async fn list_pending_deletions(&self, limit: usize) -> Result<Vec<PendingDeletion>> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.list_pending(limit)
    }

    /// Remove a settled pending-deletion entry.
    pub async fn remove_pending_deletion(&self, public_id: &str) -> Result<()> {
        let db = self.db.lock().await;
        let repo = SqliteArticleRepository::new(db.connection());
        repo.remove(public_id)
    }
}
