//! Background retry loop for asset deletions that failed inline.

use std::time::Duration;

use velora_core::lifecycle::AssetStore;
use velora_core::models::DeleteOutcome;
use velora_core::services::DatabaseService;

const SWEEP_BATCH_SIZE: usize = 50;

/// Run the deletion sweeper until the process exits.
///
/// Each tick drains a batch of pending deletions; rows are only removed
/// once the asset host confirmed the delete, so a crash mid-sweep retries
/// the remainder on the next tick.
pub async fn run<S: AssetStore>(db: DatabaseService, store: std::sync::Arc<S>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(error) = sweep_once(&db, store.as_ref()).await {
            tracing::warn!(%error, "Deletion sweep failed");
        }
    }
}

/// Attempt every pending deletion in one batch, returning how many cleared.
pub async fn sweep_once<S: AssetStore>(
    db: &DatabaseService,
    store: &S,
) -> velora_core::Result<usize> {
    let pending = db.list_pending_deletions(SWEEP_BATCH_SIZE).await?;
    if pending.is_empty() {
        return Ok(0);
    }

    let mut cleared = 0;
    for entry in pending {
        match store.delete(&entry.public_id).await {
            Ok(DeleteOutcome::Deleted) => {
                db.remove_pending_deletion(&entry.public_id).await?;
                cleared += 1;
            }
            Err(error) => {
                // Left in the queue for the next sweep.
                tracing::warn!(public_id = entry.public_id, %error, "Pending deletion still failing");
            }
        }
    }

    tracing::info!(cleared, "Deletion sweep finished");
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use velora_core::compress::ImageFile;
    use velora_core::models::{AssetFolder, AssetPage, AssetRecord};
    use velora_core::{Error, Result};

    use super::*;

    #[derive(Default)]
    struct FlakyStore {
        failing: Mutex<HashSet<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AssetStore for FlakyStore {
        async fn upload(&self, _file: ImageFile, _folder: AssetFolder) -> Result<AssetRecord> {
            Err(Error::Storage("not used".to_string()))
        }

        async fn list(&self, _folder: AssetFolder, _cursor: Option<&str>) -> Result<AssetPage> {
            Err(Error::Storage("not used".to_string()))
        }

        async fn delete(&self, public_id: &str) -> Result<DeleteOutcome> {
            self.deletes.lock().unwrap().push(public_id.to_string());
            if self.failing.lock().unwrap().contains(public_id) {
                return Err(Error::Storage("still down".to_string()));
            }
            Ok(DeleteOutcome::Deleted)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sweep_clears_confirmed_deletes_and_keeps_failures() {
        let db = DatabaseService::open_in_memory().unwrap();
        db.enqueue_pending_deletion("articles/gone").await.unwrap();
        db.enqueue_pending_deletion("articles/stuck").await.unwrap();

        let store = FlakyStore::default();
        store
            .failing
            .lock()
            .unwrap()
            .insert("articles/stuck".to_string());

        let cleared = sweep_once(&db, &store).await.unwrap();
        assert_eq!(cleared, 1);

        let remaining = db.list_pending_deletions(10).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].public_id, "articles/stuck");

        // Once the host recovers the next sweep drains the queue.
        store.failing.lock().unwrap().clear();
        let cleared = sweep_once(&db, &store).await.unwrap();
        assert_eq!(cleared, 1);
        assert!(db.list_pending_deletions(10).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_queue_is_a_quiet_noop() {
        let db = DatabaseService::open_in_memory().unwrap();
        let store = FlakyStore::default();

        let cleared = sweep_once(&db, &store).await.unwrap();
        assert_eq!(cleared, 0);
        assert!(store.deletes.lock().unwrap().is_empty());
    }
}
