use crate::api::TaskBackend;
use crate::error::AppError;
use crate::model::ProgressSnapshot;
use crate::task_store::CollectionEvent;
use tokio::sync::watch;

/// Rendered aggregate counts. Values are refetched on every collection change
/// and never computed from the (possibly filtered) local list.
#[derive(Debug)]
pub struct StatisticsView {
    snapshot: ProgressSnapshot,
    changes: watch::Receiver<CollectionEvent>,
    fetches: u64,
}

impl StatisticsView {
    pub fn new(changes: watch::Receiver<CollectionEvent>) -> Self {
        Self {
            snapshot: ProgressSnapshot::default(),
            changes,
            fetches: 0,
        }
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    pub fn is_stale(&self) -> bool {
        self.changes.has_changed().unwrap_or(false)
    }

    pub async fn refresh<B>(&mut self, api: &B) -> Result<&ProgressSnapshot, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        self.changes.mark_unchanged();
        self.fetches += 1;
        self.snapshot = api.progress().await?;
        tracing::debug!(
            total = self.snapshot.total_tasks,
            completed = self.snapshot.completed_tasks,
            "statistics refreshed"
        );
        Ok(&self.snapshot)
    }

    /// Refetches only when the collection published a change since the last refresh.
    pub async fn refresh_if_changed<B>(&mut self, api: &B) -> Result<bool, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        if !self.is_stale() {
            return Ok(false);
        }
        self.refresh(api).await?;
        Ok(true)
    }
}
