//! Ties the task collection to the statistics view and turns failures into a
//! dismissable notice.

use crate::api::TaskBackend;
use crate::error::AppError;
use crate::filter::TaskFilter;
use crate::model::{NewTask, ProgressSnapshot, Task, TaskId, TaskUpdate};
use crate::stats::StatisticsView;
use crate::task_store::TaskStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: &'static str,
    pub message: String,
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code(),
            message: err.message().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    store: TaskStore,
    stats: StatisticsView,
    notice: Option<Notice>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        let store = TaskStore::new();
        let stats = StatisticsView::new(store.subscribe());
        Self {
            store,
            stats,
            notice: None,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn stats(&self) -> &StatisticsView {
        &self.stats
    }

    pub fn active_filter(&self) -> TaskFilter {
        self.store.active_filter()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Reloads the active filter.
    pub async fn refresh<B>(&mut self, api: &B) -> Result<(), AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let filter = self.store.active_filter();
        self.select_filter(api, filter).await
    }

    pub async fn select_filter<B>(&mut self, api: &B, filter: TaskFilter) -> Result<(), AppError>
    where
        B: TaskBackend + ?Sized,
    {
        tracing::info!(filter = %filter, "filter selected");
        let result = self.store.load(api, filter).await.map(|_| ());
        self.settle(api, result).await
    }

    /// Refetches the aggregate unconditionally and reports failure to the caller.
    pub async fn refresh_statistics<B>(&mut self, api: &B) -> Result<ProgressSnapshot, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        match self.stats.refresh(api).await {
            Ok(snapshot) => Ok(*snapshot),
            Err(err) => {
                self.notice = Some(Notice::from(&err));
                Err(err)
            }
        }
    }

    pub async fn create<B>(&mut self, api: &B, new_task: NewTask) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let result = self.store.create(api, new_task).await;
        self.settle(api, result).await
    }

    pub async fn edit<B>(&mut self, api: &B, id: TaskId, update: TaskUpdate) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let result = self.store.edit(api, id, update).await;
        self.settle(api, result).await
    }

    pub async fn complete<B>(&mut self, api: &B, id: TaskId) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let result = self.store.complete(api, id).await;
        self.settle(api, result).await
    }

    pub async fn reopen<B>(&mut self, api: &B, id: TaskId) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let result = self.store.reopen(api, id).await;
        self.settle(api, result).await
    }

    pub async fn delete<B>(&mut self, api: &B, id: TaskId) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let result = self.store.delete(api, id).await;
        self.settle(api, result).await
    }

    async fn settle<B, T>(&mut self, api: &B, result: Result<T, AppError>) -> Result<T, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        match result {
            Ok(value) => {
                self.notice = None;
                if let Err(err) = self.stats.refresh_if_changed(api).await {
                    tracing::warn!(code = err.code(), "statistics refresh failed; keeping previous values");
                }
                Ok(value)
            }
            Err(err) => {
                self.notice = Some(Notice::from(&err));
                // A cleared list still counts as a change.
                if let Err(stats_err) = self.stats.refresh_if_changed(api).await {
                    tracing::warn!(code = stats_err.code(), "statistics refresh failed");
                }
                Err(err)
            }
        }
    }
}
