//! Local mirror of the backend task list for the active filter.
//!
//! Every mutation is a single remote call followed by reconciliation against the
//! record the server returns. Nothing changes locally until that call succeeds.

use crate::api::TaskBackend;
use crate::error::AppError;
use crate::filter::TaskFilter;
use crate::model::{NewTask, Task, TaskId, TaskStatus, TaskUpdate};
use tokio::sync::watch;

/// Published after every change to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    Opened,
    Cleared(TaskFilter),
    Replaced { filter: TaskFilter, len: usize },
    Appended(TaskId),
    Updated(TaskId),
    Removed(TaskId),
}

/// Issued by [`TaskStore::begin_fetch`]; a late response is applied only while its filter is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    filter: TaskFilter,
}

impl FetchTicket {
    pub fn filter(&self) -> TaskFilter {
        self.filter
    }
}

#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    active_filter: TaskFilter,
    loaded: bool,
    changes: watch::Sender<CollectionEvent>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(CollectionEvent::Opened);
        Self {
            tasks: Vec::new(),
            active_filter: TaskFilter::All,
            loaded: false,
            changes,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn active_filter(&self) -> TaskFilter {
        self.active_filter
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionEvent> {
        self.changes.subscribe()
    }

    /// Switches to `filter` and discards the current collection before any response arrives.
    pub fn begin_fetch(&mut self, filter: TaskFilter) -> FetchTicket {
        self.active_filter = filter;
        self.tasks.clear();
        self.loaded = false;
        self.publish(CollectionEvent::Cleared(filter));
        FetchTicket { filter }
    }

    /// Replaces the collection with a fetched list. Returns `false` when the
    /// ticket's filter is no longer selected and the response was dropped.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, tasks: Vec<Task>) -> bool {
        if ticket.filter != self.active_filter {
            tracing::debug!(
                stale = %ticket.filter,
                active = %self.active_filter,
                "discarding response for inactive filter"
            );
            return false;
        }

        let len = tasks.len();
        self.tasks = tasks;
        self.loaded = true;
        self.publish(CollectionEvent::Replaced {
            filter: ticket.filter,
            len,
        });
        true
    }

    pub async fn load<B>(&mut self, api: &B, filter: TaskFilter) -> Result<bool, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let ticket = self.begin_fetch(filter);
        let tasks = api.list_tasks(filter).await?;
        Ok(self.apply_fetch(ticket, tasks))
    }

    pub async fn create<B>(&mut self, api: &B, new_task: NewTask) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let payload = NewTask {
            title: require_title(&new_task.title)?,
            description: normalize_description(new_task.description),
            due_date: new_task.due_date,
        };

        let created = api.create_task(&payload).await?;
        tracing::info!(id = created.id, "task created");
        self.tasks.push(created.clone());
        self.publish(CollectionEvent::Appended(created.id));
        Ok(created)
    }

    pub async fn edit<B>(&mut self, api: &B, id: TaskId, update: TaskUpdate) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        let payload = TaskUpdate {
            title: require_title(&update.title)?,
            description: normalize_description(update.description),
            due_date: update.due_date,
        };
        self.require_task(id)?;

        let updated = api.update_task(id, &payload).await?;
        self.reconcile(updated.clone());
        Ok(updated)
    }

    pub async fn complete<B>(&mut self, api: &B, id: TaskId) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        if self.require_task(id)?.status != TaskStatus::Pending {
            return Err(AppError::invalid_input("task already completed"));
        }

        let updated = api.complete_task(id).await?;
        self.reconcile(updated.clone());
        Ok(updated)
    }

    pub async fn reopen<B>(&mut self, api: &B, id: TaskId) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        if self.require_task(id)?.status != TaskStatus::Completed {
            return Err(AppError::invalid_input("task is not completed"));
        }

        let updated = api.reopen_task(id).await?;
        self.reconcile(updated.clone());
        Ok(updated)
    }

    /// Removes a task after the server confirms. Asking the user first is the caller's job.
    pub async fn delete<B>(&mut self, api: &B, id: TaskId) -> Result<Task, AppError>
    where
        B: TaskBackend + ?Sized,
    {
        self.require_task(id)?;

        api.delete_task(id).await?;

        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::invalid_input("task not found"))?;
        let removed = self.tasks.remove(index);
        tracing::info!(id, "task deleted");
        self.publish(CollectionEvent::Removed(id));
        Ok(removed)
    }

    fn require_task(&self, id: TaskId) -> Result<&Task, AppError> {
        self.get(id)
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    /// Replaces the record with the same identity. Last write wins: an older
    /// server timestamp is still applied, but logged.
    fn reconcile(&mut self, updated: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|task| task.id == updated.id) else {
            tracing::debug!(id = updated.id, "reconciled task no longer in collection");
            return false;
        };

        if let (Some(local), Some(remote)) = (slot.updated_at.as_deref(), updated.updated_at.as_deref())
            && remote < local
        {
            tracing::warn!(
                id = updated.id,
                local,
                remote,
                "server record is older than local copy; another session may have written it"
            );
        }

        let id = updated.id;
        *slot = updated;
        self.publish(CollectionEvent::Updated(id));
        true
    }

    fn publish(&self, event: CollectionEvent) {
        self.changes.send_replace(event);
    }
}

pub fn require_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Title cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
