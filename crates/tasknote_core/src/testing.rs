//! In-memory backend used by unit tests.

use crate::api::{AssistantBackend, TaskBackend};
use crate::error::AppError;
use crate::filter::TaskFilter;
use crate::model::{
    NewTask, PrioritySuggestion, ProgressSnapshot, Task, TaskDraft, TaskId, TaskStatus, TaskUpdate,
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

pub const TODAY: &str = "2026-10-19";

#[derive(Default)]
struct FakeState {
    tasks: Vec<Task>,
    next_id: TaskId,
    clock: u32,
    calls: Vec<String>,
    fail_next: Option<AppError>,
    fail_on: Option<(String, AppError)>,
    assistant_down: bool,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            state.next_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
            state.tasks = tasks;
        }
        backend
    }

    pub fn seed(&self, task: Task) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(task.id);
        state.tasks.push(task);
    }

    pub fn fail_next(&self, err: AppError) {
        self.lock().fail_next = Some(err);
    }

    /// Fails the next call whose name starts with `prefix`.
    pub fn fail_on(&self, prefix: &str, err: AppError) {
        self.lock().fail_on = Some((prefix.to_string(), err));
    }

    pub fn set_assistant_down(&self, down: bool) {
        self.lock().assistant_down = down;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.lock().calls.iter().filter(|call| call.starts_with(name)).count()
    }

    pub fn server_task(&self, id: TaskId) -> Option<Task> {
        self.lock().tasks.iter().find(|task| task.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn enter(&self, call: String) -> Result<MutexGuard<'_, FakeState>, AppError> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next.take() {
            state.calls.push(call);
            return Err(err);
        }
        if state
            .fail_on
            .as_ref()
            .is_some_and(|(prefix, _)| call.starts_with(prefix.as_str()))
            && let Some((_, err)) = state.fail_on.take()
        {
            state.calls.push(call);
            return Err(err);
        }
        state.calls.push(call);
        Ok(state)
    }
}

pub fn task(id: TaskId, title: &str, status: TaskStatus, due_date: Option<&str>) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        status,
        due_date: due_date.map(|day| format!("{day}T00:00:00")),
        created_at: Some("2026-10-01T08:00:00".to_string()),
        updated_at: Some("2026-10-01T08:00:00".to_string()),
    }
}

fn stamp(state: &mut FakeState) -> String {
    state.clock += 1;
    format!("2026-10-19T09:{:02}:00", state.clock % 60)
}

fn matches_filter(task: &Task, filter: TaskFilter) -> bool {
    let day = match task.due_date.as_deref() {
        Some(value) => &value[..10],
        None => return matches!(filter, TaskFilter::All),
    };
    match filter {
        TaskFilter::All => true,
        TaskFilter::Today => day == TODAY,
        TaskFilter::Overdue => day < TODAY,
        TaskFilter::Upcoming(_) => day > TODAY,
    }
}

fn not_found() -> AppError {
    AppError::Rejected {
        status: 404,
        detail: "Task not found".to_string(),
    }
}

#[async_trait]
impl TaskBackend for FakeBackend {
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let state = self.enter(format!("list:{}", filter.name()))?;
        Ok(state
            .tasks
            .iter()
            .filter(|task| matches_filter(task, filter))
            .cloned()
            .collect())
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, AppError> {
        let mut state = self.enter("create".to_string())?;
        state.next_id += 1;
        let now = stamp(&mut state);
        let created = Task {
            id: state.next_id,
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            status: TaskStatus::Pending,
            due_date: new_task.due_date.clone(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, AppError> {
        let mut state = self.enter(format!("update:{id}"))?;
        let now = stamp(&mut state);
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(not_found)?;
        task.title = update.title.clone();
        task.description = update.description.clone();
        task.due_date = update.due_date.clone();
        task.updated_at = Some(now);
        Ok(task.clone())
    }

    async fn complete_task(&self, id: TaskId) -> Result<Task, AppError> {
        let mut state = self.enter(format!("complete:{id}"))?;
        let now = stamp(&mut state);
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(not_found)?;
        task.status = TaskStatus::Completed;
        task.updated_at = Some(now);
        Ok(task.clone())
    }

    async fn reopen_task(&self, id: TaskId) -> Result<Task, AppError> {
        let mut state = self.enter(format!("reopen:{id}"))?;
        let now = stamp(&mut state);
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(not_found)?;
        task.status = TaskStatus::Pending;
        task.updated_at = Some(now);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        let mut state = self.enter(format!("delete:{id}"))?;
        let index = state
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(not_found)?;
        state.tasks.remove(index);
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressSnapshot, AppError> {
        let state = self.enter("progress".to_string())?;
        let total = state.tasks.len() as u64;
        let completed = state
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Completed)
            .count() as u64;
        let percentage = if total > 0 {
            (completed * 100 / total) as f64
        } else {
            0.0
        };
        Ok(ProgressSnapshot {
            total_tasks: total,
            completed_tasks: completed,
            pending: total - completed,
            completion_percentage: percentage,
        })
    }
}

#[async_trait]
impl AssistantBackend for FakeBackend {
    async fn task_summary(&self) -> Result<String, AppError> {
        let state = self.enter("summary".to_string())?;
        if state.assistant_down {
            return Err(AppError::unreachable("connection refused"));
        }
        Ok(format!("You have {} notes.", state.tasks.len()))
    }

    async fn chat(&self, message: &str) -> Result<String, AppError> {
        let state = self.enter(format!("chat:{message}"))?;
        if state.assistant_down {
            return Err(AppError::unreachable("connection refused"));
        }
        Ok(format!("echo: {message}"))
    }

    async fn task_draft(&self, text: &str) -> Result<TaskDraft, AppError> {
        let state = self.enter(format!("draft:{text}"))?;
        if state.assistant_down {
            return Err(AppError::ServerFault { status: 500 });
        }
        Ok(TaskDraft {
            title: text.trim().to_string(),
            description: None,
            due_date: Some(format!("{TODAY}T00:00:00")),
            confidence: Some(0.9),
        })
    }

    async fn priorities(&self) -> Result<PrioritySuggestion, AppError> {
        let state = self.enter("priorities".to_string())?;
        let pending: Vec<String> = state
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Pending)
            .map(|task| task.title.clone())
            .collect();
        Ok(PrioritySuggestion {
            total_pending: pending.len() as u64,
            suggestions: pending,
            reasoning: "earliest due first".to_string(),
        })
    }

    async fn daily_plan(&self) -> Result<String, AppError> {
        self.enter("plan".to_string())?;
        Ok("Start with the overdue notes.".to_string())
    }
}
