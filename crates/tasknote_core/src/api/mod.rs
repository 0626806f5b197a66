//! Backend REST surface and the seams the stores are written against.

mod client;

pub use client::ApiClient;

use crate::error::AppError;
use crate::filter::TaskFilter;
use crate::model::{NewTask, PrioritySuggestion, ProgressSnapshot, Task, TaskDraft, TaskId, TaskUpdate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Task endpoints consumed by the collection store and the statistics view.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError>;

    async fn create_task(&self, task: &NewTask) -> Result<Task, AppError>;

    async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, AppError>;

    async fn complete_task(&self, id: TaskId) -> Result<Task, AppError>;

    async fn reopen_task(&self, id: TaskId) -> Result<Task, AppError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError>;

    async fn progress(&self) -> Result<ProgressSnapshot, AppError>;
}

/// Stateless assistant endpoints. All generation happens server-side.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn task_summary(&self) -> Result<String, AppError>;

    async fn chat(&self, message: &str) -> Result<String, AppError>;

    async fn task_draft(&self, text: &str) -> Result<TaskDraft, AppError>;

    async fn priorities(&self) -> Result<PrioritySuggestion, AppError>;

    async fn daily_plan(&self) -> Result<String, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryReply {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanReply {
    pub plan: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthReply {
    pub status: String,
}
