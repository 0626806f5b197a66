use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

pub type TaskId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Calendar day of the due date, ignoring any time or offset the backend sent.
    pub fn due_day(&self) -> Result<Option<Date>, AppError> {
        match self.due_date.as_deref() {
            Some(value) => parse_due_day(value).map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Body of `POST /tasks/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// Body of `PATCH /tasks/{id}`; the backend overwrites all three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// Reply of `POST /ai/task-draft`. Nothing is persisted until the draft is submitted as a `NewTask`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl TaskDraft {
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        let due_date = match self.due_date.as_deref() {
            Some(value) if !value.trim().is_empty() => Some(due_date_from_day(parse_due_day(value)?)?),
            _ => None,
        };
        Ok(NewTask {
            title: self.title,
            description: self.description,
            due_date,
        })
    }
}

pub fn parse_due_day(value: &str) -> Result<Date, AppError> {
    let trimmed = value.trim();
    let day_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(day_part, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("due date must be YYYY-MM-DD"))
}

/// Midnight UTC of `day`, in the ISO-8601 form the backend accepts.
pub fn due_date_from_day(day: Date) -> Result<String, AppError> {
    let formatted = day
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    Ok(format!("{formatted}T00:00:00Z"))
}
