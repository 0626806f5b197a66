//! Plain and JSON output for the terminal front-end.

use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasknote_core::assistant::{Message, Sender};
use tasknote_core::config::Palette;
use tasknote_core::model::{PrioritySuggestion, ProgressSnapshot, Task, TaskId};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: TaskId,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn due_label(task: &Task) -> String {
    match task.due_day() {
        Ok(Some(day)) => day.to_string(),
        Ok(None) => "-".to_string(),
        Err(_) => task.due_date.clone().unwrap_or_else(|| "-".to_string()),
    }
}

pub fn tasks_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No notes.".to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id,
        title: task.title.clone(),
        status: task.status.label(),
        due: due_label(task),
        description: task.description.clone().unwrap_or_default(),
    });
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

pub fn task_json(task: &Task) -> Value {
    json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "status": task.status,
        "due_date": task.due_date,
        "created_at": task.created_at,
        "updated_at": task.updated_at,
    })
}

pub fn tasks_json(tasks: &[Task]) -> Value {
    Value::Array(tasks.iter().map(task_json).collect())
}

pub fn task_line(verb: &str, task: &Task, palette: &Palette) -> String {
    format!("{verb}: {} ({})", palette.accentize(&task.title), task.id)
}

pub fn stats_lines(snapshot: &ProgressSnapshot, palette: &Palette) -> Vec<String> {
    vec![
        format!("Total: {}", snapshot.total_tasks),
        format!("Done: {}", snapshot.completed_tasks),
        format!("Pending: {}", snapshot.pending),
        palette.accentize(&format!("Progress: {}%", snapshot.display_percentage())),
    ]
}

pub fn stats_json(snapshot: &ProgressSnapshot) -> Value {
    json!({
        "total_tasks": snapshot.total_tasks,
        "completed_tasks": snapshot.completed_tasks,
        "pending": snapshot.pending,
        "completion_percentage": snapshot.display_percentage(),
    })
}

pub fn message_line(message: &Message, palette: &Palette) -> String {
    match message.sender {
        Sender::User => format!("{} {}", palette.mutedize("you>"), message.text),
        Sender::Assistant => format!("{} {}", palette.accentize("assistant>"), message.text),
    }
}

pub fn priorities_lines(priorities: &PrioritySuggestion) -> Vec<String> {
    if priorities.suggestions.is_empty() {
        return vec!["No pending notes.".to_string()];
    }

    let mut lines: Vec<String> = priorities
        .suggestions
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{}. {title}", index + 1))
        .collect();
    if !priorities.reasoning.is_empty() {
        lines.push(String::new());
        lines.push(priorities.reasoning.clone());
    }
    lines
}
