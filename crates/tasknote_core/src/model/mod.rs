mod progress;
mod task;

pub use progress::{PrioritySuggestion, ProgressSnapshot};
pub use task::{NewTask, Task, TaskDraft, TaskId, TaskStatus, TaskUpdate, due_date_from_day, parse_due_day};
