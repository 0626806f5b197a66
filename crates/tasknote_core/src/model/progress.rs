use serde::{Deserialize, Serialize};

/// Aggregate returned by `GET /tasks/progress`. Always fetched, never derived from a filtered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending: u64,
    pub completion_percentage: f64,
}

impl ProgressSnapshot {
    pub fn display_percentage(&self) -> u32 {
        self.completion_percentage.round().clamp(0.0, 100.0) as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritySuggestion {
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub total_pending: u64,
}
