use crate::config::DEFAULT_UPCOMING_DAYS;
use crate::error::AppError;
use std::fmt;

/// Server-evaluated predicate selecting which tasks `GET /tasks` returns.
/// Membership is never re-derived locally; the backend clock decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    #[default]
    All,
    Today,
    Overdue,
    Upcoming(u32),
}

impl TaskFilter {
    pub fn upcoming() -> Self {
        Self::Upcoming(DEFAULT_UPCOMING_DAYS)
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::All => Vec::new(),
            Self::Today => vec![("today", "true".to_string())],
            Self::Overdue => vec![("overdue", "true".to_string())],
            Self::Upcoming(days) => vec![("upcoming", days.to_string())],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Overdue => "overdue",
            Self::Upcoming(_) => "upcoming",
        }
    }

    /// Parses `all`, `today`, `overdue`, `upcoming` or `upcoming:<days>`.
    pub fn parse(raw: &str, upcoming_days: u32) -> Result<Self, AppError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let (name, days) = match normalized.split_once(':') {
            Some((name, days)) => (name.trim(), Some(days.trim())),
            None => (normalized.as_str(), None),
        };

        match (name, days) {
            ("" | "all", None) => Ok(Self::All),
            ("today", None) => Ok(Self::Today),
            ("overdue", None) => Ok(Self::Overdue),
            ("upcoming", None) => Ok(Self::Upcoming(upcoming_days.max(1))),
            ("upcoming", Some(days)) => match days.parse::<u32>() {
                Ok(days) if days > 0 => Ok(Self::Upcoming(days)),
                _ => Err(AppError::invalid_input(
                    "upcoming days must be a positive number",
                )),
            },
            _ => Err(AppError::invalid_input(format!("unknown filter '{raw}'"))),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upcoming(days) => write!(f, "upcoming ({days} days)"),
            other => f.write_str(other.name()),
        }
    }
}
