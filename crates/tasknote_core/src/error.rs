use serde_json::Value;

pub const SERVER_FAULT_MESSAGE: &str = "Server error. Please try again later.";
pub const CLIENT_FAULT_MESSAGE: &str = "Invalid data. Please check your input.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    #[error("unreachable - {0}")]
    Unreachable(String),
    #[error("rejected - {detail}")]
    Rejected { status: u16, detail: String },
    #[error("unauthorized - {0}")]
    Unauthorized(String),
    #[error("server_error - {}", SERVER_FAULT_MESSAGE)]
    ServerFault { status: u16 },
    #[error("client_error - {}", CLIENT_FAULT_MESSAGE)]
    ClientFault { status: u16 },
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn unreachable<M: Into<String>>(message: M) -> Self {
        Self::Unreachable(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Unreachable(_) => "unreachable",
            Self::Rejected { .. } => "rejected",
            Self::Unauthorized(_) => "unauthorized",
            Self::ServerFault { .. } => "server_error",
            Self::ClientFault { .. } => "client_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::Unreachable(message)
            | Self::Unauthorized(message) => message,
            Self::Rejected { detail, .. } => detail,
            Self::ServerFault { .. } => SERVER_FAULT_MESSAGE,
            Self::ClientFault { .. } => CLIENT_FAULT_MESSAGE,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::Rejected { status: 401, .. }
        )
    }

    /// Classifies a non-2xx response.
    ///
    /// A usable `detail` or `message` field wins over the status code, so a
    /// 401 carrying "Invalid credentials" surfaces that text verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Some(detail) = extract_detail(body) {
            return Self::Rejected { status, detail };
        }

        match status {
            401 | 403 => Self::Unauthorized("not authenticated".to_string()),
            500..=599 => Self::ServerFault { status },
            _ => Self::ClientFault { status },
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_data(err.to_string())
        } else {
            Self::unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_data(err.to_string())
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    let detail = payload.get("detail").or_else(|| payload.get("message"))?;

    match detail {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
