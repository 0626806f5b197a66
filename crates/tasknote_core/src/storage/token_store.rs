use crate::config;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const SESSION_FILE_NAME: &str = "session.json";
const SESSION_ENV_VAR: &str = "TASKNOTE_SESSION_PATH";

/// Holder of the single bearer credential. Expiry is never checked locally.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Result<Option<String>, AppError>;

    /// Empty or blank tokens are ignored.
    fn save(&self, token: &str) -> Result<(), AppError>;

    fn clear(&self) -> Result<(), AppError>;

    fn is_present(&self) -> bool {
        matches!(self.read(), Ok(Some(token)) if !token.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(session_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn session_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(SESSION_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(config::config_dir()?.join(SESSION_FILE_NAME))
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Result<Option<String>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|err| AppError::io(err.to_string()))?;
        let stored: StoredSession = serde_json::from_str(&content)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;

        if stored.access_token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(stored.access_token))
        }
    }

    fn save(&self, token: &str) -> Result<(), AppError> {
        if token.trim().is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
        }

        let stored = StoredSession {
            access_token: token.to_string(),
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        write_private(&self.path, &content).map_err(|err| AppError::io(err.to_string()))?;

        tracing::debug!(path = %self.path.display(), "saved session token");
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::io(err.to_string())),
        }
    }
}

/// Owner-only from the moment the file exists; an older file is narrowed before it is rewritten.
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        if !token.trim().is_empty() {
            store.replace(Some(token.to_string()));
        }
        store
    }

    /// A panic mid-assignment cannot leave the `Option<String>` half-written, so poison is ignored.
    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace(&self, value: Option<String>) {
        *self.lock() = value;
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Result<Option<String>, AppError> {
        Ok(self.lock().clone())
    }

    fn save(&self, token: &str) -> Result<(), AppError> {
        if token.trim().is_empty() {
            return Ok(());
        }
        self.replace(Some(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.replace(None);
        Ok(())
    }
}

/// Session state threaded explicitly through everything that talks to the backend.
#[derive(Clone)]
pub struct SessionContext {
    tokens: Arc<dyn TokenStore>,
}

impl SessionContext {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn bearer(&self) -> Result<Option<String>, AppError> {
        Ok(self
            .tokens
            .read()?
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}")))
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.tokens.is_present())
            .finish()
    }
}
