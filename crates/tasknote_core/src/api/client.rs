use super::{
    AssistantBackend, ChatReply, HealthReply, LoginRequest, PlanReply, RegisterRequest,
    SummaryReply, TaskBackend, TokenResponse, UserProfile,
};
use crate::config::Config;
use crate::error::AppError;
use crate::filter::TaskFilter;
use crate::model::{
    NewTask, PrioritySuggestion, ProgressSnapshot, Task, TaskDraft, TaskId, TaskUpdate,
};
use crate::storage::SessionContext;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin REST client. No retries, no token refresh: every failure goes back to the caller.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionContext) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| AppError::invalid_data(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, AppError> {
        let builder = self.request(Method::POST, "/register")?.json(request);
        self.send_json(builder).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, AppError> {
        let builder = self.request(Method::POST, "/login")?.json(request);
        self.send_json(builder).await
    }

    pub async fn health(&self) -> Result<String, AppError> {
        let builder = self.request(Method::GET, "/health")?;
        let reply: HealthReply = self.send_json(builder).await?;
        Ok(reply.status)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, AppError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("backend request {} {}", method, url);
        let mut builder = self.client.request(method, url);
        if let Some(bearer) = self.session.bearer()? {
            builder = builder.header(AUTHORIZATION, bearer);
        }
        Ok(builder)
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = AppError::from_response(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), code = err.code(), "backend rejected request");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let response = self.dispatch(builder).await?;
        Ok(response.json::<T>().await?)
    }

    async fn patch_task(&self, path: &str) -> Result<Task, AppError> {
        let builder = self.request(Method::PATCH, path)?;
        self.send_json(builder).await
    }
}

#[async_trait]
impl TaskBackend for ApiClient {
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let builder = self.request(Method::GET, "/tasks")?.query(&filter.query());
        self.send_json(builder).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, AppError> {
        let builder = self.request(Method::POST, "/tasks/")?.json(task);
        self.send_json(builder).await
    }

    async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, AppError> {
        let builder = self
            .request(Method::PATCH, &format!("/tasks/{id}"))?
            .json(update);
        self.send_json(builder).await
    }

    async fn complete_task(&self, id: TaskId) -> Result<Task, AppError> {
        self.patch_task(&format!("/tasks/{id}/complete")).await
    }

    async fn reopen_task(&self, id: TaskId) -> Result<Task, AppError> {
        self.patch_task(&format!("/tasks/{id}/reopen")).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        let builder = self.request(Method::DELETE, &format!("/tasks/{id}"))?;
        self.dispatch(builder).await?;
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressSnapshot, AppError> {
        let builder = self.request(Method::GET, "/tasks/progress")?;
        self.send_json(builder).await
    }
}

#[async_trait]
impl AssistantBackend for ApiClient {
    async fn task_summary(&self) -> Result<String, AppError> {
        let builder = self.request(Method::GET, "/ai/task-summary")?;
        let reply: SummaryReply = self.send_json(builder).await?;
        Ok(reply.summary)
    }

    async fn chat(&self, message: &str) -> Result<String, AppError> {
        let builder = self
            .request(Method::POST, "/ai/chat")?
            .json(&serde_json::json!({ "message": message }));
        let reply: ChatReply = self.send_json(builder).await?;
        Ok(reply.reply)
    }

    async fn task_draft(&self, text: &str) -> Result<TaskDraft, AppError> {
        let builder = self
            .request(Method::POST, "/ai/task-draft")?
            .json(&serde_json::json!({ "text": text }));
        self.send_json(builder).await
    }

    async fn priorities(&self) -> Result<PrioritySuggestion, AppError> {
        let builder = self.request(Method::GET, "/ai/priorities")?;
        self.send_json(builder).await
    }

    async fn daily_plan(&self) -> Result<String, AppError> {
        let builder = self.request(Method::GET, "/ai/daily-plan")?;
        let reply: PlanReply = self.send_json(builder).await?;
        Ok(reply.plan)
    }
}
