//! REST client for the `/api/tasks` resource.

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskStatus};

pub const TASKS_PATH: &str = "api/tasks";

/// The five calls the list and form components make.
///
/// Each call is one request; nothing is retried or cached.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// GET /api/tasks[?status=STATUS]
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>>;

    /// GET /api/tasks/{id}
    async fn get_task(&self, id: Uuid) -> Result<Task>;

    /// POST /api/tasks
    async fn create_task(&self, task: &Task) -> Result<Task>;

    /// PUT /api/tasks/{id}
    async fn update_task(&self, id: Uuid, task: &Task) -> Result<Task>;

    /// DELETE /api/tasks/{id}
    async fn delete_task(&self, id: Uuid) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct TaskClient {
    http_client: Client,
    tasks_url: Url,
}

impl TaskClient {
    /// Builds a client for the backend at `base_url`; the resource path is
    /// appended to whatever path the base URL already has.
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = Client::builder().cookie_store(true).build()?;
        Self::with_client(http_client, base_url)
    }

    pub fn with_client(http_client: Client, base_url: &str) -> Result<Self> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let tasks_url = Url::parse(&base)?.join(TASKS_PATH)?;
        if tasks_url.cannot_be_a_base() {
            return Err(TaskError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http_client,
            tasks_url,
        })
    }

    pub fn tasks_url(&self) -> &Url {
        &self.tasks_url
    }

    fn task_url(&self, id: Uuid) -> Result<Url> {
        let mut url = self.tasks_url.clone();
        url.path_segments_mut()
            .map_err(|_| TaskError::InvalidBaseUrl(self.tasks_url.to_string()))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = method.as_str(), url = url.as_str(), "task api request");
        self.http_client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(%status, "task api rejected request");
            return Err(TaskError::api_error(status, message));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TaskService for TaskClient {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut builder = self.request(Method::GET, self.tasks_url.clone());
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        self.send_json(builder).await
    }

    async fn get_task(&self, id: Uuid) -> Result<Task> {
        let builder = self.request(Method::GET, self.task_url(id)?);
        self.send_json(builder).await
    }

    async fn create_task(&self, task: &Task) -> Result<Task> {
        let builder = self.request(Method::POST, self.tasks_url.clone()).json(task);
        self.send_json(builder).await
    }

    async fn update_task(&self, id: Uuid, task: &Task) -> Result<Task> {
        let builder = self.request(Method::PUT, self.task_url(id)?).json(task);
        self.send_json(builder).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        let builder = self.request(Method::DELETE, self.task_url(id)?);
        self.send(builder).await?;
        Ok(())
    }
}
