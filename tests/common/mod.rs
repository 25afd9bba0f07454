//! Shared fixtures for the component tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;
use uuid::Uuid;
use wiremock::MockServer;

use taskdesk::{Result, Task, TaskError, TaskService, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    List(Option<TaskStatus>),
    Get(Uuid),
    Create,
    Update(Uuid),
    Delete(Uuid),
}

/// Backend stand-in that keeps tasks in memory and records every call.
#[derive(Default)]
#[allow(dead_code)]
pub struct InMemoryTasks {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    fail_writes: Mutex<bool>,
    fail_reads: Mutex<bool>,
}

#[allow(dead_code)]
impl InMemoryTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let service = Self::default();
        *service.tasks.lock().unwrap() = tasks;
        service
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create | Call::Update(_) | Call::Delete(_)))
            .count()
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn stored(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_writes(&self) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(TaskError::api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "backend unavailable",
            ));
        }
        Ok(())
    }
}

#[allow(dead_code)]
fn not_found(id: Uuid) -> TaskError {
    TaskError::api_error(StatusCode::NOT_FOUND, format!("Task not found with id: {id}"))
}

#[async_trait]
impl TaskService for InMemoryTasks {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        self.record(Call::List(status));
        if *self.fail_reads.lock().unwrap() {
            return Err(TaskError::api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "backend unavailable",
            ));
        }
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: Uuid) -> Result<Task> {
        self.record(Call::Get(id));
        let tasks = self.tasks.lock().unwrap();
        tasks
            .iter()
            .find(|t| t.id == Some(id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create_task(&self, task: &Task) -> Result<Task> {
        self.record(Call::Create);
        self.check_writes()?;
        let mut created = task.clone();
        created.id = Some(Uuid::new_v4());
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: Uuid, task: &Task) -> Result<Task> {
        self.record(Call::Update(id));
        self.check_writes()?;
        let mut tasks = self.tasks.lock().unwrap();
        let existing = tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| not_found(id))?;
        *existing = Task {
            id: Some(id),
            ..task.clone()
        };
        Ok(existing.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        self.record(Call::Delete(id));
        self.check_writes()?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != Some(id));
        if tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[allow(dead_code)]
pub fn stored_task(title: &str, status: TaskStatus) -> Task {
    let mut task = Task::new(title).with_status(status);
    task.id = Some(Uuid::new_v4());
    task
}

#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}
