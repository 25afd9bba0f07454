//! The list component: holds the last loaded tasks, owns the modal that is
//! currently open, and reloads after every successful write.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::client::TaskService;
use crate::form::{SubmitOutcome, TaskForm};
use crate::task::{Task, TaskStatus};

pub const SUCCESS_DURATION: Duration = Duration::from_secs(3);
pub const ERROR_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Displaying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Form(TaskForm),
    ConfirmDelete(Task),
}

#[derive(Debug, Default)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub filter: Option<TaskStatus>,
    pub load_state: LoadState,
    pub selected: usize,
    pub modal: Option<Modal>,
    pub notification: Option<Notification>,
}

impl TaskList {
    pub fn new(filter: Option<TaskStatus>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub async fn load_tasks<S: TaskService + ?Sized>(&mut self, service: &S) {
        self.load_state = LoadState::Loading;
        match service.list_tasks(self.filter).await {
            Ok(tasks) => {
                debug!(count = tasks.len(), filter = ?self.filter, "tasks loaded");
                self.tasks = tasks;
                self.clamp_selection();
            }
            Err(err) => {
                error!(error = %err, "failed to load tasks");
                self.show_error("Error loading tasks");
            }
        }
        self.load_state = LoadState::Displaying;
    }

    /// Reload after a write: drops the status filter and fetches every task.
    pub async fn reload_all<S: TaskService + ?Sized>(&mut self, service: &S) {
        self.filter = None;
        self.load_tasks(service).await;
    }

    pub async fn set_filter<S: TaskService + ?Sized>(
        &mut self,
        filter: Option<TaskStatus>,
        service: &S,
    ) {
        self.filter = filter;
        self.selected = 0;
        self.load_tasks(service).await;
    }

    /// All -> TODO -> IN_PROGRESS -> COMPLETED -> CANCELLED -> All.
    pub async fn cycle_filter<S: TaskService + ?Sized>(&mut self, service: &S) {
        let next = match self.filter {
            None => Some(TaskStatus::ALL[0]),
            Some(TaskStatus::Cancelled) => None,
            Some(status) => Some(status.next()),
        };
        self.set_filter(next, service).await;
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
    }

    /// Opens the form: create mode without a task, edit mode with one.
    pub fn open_task_form(&mut self, task: Option<&Task>) {
        let form = match task {
            Some(task) => TaskForm::edit(task),
            None => TaskForm::new(),
        };
        self.modal = Some(Modal::Form(form));
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match self.modal.as_mut() {
            Some(Modal::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn close_form(&mut self) {
        if matches!(self.modal, Some(Modal::Form(_))) {
            self.modal = None;
        }
    }

    /// Runs the open form's submit protocol. Returns true when the modal
    /// closed with a saved task.
    pub async fn submit_form<S: TaskService + ?Sized>(&mut self, service: &S) -> bool {
        let Some(form) = self.form_mut() else {
            return false;
        };
        let was_edit = form.is_edit_mode();
        match form.submit(service).await {
            SubmitOutcome::Saved(_) => {
                self.modal = None;
                self.on_form_closed(true, was_edit, service).await;
                true
            }
            SubmitOutcome::Invalid | SubmitOutcome::Failed(_) => false,
        }
    }

    /// Called with the modal's result once it has closed.
    pub async fn on_form_closed<S: TaskService + ?Sized>(
        &mut self,
        saved: bool,
        was_edit: bool,
        service: &S,
    ) {
        if !saved {
            return;
        }
        self.reload_all(service).await;
        self.show_success(if was_edit { "Task updated" } else { "Task created" });
    }

    pub fn request_delete(&mut self, task: &Task) {
        self.modal = Some(Modal::ConfirmDelete(task.clone()));
    }

    pub async fn resolve_delete<S: TaskService + ?Sized>(&mut self, confirmed: bool, service: &S) {
        let Some(Modal::ConfirmDelete(task)) = self.modal.take() else {
            return;
        };
        if !confirmed {
            debug!(id = ?task.id, "delete declined");
            return;
        }
        let Some(id) = task.id else {
            warn!(title = %task.title, "cannot delete a task without an id");
            self.show_error("Error deleting task");
            return;
        };
        match service.delete_task(id).await {
            Ok(()) => {
                info!(%id, "task deleted");
                self.reload_all(service).await;
                self.show_success("Task deleted");
            }
            Err(err) => {
                error!(%id, error = %err, "error deleting task");
                self.show_error("Error deleting task");
            }
        }
    }

    pub fn show_success(&mut self, message: &str) {
        self.notify(message, NotificationKind::Success, SUCCESS_DURATION);
    }

    pub fn show_error(&mut self, message: &str) {
        self.notify(message, NotificationKind::Error, ERROR_DURATION);
    }

    fn notify(&mut self, message: &str, kind: NotificationKind, duration: Duration) {
        self.notification = Some(Notification {
            message: message.to_string(),
            kind,
            expires_at: Instant::now() + duration,
        });
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now >= n.expires_at)
        {
            self.notification = None;
        }
    }
}
