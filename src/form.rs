//! The create/edit modal: a draft bound to title, description, status and
//! due date, gated on title validation before anything is sent.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info};
use uuid::Uuid;

use crate::client::TaskService;
use crate::error::TaskError;
use crate::task::{format_due_date, parse_due_date, validate_title, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Status,
    DueDate,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::DueDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Status => "Status",
            FormField::DueDate => "Due date",
        }
    }

    fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the opener should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blocked client-side; nothing was sent.
    Invalid,
    Saved(Task),
    /// The request failed; the form stays open.
    Failed(TaskError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: String,
    pub focused: FormField,
    pub error_message: Option<String>,
    original_id: Option<Uuid>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Blank draft for create mode.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo,
            due_date: String::new(),
            focused: FormField::Title,
            error_message: None,
            original_id: None,
        }
    }

    /// Draft pre-filled from an existing task, in edit mode.
    pub fn edit(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date.as_ref().map(format_due_date).unwrap_or_default(),
            focused: FormField::Title,
            error_message: None,
            original_id: task.id,
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.original_id.is_some()
    }

    pub fn original_id(&self) -> Option<Uuid> {
        self.original_id
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.focused = self.focused.next(),
            KeyCode::BackTab | KeyCode::Up => self.focused = self.focused.previous(),
            KeyCode::Left if self.focused == FormField::Status => {
                self.status = self.status.previous();
            }
            KeyCode::Right | KeyCode::Char(' ') if self.focused == FormField::Status => {
                self.status = self.status.next();
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_text_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = self.focused_text_mut() {
                    field.push(c);
                }
            }
            _ => {}
        }
        FormAction::None
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Status => None,
        }
    }

    /// Builds the task to send, carrying the original id in edit mode.
    pub fn draft(&self) -> Result<Task, TaskError> {
        validate_title(&self.title)?;
        let due_date = parse_due_date(&self.due_date)?;
        Ok(Task {
            id: self.original_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            due_date,
            ..Task::default()
        })
    }

    pub fn is_valid(&self) -> bool {
        self.draft().is_ok()
    }

    pub async fn submit<S: TaskService + ?Sized>(&mut self, service: &S) -> SubmitOutcome {
        let task = match self.draft() {
            Ok(task) => task,
            Err(err) => {
                self.error_message = Some(validation_message(&err));
                return SubmitOutcome::Invalid;
            }
        };
        self.error_message = None;

        let result = match self.original_id {
            Some(id) => service.update_task(id, &task).await,
            None => service.create_task(&task).await,
        };

        match result {
            Ok(saved) => {
                info!(id = ?saved.id, edit = self.is_edit_mode(), "task saved");
                SubmitOutcome::Saved(saved)
            }
            Err(err) => {
                error!(error = %err, "error saving task");
                SubmitOutcome::Failed(err)
            }
        }
    }
}

fn validation_message(err: &TaskError) -> String {
    match err {
        TaskError::Validation(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ValidationError;

    fn press(form: &mut TaskForm, code: KeyCode) -> FormAction {
        form.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(form: &mut TaskForm, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_new_form_is_blank_create_mode() {
        let form = TaskForm::new();
        assert!(form.title.is_empty());
        assert_eq!(form.status, TaskStatus::Todo);
        assert_eq!(form.focused, FormField::Title);
        assert!(!form.is_edit_mode());
        assert!(!form.is_valid());
    }

    #[test]
    fn test_edit_prefills_from_task() {
        let mut task = Task::new("Write spec").with_status(TaskStatus::InProgress);
        task.id = Some(Uuid::new_v4());
        task.description = "first draft".to_string();
        task.due_date = parse_due_date("2024-05-01").unwrap();

        let form = TaskForm::edit(&task);
        assert!(form.is_edit_mode());
        assert_eq!(form.original_id(), task.id);
        assert_eq!(form.title, "Write spec");
        assert_eq!(form.due_date, "2024-05-01");
        assert_eq!(form.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = TaskForm::new();
        type_text(&mut form, "Buy milk");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "2 litres");
        press(&mut form, KeyCode::Backspace);
        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.description, "2 litre");
    }

    #[test]
    fn test_status_field_cycles_instead_of_typing() {
        let mut form = TaskForm::new();
        press(&mut form, KeyCode::Tab);
        press(&mut form, KeyCode::Tab);
        assert_eq!(form.focused, FormField::Status);
        press(&mut form, KeyCode::Right);
        assert_eq!(form.status, TaskStatus::InProgress);
        press(&mut form, KeyCode::Left);
        press(&mut form, KeyCode::Left);
        assert_eq!(form.status, TaskStatus::Cancelled);
        type_text(&mut form, "x");
        assert!(form.title.is_empty() && form.description.is_empty());
    }

    #[test]
    fn test_focus_wraps_backwards() {
        let mut form = TaskForm::new();
        press(&mut form, KeyCode::BackTab);
        assert_eq!(form.focused, FormField::DueDate);
    }

    #[test]
    fn test_enter_and_esc_map_to_actions() {
        let mut form = TaskForm::new();
        assert_eq!(press(&mut form, KeyCode::Enter), FormAction::Submit);
        assert_eq!(press(&mut form, KeyCode::Esc), FormAction::Cancel);
        assert_eq!(press(&mut form, KeyCode::Char('a')), FormAction::None);
    }

    #[test]
    fn test_draft_carries_original_id() {
        let mut task = Task::new("Ship it");
        task.id = Some(Uuid::new_v4());
        let mut form = TaskForm::edit(&task);
        form.status = TaskStatus::Completed;

        let draft = form.draft().unwrap();
        assert_eq!(draft.id, task.id);
        assert_eq!(draft.status, TaskStatus::Completed);
    }

    #[test]
    fn test_draft_rejects_bad_due_date() {
        let mut form = TaskForm::new();
        form.title = "Ship it".to_string();
        form.due_date = "next week".to_string();
        assert!(matches!(
            form.draft(),
            Err(TaskError::Validation(ValidationError::InvalidDueDate(_)))
        ));
    }
}
