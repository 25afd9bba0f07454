use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Longest title the backend accepts.
pub const TITLE_MAX_LEN: usize = 255;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    // Server-owned timestamps, read but never sent back.
    #[serde(default, skip_serializing)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks the title the same way the form does before submitting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }

    /// Short id prefix for list rows.
    pub fn short_id(&self) -> String {
        match self.id {
            Some(id) => id.simple().to_string()[..8].to_string(),
            None => "new".to_string(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// Display colour role for a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Primary,
    Accent,
    Warn,
}

pub fn status_color(status: TaskStatus) -> StatusColor {
    match status {
        TaskStatus::Todo => StatusColor::Primary,
        TaskStatus::InProgress => StatusColor::Accent,
        TaskStatus::Completed => StatusColor::Primary,
        TaskStatus::Cancelled => StatusColor::Warn,
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be at most {max} characters (got {len})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Due date '{0}' is not a date (expected YYYY-MM-DD)")]
    InvalidDueDate(String),

    #[error("Unknown status '{0}'")]
    UnknownStatus(String),
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    // Browser and backend both measure UTF-16 code units.
    let len = title.encode_utf16().count();
    if len > TITLE_MAX_LEN {
        return Err(ValidationError::TitleTooLong {
            len,
            max: TITLE_MAX_LEN,
        });
    }
    Ok(())
}

/// Parses the due date as typed by a user: a bare date (midnight) or a
/// full local date-time. Empty input means no due date.
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDateTime>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Some(datetime));
        }
    }
    Err(ValidationError::InvalidDueDate(input.to_string()))
}

/// Inverse of `parse_due_date` for pre-filling the form.
pub fn format_due_date(due_date: &NaiveDateTime) -> String {
    if due_date.time() == chrono::NaiveTime::MIN {
        due_date.format("%Y-%m-%d").to_string()
    } else {
        due_date.format("%Y-%m-%dT%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_backend_strings() {
        let json = serde_json::to_string(&TaskStatus::ALL).unwrap();
        assert_eq!(json, r#"["TODO","IN_PROGRESS","COMPLETED","CANCELLED"]"#);
    }

    #[test]
    fn test_task_deserializes_backend_payload() {
        let payload = r#"{
            "id": "6f1c2d3e-4b5a-4c7d-8e9f-0a1b2c3d4e5f",
            "title": "Write spec",
            "description": null,
            "status": "IN_PROGRESS",
            "dueDate": "2024-05-01T10:30:00",
            "createdAt": "2024-04-01T08:00:00.123",
            "updatedAt": "2024-04-02T08:00:00"
        }"#;
        let task: Task = serde_json::from_str(payload).unwrap();
        assert!(task.id.is_some());
        assert_eq!(task.description, "");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(
            task.due_date.map(|d| d.to_string()),
            Some("2024-05-01 10:30:00".to_string())
        );
        assert!(task.created_at.is_some());
    }

    #[test]
    fn test_new_task_omits_id_and_server_fields() {
        let task = Task::new("Write spec");
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("createdAt").is_none());
        assert_eq!(value["status"], "TODO");
        assert_eq!(value["dueDate"], serde_json::Value::Null);
    }

    #[test]
    fn test_status_color_lookup() {
        assert_eq!(status_color(TaskStatus::Todo), StatusColor::Primary);
        assert_eq!(status_color(TaskStatus::InProgress), StatusColor::Accent);
        assert_eq!(status_color(TaskStatus::Completed), StatusColor::Primary);
        assert_eq!(status_color(TaskStatus::Cancelled), StatusColor::Warn);
    }

    #[test]
    fn test_status_cycles_both_ways() {
        assert_eq!(TaskStatus::Cancelled.next(), TaskStatus::Todo);
        assert_eq!(TaskStatus::Todo.previous(), TaskStatus::Cancelled);
        assert_eq!(TaskStatus::Todo.next().previous(), TaskStatus::Todo);
    }

    #[test]
    fn test_status_from_str_is_lenient_about_case() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("COMPLETED".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_title_length_boundary() {
        assert_eq!(validate_title(&"a".repeat(TITLE_MAX_LEN)), Ok(()));
        assert_eq!(
            validate_title(&"a".repeat(TITLE_MAX_LEN + 1)),
            Err(ValidationError::TitleTooLong { len: 256, max: 255 })
        );
        assert_eq!(validate_title(""), Err(ValidationError::TitleRequired));
        assert_eq!(validate_title("   "), Err(ValidationError::TitleRequired));
    }

    #[test]
    fn test_title_length_counts_utf16_units() {
        assert!(validate_title(&"é".repeat(TITLE_MAX_LEN)).is_ok());
        assert_eq!(
            validate_title(&"😀".repeat(200)),
            Err(ValidationError::TitleTooLong { len: 400, max: 255 })
        );

        let at_limit = format!("{}{}", "a".repeat(TITLE_MAX_LEN - 2), "😀");
        assert_eq!(validate_title(&at_limit), Ok(()));
        let over_limit = format!("{}{}", "a".repeat(TITLE_MAX_LEN - 1), "😀");
        assert_eq!(
            validate_title(&over_limit),
            Err(ValidationError::TitleTooLong { len: 256, max: 255 })
        );
    }

    #[test]
    fn test_parse_due_date_formats() {
        assert_eq!(parse_due_date(""), Ok(None));
        let date = parse_due_date("2024-05-01").unwrap().unwrap();
        assert_eq!(format_due_date(&date), "2024-05-01");
        let datetime = parse_due_date("2024-05-01T09:15").unwrap().unwrap();
        assert_eq!(format_due_date(&datetime), "2024-05-01T09:15");
        assert!(matches!(
            parse_due_date("tomorrow"),
            Err(ValidationError::InvalidDueDate(_))
        ));
    }
}
