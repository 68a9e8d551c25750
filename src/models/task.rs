use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The three board columns. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inProgress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation(
                    "Invalid status. Must be todo, inProgress, or completed".to_string(),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(AppError::Validation(
                "Invalid priority. Must be low, medium, or high".to_string(),
            )),
        }
    }
}

/// A task as stored and as returned to the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(user_id: &str, input: NewTask) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: input.title,
            description: input.description,
            status: input.status,
            date: input.date,
            priority: input.priority,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub date: NaiveDate,
    pub priority: Priority,
    pub tags: Vec<String>,
}

/// Validated partial edit of a task. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        *self == TaskChanges::default()
    }

    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        task.updated_at = now;
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

fn clean_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

impl TryFrom<CreateTaskRequest> for NewTask {
    type Error = AppError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        let (title, date) = match (req.title.as_deref(), req.date.as_deref()) {
            (Some(t), Some(d)) if !t.trim().is_empty() && !d.trim().is_empty() => (t, d),
            _ => return Err(AppError::Validation("Title and date are required".to_string())),
        };

        Ok(NewTask {
            title: clean_title(title)?,
            date: parse_date(date)?,
            status: req.status.as_deref().map(str::parse::<TaskStatus>).transpose()?.unwrap_or_default(),
            priority: req.priority.as_deref().map(str::parse::<Priority>).transpose()?.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            tags: req.tags.unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateTaskRequest> for TaskChanges {
    type Error = AppError;

    fn try_from(req: UpdateTaskRequest) -> Result<Self, Self::Error> {
        Ok(TaskChanges {
            title: req.title.as_deref().map(clean_title).transpose()?,
            description: req.description,
            status: req.status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
            date: req.date.as_deref().map(parse_date).transpose()?,
            priority: req.priority.as_deref().map(str::parse::<Priority>).transpose()?,
            tags: req.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: Option<&str>, date: Option<&str>, status: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.map(String::from),
            status: status.map(String::from),
            date: date.map(String::from),
            description: None,
            priority: None,
            tags: None,
        }
    }

    #[test]
    fn status_round_trips_through_its_wire_name() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn legacy_status_names_are_rejected() {
        for legacy in ["pending", "in-progress", "done", "InProgress", ""] {
            assert!(matches!(legacy.parse::<TaskStatus>(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn new_task_defaults() {
        let task: NewTask = create(Some("  write report "), Some("2024-03-01"), None)
            .try_into()
            .unwrap();
        assert_eq!(task.title, "write report");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn new_task_keeps_requested_status() {
        let task: NewTask = create(Some("ship"), Some("2024-03-01"), Some("completed"))
            .try_into()
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn new_task_requires_title_and_date() {
        for req in [
            create(None, Some("2024-03-01"), None),
            create(Some("   "), Some("2024-03-01"), None),
            create(Some("x"), None, None),
            create(Some("x"), Some("03/01/2024"), None),
            create(Some("x"), Some("2024-03-01"), Some("blocked")),
        ] {
            assert!(matches!(NewTask::try_from(req), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn changes_apply_only_present_fields() {
        let mut task = Task::new(
            "u1",
            create(Some("a"), Some("2024-03-01"), None).try_into().unwrap(),
        );
        let before = task.clone();
        let changes = TaskChanges {
            priority: Some(Priority::High),
            ..Default::default()
        };
        let later = before.updated_at + chrono::Duration::seconds(5);
        changes.apply(&mut task, later);

        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.title, before.title);
        assert_eq!(task.status, before.status);
        assert_eq!(task.updated_at, later);
        assert!(TaskChanges::default().is_empty());
        assert!(!changes.is_empty());
    }

    #[test]
    fn empty_title_edit_is_rejected() {
        let req = UpdateTaskRequest {
            title: Some(" ".to_string()),
            description: None,
            status: None,
            date: None,
            priority: None,
            tags: None,
        };
        assert!(matches!(TaskChanges::try_from(req), Err(AppError::Validation(_))));
    }
}
