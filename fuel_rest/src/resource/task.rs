//! Server-side tasks, as reported while a cluster deploys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Attributes;

/// The status of a `Task`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The task is still running.
    Running,
    /// The task finished successfully.
    Ready,
    /// The task failed.
    Error,
    /// A status we don't know about. We treat this as "not finished".
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Has this task finished successfully?
    pub fn is_ready(self) -> bool {
        self == TaskStatus::Ready
    }

    /// Did something go wrong running this task?
    pub fn is_err(self) -> bool {
        self == TaskStatus::Error
    }
}

/// A task record. These are only ever inspected, never updated.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Task {
    /// The task ID, if Fuel sent one.
    #[serde(default)]
    pub id: Option<Value>,

    /// The kind of task, such as `"deploy"`.
    #[serde(default)]
    pub name: Option<String>,

    /// Where the task is at.
    pub status: TaskStatus,

    /// Progress, from 0 to 100.
    #[serde(default)]
    pub progress: Option<u64>,

    /// A human-readable message, usually only present on errors.
    #[serde(default)]
    pub message: Option<String>,

    /// Everything else.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Task {
    /// A short name for this task, for error messages.
    pub fn label(&self) -> String {
        match (&self.name, &self.id) {
            (Some(name), Some(id)) => format!("{} ({})", name, id),
            (Some(name), None) => name.clone(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "<unnamed>".to_owned(),
        }
    }
}

#[test]
fn unknown_task_statuses_are_not_errors() {
    let task: Task =
        serde_json::from_str(r#"{"id": 12, "name": "deploy", "status": "pending"}"#)
            .unwrap();
    assert_eq!(task.status, TaskStatus::Unknown);
    assert!(!task.status.is_err());
    assert!(!task.status.is_ready());
    assert_eq!(task.label(), "deploy (12)");
}

#[test]
fn error_tasks_keep_their_message() {
    let task: Task = serde_json::from_str(
        r#"{"status": "error", "message": "Provision has failed", "progress": 100}"#,
    )
    .unwrap();
    assert!(task.status.is_err());
    assert_eq!(task.message.as_deref(), Some("Provision has failed"));
    assert_eq!(task.label(), "<unnamed>");
}
