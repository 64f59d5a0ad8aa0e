// Data models for taskpro

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage-assigned task identifier
pub type TaskId = i64;

/// In-memory mirror of the tasks table, iterated in id order
pub type TaskMap = BTreeMap<TaskId, Task>;

/// One to-do item as stored in the tasks table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub notes: Option<String>,
    pub created_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub finished: bool,
}

impl Task {
    /// The user-editable part of this task
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            name: self.name.clone(),
            notes: self.notes.clone(),
            deadline: self.deadline,
        }
    }
}

/// Fields a user can set on create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub name: String,
    pub notes: Option<String>,
    pub deadline: Option<NaiveDate>,
}

impl TaskFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Blank notes are stored as NULL
    pub fn normalized(mut self) -> Self {
        if self.notes.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.notes = None;
        }
        self
    }
}

/// Insert request; finished always starts out false
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub fields: TaskFields,
    pub created_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fields_builder() {
        let fields = TaskFields::new("Buy milk")
            .with_notes("2%")
            .with_deadline(date(2024, 1, 1));

        assert_eq!(fields.name, "Buy milk");
        assert_eq!(fields.notes.as_deref(), Some("2%"));
        assert_eq!(fields.deadline, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_normalized_drops_blank_notes() {
        let fields = TaskFields::new("a").with_notes("   ").normalized();
        assert!(fields.notes.is_none());

        let fields = TaskFields::new("a").with_notes(" keep ").normalized();
        assert_eq!(fields.notes.as_deref(), Some(" keep "));
    }

    #[test]
    fn test_task_fields_roundtrip_from_task() {
        let task = Task {
            id: 7,
            name: "Write report".to_string(),
            notes: None,
            created_date: date(2024, 3, 1),
            deadline: Some(date(2024, 3, 8)),
            finished: true,
        };

        let fields = task.fields();
        assert_eq!(fields.name, "Write report");
        assert_eq!(fields.deadline, Some(date(2024, 3, 8)));
    }

    #[test]
    fn test_task_serialization() {
        let task = Task {
            id: 1,
            name: "Test".to_string(),
            notes: Some("n".to_string()),
            created_date: date(2024, 1, 2),
            deadline: None,
            finished: false,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"created_date\":\"2024-01-02\""));
        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, task);
    }
}
