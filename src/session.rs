// Per-session state mirrored from storage

use crate::models::{Task, TaskId, TaskMap};
use serde::Serialize;
use std::collections::HashMap;

/// Presentation state for one task, independent of storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskView {
    /// Show the edit form instead of the display card
    pub editing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A user-visible message raised by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Raised by the administrative table creation
    pub fn table_created(table: &str) -> Self {
        Self::info(format!("Task table '{}' created successfully!", table))
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// State owned by one interaction session
///
/// `tasks` stays `None` until the first load; after that it is only replaced
/// with data read back from a committed transaction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    tasks: Option<TaskMap>,
    views: HashMap<TaskId, TaskView>,
    notices: Vec<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.tasks.is_some()
    }

    /// The mirrored tasks, empty before the first load
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().flat_map(|tasks| tasks.values())
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.as_ref().and_then(|tasks| tasks.get(&id))
    }

    pub fn len(&self) -> usize {
        self.tasks.as_ref().map_or(0, |tasks| tasks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn replace_tasks(&mut self, tasks: TaskMap) {
        self.tasks = Some(tasks);
    }

    pub(crate) fn replace_task(&mut self, task: Task) {
        self.tasks.get_or_insert_with(TaskMap::new).insert(task.id, task);
    }

    pub(crate) fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        self.tasks.as_mut().and_then(|tasks| tasks.remove(&id))
    }

    /// Presentation state for `id`, defaulting to the display card
    pub fn view(&self, id: TaskId) -> TaskView {
        self.views.get(&id).copied().unwrap_or_default()
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.view(id).editing
    }

    pub fn set_editing(&mut self, id: TaskId, editing: bool) {
        self.views.entry(id).or_default().editing = editing;
    }

    pub fn clear_view(&mut self, id: TaskId) {
        self.views.remove(&id);
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drain notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
