// taskpro - Task manager with an SQLite-backed session reconciler

pub mod config;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod render;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Error, ValidationError};
pub use models::{NewTask, Task, TaskFields, TaskId, TaskMap};
pub use reconciler::{Command, Outcome, Reconciler};
pub use session::{Notice, NoticeLevel, SessionState, TaskView};
pub use store::{TaskStorage, TaskStore};
