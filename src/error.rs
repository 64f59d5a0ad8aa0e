// Error types for the reconciler

use crate::models::TaskId;
use thiserror::Error;

/// Failures that abort an interaction
#[derive(Error, Debug)]
pub enum Error {
    #[error("Table '{table}' does not exist")]
    StorageUnavailable { table: String },

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Storage operation failed: {0:#}")]
    Storage(eyre::Report),
}

impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Storage(err)
    }
}

/// User input rejected before any storage access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name too long: {len} chars (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Task {0} is finished and cannot be edited")]
    Finished(TaskId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::StorageUnavailable {
            table: "tasks".to_string(),
        };
        assert_eq!(err.to_string(), "Table 'tasks' does not exist");
        assert_eq!(Error::NotFound(3).to_string(), "Task not found: 3");
    }

    #[test]
    fn test_storage_error_from_report() {
        let err: Error = eyre::eyre!("disk full").into();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_validation_display() {
        assert_eq!(ValidationError::EmptyName.to_string(), "Name cannot be empty");
        assert_eq!(
            ValidationError::NameTooLong { len: 31, max: 30 }.to_string(),
            "Name too long: 31 chars (max 30)"
        );
    }
}
