// SQLite-backed task storage

use crate::models::{NewTask, Task, TaskFields, TaskId, TaskMap};
use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_TABLE: &str = "tasks";

/// Backing relational store for tasks
///
/// Reads take `&self`; every mutating call commits before returning, so a
/// successful return means the change is durable.
pub trait TaskStorage {
    /// Name of the backing table
    fn table(&self) -> &str;

    /// Whether the tasks table exists
    fn table_exists(&self) -> Result<bool>;

    /// Create the tasks table if it does not exist
    fn create_table(&mut self) -> Result<()>;

    /// All tasks, keyed and ordered by id
    fn load_all(&self) -> Result<TaskMap>;

    /// A single task, or `None` if no row has this id
    fn load_one(&self, id: TaskId) -> Result<Option<Task>>;

    /// Insert a task and return the id storage assigned to it
    fn insert(&mut self, task: &NewTask) -> Result<TaskId>;

    /// Overwrite name/notes/deadline. Returns the number of rows changed.
    fn update_fields(&mut self, id: TaskId, fields: &TaskFields) -> Result<usize>;

    /// Returns the number of rows changed
    fn set_finished(&mut self, id: TaskId, finished: bool) -> Result<usize>;

    /// Returns the number of rows removed
    fn delete(&mut self, id: TaskId) -> Result<usize>;
}

/// Task storage over a single SQLite table
pub struct TaskStore {
    db: Connection,
    table: String,
}

impl TaskStore {
    /// Open (or create) the database file at `path`
    ///
    /// The table itself is not created here; see [`TaskStorage::create_table`].
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        let path = path.as_ref();
        Self::validate_table_name(table)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;
        debug!(path = ?path, table, "Opened task database");

        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory(table: &str) -> Result<Self> {
        Self::validate_table_name(table)?;
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    /// Run `f` inside a scoped session
    ///
    /// The transaction commits when `f` succeeds. On any error it is dropped,
    /// which rolls it back, so nothing is left half-applied.
    pub fn scoped<R>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<R>) -> Result<R> {
        let tx = self
            .db
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        let out = f(&tx)?;
        tx.commit().context("Failed to commit transaction")?;
        Ok(out)
    }

    /// The table name as a quoted SQL identifier
    ///
    /// Validation keeps `"` out of the name, so no escaping is needed.
    fn ident(&self) -> String {
        format!("\"{}\"", self.table)
    }

    fn ensure_table(&self) -> Result<()> {
        if !self.table_exists()? {
            return Err(eyre!("Table '{}' does not exist", self.table));
        }
        Ok(())
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get("id")?,
            name: row.get("name")?,
            notes: row.get("notes")?,
            created_date: row.get("created_date")?,
            deadline: row.get("deadline")?,
            finished: row.get::<_, Option<bool>>("finished")?.unwrap_or(false),
        })
    }

    /// Table names are interpolated into SQL, so keep them to a safe alphabet
    pub fn validate_table_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(eyre!("Table name cannot be empty"));
        }
        if name.len() > 64 {
            return Err(eyre!("Table name too long: {} (max 64 chars)", name));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(eyre!("Invalid table name: {} (must be alphanumeric with _)", name));
        }
        if name.to_ascii_lowercase().starts_with("sqlite_") {
            return Err(eyre!("Invalid table name: {} (sqlite_ prefix is reserved)", name));
        }
        Ok(())
    }
}

impl TaskStorage for TaskStore {
    fn table(&self) -> &str {
        &self.table
    }

    fn table_exists(&self) -> Result<bool> {
        let found: Option<i64> = self
            .db
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                [self.table.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create_table(&mut self) -> Result<()> {
        info!(table = %self.table, "Creating task table");

        self.db
            .execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name VARCHAR(30) NOT NULL,
                    notes TEXT,
                    created_date DATE NOT NULL,
                    deadline DATE,
                    finished BOOLEAN
                );
                "#,
                self.ident()
            ))
            .context("Failed to create task table")?;

        Ok(())
    }

    fn load_all(&self) -> Result<TaskMap> {
        self.ensure_table()?;
        let sql = format!(
            "SELECT id, name, notes, created_date, deadline, finished FROM {} ORDER BY id",
            self.ident()
        );

        let tasks = self.scoped(|tx| {
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map([], Self::task_from_row)?;

            let mut tasks = TaskMap::new();
            for row_result in rows {
                let task = row_result.context("Failed to read task row")?;
                tasks.insert(task.id, task);
            }
            Ok(tasks)
        })?;

        debug!(table = %self.table, count = tasks.len(), "Loaded all tasks");
        Ok(tasks)
    }

    fn load_one(&self, id: TaskId) -> Result<Option<Task>> {
        let sql = format!(
            "SELECT id, name, notes, created_date, deadline, finished FROM {} WHERE id = ?1",
            self.ident()
        );

        self.scoped(|tx| {
            let task = tx.query_row(&sql, [id], Self::task_from_row).optional()?;
            Ok(task)
        })
    }

    fn insert(&mut self, task: &NewTask) -> Result<TaskId> {
        let sql = format!(
            "INSERT INTO {} (name, notes, created_date, deadline, finished)
             VALUES (?1, ?2, ?3, ?4, 0)",
            self.ident()
        );

        let id = self.scoped(|tx| {
            tx.execute(
                &sql,
                rusqlite::params![
                    task.fields.name,
                    task.fields.notes,
                    task.created_date,
                    task.fields.deadline
                ],
            )
            .context("Failed to insert task")?;
            Ok(tx.last_insert_rowid())
        })?;

        debug!(table = %self.table, id, "Inserted task");
        Ok(id)
    }

    fn update_fields(&mut self, id: TaskId, fields: &TaskFields) -> Result<usize> {
        let sql = format!(
            "UPDATE {} SET name = ?1, notes = ?2, deadline = ?3 WHERE id = ?4",
            self.ident()
        );

        self.scoped(|tx| {
            let changed = tx
                .execute(&sql, rusqlite::params![fields.name, fields.notes, fields.deadline, id])
                .context("Failed to update task")?;
            Ok(changed)
        })
    }

    fn set_finished(&mut self, id: TaskId, finished: bool) -> Result<usize> {
        let sql = format!("UPDATE {} SET finished = ?1 WHERE id = ?2", self.ident());

        self.scoped(|tx| {
            let changed = tx
                .execute(&sql, rusqlite::params![finished, id])
                .context("Failed to update finished flag")?;
            Ok(changed)
        })
    }

    fn delete(&mut self, id: TaskId) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.ident());

        self.scoped(|tx| {
            let removed = tx.execute(&sql, [id]).context("Failed to delete task")?;
            Ok(removed)
        })
    }
}
