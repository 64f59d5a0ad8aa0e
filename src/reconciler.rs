// Reconciles session state with the tasks table

use crate::error::{Error, ValidationError};
use crate::models::{NewTask, TaskFields, TaskId};
use crate::session::{Notice, SessionState};
use crate::store::TaskStorage;
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

/// Width of the name column
pub const DEFAULT_NAME_MAX_LEN: usize = 30;

/// A user intent against the task list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(TaskFields),
    Update(TaskId, TaskFields),
    Delete(TaskId),
    ToggleFinished(TaskId),
    OpenEdit(TaskId),
    CancelEdit(TaskId),
}

/// Result of a command that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Input was rejected before reaching storage; a notice was raised
    Rejected(ValidationError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Applies commands to storage and keeps a session's task mirror in step
///
/// The mirror is only written after storage has committed. Create and delete
/// reload every row since they change the key set; update and toggle re-fetch
/// the one row they touched.
pub struct Reconciler<S: TaskStorage> {
    storage: S,
    name_max_len: usize,
    today: fn() -> NaiveDate,
}

impl<S: TaskStorage> Reconciler<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            name_max_len: DEFAULT_NAME_MAX_LEN,
            today: local_today,
        }
    }

    pub fn with_name_max_len(mut self, name_max_len: usize) -> Self {
        self.name_max_len = name_max_len;
        self
    }

    /// Replace the clock used for `created_date`
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Administrative action: create the backing table
    pub fn create_table(&mut self) -> Result<(), Error> {
        self.storage.create_table()?;
        Ok(())
    }

    /// Check the table exists and populate the mirror on first access
    pub fn prepare(&self, state: &mut SessionState) -> Result<(), Error> {
        if !self.storage.table_exists()? {
            return Err(Error::StorageUnavailable {
                table: self.storage.table().to_string(),
            });
        }

        if !state.is_loaded() {
            debug!(table = self.storage.table(), "Loading tasks into session");
            state.replace_tasks(self.storage.load_all()?);
        }
        Ok(())
    }

    /// Single entry point for every command
    pub fn dispatch(&mut self, state: &mut SessionState, command: Command) -> Result<Outcome, Error> {
        debug!(?command, "dispatch: called");

        match command {
            Command::Create(fields) => self.create(state, fields),
            Command::Update(id, fields) => self.update(state, id, fields),
            Command::Delete(id) => self.delete(state, id),
            Command::ToggleFinished(id) => self.toggle_finished(state, id),
            Command::OpenEdit(id) => self.open_edit(state, id),
            Command::CancelEdit(id) => self.cancel_edit(state, id),
        }
    }

    pub fn create(&mut self, state: &mut SessionState, fields: TaskFields) -> Result<Outcome, Error> {
        let fields = fields.normalized();
        if let Err(reason) = self.validate_name(&fields.name) {
            warn!(%reason, "Rejected new task");
            state.push_notice(Notice::warning(format!("{}, not adding task", reason)));
            return Ok(Outcome::Rejected(reason));
        }

        self.prepare(state)?;

        let task = NewTask {
            fields,
            created_date: (self.today)(),
        };
        let id = self.storage.insert(&task)?;
        info!(id, name = %task.fields.name, "Created task");

        state.replace_tasks(self.storage.load_all()?);
        Ok(Outcome::Applied)
    }

    pub fn update(&mut self, state: &mut SessionState, id: TaskId, fields: TaskFields) -> Result<Outcome, Error> {
        let fields = fields.normalized();
        if let Err(reason) = self.validate_name(&fields.name) {
            warn!(id, %reason, "Rejected task update");
            state.push_notice(Notice::warning(reason.to_string()));
            state.set_editing(id, true);
            return Ok(Outcome::Rejected(reason));
        }

        self.prepare(state)?;
        if state.task(id).is_none() {
            return Err(Error::NotFound(id));
        }

        let changed = self.storage.update_fields(id, &fields)?;
        debug!(id, changed, "Updated task fields");

        self.refresh_one(state, id)?;
        state.set_editing(id, false);
        Ok(Outcome::Applied)
    }

    pub fn delete(&mut self, state: &mut SessionState, id: TaskId) -> Result<Outcome, Error> {
        self.prepare(state)?;
        if state.task(id).is_none() {
            return Err(Error::NotFound(id));
        }

        let removed = self.storage.delete(id)?;
        info!(id, removed, "Deleted task");

        state.replace_tasks(self.storage.load_all()?);
        state.clear_view(id);
        Ok(Outcome::Applied)
    }

    pub fn toggle_finished(&mut self, state: &mut SessionState, id: TaskId) -> Result<Outcome, Error> {
        self.prepare(state)?;

        let current = state.task(id).ok_or(Error::NotFound(id))?.finished;
        self.storage.set_finished(id, !current)?;
        debug!(id, finished = !current, "Toggled task");

        self.refresh_one(state, id)?;
        Ok(Outcome::Applied)
    }

    pub fn open_edit(&mut self, state: &mut SessionState, id: TaskId) -> Result<Outcome, Error> {
        self.prepare(state)?;

        let task = state.task(id).ok_or(Error::NotFound(id))?;
        if task.finished {
            let reason = ValidationError::Finished(id);
            state.push_notice(Notice::warning(reason.to_string()));
            return Ok(Outcome::Rejected(reason));
        }

        state.set_editing(id, true);
        Ok(Outcome::Applied)
    }

    /// Presentation only, so storage is not consulted
    pub fn cancel_edit(&mut self, state: &mut SessionState, id: TaskId) -> Result<Outcome, Error> {
        state.set_editing(id, false);
        Ok(Outcome::Applied)
    }

    /// Re-read one row after a commit
    fn refresh_one(&self, state: &mut SessionState, id: TaskId) -> Result<(), Error> {
        match self.storage.load_one(id)? {
            Some(task) => state.replace_task(task),
            None => {
                warn!(id, "Task vanished from storage, dropping it from session");
                state.remove_task(id);
                state.clear_view(id);
            }
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let len = name.chars().count();
        if len > self.name_max_len {
            return Err(ValidationError::NameTooLong {
                len,
                max: self.name_max_len,
            });
        }
        Ok(())
    }
}
