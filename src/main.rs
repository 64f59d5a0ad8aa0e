use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskpro::{Command, Config, Error, Notice, Outcome, Reconciler, SessionState, TaskFields, TaskId, TaskStore, render};
use tracing::Level;

#[derive(Parser)]
#[command(name = "taskpro")]
#[command(about = "Task Manager Pro - tasks kept in an SQLite table")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file (default: <config dir>/taskpro/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the config file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Tasks table name, overrides the config file
    #[arg(long)]
    table: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tasks table if it doesn't exist
    Init,

    /// Show all tasks
    List {
        /// Dump the session state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new task
    Add {
        name: String,

        #[arg(short, long)]
        notes: Option<String>,

        /// Deadline as YYYY-MM-DD
        #[arg(short, long)]
        deadline: Option<NaiveDate>,
    },

    /// Edit a task; omitted fields keep their current value
    Edit {
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Deadline as YYYY-MM-DD
        #[arg(short, long, conflicts_with = "clear_deadline")]
        deadline: Option<NaiveDate>,

        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },

    /// Mark a task finished, or reopen it
    Done { id: TaskId },

    /// Delete a task
    Rm { id: TaskId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.db, cli.table)?;
    let store = TaskStore::open(&config.database, &config.table)?;
    let mut reconciler = Reconciler::new(store).with_name_max_len(config.name_max_len);

    if let Commands::Init = cli.command {
        reconciler.create_table()?;
        println!("{}", render::notice(&Notice::table_created(&config.table)));
        return Ok(());
    }

    let json = matches!(cli.command, Commands::List { json: true });
    let mut state = SessionState::new();

    match interact(&mut reconciler, &mut state, cli.command) {
        Ok(()) => {}
        Err(Error::StorageUnavailable { table }) => {
            return Err(eyre!("Table '{}' does not exist. Create it with `taskpro init`", table));
        }
        Err(err) => return Err(err.into()),
    }

    for notice in state.take_notices() {
        eprintln!("{}", render::notice(&notice));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else if state.is_empty() {
        println!("No tasks yet");
    } else {
        for task in state.tasks() {
            println!("{}\n", render::task_card(task, state.view(task.id)));
        }
    }

    Ok(())
}

/// Run one interaction against a fresh session
fn interact(reconciler: &mut Reconciler<TaskStore>, state: &mut SessionState, command: Commands) -> Result<(), Error> {
    reconciler.prepare(state)?;

    let command = match command {
        Commands::Init | Commands::List { .. } => return Ok(()),
        Commands::Add { name, notes, deadline } => Command::Create(TaskFields { name, notes, deadline }),
        Commands::Edit {
            id,
            name,
            notes,
            deadline,
            clear_deadline,
        } => {
            if let Outcome::Rejected(_) = reconciler.dispatch(state, Command::OpenEdit(id))? {
                return Ok(());
            }

            let mut fields = state.task(id).ok_or(Error::NotFound(id))?.fields();
            if let Some(name) = name {
                fields.name = name;
            }
            if let Some(notes) = notes {
                fields.notes = Some(notes);
            }
            if let Some(deadline) = deadline {
                fields.deadline = Some(deadline);
            }
            if clear_deadline {
                fields.deadline = None;
            }
            Command::Update(id, fields)
        }
        Commands::Done { id } => Command::ToggleFinished(id),
        Commands::Rm { id } => Command::Delete(id),
    };

    reconciler.dispatch(state, command)?;
    Ok(())
}
