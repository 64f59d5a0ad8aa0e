// Text rendering of task cards

use crate::models::Task;
use crate::session::{Notice, NoticeLevel, TaskView};
use colored::Colorize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Label of the finish/reopen action for `task`
pub fn toggle_label(task: &Task) -> &'static str {
    if task.finished { "Reopen" } else { "Complete" }
}

/// Render a task as a display card, or as its edit form while editing
pub fn task_card(task: &Task, view: TaskView) -> String {
    if view.editing {
        return edit_form(task);
    }

    let notes = match &task.notes {
        Some(notes) => notes.normal(),
        None => "No notes".dimmed().italic(),
    };
    let deadline = match task.deadline {
        Some(deadline) => format!("Due {}", deadline.format(DATE_FORMAT)).dimmed(),
        None => "No deadline".dimmed(),
    };
    let mut name = task.name.bold();

    let (notes, deadline) = if task.finished {
        name = name.strikethrough();
        (notes.strikethrough(), deadline.strikethrough())
    } else {
        (notes, deadline)
    };

    format!(
        "#{} {}\n    {}\n    {}\n    [{}]",
        task.id,
        name,
        notes,
        deadline,
        toggle_label(task)
    )
}

fn edit_form(task: &Task) -> String {
    let deadline = task
        .deadline
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default();

    format!(
        "#{} {}\n    Name:     {}\n    Notes:    {}\n    Deadline: {}",
        task.id,
        "(editing)".yellow(),
        task.name,
        task.notes.as_deref().unwrap_or(""),
        deadline
    )
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => notice.message.green().to_string(),
        NoticeLevel::Warning => format!("{} {}", "warning:".yellow().bold(), notice.message),
    }
}
