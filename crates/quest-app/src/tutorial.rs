//! The built-in warm-up mission played in the REPL.

use quest_mission::{Task, TaskValidator};
use quest_terminal::Shell;

pub fn warm_up() -> Vec<Task> {
    vec![
        Task::new("pwd", "Print the current directory")
            .accepting(&["pwd"])
            .with_success_message("pwd prints where you are."),
        Task::new("ls_hidden", "List the home directory, hidden files included")
            .accepting(&["ls -a", "ls -la", "ls --all"])
            .with_success_message("-a shows dot files."),
        Task::new("cd_docs", "Move into Documents")
            .expecting_cwd("~/Documents")
            .with_success_message("cd changes the working directory."),
        Task::new("notes", "Create notes-backup.txt next to notes.txt")
            .expecting_path("~/Documents/notes-backup.txt")
            .with_success_message("cp, touch, or a redirect all work."),
        Task::new("home", "Go back home")
            .expecting_cwd("~")
            .with_success_message("Warm-up complete."),
    ]
}

/// Tracks progress through a task list.
pub struct Tutorial {
    tasks: Vec<Task>,
    current: usize,
    points: u32,
}

impl Tutorial {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            current: 0,
            points: 0,
        }
    }

    pub fn current(&self) -> Option<&Task> {
        self.tasks.get(self.current)
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Judge the line just executed; advances and returns the success
    /// message when the current task is done.
    pub fn record(&mut self, shell: &Shell, line: &str) -> Option<String> {
        let task = self.tasks.get(self.current)?;
        let verdict = TaskValidator::new(shell.fs()).validate(task, line);
        if !verdict.success {
            return None;
        }
        self.points += task.points;
        self.current += 1;
        log::info!("task {} complete ({} points)", task.id, self.points);
        Some(verdict.message)
    }
}
