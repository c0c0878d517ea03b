//! Task completion checks against the live filesystem.

use quest_vfs::VirtualFileSystem;
use quest_vfs::path;

use crate::task::{Criteria, Task};

/// Outcome of validating one command line against a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    /// The task's success message when `success`, otherwise empty.
    pub message: String,
}

impl Verdict {
    fn pass(task: &Task) -> Self {
        Self {
            success: true,
            message: task.success_message.clone(),
        }
    }

    fn miss() -> Self {
        Self::default()
    }
}

/// Judges tasks against a borrowed filesystem.
pub struct TaskValidator<'a> {
    fs: &'a VirtualFileSystem,
}

impl<'a> TaskValidator<'a> {
    pub fn new(fs: &'a VirtualFileSystem) -> Self {
        Self { fs }
    }

    /// Decide whether `line`, already executed, completed `task`.
    ///
    /// Only one criterion group is consulted: filesystem checks if the task
    /// has any, else the working directory, else the accepted commands. A
    /// task with no criteria passes.
    pub fn validate(&self, task: &Task, line: &str) -> Verdict {
        let passed = match task.criteria() {
            Criteria::Files { exists, absent } => {
                exists.is_none_or(|p| self.fs.exists(p))
                    && absent.is_none_or(|p| !self.fs.exists(p))
            },
            Criteria::Cwd(expected) => self.expected_cwd(expected) == self.fs.cwd(),
            Criteria::Commands(accepted) => command_matches(line, accepted),
            Criteria::None => true,
        };
        log::debug!("task {}: {line:?} -> {passed}", task.id);
        if passed {
            Verdict::pass(task)
        } else {
            Verdict::miss()
        }
    }

    fn expected_cwd(&self, expected: &str) -> String {
        let home = self.fs.home();
        path::resolve(expected, home, home, self.fs.username())
    }
}

/// Exact match after whitespace normalization, or the same command word.
fn command_matches(line: &str, accepted: &[String]) -> bool {
    let Some(word) = line.split_whitespace().next() else {
        return false;
    };
    let typed = normalize_whitespace(line);
    accepted.iter().any(|candidate| {
        normalize_whitespace(candidate) == typed
            || candidate.split_whitespace().next() == Some(word)
    })
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_terminal::Shell;

    fn shell() -> Shell {
        Shell::new(VirtualFileSystem::default())
    }

    fn check(sh: &Shell, task: &Task, line: &str) -> Verdict {
        TaskValidator::new(sh.fs()).validate(task, line)
    }

    #[test]
    fn exists_after_touch() {
        let mut sh = shell();
        let task = Task::new("touch", "")
            .expecting_path("README.md")
            .with_success_message("created");
        assert!(!check(&sh, &task, "ls").success);
        sh.execute("touch README.md");
        let verdict = check(&sh, &task, "touch README.md");
        assert!(verdict.success);
        assert_eq!(verdict.message, "created");
    }

    #[test]
    fn exists_after_redirect() {
        let mut sh = shell();
        let task = Task::new("touch", "")
            .accepting(&["touch README.md"])
            .expecting_path("README.md");
        sh.execute("echo x > README.md");
        assert!(check(&sh, &task, "echo x > README.md").success);
    }

    #[test]
    fn not_exists_after_rm() {
        let mut sh = shell();
        sh.execute("touch config.json");
        let task = Task::new("rm", "").expecting_absent("config.json");
        assert!(!check(&sh, &task, "rm config.json").success);
        sh.execute("rm config.json");
        assert!(check(&sh, &task, "rm config.json").success);
    }

    #[test]
    fn both_file_checks_must_hold() {
        let mut sh = shell();
        sh.execute("touch app.py");
        let task = Task::new("t", "")
            .expecting_path("app.py")
            .expecting_absent("Documents");
        assert!(!check(&sh, &task, "").success);
        sh.execute("rm -r Documents");
        assert!(check(&sh, &task, "").success);
    }

    #[test]
    fn file_checks_ignore_the_typed_line() {
        let sh = shell();
        let task = Task::new("t", "")
            .accepting(&["touch nothing"])
            .expecting_path("nothing");
        assert!(!check(&sh, &task, "touch nothing").success);
    }

    #[test]
    fn cwd_with_tilde() {
        let mut sh = shell();
        let task = Task::new("cd", "").expecting_cwd("~/Documents");
        assert!(!check(&sh, &task, "cd Documents").success);
        sh.execute("cd Documents");
        assert!(check(&sh, &task, "cd Documents").success);
    }

    #[test]
    fn cwd_relative_to_home() {
        let mut sh = shell();
        sh.execute("cd /tmp");
        sh.execute("cd ~/Music");
        let task = Task::new("cd", "").expecting_cwd("Music/");
        assert!(check(&sh, &task, "cd ~/Music").success);
    }

    #[test]
    fn cwd_root_and_home() {
        let mut sh = shell();
        let home = Task::new("home", "").expecting_cwd("~");
        let root = Task::new("root", "").expecting_cwd("/");
        assert!(check(&sh, &home, "").success);
        sh.execute("cd /");
        assert!(check(&sh, &root, "cd /").success);
        assert!(!check(&sh, &home, "cd /").success);
    }

    #[test]
    fn accepted_exact_after_normalizing() {
        let sh = shell();
        let task = Task::new("ls", "").accepting(&["ls  -a"]);
        assert!(check(&sh, &task, "  ls   -a ").success);
    }

    #[test]
    fn accepted_same_command_word() {
        let sh = shell();
        let task = Task::new("ls", "").accepting(&["ls -la"]);
        assert!(check(&sh, &task, "ls -l -a").success);
        assert!(!check(&sh, &task, "lsblk").success);
        assert!(!check(&sh, &task, "pwd").success);
        assert!(!check(&sh, &task, "   ").success);
    }

    #[test]
    fn no_criteria_passes() {
        let sh = shell();
        let task = Task::new("free", "").with_success_message("ok");
        assert_eq!(
            check(&sh, &task, "anything"),
            Verdict {
                success: true,
                message: "ok".to_string()
            }
        );
    }
}
