//! Task definitions.

use serde::Deserialize;

/// One step of a mission and the criteria that complete it.
///
/// Criteria are checked in a fixed order by
/// [`TaskValidator`](crate::TaskValidator): filesystem checks first, then
/// the working directory, then the typed command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub hint: String,
    pub points: u32,
    /// Shown when the task is completed.
    pub success_message: String,
    /// Command lines that complete the task. Whitespace is normalized
    /// before comparison.
    pub accepted_commands: Vec<String>,
    /// Expected working directory. `~` means home; relative paths are taken
    /// from home.
    pub check_cwd: Option<String>,
    /// Path that must exist.
    pub check_exists: Option<String>,
    /// Path that must not exist.
    pub check_not_exists: Option<String>,
}

impl Task {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            points: 10,
            ..Self::default()
        }
    }

    pub fn accepting(mut self, commands: &[&str]) -> Self {
        self.accepted_commands = commands.iter().map(|c| (*c).to_string()).collect();
        self
    }

    pub fn expecting_cwd(mut self, path: &str) -> Self {
        self.check_cwd = Some(path.to_string());
        self
    }

    pub fn expecting_path(mut self, path: &str) -> Self {
        self.check_exists = Some(path.to_string());
        self
    }

    pub fn expecting_absent(mut self, path: &str) -> Self {
        self.check_not_exists = Some(path.to_string());
        self
    }

    pub fn with_success_message(mut self, message: &str) -> Self {
        self.success_message = message.to_string();
        self
    }

    fn has_file_checks(&self) -> bool {
        self.check_exists.is_some() || self.check_not_exists.is_some()
    }

    pub(crate) fn criteria(&self) -> Criteria<'_> {
        if self.has_file_checks() {
            Criteria::Files {
                exists: self.check_exists.as_deref(),
                absent: self.check_not_exists.as_deref(),
            }
        } else if let Some(cwd) = &self.check_cwd {
            Criteria::Cwd(cwd)
        } else if !self.accepted_commands.is_empty() {
            Criteria::Commands(&self.accepted_commands)
        } else {
            Criteria::None
        }
    }
}

/// The single criterion group that decides a task.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Criteria<'a> {
    Files {
        exists: Option<&'a str>,
        absent: Option<&'a str>,
    },
    Cwd(&'a str),
    Commands(&'a [String]),
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": "touch",
                "description": "Create README.md",
                "accepted_commands": ["touch README.md"],
                "check_exists": "README.md"
            }"#,
        )
        .unwrap();
        assert_eq!(task.id, "touch");
        assert_eq!(task.points, 0);
        assert!(task.hint.is_empty());
        assert_eq!(task.check_exists.as_deref(), Some("README.md"));
        assert_eq!(task.check_cwd, None);
    }

    #[test]
    fn file_checks_take_priority() {
        let task = Task::new("t", "")
            .accepting(&["touch a"])
            .expecting_cwd("~")
            .expecting_absent("b");
        assert_eq!(
            task.criteria(),
            Criteria::Files {
                exists: None,
                absent: Some("b")
            }
        );
    }

    #[test]
    fn cwd_before_commands() {
        let task = Task::new("t", "").accepting(&["cd /"]).expecting_cwd("/");
        assert_eq!(task.criteria(), Criteria::Cwd("/"));
    }

    #[test]
    fn no_criteria() {
        assert_eq!(Task::new("t", "").criteria(), Criteria::None);
        assert_eq!(Task::new("t", "").points, 10);
    }
}
