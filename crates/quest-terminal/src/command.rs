//! The command contract shared by every built-in.

use quest_types::error::Result;
use quest_vfs::VirtualFileSystem;

use crate::registry::CommandRegistry;

/// Outcome of running one command or pipeline.
///
/// Success carries `output`, failure carries `error`. Neither ends with a
/// trailing newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    pub error: String,
    /// Ask the front end to wipe the screen.
    pub clear_screen: bool,
    /// Ask the front end to end the session.
    pub should_exit: bool,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            ..Self::default()
        }
    }

    /// Success with no visible output.
    pub fn empty() -> Self {
        Self::ok(String::new())
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn clear() -> Self {
        Self {
            clear_screen: true,
            ..Self::empty()
        }
    }

    pub fn exit(farewell: impl Into<String>) -> Self {
        Self {
            should_exit: true,
            ..Self::ok(farewell)
        }
    }
}

/// State lent to a command for the duration of one `execute` call.
pub struct Context<'a> {
    /// The session filesystem.
    pub fs: &'a mut VirtualFileSystem,
    /// Every registered command, for `help` and `type`.
    pub registry: &'a CommandRegistry,
    /// Lines entered so far, oldest first, including the current one.
    pub history: &'a [String],
    /// Output of the previous pipeline stage, when the shell forwards it.
    pub stdin: Option<&'a str>,
}

/// Read-only state available while completing a partial line.
pub struct CompletionContext<'a> {
    pub fs: &'a VirtualFileSystem,
    pub registry: &'a CommandRegistry,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Alternative names resolving to this command.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-la\] \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Fewest arguments accepted, flags included.
    fn min_args(&self) -> usize {
        0
    }

    /// Most arguments accepted; `None` is unbounded.
    fn max_args(&self) -> Option<usize> {
        None
    }

    /// Execute the command. Arity has already been checked.
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult>;

    /// Candidates for the word being typed. `args` holds the complete words
    /// before it. Defaults to filesystem entries.
    fn autocomplete(&self, partial: &str, _args: &[&str], ctx: &CompletionContext<'_>) -> Vec<String> {
        complete_path(ctx.fs, partial, false)
    }
}

/// The arity violation for `args`, if any.
pub fn check_arity(cmd: &dyn Command, args: &[&str]) -> Option<String> {
    if args.len() < cmd.min_args() {
        return Some(format!("{}: missing operand", cmd.name()));
    }
    if cmd.max_args().is_some_and(|max| args.len() > max) {
        return Some(format!("{}: too many arguments", cmd.name()));
    }
    None
}

/// Complete `partial` against filesystem entries.
///
/// A partial with a `/` lists the directory before the last separator and
/// keeps that prefix in the candidates. Hidden entries only appear once the
/// typed name starts with a dot. Directories carry a trailing `/`.
pub fn complete_path(fs: &VirtualFileSystem, partial: &str, dirs_only: bool) -> Vec<String> {
    let (dir, prefix) = match partial.rsplit_once('/') {
        Some((dir, prefix)) => (Some(dir), prefix),
        None => (None, partial),
    };
    let listed = match dir {
        Some("") => "/",
        Some(d) => d,
        None => ".",
    };
    if !fs.is_dir(listed) {
        return Vec::new();
    }
    let Ok(entries) = fs.ls(listed, prefix.starts_with('.')) else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter(|e| e.name.starts_with(prefix) && (e.is_dir || !dirs_only))
        .map(|e| {
            let slash = if e.is_dir { "/" } else { "" };
            match dir {
                Some(d) => format!("{d}/{}{slash}", e.name),
                None => format!("{}{slash}", e.name),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs() -> VirtualFileSystem {
        VirtualFileSystem::new("user", "quest")
    }

    #[test]
    fn result_constructors() {
        let ok = CommandResult::ok("hi");
        assert!(ok.success);
        assert_eq!(ok.output, "hi");
        assert!(ok.error.is_empty());

        let fail = CommandResult::fail("boom");
        assert!(!fail.success);
        assert_eq!(fail.error, "boom");

        assert!(CommandResult::clear().clear_screen);
        let bye = CommandResult::exit("logout");
        assert!(bye.should_exit && bye.success);
        assert_eq!(bye.output, "logout");
    }

    #[test]
    fn complete_in_cwd() {
        let fs = fs();
        let mut got = complete_path(&fs, "D", false);
        got.sort();
        assert_eq!(got, vec!["Desktop/", "Documents/", "Downloads/"]);
    }

    #[test]
    fn complete_hidden_only_with_dot() {
        let fs = fs();
        assert!(complete_path(&fs, "", false).iter().all(|c| !c.starts_with('.')));
        let hidden = complete_path(&fs, ".b", false);
        assert_eq!(hidden, vec![".bashrc"]);
    }

    #[test]
    fn complete_nested_keeps_prefix() {
        let fs = fs();
        let got = complete_path(&fs, "Documents/no", false);
        assert_eq!(got, vec!["Documents/notes.txt"]);
    }

    #[test]
    fn complete_absolute_from_root() {
        let fs = fs();
        assert_eq!(complete_path(&fs, "/et", false), vec!["/etc/"]);
        assert_eq!(complete_path(&fs, "/etc/hostn", false), vec!["/etc/hostname"]);
    }

    #[test]
    fn complete_dirs_only() {
        let fs = fs();
        let got = complete_path(&fs, "Documents/", true);
        assert!(got.is_empty());
    }

    #[test]
    fn complete_missing_dir_is_empty() {
        let fs = fs();
        assert!(complete_path(&fs, "nope/x", false).is_empty());
        assert!(complete_path(&fs, ".bashrc/x", false).is_empty());
    }
}
