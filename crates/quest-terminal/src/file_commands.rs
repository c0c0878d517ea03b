//! File mutation commands: touch, mkdir, rm, rmdir, cp, mv, find.

use quest_types::error::{FsError, QuestError, Result};
use quest_vfs::FileNode;

use crate::command::{Command, CommandResult, Context};
use crate::commands::{invalid_option, is_short_flags, unrecognized_option};
use crate::parser::glob_match;

const ROOT_WIPE_BANNER: &str = "\
+------------------------------------------------------------+
|  DANGER! THE ENTIRE FILESYSTEM IS BEING DELETED!           |
+------------------------------------------------------------+
|  rm -rf / was executed...                                  |
|                                                            |
|  /bin      [DELETED]                                       |
|  /etc      [DELETED]                                       |
|  /home     [DELETED]                                       |
|  /usr      [DELETED]                                       |
|  /var      [DELETED]                                       |
|  ...                                                       |
|                                                            |
|  The system is no longer usable!                           |
|                                                            |
|  Luckily this is only a simulation :)                      |
|  Reset the filesystem to start over.                       |
+------------------------------------------------------------+";

/// Join per-operand failures into one result.
fn collect_errors(errors: Vec<String>) -> CommandResult {
    if errors.is_empty() {
        CommandResult::empty()
    } else {
        CommandResult::fail(errors.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create empty files or update timestamps"
    }
    fn usage(&self) -> &str {
        "touch <file>..."
    }
    fn category(&self) -> &str {
        "files"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let errors = args
            .iter()
            .filter_map(|path| ctx.fs.touch(path).err())
            .map(|e| format!("touch: cannot touch '{}': {}", e.path(), e.reason()))
            .collect();
        Ok(collect_errors(errors))
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directories"
    }
    fn usage(&self) -> &str {
        "mkdir [-p] <dir>..."
    }
    fn category(&self) -> &str {
        "files"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut parents = false;
        let mut paths = Vec::new();
        for &arg in args {
            match arg {
                "-p" | "--parents" => parents = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    if let Some(bad) = a[1..].chars().find(|&c| c != 'p') {
                        return Err(invalid_option(bad));
                    }
                    parents = true;
                },
                a => paths.push(a),
            }
        }
        if paths.is_empty() {
            return Err(QuestError::Command("missing operand".to_string()));
        }

        let errors = paths
            .into_iter()
            .filter_map(|path| ctx.fs.mkdir(path, parents).err())
            .map(|e| format!("mkdir: cannot create directory '{}': {}", e.path(), e.reason()))
            .collect();
        Ok(collect_errors(errors))
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files or directories"
    }
    fn usage(&self) -> &str {
        "rm [-rf] <path>..."
    }
    fn category(&self) -> &str {
        "files"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut recursive = false;
        let mut force = false;
        let mut paths = Vec::new();
        for &arg in args {
            match arg {
                "--recursive" => recursive = true,
                "--force" => force = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    for flag in a[1..].chars() {
                        match flag {
                            'r' | 'R' => recursive = true,
                            'f' => force = true,
                            other => return Err(invalid_option(other)),
                        }
                    }
                },
                a => paths.push(a),
            }
        }
        if paths.is_empty() {
            return Err(QuestError::Command("missing operand".to_string()));
        }

        let wipes_root = recursive && paths.iter().any(|p| ctx.fs.resolve(p) == "/");
        let mut errors = Vec::new();
        for path in paths {
            match ctx.fs.rm(path, recursive, force) {
                Ok(()) => {},
                Err(e) => errors.push(format!("rm: cannot remove '{}': {}", e.path(), e.reason())),
            }
        }

        if wipes_root {
            log::info!("rm -r / wiped the session filesystem");
            return Ok(CommandResult::ok(ROOT_WIPE_BANNER));
        }
        Ok(collect_errors(errors))
    }
}

// ---------------------------------------------------------------------------
// rmdir
// ---------------------------------------------------------------------------

struct RmdirCmd;
impl Command for RmdirCmd {
    fn name(&self) -> &str {
        "rmdir"
    }
    fn description(&self) -> &str {
        "Remove empty directories"
    }
    fn usage(&self) -> &str {
        "rmdir <dir>..."
    }
    fn category(&self) -> &str {
        "files"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let errors = args
            .iter()
            .filter_map(|path| ctx.fs.rmdir(path).err())
            .map(|e| format!("rmdir: failed to remove '{}': {}", e.path(), e.reason()))
            .collect();
        Ok(collect_errors(errors))
    }
}

// ---------------------------------------------------------------------------
// cp
// ---------------------------------------------------------------------------

struct CpCmd;
impl Command for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy files and directories"
    }
    fn usage(&self) -> &str {
        "cp [-r] <src> <dst>"
    }
    fn category(&self) -> &str {
        "files"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut recursive = false;
        let mut paths = Vec::new();
        for &arg in args {
            match arg {
                "-r" | "-R" | "--recursive" => recursive = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    let bad = a[1..].chars().find(|c| !matches!(c, 'r' | 'R'));
                    if let Some(bad) = bad {
                        return Err(invalid_option(bad));
                    }
                    recursive = true;
                },
                a => paths.push(a),
            }
        }
        let (src, dst) = match paths.as_slice() {
            [] => return Err(QuestError::Command("missing file operand".to_string())),
            [src] => {
                return Err(QuestError::Command(format!(
                    "missing destination file operand after '{src}'"
                )));
            },
            [src, dst] => (*src, *dst),
            _ => return Err(QuestError::Command("too many arguments".to_string())),
        };

        match ctx.fs.cp(src, dst, recursive) {
            Err(FsError::IsADirectory(_)) => Err(QuestError::Command(format!(
                "-r not specified; omitting directory '{src}'"
            ))),
            Err(FsError::InvalidArgument(_)) => Err(QuestError::Command(format!(
                "cannot copy a directory, '{src}', into itself, '{dst}'"
            ))),
            other => {
                other?;
                Ok(CommandResult::empty())
            },
        }
    }
}

// ---------------------------------------------------------------------------
// mv
// ---------------------------------------------------------------------------

struct MvCmd;
impl Command for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename files"
    }
    fn usage(&self) -> &str {
        "mv <src> <dst>"
    }
    fn category(&self) -> &str {
        "files"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let (src, dst) = (args[0], args[1]);
        match ctx.fs.mv(src, dst) {
            Err(FsError::InvalidArgument(_)) => Err(QuestError::Command(format!(
                "cannot move '{src}' to a subdirectory of itself, '{dst}'"
            ))),
            other => {
                other?;
                Ok(CommandResult::empty())
            },
        }
    }
}

// ---------------------------------------------------------------------------
// find
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryType {
    File,
    Dir,
}

struct FindCmd;
impl Command for FindCmd {
    fn name(&self) -> &str {
        "find"
    }
    fn description(&self) -> &str {
        "Search for files in a directory hierarchy"
    }
    fn usage(&self) -> &str {
        "find [dir] [-name <pattern>] [-type f|d]"
    }
    fn category(&self) -> &str {
        "files"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut start = ".";
        let mut pattern = None;
        let mut kind = None;
        let mut rest = args.iter().copied();
        while let Some(arg) = rest.next() {
            match arg {
                "-name" | "-type" => {
                    let value = rest.next().ok_or_else(|| {
                        QuestError::Command(format!("missing argument to `{arg}'"))
                    })?;
                    if arg == "-name" {
                        pattern = Some(value);
                    } else {
                        kind = Some(match value {
                            "f" => EntryType::File,
                            "d" => EntryType::Dir,
                            other => {
                                return Err(QuestError::Command(format!(
                                    "Unknown argument to -type: {other}"
                                )));
                            },
                        });
                    }
                },
                a if a.starts_with('-') => {
                    return Err(QuestError::Command(format!("unknown predicate `{a}'")));
                },
                a => start = a,
            }
        }

        let root = ctx.fs.node(start).ok_or_else(|| {
            QuestError::Command(format!("'{start}': No such file or directory"))
        })?;
        let filter = Filter { pattern, kind };
        let mut found = Vec::new();
        if filter.accepts(basename(start), root) {
            found.push(start.to_string());
        }
        walk(root, start, &filter, &mut found);
        found.sort();
        Ok(CommandResult::ok(found.join("\n")))
    }
}

struct Filter<'a> {
    pattern: Option<&'a str>,
    kind: Option<EntryType>,
}

impl Filter<'_> {
    fn accepts(&self, name: &str, node: &FileNode) -> bool {
        let kind_ok = match self.kind {
            Some(EntryType::Dir) => node.is_dir,
            Some(EntryType::File) => !node.is_dir,
            None => true,
        };
        kind_ok && self.pattern.is_none_or(|p| glob_match(p, name))
    }
}

/// Final component of a path as typed; `/` stays `/`.
fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Collect matching descendants of `node`, shown relative to `shown`.
/// Hidden entries and everything under them are skipped.
fn walk(node: &FileNode, shown: &str, filter: &Filter<'_>, found: &mut Vec<String>) {
    for child in node.children().filter(|c| !c.is_hidden()) {
        let path = if shown.ends_with('/') {
            format!("{shown}{}", child.name)
        } else {
            format!("{shown}/{}", child.name)
        };
        if filter.accepts(&child.name, child) {
            found.push(path.clone());
        }
        if child.is_dir {
            walk(child, &path, filter, found);
        }
    }
}

/// Register file mutation commands.
pub fn register_file_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(RmdirCmd));
    reg.register(Box::new(CpCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(FindCmd));
}
