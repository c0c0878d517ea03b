//! Built-in commands: registration and navigation (`pwd`, `cd`, `ls`).

use quest_types::error::{QuestError, Result};

use crate::command::{Command, CommandResult, CompletionContext, Context, complete_path};
use crate::registry::CommandRegistry;

/// Register all built-in commands into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(LsCmd));
    crate::register_file_commands(reg);
    crate::register_text_commands(reg);
    crate::register_system_commands(reg);
    crate::register_admin_commands(reg);
    crate::register_process_commands(reg);
    crate::register_network_commands(reg);
}

/// Error for an unknown single-letter flag.
pub(crate) fn invalid_option(flag: char) -> QuestError {
    QuestError::Command(format!("invalid option -- '{flag}'"))
}

/// Error for an unknown `--long` flag.
pub(crate) fn unrecognized_option(flag: &str) -> QuestError {
    QuestError::Command(format!("unrecognized option '{flag}'"))
}

/// Whether `arg` is a bundle of short flags such as `-la`.
pub(crate) fn is_short_flags(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && !arg.starts_with("--")
}

/// Command names and aliases starting with `partial`.
pub(crate) fn complete_command_name(partial: &str, ctx: &CompletionContext<'_>) -> Vec<String> {
    ctx.registry
        .all_names()
        .into_iter()
        .filter(|n| n.starts_with(partial))
        .collect()
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "navigation"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        Ok(CommandResult::ok(ctx.fs.cwd()))
    }
    fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [dir | - | ~]"
    }
    fn category(&self) -> &str {
        "navigation"
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        ctx.fs.cd(args.first().copied().unwrap_or("~"))?;
        Ok(CommandResult::empty())
    }
    fn autocomplete(&self, partial: &str, _: &[&str], ctx: &CompletionContext<'_>) -> Vec<String> {
        complete_path(ctx.fs, partial, true)
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["dir"]
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-alA] [path]"
    }
    fn category(&self) -> &str {
        "navigation"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let mut show_hidden = false;
        let mut long = false;
        let mut path = ".";
        for &arg in args {
            match arg {
                "--all" => show_hidden = true,
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => {
                    for flag in a[1..].chars() {
                        match flag {
                            'a' | 'A' => show_hidden = true,
                            'l' => long = true,
                            other => return Err(invalid_option(other)),
                        }
                    }
                },
                a => path = a,
            }
        }

        if !long {
            let names: Vec<String> = ctx
                .fs
                .ls(path, show_hidden)?
                .into_iter()
                .map(|e| if e.is_dir { format!("{}/", e.name) } else { e.name })
                .collect();
            return Ok(CommandResult::ok(names.join("  ")));
        }

        let entries = ctx.fs.ls_detailed(path, show_hidden)?;
        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(format!("total {}", entries.len()));
        for e in &entries {
            let (kind, slash) = if e.is_dir { ('d', "/") } else { ('-', "") };
            lines.push(format!(
                "{kind}{} 1 {:<8.8} {:<8.8} {:>5} {} {}{slash}",
                e.permissions,
                e.owner,
                e.group,
                e.size,
                e.modified.format("%b %d %H:%M"),
                e.name,
            ));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
}
