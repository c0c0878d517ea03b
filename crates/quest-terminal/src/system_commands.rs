//! Session and system information commands.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::Local;
use quest_types::error::{QuestError, Result};

use crate::command::{Command, CommandResult, CompletionContext, Context};
use crate::commands::{complete_command_name, invalid_option, is_short_flags, unrecognized_option};

const KERNEL_NAME: &str = "Linux";
const KERNEL_RELEASE: &str = "6.1.0-quest";
const MACHINE: &str = "x86_64";
const OPERATING_SYSTEM: &str = "GNU/Linux";

/// Output format of `date` without an argument.
const DEFAULT_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

/// Shortcuts listed by `alias`.
const ALIASES: &[(&str, &str)] = &[
    ("ll", "ls -la"),
    ("la", "ls -A"),
    ("l", "ls -CF"),
    ("..", "cd .."),
    ("...", "cd ../.."),
    ("cls", "clear"),
];

/// Commands that take no operands and have nothing to complete.
macro_rules! no_completion {
    () => {
        fn autocomplete(&self, _: &str, _: &[&str], _: &CompletionContext<'_>) -> Vec<String> {
            Vec::new()
        }
    };
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["cls"]
    }
    fn description(&self) -> &str {
        "Clear the terminal screen"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        Ok(CommandResult::clear())
    }
    no_completion!();
}

// ---------------------------------------------------------------------------
// whoami / hostname
// ---------------------------------------------------------------------------

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Print the current user name"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        Ok(CommandResult::ok(ctx.fs.username()))
    }
    no_completion!();
}

struct HostnameCmd;
impl Command for HostnameCmd {
    fn name(&self) -> &str {
        "hostname"
    }
    fn description(&self) -> &str {
        "Print the machine name"
    }
    fn usage(&self) -> &str {
        "hostname"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        Ok(CommandResult::ok(ctx.fs.hostname()))
    }
    no_completion!();
}

// ---------------------------------------------------------------------------
// date
// ---------------------------------------------------------------------------

struct DateCmd;
impl Command for DateCmd {
    fn name(&self) -> &str {
        "date"
    }
    fn description(&self) -> &str {
        "Print the current date and time"
    }
    fn usage(&self) -> &str {
        "date [+FORMAT]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let format = match args.first() {
            None => DEFAULT_DATE_FORMAT,
            Some(arg) => arg
                .strip_prefix('+')
                .ok_or_else(|| QuestError::Command(format!("invalid date '{arg}'")))?,
        };
        // An unknown specifier surfaces as a formatting error, not a panic.
        let mut out = String::new();
        write!(out, "{}", Local::now().format(format))
            .map_err(|_| QuestError::Command(format!("invalid format '{format}'")))?;
        Ok(CommandResult::ok(out))
    }
    no_completion!();
}

// ---------------------------------------------------------------------------
// uname
// ---------------------------------------------------------------------------

struct UnameCmd;
impl Command for UnameCmd {
    fn name(&self) -> &str {
        "uname"
    }
    fn description(&self) -> &str {
        "Print system information"
    }
    fn usage(&self) -> &str {
        "uname [-asnrmo]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        // kernel name, node name, release, machine, operating system
        let mut fields = [false; 5];
        for &arg in args {
            let short = match arg {
                "--all" => "a",
                "--kernel-name" => "s",
                "--nodename" => "n",
                "--kernel-release" => "r",
                "--machine" => "m",
                "--operating-system" => "o",
                a if a.starts_with("--") => return Err(unrecognized_option(a)),
                a if is_short_flags(a) => &a[1..],
                a => {
                    return Err(QuestError::Command(format!("extra operand '{a}'")));
                },
            };
            for flag in short.chars() {
                match flag {
                    'a' => fields = [true; 5],
                    's' => fields[0] = true,
                    'n' => fields[1] = true,
                    'r' => fields[2] = true,
                    'm' => fields[3] = true,
                    'o' => fields[4] = true,
                    other => return Err(invalid_option(other)),
                }
            }
        }
        if !fields.contains(&true) {
            fields[0] = true;
        }

        let values = [
            KERNEL_NAME,
            ctx.fs.hostname(),
            KERNEL_RELEASE,
            MACHINE,
            OPERATING_SYSTEM,
        ];
        let shown: Vec<&str> = values
            .iter()
            .zip(fields)
            .filter_map(|(v, on)| on.then_some(*v))
            .collect();
        Ok(CommandResult::ok(shown.join(" ")))
    }
    no_completion!();
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["?"]
    }
    fn description(&self) -> &str {
        "List commands or describe one"
    }
    fn usage(&self) -> &str {
        "help [command]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        if let Some(&topic) = args.first() {
            let cmd = ctx.registry.get(topic).ok_or_else(|| {
                QuestError::Command(format!("no help topics match '{topic}'"))
            })?;
            let mut out = format!("{} ({})\n", cmd.name(), cmd.category());
            out.push_str(&format!("  {}\n", cmd.description()));
            out.push_str(&format!("  Usage: {}", cmd.usage()));
            if !cmd.aliases().is_empty() {
                out.push_str(&format!("\n  Aliases: {}", cmd.aliases().join(", ")));
            }
            return Ok(CommandResult::ok(out));
        }

        let mut categories: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for cmd in ctx.registry.commands() {
            categories
                .entry(cmd.category())
                .or_default()
                .push((cmd.name(), cmd.description()));
        }

        let mut out = format!("Commands ({}):\n", ctx.registry.len());
        for (category, cmds) in &categories {
            out.push_str(&format!("\n  [{category}]\n"));
            for (name, desc) in cmds {
                out.push_str(&format!("    {name:12} {desc}\n"));
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        Ok(CommandResult::ok(out))
    }
    fn autocomplete(&self, partial: &str, args: &[&str], ctx: &CompletionContext<'_>) -> Vec<String> {
        if args.is_empty() {
            complete_command_name(partial, ctx)
        } else {
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Command for HistoryCmd {
    fn name(&self) -> &str {
        "history"
    }
    fn description(&self) -> &str {
        "Show command history"
    }
    fn usage(&self) -> &str {
        "history [N]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let history = ctx.history;
        if history.is_empty() {
            return Ok(CommandResult::ok("history is empty"));
        }
        let count = match args.first() {
            Some(n) => n.parse::<usize>().map_err(|_| {
                QuestError::Command(format!("{n}: numeric argument required"))
            })?,
            None => history.len(),
        };
        let skip = history.len().saturating_sub(count);
        let lines: Vec<String> = history
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, entry)| format!("  {:4}  {entry}", i + 1))
            .collect();
        Ok(CommandResult::ok(lines.join("\n")))
    }
    no_completion!();
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["quit", "logout"]
    }
    fn description(&self) -> &str {
        "End the session"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
    fn execute(&self, _args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        Ok(CommandResult::exit("logout"))
    }
    no_completion!();
}

// ---------------------------------------------------------------------------
// type
// ---------------------------------------------------------------------------

struct TypeCmd;
impl Command for TypeCmd {
    fn name(&self) -> &str {
        "type"
    }
    fn description(&self) -> &str {
        "Describe how a command name is interpreted"
    }
    fn usage(&self) -> &str {
        "type <name>..."
    }
    fn category(&self) -> &str {
        "system"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], ctx: &mut Context<'_>) -> Result<CommandResult> {
        let lines: Vec<String> = args
            .iter()
            .map(|&name| {
                if let Some(target) = ctx.registry.alias_target(name) {
                    format!("{name} is an alias for {target}")
                } else if ctx.registry.contains(name) {
                    format!("{name} is a shell builtin")
                } else {
                    format!("type: {name}: not found")
                }
            })
            .collect();
        Ok(CommandResult::ok(lines.join("\n")))
    }
    fn autocomplete(&self, partial: &str, _: &[&str], ctx: &CompletionContext<'_>) -> Vec<String> {
        complete_command_name(partial, ctx)
    }
}

// ---------------------------------------------------------------------------
// alias
// ---------------------------------------------------------------------------

struct AliasCmd;
impl Command for AliasCmd {
    fn name(&self) -> &str {
        "alias"
    }
    fn description(&self) -> &str {
        "List shell aliases"
    }
    fn usage(&self) -> &str {
        "alias [name]..."
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context<'_>) -> Result<CommandResult> {
        let render = |(name, value): &(&str, &str)| format!("alias {name}='{value}'");
        if args.is_empty() {
            let lines: Vec<String> = ALIASES.iter().map(render).collect();
            return Ok(CommandResult::ok(lines.join("\n")));
        }
        let mut lines = Vec::new();
        for &name in args {
            let entry = ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .ok_or_else(|| QuestError::Command(format!("{name}: not found")))?;
            lines.push(render(entry));
        }
        Ok(CommandResult::ok(lines.join("\n")))
    }
    no_completion!();
}

/// Register session and system information commands.
pub fn register_system_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(HostnameCmd));
    reg.register(Box::new(DateCmd));
    reg.register(Box::new(UnameCmd));
    reg.register(Box::new(HelpCmd));
    reg.register(Box::new(HistoryCmd));
    reg.register(Box::new(ExitCmd));
    reg.register(Box::new(TypeCmd));
    reg.register(Box::new(AliasCmd));
}
