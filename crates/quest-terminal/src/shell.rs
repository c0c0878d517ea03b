//! The interactive shell: history, dispatch, pipes, redirection, completion.

use quest_types::config::QuestConfig;
use quest_types::error::QuestError;
use quest_vfs::VirtualFileSystem;

use crate::command::{CommandResult, CompletionContext, Context, check_arity};
use crate::parser::{self, ParsedCommand};
use crate::registry::CommandRegistry;

/// Maximum number of history entries to retain unless configured.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// What a pipeline stage receives from the stage before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipeMode {
    /// The previous output is dropped; each stage reads only its operands.
    #[default]
    Inert,
    /// The previous output is offered as standard input. Text commands read
    /// it when given no file operand.
    Stdin,
}

/// One session's shell, owning its filesystem and command table.
pub struct Shell {
    fs: VirtualFileSystem,
    registry: CommandRegistry,
    history: Vec<String>,
    history_max: usize,
    pipe_mode: PipeMode,
}

impl Shell {
    /// A shell over `fs` with every built-in registered.
    pub fn new(fs: VirtualFileSystem) -> Self {
        Self::with_registry(fs, CommandRegistry::with_builtins())
    }

    pub fn with_registry(fs: VirtualFileSystem, registry: CommandRegistry) -> Self {
        Self {
            fs,
            registry,
            history: Vec::new(),
            history_max: DEFAULT_HISTORY_SIZE,
            pipe_mode: PipeMode::default(),
        }
    }

    /// A fresh session shaped by `config`.
    pub fn from_config(config: &QuestConfig) -> Self {
        let mut shell = Self::new(VirtualFileSystem::new(&config.username, &config.hostname));
        shell.set_history_max(config.history_size);
        if config.pipe_stdin {
            shell.set_pipe_mode(PipeMode::Stdin);
        }
        shell
    }

    pub fn fs(&self) -> &VirtualFileSystem {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut VirtualFileSystem {
        &mut self.fs
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Entered lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Cap the history, dropping the oldest entries beyond it.
    pub fn set_history_max(&mut self, max: usize) {
        self.history_max = max.max(1);
        let excess = self.history.len().saturating_sub(self.history_max);
        self.history.drain(..excess);
    }

    pub fn pipe_mode(&self) -> PipeMode {
        self.pipe_mode
    }

    pub fn set_pipe_mode(&mut self, mode: PipeMode) {
        self.pipe_mode = mode;
    }

    /// `user@host:~/dir$ `
    pub fn prompt(&self) -> String {
        format!(
            "{}@{}:{}$ ",
            self.fs.username(),
            self.fs.hostname(),
            self.fs.prompt_path()
        )
    }

    /// Run one raw input line. Never fails: every problem becomes a failed
    /// [`CommandResult`].
    pub fn execute(&mut self, line: &str) -> CommandResult {
        let line = line.trim();
        if line.is_empty() {
            return CommandResult::empty();
        }
        self.push_history(line);

        let pipeline = match parser::parse(line) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("parse failed for {line:?}: {e}");
                return CommandResult::fail(e.to_string());
            },
        };
        log::debug!("dispatch {:?} ({} stage(s))", pipeline.name, pipeline.stages());
        self.run(&pipeline, None)
    }

    fn push_history(&mut self, line: &str) {
        if self.history.last().is_none_or(|last| last != line) {
            self.history.push(line.to_string());
            if self.history.len() > self.history_max {
                self.history.remove(0);
            }
        }
    }

    /// Run a stage, then either hand its output down the pipe or write it
    /// to the redirect target. A pipe wins over a redirect on one stage.
    fn run(&mut self, cmd: &ParsedCommand, stdin: Option<&str>) -> CommandResult {
        if cmd.is_empty() {
            return CommandResult::empty();
        }
        let result = self.dispatch(cmd, stdin);
        if !result.success {
            return result;
        }

        if let Some(next) = &cmd.next {
            let forwarded = match self.pipe_mode {
                PipeMode::Inert => None,
                PipeMode::Stdin => Some(result.output.as_str()),
            };
            return self.run(next, forwarded);
        }

        if let Some(target) = &cmd.stdout_target {
            let text = format!("{}\n", result.output);
            return match self.fs.write(target, &text, cmd.append) {
                Ok(()) => CommandResult {
                    output: String::new(),
                    ..result
                },
                Err(e) => CommandResult::fail(e.to_string()),
            };
        }
        result
    }

    fn dispatch(&mut self, cmd: &ParsedCommand, stdin: Option<&str>) -> CommandResult {
        let Some(command) = self.registry.get(&cmd.name) else {
            return CommandResult::fail(format!("{}: command not found", cmd.name));
        };
        let args: Vec<&str> = cmd.args.iter().map(String::as_str).collect();
        if let Some(violation) = check_arity(command, &args) {
            return CommandResult::fail(violation);
        }

        let mut ctx = Context {
            fs: &mut self.fs,
            registry: &self.registry,
            history: &self.history,
            stdin,
        };
        match command.execute(&args, &mut ctx) {
            Ok(result) => result,
            Err(e) => {
                log::debug!("{} failed: {e}", cmd.name);
                CommandResult::fail(format!("{}: {}", cmd.name, cause(&e)))
            },
        }
    }

    /// Completion candidates for a partially typed line.
    pub fn complete(&self, partial: &str) -> Vec<String> {
        let words: Vec<&str> = partial.split_whitespace().collect();
        let trailing = partial.ends_with(char::is_whitespace);

        match words.as_slice() {
            [] => self.registry.all_names(),
            [first] if !trailing => self
                .registry
                .all_names()
                .into_iter()
                .filter(|n| n.starts_with(first))
                .collect(),
            [name, rest @ ..] => {
                let Some(cmd) = self.registry.get(name) else {
                    return Vec::new();
                };
                let (args, word) = match rest.split_last() {
                    Some((last, before)) if !trailing => (before, *last),
                    _ => (rest, ""),
                };
                let ctx = CompletionContext {
                    fs: &self.fs,
                    registry: &self.registry,
                };
                cmd.autocomplete(word, args, &ctx)
            },
        }
    }
}

/// The text shown after `<name>: ` when a command returns an error.
pub(crate) fn cause(e: &QuestError) -> String {
    match e {
        QuestError::Fs(fs) => fs.to_string(),
        QuestError::Command(msg) => msg.clone(),
        other => other.to_string(),
    }
}
