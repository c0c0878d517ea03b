//! Shell and command interpreter for Linux Command Quest.
//!
//! Commands implement the `Command` trait and are registered by name (plus
//! aliases) in a `CommandRegistry`. The `Shell` owns the filesystem and the
//! registry: it records history, parses a line into pipeline stages,
//! dispatches each stage, and writes redirected output back into the
//! virtual filesystem.

pub mod admin_commands;
mod command;
mod commands;
pub mod file_commands;
pub mod network_commands;
pub mod parser;
pub mod process_commands;
mod registry;
mod shell;
pub mod system_commands;
pub mod text_commands;

/// Register user, account and permission commands (id, chmod, sudo, ...) into a registry.
pub use admin_commands::register_admin_commands;
/// Report whether arguments satisfy a command's declared arity.
pub use command::check_arity;
/// Complete a partial path against the filesystem.
pub use command::complete_path;
/// A single executable command trait.
pub use command::Command;
/// Outcome of running a command line.
pub use command::CommandResult;
/// Read-only view handed to completion.
pub use command::CompletionContext;
/// Mutable environment passed to every command.
pub use command::Context;
/// Register all built-in commands into a registry.
pub use commands::register_builtins;
/// Register file manipulation commands (touch, mkdir, rm, cp, mv, find) into a registry.
pub use file_commands::register_file_commands;
/// Register network commands (ping, ifconfig, curl, dig, ...) into a registry.
pub use network_commands::register_network_commands;
/// A parsed pipeline stage with its redirect.
pub use parser::ParsedCommand;
/// Shell-style `*`/`?` pattern matching.
pub use parser::glob_match;
/// Parse a command line into pipeline stages.
pub use parser::parse;
/// Split a line into words, honouring quotes and escapes.
pub use parser::tokenize;
/// Register process, service and resource commands (ps, kill, df, ...) into a registry.
pub use process_commands::register_process_commands;
/// Registry of available commands with alias lookup.
pub use registry::CommandRegistry;
/// Default cap on remembered history lines.
pub use shell::DEFAULT_HISTORY_SIZE;
/// How pipeline stages hand output to each other.
pub use shell::PipeMode;
/// An interactive session: filesystem, registry, history.
pub use shell::Shell;
/// Register session and help commands (clear, date, help, history, ...) into a registry.
pub use system_commands::register_system_commands;
/// Register text processing commands (cat, echo, head, tail, grep, wc) into a registry.
pub use text_commands::register_text_commands;
