//! Error types for Linux Command Quest.

use std::io;

/// Failure kinds signalled by virtual filesystem operations.
///
/// Every variant carries the path the caller supplied, so command adapters
/// can echo it back in their messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    #[error("{0}: No such file or directory")]
    PathNotFound(String),

    #[error("{0}: File exists")]
    AlreadyExists(String),

    #[error("{0}: Is a directory")]
    IsADirectory(String),

    #[error("{0}: Not a directory")]
    NotADirectory(String),

    #[error("{0}: Permission denied")]
    PermissionDenied(String),

    #[error("{0}: Directory not empty")]
    NotEmpty(String),

    /// A directory would end up inside itself.
    #[error("{0}: Invalid argument")]
    InvalidArgument(String),
}

impl FsError {
    /// The path the failing operation was given.
    pub fn path(&self) -> &str {
        match self {
            Self::PathNotFound(p)
            | Self::AlreadyExists(p)
            | Self::IsADirectory(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::NotEmpty(p)
            | Self::InvalidArgument(p) => p,
        }
    }

    /// Human-readable reason without the path prefix.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::PathNotFound(_) => "No such file or directory",
            Self::AlreadyExists(_) => "File exists",
            Self::IsADirectory(_) => "Is a directory",
            Self::NotADirectory(_) => "Not a directory",
            Self::PermissionDenied(_) => "Permission denied",
            Self::NotEmpty(_) => "Directory not empty",
            Self::InvalidArgument(_) => "Invalid argument",
        }
    }
}

/// Errors produced by the quest crates.
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, QuestError>;
