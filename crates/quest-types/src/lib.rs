//! Foundation types for Linux Command Quest.
//!
//! This crate holds the pieces shared by every other quest crate: the error
//! taxonomy (filesystem kinds plus the crate-wide error) and the session
//! configuration loaded from TOML.

pub mod config;
pub mod error;
