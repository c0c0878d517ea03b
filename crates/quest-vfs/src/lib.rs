//! In-memory virtual filesystem for Linux Command Quest.
//!
//! The tree is a plain owned structure ([`FileNode`]) managed by a
//! [`VirtualFileSystem`] that also tracks the session's user, home, and
//! working directory. Paths are resolved lexically (see [`path`]) before any
//! lookup, so every operation accepts absolute, relative, `~`, and
//! `$HOME`-style spellings.

mod defaults;
pub mod memory;
pub mod node;
pub mod path;
pub mod permission;
pub mod snapshot;

pub use memory::{DIR_LISTING_SIZE, DirEntry, EntryDetail, VirtualFileSystem};
pub use node::FileNode;
pub use permission::Permission;
pub use snapshot::VfsSnapshot;
