//! Mission tasks and the validator that judges them.
//!
//! A [`Task`] names what the player should achieve; [`TaskValidator`]
//! decides, after each command, whether the filesystem state or the typed
//! line satisfies it.

pub mod task;
pub mod validator;

pub use task::Task;
pub use validator::{TaskValidator, Verdict};
