//! Pieces of the `specsense` binary that are worth testing on their own:
//! query flags, shell commands and engine setup.
pub mod query;
pub mod setup;
pub mod shell;
