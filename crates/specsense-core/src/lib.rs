//! specsense-core
//!
//! Catalog store, domain types, collaborator traits, error taxonomy and
//! configuration shared by the text, vector and hybrid crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::Catalog;
pub use error::{Error, Result};
