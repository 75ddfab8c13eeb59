//! Core types shared by every Carbn crate.
//!
//! This crate provides the tagged [`Value`] model and the [`VmError`]
//! type used across the virtual machine and the CLI front-end. It has
//! no dependencies and no I/O; everything here is pure data.

pub mod error;
pub mod value;

pub use error::{VmError, VmResult};
pub use value::Value;

/// Crate version, surfaced by the CLI's `--version` output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
