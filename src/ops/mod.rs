//! High-level operations.
//!
//! This module contains the implementation of sasspiler commands.

pub mod discover;
pub mod sasspiler_compile;

pub use discover::discover;
pub use sasspiler_compile::{compile, CompileOptions};
