//! Stylesheet conversion.
//!
//! This module implements the compiler capability and the batch executor
//! that drives it over every discovered file.

pub mod compiler;
pub mod executor;
pub mod sass;

pub use compiler::{Compiler, Converter};
pub use executor::{BatchProgress, BatchRunner, BatchSummary, FileOutcome, Schedule};
pub use sass::{OutputStyle, SassCompiler};
