//! sasspiler - compile a tree of Sass stylesheets into CSS
//!
//! This crate provides the core library functionality for sasspiler,
//! including stylesheet discovery, destination mapping and batch execution.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for sasspiler unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations of the filesystem and
/// the stylesheet compiler.
#[cfg(test)]
pub mod test_support;

pub use builder::{BatchRunner, Compiler, SassCompiler};
pub use core::SourceFile;
pub use util::context::GlobalContext;
