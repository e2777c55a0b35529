//! Stylesheet compiler capability.
//!
//! The batch runner never interprets stylesheet syntax. It asks a
//! [`Compiler`] for a [`Converter`] bound to one source/destination pair and
//! the source's [`StyleSyntax`], configures its include paths and runs it.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Result;

use crate::core::StyleSyntax;

/// Factory for per-file converters. Shared by every file of a batch.
pub trait Compiler: Send + Sync {
    /// Bind a converter that reads `syntax` source from `src` and streams
    /// compiled CSS into `dest`.
    fn converter<'a>(
        &self,
        syntax: StyleSyntax,
        dest: &'a mut dyn Write,
        src: &'a mut dyn Read,
    ) -> Result<Box<dyn Converter + 'a>>;
}

/// A single source-to-CSS conversion.
pub trait Converter {
    /// Directories searched when resolving `@import`/`@use`.
    fn include_paths(&mut self, paths: &[PathBuf]) -> Result<()>;

    /// Compile the bound source into the bound destination.
    fn run(&mut self) -> Result<()>;
}
