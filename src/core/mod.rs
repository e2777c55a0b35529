//! Core data structures for sasspiler.
//!
//! This module contains the foundational types used throughout sasspiler:
//! - Open source files handed from discovery to the batch runner
//! - Stylesheet syntaxes, conversion targets and import paths
//! - Source recognition and destination path mapping

pub mod path;
pub mod source_file;
pub mod target;

pub use source_file::SourceFile;
pub use target::{ConversionTarget, ImportPaths, StyleSyntax, OUTPUT_EXTENSION};
