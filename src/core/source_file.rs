//! Open stylesheet sources.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::core::target::StyleSyntax;
use crate::util::fs::{FileHandle, FileStat};

/// An open, readable stylesheet source.
///
/// The handle is released when the value is dropped, so whoever owns the
/// `SourceFile` last closes it exactly once.
pub struct SourceFile {
    path: PathBuf,
    syntax: StyleSyntax,
    handle: Box<dyn FileHandle>,
}

impl SourceFile {
    /// Wrap an open handle for `path`, written in `syntax`.
    pub fn new(path: impl Into<PathBuf>, syntax: StyleSyntax, handle: Box<dyn FileHandle>) -> Self {
        SourceFile {
            path: path.into(),
            syntax,
            handle,
        }
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn syntax(&self) -> StyleSyntax {
        self.syntax
    }

    /// Stat the open file.
    pub fn stat(&self) -> io::Result<FileStat> {
        self.handle.stat()
    }
}

impl Read for SourceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle.read(buf)
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("syntax", &self.syntax)
            .finish_non_exhaustive()
    }
}
