//! Stylesheet discovery.

use std::path::Path;

use anyhow::Result;

use crate::core::path::is_directory_like;
use crate::core::{SourceFile, StyleSyntax};
use crate::util::diagnostic::SasspilerError;
use crate::util::fs::FileSystem;

/// Collect every stylesheet under `path`, opened and ready to compile.
///
/// A non-directory `path` yields itself when it is a stylesheet and nothing
/// otherwise. A directory is walked depth-first in the filesystem's listing
/// order, descending into subdirectories as they are met. Listing or open
/// failures abort the whole walk.
///
/// The returned handles are owned by the caller.
pub fn discover(fs: &dyn FileSystem, path: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    discover_into(fs, path, &mut files)?;
    Ok(files)
}

fn discover_into(fs: &dyn FileSystem, path: &Path, files: &mut Vec<SourceFile>) -> Result<()> {
    if !is_directory_like(fs, path)? {
        match StyleSyntax::from_path(path) {
            Some(syntax) => files.push(SourceFile::new(path, syntax, fs.open(path)?)),
            None => tracing::debug!("ignoring {}: not a stylesheet", path.display()),
        }
        return Ok(());
    }

    let entries = fs.read_dir(path).map_err(|e| SasspilerError::ReadDir {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    for entry in entries {
        if entry.is_dir {
            discover_into(fs, &entry.path, files)?;
            continue;
        }

        let Some(syntax) = StyleSyntax::from_path(&entry.path) else {
            continue;
        };
        tracing::trace!("found {} stylesheet {}", syntax, entry.path.display());

        files.push(SourceFile::new(&entry.path, syntax, fs.open(&entry.path)?));
    }

    Ok(())
}
