//! Source recognition and destination path mapping.
//!
//! These decisions are purely path based, except that an existing path is
//! asked about through the [`FileSystem`] before falling back to syntax.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::core::target::{StyleSyntax, OUTPUT_EXTENSION};
use crate::util::fs::FileSystem;

/// Whether `path` has a stylesheet extension (`.scss`, `.sass`, `.css`, any case).
pub fn is_recognized_source(path: &Path) -> bool {
    StyleSyntax::from_path(path).is_some()
}

/// Whether `path` denotes a directory, existing or not.
///
/// An existing path is answered by the filesystem. A missing path is a
/// directory unless its last component contains a `.`, so `/a/b` is a
/// directory and `/a/b.css` is a file. Stat errors other than "not found"
/// are returned to the caller.
pub fn is_directory_like(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    match fs.metadata(path) {
        Ok(stat) => Ok(stat.is_dir),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(!base_name(path).contains('.')),
        Err(e) => Err(e.into()),
    }
}

/// Last path component as text; `.`, `..` and `/` are kept as-is.
fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path
            .components()
            .next_back()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Compute the output path for `source_path`.
///
/// A file-like `dest_target` is returned unchanged, whatever the number of
/// sources mapped to it. Otherwise the source's path relative to
/// `source_root` is re-rooted under `dest_target` with a `.css` extension.
/// When `source_root` is itself a file, its parent directory is the root.
pub fn compute_destination(
    fs: &dyn FileSystem,
    source_root: &Path,
    source_path: &Path,
    dest_target: &Path,
) -> Result<PathBuf> {
    if !is_directory_like(fs, dest_target)? {
        return Ok(dest_target.to_path_buf());
    }

    let root = effective_root(fs, source_root, source_path)?;
    let relative = pathdiff::diff_paths(source_path, &root).ok_or_else(|| {
        anyhow!(
            "cannot express {} relative to {}",
            source_path.display(),
            root.display()
        )
    })?;

    Ok(with_output_extension(dest_target.join(relative)))
}

/// Swap whatever follows the file name's last `.` for `.css`.
fn with_output_extension(path: PathBuf) -> PathBuf {
    let stem = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(stem, _)| stem.to_string());
    match stem {
        Some(stem) => path.with_file_name(format!("{}.{}", stem, OUTPUT_EXTENSION)),
        None => path.with_extension(OUTPUT_EXTENSION),
    }
}

/// The directory sources are made relative to: `source_root` itself when it
/// is a directory, otherwise the source file's parent.
pub fn effective_root(
    fs: &dyn FileSystem,
    source_root: &Path,
    source_path: &Path,
) -> Result<PathBuf> {
    if is_directory_like(fs, source_root)? {
        Ok(source_root.to_path_buf())
    } else {
        Ok(source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default())
    }
}
