//! Filesystem capability.
//!
//! Everything that touches the disk goes through the [`FileSystem`] trait so
//! discovery and batch runs can be exercised against an in-memory tree in
//! tests and against the real disk in the CLI.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// The subset of file metadata the compiler pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Whether the path is a directory.
    pub is_dir: bool,
    /// Size in bytes.
    pub size: u64,
}

/// A single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry (listing path joined with the entry name).
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// An open, readable file.
pub trait FileHandle: Read + Send {
    /// Stat the open file.
    fn stat(&self) -> io::Result<FileStat>;
}

/// Abstract filesystem used by discovery and the batch runner.
pub trait FileSystem: Send + Sync {
    /// Open a file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;

    /// Create (or truncate) a file for writing.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Stat a path.
    fn metadata(&self, path: &Path) -> io::Result<FileStat>;

    /// List the immediate entries of a directory, in the order this
    /// filesystem reports them.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Check whether a path exists.
    ///
    /// Only a `NotFound` stat counts as missing. A path that cannot be
    /// stat'ed for another reason exists, and the error shows up on first use.
    fn exists(&self, path: &Path) -> bool {
        match self.metadata(path) {
            Ok(_) => true,
            Err(e) => e.kind() != io::ErrorKind::NotFound,
        }
    }
}

/// [`FileSystem`] backed by the real disk.
///
/// Directory listings are returned sorted by file name so that discovery is
/// reproducible across platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// Create a new OS-backed filesystem.
    pub fn new() -> Self {
        OsFileSystem
    }
}

struct OsFile {
    file: fs::File,
}

impl Read for OsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl FileHandle for OsFile {
    fn stat(&self) -> io::Result<FileStat> {
        let meta = self.file.metadata()?;
        Ok(FileStat {
            is_dir: meta.is_dir(),
            size: meta.len(),
        })
    }
}

/// Attach the path to an I/O error while keeping its kind.
fn path_error(action: &str, path: &Path, err: io::Error) -> io::Error {
    io::Error::new(
        err.kind(),
        format!("failed to {} {}: {}", action, path.display(), err),
    )
}

impl FileSystem for OsFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = fs::File::open(path).map_err(|e| path_error("open", path, e))?;
        Ok(Box::new(OsFile { file }))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        let file = fs::File::create(path).map_err(|e| path_error("create", path, e))?;
        Ok(Box::new(io::BufWriter::new(file)))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).map_err(|e| path_error("create directory", path, e))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        // Keep the original error: callers branch on `NotFound`.
        let meta = fs::metadata(path)?;
        Ok(FileStat {
            is_dir: meta.is_dir(),
            size: meta.len(),
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Follow symlinks so a linked directory is walked like a real one.
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            entries.push(DirEntry {
                path: entry.path(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }
}
