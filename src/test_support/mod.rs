//! Test utilities and mocks for sasspiler unit tests.
//!
//! This module provides an in-memory [`FileSystem`] and a scripted
//! [`Compiler`] so discovery and batch runs can be tested without touching
//! the disk or needing a Sass executable.
//!
//! # Example
//!
//! ```rust,ignore
//! use sasspiler::test_support::{MockCompiler, MockFileSystem};
//!
//! #[test]
//! fn test_example() {
//!     let mut fs = MockFileSystem::new();
//!     fs.add_file("/src/style.scss", b"body {}".to_vec());
//!
//!     let compiler = MockCompiler::new();
//!     // Use mocks in tests...
//! }
//! ```


use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};

use crate::builder::compiler::{Compiler, Converter};
use crate::core::StyleSyntax;
use crate::util::fs::{DirEntry, FileHandle, FileStat, FileSystem};

// Re-export fixtures for convenience
pub use fixtures::*;

#[derive(Debug, Default)]
struct MockState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    metadata_failures: HashMap<PathBuf, String>,
    stat_failures: HashMap<PathBuf, String>,
    read_dir_failures: HashMap<PathBuf, String>,
    create_failures: HashMap<PathBuf, String>,
}

impl MockState {
    fn add_dir(&mut self, path: &Path) {
        let mut current = Some(path);
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }
}

#[derive(Debug, Default)]
struct HandleCounter {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Mock filesystem for testing without real I/O.
///
/// Clones share the same tree, so a test can hand one clone to the code
/// under test and inspect the results through another. Directory listings
/// are sorted by name. Every handle returned by `open` is counted, and its
/// drop is counted as a close.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
    handles: Arc<HandleCounter>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        MockFileSystem::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a file with the given content, creating parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut state = self.state();
        if let Some(parent) = path.parent() {
            state.add_dir(parent);
        }
        state.files.insert(path.to_path_buf(), content.into());
    }

    /// Add a directory and all of its parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        self.state().add_dir(path.as_ref());
    }

    /// Make `metadata(path)` fail with `message`.
    pub fn fail_metadata(&mut self, path: impl AsRef<Path>, message: &str) {
        self.state()
            .metadata_failures
            .insert(path.as_ref().to_path_buf(), message.to_string());
    }

    /// Make `stat()` on handles opened for `path` fail with `message`.
    pub fn fail_stat(&mut self, path: impl AsRef<Path>, message: &str) {
        self.state()
            .stat_failures
            .insert(path.as_ref().to_path_buf(), message.to_string());
    }

    /// Make listing `path` fail with `message`.
    pub fn fail_read_dir(&mut self, path: impl AsRef<Path>, message: &str) {
        self.state()
            .read_dir_failures
            .insert(path.as_ref().to_path_buf(), message.to_string());
    }

    /// Make creating `path` fail with `message`.
    pub fn fail_create(&mut self, path: impl AsRef<Path>, message: &str) {
        self.state()
            .create_failures
            .insert(path.as_ref().to_path_buf(), message.to_string());
    }

    /// Read a file's contents.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        self.state()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("file not found: {}", path.display()))
    }

    /// Read a file as a string.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| anyhow!("invalid UTF-8: {}", e))
    }

    /// Check if a path is a file.
    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    /// Check if a path is a directory.
    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.state().dirs.contains(path.as_ref())
    }

    /// Number of handles opened and not yet dropped.
    pub fn open_handles(&self) -> usize {
        self.opened() - self.closed()
    }

    /// Number of handles ever opened.
    pub fn opened(&self) -> usize {
        self.handles.opened.load(Ordering::SeqCst)
    }

    /// Number of handles dropped.
    pub fn closed(&self) -> usize {
        self.handles.closed.load(Ordering::SeqCst)
    }
}

struct MockHandle {
    content: Cursor<Vec<u8>>,
    stat_failure: Option<String>,
    handles: Arc<HandleCounter>,
}

impl Read for MockHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

impl FileHandle for MockHandle {
    fn stat(&self) -> io::Result<FileStat> {
        match &self.stat_failure {
            Some(message) => Err(io::Error::other(message.clone())),
            None => Ok(FileStat {
                is_dir: false,
                size: self.content.get_ref().len() as u64,
            }),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.handles.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writer that appends straight into the shared tree, so partial output is
/// visible even when a conversion fails halfway.
struct MockWriter {
    path: PathBuf,
    state: Arc<Mutex<MockState>>,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let state = self.state();
        let content = state.files.get(path).cloned().ok_or_else(|| not_found(path))?;
        let stat_failure = state.stat_failures.get(path).cloned();
        drop(state);

        self.handles.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            content: Cursor::new(content),
            stat_failure,
            handles: Arc::clone(&self.handles),
        }))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        let mut state = self.state();
        if let Some(message) = state.create_failures.get(path) {
            return Err(io::Error::other(message.clone()));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) {
                return Err(not_found(parent));
            }
        }
        if state.dirs.contains(path) {
            return Err(io::Error::other(format!("{}: is a directory", path.display())));
        }
        state.files.insert(path.to_path_buf(), Vec::new());

        Ok(Box::new(MockWriter {
            path: path.to_path_buf(),
            state: Arc::clone(&self.state),
        }))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state();
        if state.files.contains_key(path) {
            return Err(io::Error::other(format!("{}: not a directory", path.display())));
        }
        state.add_dir(path);
        Ok(())
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let state = self.state();
        if let Some(message) = state.metadata_failures.get(path) {
            return Err(io::Error::other(message.clone()));
        }
        if state.dirs.contains(path) {
            return Ok(FileStat {
                is_dir: true,
                size: 0,
            });
        }
        match state.files.get(path) {
            Some(content) => Ok(FileStat {
                is_dir: false,
                size: content.len() as u64,
            }),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let state = self.state();
        if let Some(message) = state.read_dir_failures.get(path) {
            return Err(io::Error::other(message.clone()));
        }
        if !state.dirs.contains(path) {
            return Err(not_found(path));
        }

        let dirs = state
            .dirs
            .iter()
            .filter(|d| d.parent() == Some(path))
            .map(|d| DirEntry {
                path: d.clone(),
                is_dir: true,
            });
        let files = state
            .files
            .keys()
            .filter(|f| f.parent() == Some(path))
            .map(|f| DirEntry {
                path: f.clone(),
                is_dir: false,
            });

        let mut entries: Vec<_> = dirs.chain(files).collect();
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }
}

/// Stage at which a [`MockCompiler`] conversion fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    /// Building the converter.
    Converter,
    /// Applying include paths.
    IncludePaths,
    /// Running the conversion.
    Run,
}

/// Output the mock compiler produces for `source`.
pub fn mock_css(source: &str) -> String {
    format!("/* compiled */\n{}\n", source.trim())
}

/// Scripted [`Compiler`] for tests.
///
/// By default every conversion succeeds and writes [`mock_css`] of the
/// source. Failures can be injected at any stage, for every file or only for
/// sources containing a marker.
#[derive(Debug, Clone, Default)]
pub struct MockCompiler {
    failure: Option<(CompileStage, String)>,
    marker: Option<String>,
    partial_output: Option<Vec<u8>>,
    converters: Arc<AtomicUsize>,
    syntaxes: Arc<Mutex<Vec<StyleSyntax>>>,
    include_paths: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl MockCompiler {
    /// A compiler that always succeeds.
    pub fn new() -> Self {
        MockCompiler::default()
    }

    /// Fail every conversion at `stage` with `message`.
    pub fn failing_at(stage: CompileStage, message: &str) -> Self {
        MockCompiler {
            failure: Some((stage, message.to_string())),
            ..MockCompiler::default()
        }
    }

    /// Fail the run of every source containing `marker` with `message`.
    pub fn failing_on(marker: &str, message: &str) -> Self {
        MockCompiler {
            failure: Some((CompileStage::Run, message.to_string())),
            marker: Some(marker.to_string()),
            ..MockCompiler::default()
        }
    }

    /// Write `bytes` to the destination before a run failure.
    pub fn with_partial_output(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.partial_output = Some(bytes.into());
        self
    }

    /// Number of converters built so far.
    pub fn converters_built(&self) -> usize {
        self.converters.load(Ordering::SeqCst)
    }

    /// Syntax each converter was built for, in call order.
    pub fn syntaxes(&self) -> Vec<StyleSyntax> {
        self.syntaxes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Include paths passed to each converter, in call order.
    pub fn include_path_calls(&self) -> Vec<Vec<PathBuf>> {
        self.include_paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn fails_at(&self, stage: CompileStage) -> Option<&str> {
        match &self.failure {
            Some((s, message)) if *s == stage => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compiler for MockCompiler {
    fn converter<'a>(
        &self,
        syntax: StyleSyntax,
        dest: &'a mut dyn Write,
        src: &'a mut dyn Read,
    ) -> Result<Box<dyn Converter + 'a>> {
        self.converters.fetch_add(1, Ordering::SeqCst);
        self.syntaxes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(syntax);
        if let Some(message) = self.fails_at(CompileStage::Converter) {
            bail!("{}", message);
        }
        Ok(Box::new(MockConverter {
            compiler: self.clone(),
            dest,
            src,
        }))
    }
}

struct MockConverter<'a> {
    compiler: MockCompiler,
    dest: &'a mut dyn Write,
    src: &'a mut dyn Read,
}

impl Converter for MockConverter<'_> {
    fn include_paths(&mut self, paths: &[PathBuf]) -> Result<()> {
        self.compiler
            .include_paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(paths.to_vec());
        if let Some(message) = self.compiler.fails_at(CompileStage::IncludePaths) {
            bail!("{}", message);
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let mut source = String::new();
        self.src.read_to_string(&mut source)?;

        if let Some(message) = self.compiler.fails_at(CompileStage::Run) {
            let matches = match &self.compiler.marker {
                Some(marker) => source.contains(marker.as_str()),
                None => true,
            };
            if matches {
                if let Some(partial) = &self.compiler.partial_output {
                    self.dest.write_all(partial)?;
                }
                bail!("{}", message);
            }
        }

        self.dest.write_all(mock_css(&source).as_bytes())?;
        Ok(())
    }
}

/// Assertion helpers for testing.
pub mod assertions {
    use super::*;

    /// Assert that a result is Err and that its message is exactly `message`.
    pub fn assert_error_eq<T: std::fmt::Debug>(result: Result<T>, message: &str) {
        match result {
            Ok(v) => panic!("expected Err '{}', got Ok: {:?}", message, v),
            Err(e) => assert_eq!(e.to_string(), message),
        }
    }

    /// Assert that a file does not exist in the mock filesystem.
    pub fn assert_no_file(fs: &MockFileSystem, path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!fs.is_file(path), "{} should not exist", path.display());
    }

    /// Assert that a file has exactly the given content.
    pub fn assert_file_eq(fs: &MockFileSystem, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        let actual = fs
            .read_to_string(path)
            .unwrap_or_else(|_| panic!("file not found: {}", path.display()));
        assert_eq!(actual, content, "unexpected content in {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_filesystem_basic() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/project/style.scss", b"body {}".to_vec());

        assert!(fs.exists(Path::new("/project")));
        assert!(fs.exists(Path::new("/project/style.scss")));
        assert!(!fs.exists(Path::new("/project/nonexistent")));
        assert_eq!(fs.read_to_string("/project/style.scss").unwrap(), "body {}");
    }

    #[test]
    fn test_mock_filesystem_directories() {
        let mut fs = MockFileSystem::new();

        fs.add_dir("/a/b/c");
        assert!(fs.is_dir("/a"));
        assert!(fs.is_dir("/a/b"));
        assert!(fs.is_dir("/a/b/c"));
        assert!(fs.metadata(Path::new("/a/b")).unwrap().is_dir);
    }

    #[test]
    fn test_mock_filesystem_handle_counting() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/a.scss", b"a {}".to_vec());

        let handle = fs.open(Path::new("/a.scss")).unwrap();
        assert_eq!(fs.open_handles(), 1);
        drop(handle);
        assert_eq!(fs.open_handles(), 0);
        assert_eq!(fs.opened(), 1);
        assert_eq!(fs.closed(), 1);
    }

    #[test]
    fn test_mock_filesystem_create_requires_parent() {
        let fs = MockFileSystem::new();

        assert!(fs.create(Path::new("/out/a.css")).is_err());
        fs.create_dir_all(Path::new("/out")).unwrap();

        let mut writer = fs.create(Path::new("/out/a.css")).unwrap();
        writer.write_all(b"a {}").unwrap();
        assert_eq!(fs.read_to_string("/out/a.css").unwrap(), "a {}");
    }

    #[test]
    fn test_mock_compiler_success() {
        let compiler = MockCompiler::new();
        let mut dest = Vec::new();
        let mut src: &[u8] = b"body {}";
        {
            let mut converter = compiler.converter(StyleSyntax::Scss, &mut dest, &mut src).unwrap();
            converter.include_paths(&[PathBuf::from("lib")]).unwrap();
            converter.run().unwrap();
        }

        assert_eq!(String::from_utf8(dest).unwrap(), mock_css("body {}"));
        assert_eq!(compiler.converters_built(), 1);
        assert_eq!(compiler.syntaxes(), vec![StyleSyntax::Scss]);
        assert_eq!(compiler.include_path_calls(), vec![vec![PathBuf::from("lib")]]);
    }

    #[test]
    fn test_mock_compiler_marker() {
        let compiler = MockCompiler::failing_on("BROKEN", "syntax error");
        let mut dest = Vec::new();

        let mut ok: &[u8] = b"a {}";
        compiler.converter(StyleSyntax::Scss, &mut dest, &mut ok).unwrap().run().unwrap();

        let mut broken: &[u8] = b"a { BROKEN }";
        let err = compiler
            .converter(StyleSyntax::Scss, &mut dest, &mut broken)
            .unwrap()
            .run()
            .unwrap_err();
        assert_eq!(err.to_string(), "syntax error");
    }
}
