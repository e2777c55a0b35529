//! Implementation of `sasspiler --source <path> --dest <path>`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::compiler::Compiler;
use crate::builder::executor::{BatchProgress, BatchRunner, BatchSummary, Schedule};
use crate::core::{ConversionTarget, ImportPaths};
use crate::ops::discover::discover;
use crate::util::diagnostic::SasspilerError;
use crate::util::fs::FileSystem;

/// Options for the compile command.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Stylesheet file or directory to compile
    pub source: PathBuf,

    /// Output directory, or output file for a single source
    pub dest: PathBuf,

    /// Extra directories searched for imports
    pub import_paths: ImportPaths,

    /// How files are scheduled
    pub schedule: Schedule,
}

/// Fail with [`SasspilerError::SourceNotFound`] unless `source` exists.
pub fn check_source(fs: &dyn FileSystem, source: &Path) -> Result<()> {
    if !fs.exists(source) {
        return Err(SasspilerError::SourceNotFound {
            path: source.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

/// Discover every stylesheet under `opts.source` and compile it into `opts.dest`.
///
/// Fails before any conversion when the source does not exist or a
/// directory cannot be listed. After that, the first per-file failure is
/// returned as produced by the filesystem or compiler.
pub fn compile(
    fs: Arc<dyn FileSystem>,
    compiler: Arc<dyn Compiler>,
    opts: &CompileOptions,
    progress: BatchProgress,
) -> Result<BatchSummary> {
    check_source(fs.as_ref(), &opts.source)?;

    let files = discover(fs.as_ref(), &opts.source)?;

    let target = ConversionTarget::classify(fs.as_ref(), &opts.dest)?;
    if !target.is_directory() && files.len() > 1 {
        tracing::warn!(
            "{} stylesheets will all be written to {}",
            files.len(),
            target.path().display()
        );
    }

    tracing::info!(
        "compiling {} stylesheet(s) from {}",
        files.len(),
        opts.source.display()
    );

    BatchRunner::new(fs, compiler)
        .schedule(opts.schedule)
        .progress(progress)
        .run(
            &opts.source,
            target.path(),
            files,
            opts.import_paths.as_slice(),
        )
}
