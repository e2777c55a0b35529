//! Batch executor with progress reporting.
//!
//! [`BatchRunner`] converts every discovered [`SourceFile`] and folds the
//! per-file results into one outcome: success when every file converted or
//! was skipped, otherwise the first error the runner observed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use indicatif::ProgressBar;

use crate::builder::compiler::Compiler;
use crate::core::path::compute_destination;
use crate::core::SourceFile;
use crate::util::fs::FileSystem;

/// How the files of a batch are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// One file at a time in discovery order; stops at the first failure.
    #[default]
    Sequential,
    /// One task per file on the rayon pool.
    ///
    /// The first error received is returned without waiting for tasks
    /// already running, which may still write their outputs. When several
    /// files fail close together, which error wins is not fixed.
    Parallel {
        /// Size of the global thread pool, if not already initialized.
        jobs: Option<usize>,
    },
}

/// Result of converting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// CSS was written to `dest`.
    Converted { source: PathBuf, dest: PathBuf },
    /// The source was empty and produced no output.
    Skipped { source: PathBuf },
}

impl FileOutcome {
    /// The source this outcome belongs to.
    pub fn source(&self) -> &Path {
        match self {
            FileOutcome::Converted { source, .. } | FileOutcome::Skipped { source } => source,
        }
    }
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Per-file outcomes, in completion order.
    pub outcomes: Vec<FileOutcome>,
    /// Wall time spent in the batch.
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Number of files that produced output.
    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Converted { .. }))
            .count()
    }

    /// Number of empty files that were skipped.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    /// Destinations written, in completion order.
    pub fn destinations(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Converted { dest, .. } => Some(dest.as_path()),
            FileOutcome::Skipped { .. } => None,
        })
    }
}

/// Converts batches of stylesheets.
pub struct BatchRunner {
    fs: Arc<dyn FileSystem>,
    compiler: Arc<dyn Compiler>,
    schedule: Schedule,
    progress: BatchProgress,
}

impl BatchRunner {
    /// Create a sequential runner over `fs` using `compiler`.
    pub fn new(fs: Arc<dyn FileSystem>, compiler: Arc<dyn Compiler>) -> Self {
        BatchRunner {
            fs,
            compiler,
            schedule: Schedule::default(),
            progress: BatchProgress::new(0),
        }
    }

    /// Set the scheduling model.
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Report per-file completions to `progress`.
    pub fn progress(mut self, progress: BatchProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Convert `files` found under `source_root` into `dest_target`.
    ///
    /// Every file handle is released before this returns, except those
    /// still owned by parallel tasks that were running when an error came
    /// back. Outputs already written are left in place on failure.
    pub fn run(
        &self,
        source_root: &Path,
        dest_target: &Path,
        files: Vec<SourceFile>,
        import_paths: &[PathBuf],
    ) -> Result<BatchSummary> {
        let start = Instant::now();
        let job = Job {
            fs: Arc::clone(&self.fs),
            compiler: Arc::clone(&self.compiler),
            source_root: source_root.to_path_buf(),
            dest_target: dest_target.to_path_buf(),
            import_paths: import_paths.to_vec(),
        };

        self.progress.set_total(files.len());
        tracing::debug!("converting {} file(s) ({:?})", files.len(), self.schedule);

        let outcomes = match self.schedule {
            Schedule::Sequential => self.run_sequential(&job, files)?,
            Schedule::Parallel { jobs } => self.run_parallel(job, files, jobs)?,
        };

        Ok(BatchSummary {
            outcomes,
            elapsed: start.elapsed(),
        })
    }

    fn run_sequential(&self, job: &Job, files: Vec<SourceFile>) -> Result<Vec<FileOutcome>> {
        let mut outcomes = Vec::with_capacity(files.len());
        // Remaining handles are dropped with the iterator on early return.
        for file in files {
            let outcome = job.transpile(file)?;
            self.progress.record(&outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn run_parallel(
        &self,
        job: Job,
        files: Vec<SourceFile>,
        jobs: Option<usize>,
    ) -> Result<Vec<FileOutcome>> {
        if let Some(j) = jobs {
            rayon::ThreadPoolBuilder::new()
                .num_threads(j)
                .build_global()
                .ok(); // Ignore if already set
        }

        let total = files.len();
        let job = Arc::new(job);
        let aborted = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<Result<FileOutcome>>();

        for file in files {
            let job = Arc::clone(&job);
            let aborted = Arc::clone(&aborted);
            let progress = self.progress.clone();
            let tx = tx.clone();
            rayon::spawn(move || {
                if aborted.load(Ordering::SeqCst) {
                    tracing::trace!("not starting {}: batch failed", file.path().display());
                    return;
                }
                let result = job.transpile(file);
                match &result {
                    Ok(outcome) => progress.record(outcome),
                    Err(_) => aborted.store(true, Ordering::SeqCst),
                }
                // The receiver is gone once the batch has failed.
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        for _ in 0..total {
            let result = rx
                .recv()
                .map_err(|_| anyhow!("a conversion task exited without reporting"))?;
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => return Err(e),
            }
        }

        Ok(outcomes)
    }
}

/// Everything one file's conversion needs, shareable across tasks.
struct Job {
    fs: Arc<dyn FileSystem>,
    compiler: Arc<dyn Compiler>,
    source_root: PathBuf,
    dest_target: PathBuf,
    import_paths: Vec<PathBuf>,
}

impl Job {
    /// Convert one file. `file` is dropped, and so closed, on every return.
    fn transpile(&self, mut file: SourceFile) -> Result<FileOutcome> {
        let stat = file.stat()?;
        if stat.size == 0 {
            tracing::debug!("{} is empty, skipping", file.path().display());
            return Ok(FileOutcome::Skipped {
                source: file.path().to_path_buf(),
            });
        }

        let dest = compute_destination(
            self.fs.as_ref(),
            &self.source_root,
            file.path(),
            &self.dest_target,
        )?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            // A failure here resurfaces when the destination is created.
            if let Err(e) = self.fs.create_dir_all(parent) {
                tracing::debug!("failed to create {}: {}", parent.display(), e);
            }
        }

        let syntax = file.syntax();
        let mut writer = self.fs.create(&dest)?;
        {
            let mut converter = self.compiler.converter(syntax, &mut *writer, &mut file)?;
            converter.include_paths(&self.import_paths)?;
            converter.run()?;
        }
        writer.flush()?;

        tracing::debug!("{} ==> {}", file.path().display(), dest.display());

        Ok(FileOutcome::Converted {
            source: file.path().to_path_buf(),
            dest,
        })
    }
}

/// Progress counters shared by every task of a batch.
#[derive(Clone, Default)]
pub struct BatchProgress {
    converted: Arc<AtomicUsize>,
    skipped: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    /// Create a new progress tracker.
    pub fn new(total: usize) -> Self {
        BatchProgress {
            total: Arc::new(AtomicUsize::new(total)),
            ..BatchProgress::default()
        }
    }

    /// Mirror progress onto a terminal progress bar.
    pub fn with_bar(mut self, bar: ProgressBar) -> Self {
        bar.set_length(self.total() as u64);
        self.bar = Some(bar);
        self
    }

    /// Set the number of files expected.
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
        }
    }

    /// Record a finished file.
    pub fn record(&self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Converted { .. } => self.converted.fetch_add(1, Ordering::SeqCst),
            FileOutcome::Skipped { .. } => self.skipped.fetch_add(1, Ordering::SeqCst),
        };
        if let Some(bar) = &self.bar {
            bar.set_message(outcome.source().display().to_string());
            bar.inc(1);
        }
    }

    /// Get the number of converted files.
    pub fn converted_count(&self) -> usize {
        self.converted.load(Ordering::SeqCst)
    }

    /// Get the number of skipped files.
    pub fn skipped_count(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Get the number of files expected.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Get total progress as a fraction.
    pub fn progress(&self) -> f64 {
        let done = self.converted_count() + self.skipped_count();
        match self.total() {
            0 => 1.0,
            total => done as f64 / total as f64,
        }
    }

    /// Check if every expected file has finished.
    pub fn is_complete(&self) -> bool {
        self.converted_count() + self.skipped_count() >= self.total()
    }

    /// Clear the progress bar, if any.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
