//! Directory traversal feeding the worker pool.
//!
//! The calling thread walks the tree depth-first with `walkdir`, pruning
//! excluded and hidden directories before descending. Every regular file
//! goes through [`FilterConfig::select`]; eligible files are sent to the
//! [`WorkerPool`] as jobs, everything else bumps the skipped counter.
//! Traversal errors are recorded and the walk carries on.
//!
//! Symbolic links are only descended with `follow_links`. Without it, a link
//! to a regular file is still counted and a dangling link is recorded as a
//! path-access error.

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::{mem, thread};

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{LoccError, RunError};
use crate::filter::{FilterConfig, Selection};
use crate::language::LanguageRegistry;
use crate::pool::{lock, Aggregate, FileJob, WorkerPool, DEFAULT_QUEUE_CAPACITY};
use crate::stats::{aggregate, total, FileStats, LanguageStats, TotalStats};
use crate::Result;

/// Options for a directory walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Worker threads (None = available parallelism)
    pub workers: Option<usize>,
    /// Directory and file exclusion rules
    pub filter: FilterConfig,
    /// Follow symbolic links
    pub follow_links: bool,
    /// Bound for the job and result queues
    pub queue_capacity: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            workers: None,
            filter: FilterConfig::default(),
            follow_links: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WalkOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Follow symbolic links while walking.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set the bound for the job and result queues.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// Everything a walk collected.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// One entry per counted file, in completion order
    pub files: Vec<FileStats>,
    /// Traversal and classification errors
    pub errors: Vec<RunError>,
    /// Whether the walk stopped early
    pub cancelled: bool,
}

impl WalkOutcome {
    /// Per-language rollup of the counted files.
    pub fn languages(&self) -> BTreeMap<String, LanguageStats> {
        aggregate(&self.files)
    }

    /// Grand total of the counted files.
    pub fn total(&self) -> TotalStats {
        total(&self.languages())
    }
}

/// Counts every eligible file under a root.
///
/// The run state lives behind one lock, so the counters can be read from
/// another thread while a walk is in progress.
pub struct Walker<'r> {
    registry: &'r LanguageRegistry,
    options: WalkOptions,
    pool: WorkerPool,
    state: Mutex<Aggregate>,
    cancel: Arc<AtomicBool>,
    running: AtomicBool,
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<'r> Walker<'r> {
    /// Validate the options and build a walker. Fails on a zero worker count
    /// or queue capacity.
    pub fn new(registry: &'r LanguageRegistry, options: WalkOptions) -> Result<Self> {
        let workers = match options.workers {
            Some(n) => n,
            None => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        };
        let pool = WorkerPool::new(workers, options.queue_capacity)?;
        Ok(Self {
            registry,
            options,
            pool,
            state: Mutex::new(Aggregate::default()),
            cancel: Arc::new(AtomicBool::new(false)),
            running: AtomicBool::new(false),
        })
    }

    /// Number of worker threads a run will use.
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Flag that stops a run when set. Traversal checks it before every step
    /// and every dispatch; files already being classified still finish.
    /// A cancelled walker stays cancelled.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Files classified so far.
    pub fn processed_count(&self) -> u64 {
        self.state().processed
    }

    /// Files skipped so far (binary, hidden, unsupported, or pattern match).
    pub fn skipped_count(&self) -> u64 {
        self.state().skipped
    }

    /// Errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.state().errors.len()
    }

    /// Walk `root` and count every eligible file beneath it.
    ///
    /// Only configuration problems fail the call; per-path failures end up in
    /// [`WalkOutcome::errors`]. Each run starts from fresh counters.
    ///
    /// Runs on one walker are sequential: calling `run` while another run is
    /// active fails with [`LoccError::WalkInProgress`].
    pub fn run(&self, root: impl AsRef<Path>) -> Result<WalkOutcome> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(LoccError::PathNotFound(root.to_path_buf()));
        }
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(LoccError::WalkInProgress);
        }
        let _guard = RunGuard(&self.running);

        *self.state() = Aggregate::default();
        info!(root = %root.display(), workers = self.pool.workers(), "starting walk");

        self.pool
            .run(&self.state, &self.cancel, |jobs| self.traverse(root, jobs))?;

        let cancelled = self.is_cancelled();
        let mut state = self.state();
        info!(
            processed = state.processed,
            skipped = state.skipped,
            errors = state.errors.len(),
            cancelled,
            "walk finished"
        );
        Ok(WalkOutcome {
            files: mem::take(&mut state.files),
            errors: state.errors.clone(),
            cancelled,
        })
    }

    fn traverse(&self, root: &Path, jobs: &Sender<FileJob<'r>>) {
        let entries = WalkDir::new(root)
            .follow_links(self.options.follow_links)
            .into_iter()
            .filter_entry(|entry| self.keep_dir(entry));

        for entry in entries {
            if self.is_cancelled() {
                debug!("walk cancelled");
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_access_error(RunError::from(err));
                    continue;
                }
            };
            if !self.is_file(&entry) {
                continue;
            }

            match self.options.filter.select(self.registry, entry.path()) {
                Selection::Skipped(reason) => {
                    debug!(path = %entry.path().display(), %reason, "skipping file");
                    self.state().skipped += 1;
                }
                Selection::Eligible {
                    extension,
                    language,
                } => {
                    if self.is_cancelled() {
                        break;
                    }
                    let job = FileJob {
                        path: entry.into_path(),
                        extension,
                        language,
                    };
                    if jobs.send(job).is_err() {
                        break;
                    }
                }
            }
        }
    }

    /// Regular files, plus links to regular files when links are not
    /// followed. A link whose target cannot be read is recorded.
    fn is_file(&self, entry: &DirEntry) -> bool {
        if self.options.follow_links || !entry.path_is_symlink() {
            return entry.file_type().is_file();
        }
        match fs::metadata(entry.path()) {
            Ok(meta) => meta.is_file(),
            Err(err) => {
                self.record_access_error(RunError::path_access(entry.path(), err.to_string()));
                false
            }
        }
    }

    fn record_access_error(&self, err: RunError) {
        debug!(path = %err.path.display(), error = %err.message, "cannot access path");
        self.state().errors.push(err);
    }

    fn keep_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        let is_root = entry.depth() == 0;
        match self.options.filter.prune_dir(&name, is_root) {
            None => true,
            Some(reason) => {
                if is_root {
                    warn!(path = %entry.path().display(), %reason, "root directory is excluded, nothing to count");
                } else {
                    debug!(path = %entry.path().display(), %reason, "pruning directory");
                }
                false
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn state(&self) -> MutexGuard<'_, Aggregate> {
        lock(&self.state)
    }
}

/// Count a directory tree with a one-off [`Walker`].
///
/// # Example
///
/// ```rust,ignore
/// use locclib::{count_directory, FilterConfig, LanguageRegistry, WalkOptions};
///
/// let registry = LanguageRegistry::builtin();
/// let filter = FilterConfig::new().exclude("*_test.go")?;
/// let outcome = count_directory("src", &registry, WalkOptions::new().filter(filter))?;
/// println!("{} files", outcome.files.len());
/// ```
pub fn count_directory(
    root: impl AsRef<Path>,
    registry: &LanguageRegistry,
    options: WalkOptions,
) -> Result<WalkOutcome> {
    Walker::new(registry, options)?.run(root)
}
