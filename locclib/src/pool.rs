//! Worker pool and result collector.
//!
//! ```text
//! traversal (caller thread) ──jobs──▶ worker 0..N ──results──▶ collector
//!                                                              │
//!                                                   Mutex<Aggregate>
//! ```
//!
//! Both queues are bounded `crossbeam-channel`s. A queue closes when its last
//! sender is dropped: the producer returning closes the job queue, and the
//! last worker exiting closes the result queue, which ends the collector.
//! All threads are scoped, so jobs may borrow the language registry.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::debug;

use crate::classifier::classify_as;
use crate::error::{LoccError, RunError};
use crate::language::Language;
use crate::stats::FileStats;
use crate::Result;

/// Default bound for both queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// One eligible file, ready to classify.
#[derive(Debug, Clone)]
pub struct FileJob<'r> {
    pub path: PathBuf,
    /// Lowercased extension without the dot
    pub extension: String,
    pub language: &'r Language,
}

/// What a worker sends back for one job.
#[derive(Debug, Clone)]
pub enum JobResult {
    Counted(FileStats),
    Failed(RunError),
}

/// Shared run state. Only ever touched under its lock.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub files: Vec<FileStats>,
    pub errors: Vec<RunError>,
    pub processed: u64,
    pub skipped: u64,
}

impl Aggregate {
    /// Append one worker result.
    pub fn record(&mut self, result: JobResult) {
        match result {
            JobResult::Counted(stats) => {
                self.processed += 1;
                self.files.push(stats);
            }
            JobResult::Failed(err) => self.errors.push(err),
        }
    }
}

/// Lock the shared state, recovering the data if a holder panicked.
pub(crate) fn lock(state: &Mutex<Aggregate>) -> std::sync::MutexGuard<'_, Aggregate> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A fixed number of classifier threads plus one collector.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    capacity: usize,
}

impl WorkerPool {
    /// Both `workers` and `capacity` must be at least one.
    pub fn new(workers: usize, capacity: usize) -> Result<Self> {
        if workers == 0 {
            return Err(LoccError::InvalidWorkerCount(workers));
        }
        if capacity == 0 {
            return Err(LoccError::InvalidQueueCapacity(capacity));
        }
        Ok(Self { workers, capacity })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run `produce` on the calling thread while the pool consumes the jobs
    /// it sends. Returns once every job has been classified and every result
    /// recorded in `state`.
    ///
    /// Once `cancel` is set, workers stop classifying: jobs still queued are
    /// drained and dropped so the producer never blocks on a full queue.
    pub fn run<'r, F>(&self, state: &Mutex<Aggregate>, cancel: &AtomicBool, produce: F) -> Result<()>
    where
        F: FnOnce(&Sender<FileJob<'r>>),
    {
        thread::scope(|scope| -> Result<()> {
            let (job_tx, job_rx) = bounded::<FileJob<'r>>(self.capacity);
            let (result_tx, result_rx) = bounded::<JobResult>(self.capacity);

            for id in 0..self.workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                thread::Builder::new()
                    .name(format!("locc-worker-{id}"))
                    .spawn_scoped(scope, move || work(jobs, results, cancel))?;
            }
            drop(job_rx);
            drop(result_tx);

            thread::Builder::new()
                .name("locc-collector".to_string())
                .spawn_scoped(scope, move || collect(result_rx, state))?;

            produce(&job_tx);
            drop(job_tx);
            Ok(())
        })
    }
}

fn work(jobs: Receiver<FileJob<'_>>, results: Sender<JobResult>, cancel: &AtomicBool) {
    for job in jobs {
        if cancel.load(Ordering::Relaxed) {
            continue;
        }
        let result = match classify_as(&job.path, job.extension, job.language) {
            Ok(stats) => JobResult::Counted(stats),
            Err(err) => {
                let err = RunError::classification(&err, &job.path);
                debug!(path = %err.path.display(), error = %err.message, "failed to classify file");
                JobResult::Failed(err)
            }
        };
        if results.send(result).is_err() {
            // collector is gone, nothing more can be recorded
            cancel.store(true, Ordering::Relaxed);
        }
    }
}

fn collect(results: Receiver<JobResult>, state: &Mutex<Aggregate>) {
    for result in results {
        lock(state).record(result);
    }
}
