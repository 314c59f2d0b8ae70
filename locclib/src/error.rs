//! Error types for locclib

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LOC counting
#[derive(Error, Debug)]
pub enum LoccError {
    /// Failed to read a file selected for classification
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Root path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Worker count must be at least one
    #[error("invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    /// Queue capacity must be at least one
    #[error("invalid queue capacity: {0} (must be at least 1)")]
    InvalidQueueCapacity(usize),

    /// `Walker::run` was called while another run on the same walker is active
    #[error("a walk is already running on this walker")]
    WalkInProgress,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoccError {
    /// Whether this error means the run was misconfigured and must not start,
    /// as opposed to a single path failing.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoccError::PathNotFound(_)
                | LoccError::InvalidGlob { .. }
                | LoccError::InvalidWorkerCount(_)
                | LoccError::InvalidQueueCapacity(_)
        )
    }

    /// The path this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoccError::FileRead { path, .. } | LoccError::PathNotFound(path) => Some(path),
            _ => None,
        }
    }
}

/// Stage of the run at which a [`RunError`] was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    /// A directory or file could not be statted or listed during traversal.
    PathAccess,
    /// A file selected for counting could not be read.
    Classification,
}

impl fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunErrorKind::PathAccess => write!(f, "path access"),
            RunErrorKind::Classification => write!(f, "classification"),
        }
    }
}

/// A non-fatal failure on one path. Collected during a run, never aborts it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} error on '{path}': {message}")]
pub struct RunError {
    /// Path the failure is about
    pub path: PathBuf,
    /// Where in the pipeline it happened
    pub kind: RunErrorKind,
    /// Human-readable cause
    pub message: String,
}

impl RunError {
    /// Record a traversal-level failure.
    pub fn path_access(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: RunErrorKind::PathAccess,
            message: message.into(),
        }
    }

    /// Record a failure to classify a file. `fallback` is used when the error
    /// carries no path of its own.
    pub fn classification(error: &LoccError, fallback: &Path) -> Self {
        let message = match error {
            LoccError::FileRead { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        Self {
            path: error.path().unwrap_or(fallback).to_path_buf(),
            kind: RunErrorKind::Classification,
            message,
        }
    }
}

impl From<walkdir::Error> for RunError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let message = match err.io_error() {
            Some(io) => io.to_string(),
            None => err.to_string(),
        };
        RunError::path_access(path, message)
    }
}
