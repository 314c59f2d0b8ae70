//! # locclib
//!
//! A multi-language lines of code counter library that separates code,
//! comments, and blank lines.
//!
//! ## Overview
//!
//! Each counted file is matched to a [`Language`] from an immutable
//! [`LanguageRegistry`] and read once, line by line. Every line is exactly
//! one of:
//!
//! - **Blank**: Whitespace-only lines
//! - **Comment**: Lines starting with a line comment marker, or inside a
//!   block comment
//! - **Code**: Everything else
//!
//! ## Features
//!
//! - **Parallel traversal**: One producer walks the tree, a fixed pool of
//!   workers classifies files, one collector aggregates results
//! - **Exclusion rules**: Default excluded directories, hidden file handling,
//!   binary extensions and glob patterns on file names
//! - **Nested comments**: Depth tracking for languages whose block comments nest
//! - **Fault tolerant**: Unreadable paths are recorded, never fatal
//! - **Pure Rust data types**: Returns structured data, no I/O side effects
//!
//! ## Example
//!
//! ```rust
//! use locclib::{classify_file, count_directory, FilterConfig, LanguageRegistry, WalkOptions};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! // Set up a temporary project
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("main.go"), "package main\n\n// entry\nfunc main() {}\n").unwrap();
//! fs::create_dir(dir.path().join("node_modules")).unwrap();
//! fs::write(dir.path().join("node_modules/dep.js"), "x();\n").unwrap();
//!
//! let registry = LanguageRegistry::builtin();
//!
//! // Count a single file
//! let path = dir.path().join("main.go");
//! let stats = classify_file(&path, registry.resolve_path(&path)).unwrap();
//! assert_eq!(stats.stats.code, 2);
//! assert_eq!(stats.stats.comment, 1);
//!
//! // Count a directory tree, node_modules is pruned by default
//! let outcome = count_directory(dir.path(), &registry, WalkOptions::new()).unwrap();
//! assert_eq!(outcome.files.len(), 1);
//! assert_eq!(outcome.total().stats.total, 4);
//!
//! // Count with filtering
//! let filter = FilterConfig::new().exclude("*.go").unwrap();
//! let outcome = count_directory(dir.path(), &registry, WalkOptions::new().filter(filter)).unwrap();
//! assert!(outcome.files.is_empty());
//! ```

pub mod classifier;
pub mod error;
pub mod filter;
pub mod language;
pub mod output;
pub mod pool;
pub mod stats;
pub mod walker;

pub use classifier::{classify_file, Classifier};
pub use error::{LoccError, RunError, RunErrorKind};
pub use filter::{FilterConfig, PruneReason, Selection, SkipReason, DEFAULT_EXCLUDE_DIRS};
pub use language::{BlockComment, Language, LanguageRegistry};
pub use output::{Grouping, LocTable, TableRow};
pub use pool::{FileJob, JobResult, WorkerPool};
pub use stats::{aggregate, total, FileStats, LanguageStats, LineKind, Locs, TotalStats};
pub use walker::{count_directory, WalkOptions, WalkOutcome, Walker};

/// Result type for locclib operations
pub type Result<T> = std::result::Result<T, LoccError>;
