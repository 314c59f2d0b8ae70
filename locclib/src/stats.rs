//! Core data structures for LOC statistics.
//!
//! Every line of a counted file is exactly one of:
//!
//! - **blank**: empty or whitespace-only
//! - **comment**: inside or starting a comment
//! - **code**: anything else
//!
//! so `blank + comment + code == total` holds for every [`Locs`] value built
//! by the classifier, and stays true under addition.
//!
//! Per-file results roll up into per-language [`LanguageStats`] and a grand
//! [`TotalStats`]. Addition is commutative and associative, so the order in
//! which workers deliver files never changes the aggregates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

/// Classification of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Code,
}

/// Line counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locs {
    /// Blank/whitespace-only lines
    pub blank: u64,
    /// Comment lines
    pub comment: u64,
    /// Code lines
    pub code: u64,
    /// Total line count (sum of all kinds)
    pub total: u64,
}

impl Locs {
    /// Create a new Locs with all zeros.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one line of the given kind.
    pub fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Blank => self.blank += 1,
            LineKind::Comment => self.comment += 1,
            LineKind::Code => self.code += 1,
        }
        self.total += 1;
    }

    /// Whether `blank + comment + code == total`.
    pub fn is_consistent(&self) -> bool {
        self.blank + self.comment + self.code == self.total
    }
}

impl Add for Locs {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            blank: self.blank + other.blank,
            comment: self.comment + other.comment,
            code: self.code + other.code,
            total: self.total + other.total,
        }
    }
}

impl AddAssign for Locs {
    fn add_assign(&mut self, other: Self) {
        self.blank += other.blank;
        self.comment += other.comment;
        self.code += other.code;
        self.total += other.total;
    }
}

impl Sum for Locs {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Locs::new(), Add::add)
    }
}

/// Statistics for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Path to the file.
    pub path: PathBuf,
    /// Name of the language the file was counted as.
    pub language: String,
    /// Lowercased extension without the dot, empty if none.
    pub extension: String,
    /// Line counts for this file.
    pub stats: Locs,
}

impl FileStats {
    /// Create new file stats.
    pub fn new(
        path: impl Into<PathBuf>,
        language: impl Into<String>,
        extension: impl Into<String>,
        stats: Locs,
    ) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            extension: extension.into(),
            stats,
        }
    }
}

/// Aggregated statistics for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    /// Language name.
    pub language: String,
    /// Number of files counted as this language.
    pub file_count: u64,
    /// Summed line counts.
    pub stats: Locs,
}

impl LanguageStats {
    /// Create empty stats for a language.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Add one file's counts.
    pub fn add_file(&mut self, stats: Locs) {
        self.file_count += 1;
        self.stats += stats;
    }
}

/// Grand total over all languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalStats {
    /// Number of files counted.
    pub file_count: u64,
    /// Summed line counts.
    pub stats: Locs,
}

/// Roll per-file statistics up into per-language statistics.
pub fn aggregate(files: &[FileStats]) -> BTreeMap<String, LanguageStats> {
    let mut languages: BTreeMap<String, LanguageStats> = BTreeMap::new();
    for file in files {
        languages
            .entry(file.language.clone())
            .or_insert_with(|| LanguageStats::new(file.language.clone()))
            .add_file(file.stats);
    }
    languages
}

/// Sum per-language statistics into a grand total.
pub fn total(languages: &BTreeMap<String, LanguageStats>) -> TotalStats {
    languages.values().fold(TotalStats::default(), |mut acc, lang| {
        acc.file_count += lang.file_count;
        acc.stats += lang.stats;
        acc
    })
}
