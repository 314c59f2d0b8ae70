//! Table-ready data structures for LOC output.
//!
//! This module provides `LocTable`, a presentation-ready data structure
//! that the CLI draws as text or serializes to JSON.
//!
//! The data flow is:
//! 1. Per-file results (`FileStats`)
//! 2. Rollup (`LanguageStats`, `TotalStats`)
//! 3. LocTable (sorted rows, display strings plus raw counts)
//!
//! Rows are ranked by code lines, largest first; ties fall back to the label
//! so the output is stable across runs.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::stats::{total, FileStats, LanguageStats, Locs};

/// What one table row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    ByLanguage,
    ByFile,
}

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (language name, file path, "Total (N languages)")
    pub label: String,
    /// Values for each column after the label, ready for display
    pub values: Vec<String>,
    /// Raw counts behind `values`
    pub stats: Locs,
}

/// Table-ready LOC data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocTable {
    pub grouping: Grouping,
    /// Column headers: [label_header, second column, Blank, Comment, Code, Total]
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
    /// Summary/footer row
    pub footer: TableRow,
}

impl LocTable {
    /// One row per language.
    pub fn by_language(languages: &BTreeMap<String, LanguageStats>) -> Self {
        let mut ranked: Vec<&LanguageStats> = languages.values().collect();
        ranked.sort_by(|a, b| {
            Reverse(a.stats.code)
                .cmp(&Reverse(b.stats.code))
                .then_with(|| a.language.cmp(&b.language))
        });

        let rows = ranked
            .into_iter()
            .map(|lang| TableRow {
                label: lang.language.clone(),
                values: format_row(lang.file_count.to_string(), &lang.stats),
                stats: lang.stats,
            })
            .collect();

        let totals = total(languages);
        let footer = TableRow {
            label: build_footer_label(Grouping::ByLanguage, languages.len()),
            values: format_row(totals.file_count.to_string(), &totals.stats),
            stats: totals.stats,
        };

        LocTable {
            grouping: Grouping::ByLanguage,
            headers: build_headers(Grouping::ByLanguage),
            rows,
            footer,
        }
    }

    /// One row per file. Paths are shown relative to `root` when they live
    /// under it.
    pub fn by_file(files: &[FileStats], root: Option<&Path>) -> Self {
        let mut rows: Vec<TableRow> = files
            .iter()
            .map(|file| TableRow {
                label: make_relative(&file.path, root),
                values: format_row(file.language.clone(), &file.stats),
                stats: file.stats,
            })
            .collect();
        rows.sort_by(|a, b| {
            Reverse(a.stats.code)
                .cmp(&Reverse(b.stats.code))
                .then_with(|| a.label.cmp(&b.label))
        });

        let stats: Locs = files.iter().map(|f| f.stats).sum();
        let footer = TableRow {
            label: build_footer_label(Grouping::ByFile, files.len()),
            values: format_row(String::new(), &stats),
            stats,
        };

        LocTable {
            grouping: Grouping::ByFile,
            headers: build_headers(Grouping::ByFile),
            rows,
            footer,
        }
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn build_headers(grouping: Grouping) -> Vec<String> {
    let (label, second) = match grouping {
        Grouping::ByLanguage => ("Language", "Files"),
        Grouping::ByFile => ("File", "Language"),
    };
    [label, second, "Blank", "Comment", "Code", "Total"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn build_footer_label(grouping: Grouping, count: usize) -> String {
    match grouping {
        Grouping::ByLanguage => format!("Total ({} languages)", count),
        Grouping::ByFile => format!("Total ({} files)", count),
    }
}

fn format_row(second: String, locs: &Locs) -> Vec<String> {
    vec![
        second,
        locs.blank.to_string(),
        locs.comment.to_string(),
        locs.code.to_string(),
        locs.total.to_string(),
    ]
}

/// Display `path` relative to `root`, or as given when it is not under it.
fn make_relative(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|root| path.strip_prefix(root).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}
