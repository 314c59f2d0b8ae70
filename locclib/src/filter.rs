//! Exclusion rules applied during traversal.
//!
//! Directories are pruned by base name (an exclude set plus the hidden-file
//! rule). Each regular file then goes through [`FilterConfig::select`]:
//!
//! 1. binary extension: skipped
//! 2. dotfile not in the registry's filename table, hidden files excluded: skipped
//! 3. language resolved by extension, then by exact filename
//! 4. no language: skipped
//! 5. base name matches an exclude pattern: skipped
//! 6. otherwise eligible

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use glob::Pattern;

use crate::error::LoccError;
use crate::language::{extension_of, Language, LanguageRegistry};
use crate::Result;

/// Directories skipped unless the exclude set is replaced.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "vendor",
    ".idea",
    ".vscode",
    "__pycache__",
    ".cache",
    "dist",
    "build",
    "target",
    ".next",
    ".nuxt",
    "coverage",
    ".nyc_output",
];

/// Prefix marking hidden files and directories.
pub const HIDDEN_MARKER: char = '.';

/// Configuration for directory and file exclusion.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Directory base names to prune
    pub exclude_dirs: BTreeSet<String>,
    /// Glob patterns matched against file base names
    pub exclude_patterns: Vec<Pattern>,
    /// Whether hidden files and directories are walked
    pub include_hidden: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
            exclude_patterns: Vec::new(),
            include_hidden: false,
        }
    }
}

/// Why a directory was pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    Excluded,
    Hidden,
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::Excluded => write!(f, "excluded directory"),
            PruneReason::Hidden => write!(f, "hidden directory"),
        }
    }
}

/// Why a file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Binary,
    Hidden,
    UnknownLanguage,
    Pattern,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Binary => write!(f, "binary file"),
            SkipReason::Hidden => write!(f, "unknown hidden file"),
            SkipReason::UnknownLanguage => write!(f, "unsupported file"),
            SkipReason::Pattern => write!(f, "matches exclude pattern"),
        }
    }
}

/// Outcome of filtering one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'r> {
    /// Count the file as `language`.
    Eligible {
        extension: String,
        language: &'r Language,
    },
    /// Do not count the file.
    Skipped(SkipReason),
}

impl FilterConfig {
    /// Default exclude set, no patterns, hidden files excluded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the exclude set.
    pub fn exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Add a directory name to the exclude set.
    pub fn add_exclude_dir(mut self, dir: impl Into<String>) -> Self {
        self.exclude_dirs.insert(dir.into());
        self
    }

    /// Add a file exclusion pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        let pat = Pattern::new(pattern).map_err(|e| LoccError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.exclude_patterns.push(pat);
        Ok(self)
    }

    /// Add multiple file exclusion patterns.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Walk hidden files and directories.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check whether a directory should be pruned. The walk root is never
    /// pruned as hidden (`.` or a dot-named checkout).
    pub fn prune_dir(&self, name: &str, is_root: bool) -> Option<PruneReason> {
        if self.exclude_dirs.contains(name) {
            return Some(PruneReason::Excluded);
        }
        if !is_root && !self.include_hidden && is_hidden(name) {
            return Some(PruneReason::Hidden);
        }
        None
    }

    /// Check whether a file base name matches an exclude pattern.
    pub fn excludes_file(&self, name: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches(name))
    }

    /// Decide whether a regular file is counted, and as what.
    pub fn select<'r>(&self, registry: &'r LanguageRegistry, path: &Path) -> Selection<'r> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let raw_ext = extension_of(path).unwrap_or("");
        let extension = raw_ext.to_lowercase();

        if registry.is_binary_extension(&extension) {
            return Selection::Skipped(SkipReason::Binary);
        }

        if is_hidden(&name)
            && !self.include_hidden
            && registry.resolve_by_filename(&name).is_none()
        {
            return Selection::Skipped(SkipReason::Hidden);
        }

        let language = registry
            .resolve_by_extension(raw_ext)
            .or_else(|| registry.resolve_by_filename(&name));
        let Some(language) = language else {
            return Selection::Skipped(SkipReason::UnknownLanguage);
        };

        if self.excludes_file(&name) {
            return Selection::Skipped(SkipReason::Pattern);
        }

        Selection::Eligible {
            extension,
            language,
        }
    }
}

/// Whether a base name marks a hidden entry. `.` and `..` are not hidden.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER) && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LanguageRegistry {
        LanguageRegistry::builtin()
    }

    fn language_of(selection: Selection<'_>) -> Option<String> {
        match selection {
            Selection::Eligible { language, .. } => Some(language.name.clone()),
            Selection::Skipped(_) => None,
        }
    }

    #[test]
    fn test_default_excludes() {
        let filter = FilterConfig::new();
        for dir in ["node_modules", ".git", "target", "vendor", "__pycache__"] {
            assert_eq!(filter.prune_dir(dir, false), Some(PruneReason::Excluded));
        }
        assert_eq!(filter.prune_dir("src", false), None);
    }

    #[test]
    fn test_replace_and_extend_excludes() {
        let filter = FilterConfig::new().exclude_dirs(["dir1", "dir2"]);
        assert_eq!(filter.prune_dir("dir1", false), Some(PruneReason::Excluded));
        assert_eq!(filter.prune_dir("dir2", false), Some(PruneReason::Excluded));
        assert_eq!(filter.prune_dir("node_modules", false), None);

        let filter = FilterConfig::new().add_exclude_dir("custom_dir");
        assert_eq!(filter.prune_dir("custom_dir", false), Some(PruneReason::Excluded));
        assert_eq!(filter.prune_dir("node_modules", false), Some(PruneReason::Excluded));
    }

    #[test]
    fn test_hidden_dirs() {
        let filter = FilterConfig::new();
        assert_eq!(filter.prune_dir(".hidden", false), Some(PruneReason::Hidden));
        assert_eq!(filter.prune_dir(".hidden", true), None);
        assert_eq!(filter.prune_dir(".", true), None);

        let filter = FilterConfig::new().include_hidden(true);
        assert_eq!(filter.prune_dir(".hidden", false), None);
        // the exclude set still applies to hidden names
        assert_eq!(filter.prune_dir(".git", false), Some(PruneReason::Excluded));
    }

    #[test]
    fn test_select_by_extension_and_filename() {
        let registry = registry();
        let filter = FilterConfig::new();

        assert_eq!(
            language_of(filter.select(&registry, Path::new("src/main.go"))),
            Some("Go".to_string())
        );
        assert_eq!(
            language_of(filter.select(&registry, Path::new("Makefile"))),
            Some("Makefile".to_string())
        );
        assert_eq!(
            language_of(filter.select(&registry, Path::new("stats.R"))),
            Some("R".to_string())
        );
        assert_eq!(
            filter.select(&registry, Path::new("data.xyz")),
            Selection::Skipped(SkipReason::UnknownLanguage)
        );
    }

    #[test]
    fn test_select_reports_lowercase_extension() {
        let registry = registry();
        match FilterConfig::new().select(&registry, Path::new("MAIN.GO")) {
            Selection::Eligible { extension, .. } => assert_eq!(extension, "go"),
            other => panic!("expected eligible, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_always_skipped() {
        let registry = registry();
        for filter in [FilterConfig::new(), FilterConfig::new().include_hidden(true)] {
            assert_eq!(
                filter.select(&registry, Path::new("logo.png")),
                Selection::Skipped(SkipReason::Binary)
            );
            assert_eq!(
                filter.select(&registry, Path::new(".logo.PNG")),
                Selection::Skipped(SkipReason::Binary)
            );
        }
    }

    #[test]
    fn test_hidden_files() {
        let registry = registry();
        let filter = FilterConfig::new();

        // known dotfiles are counted regardless of include_hidden
        assert_eq!(
            language_of(filter.select(&registry, Path::new(".gitignore"))),
            Some("Ignore List".to_string())
        );
        assert_eq!(
            filter.select(&registry, Path::new(".hidden.go")),
            Selection::Skipped(SkipReason::Hidden)
        );

        let filter = filter.include_hidden(true);
        assert_eq!(
            language_of(filter.select(&registry, Path::new(".hidden.go"))),
            Some("Go".to_string())
        );
        assert_eq!(
            filter.select(&registry, Path::new(".secret")),
            Selection::Skipped(SkipReason::UnknownLanguage)
        );
    }

    #[test]
    fn test_exclude_patterns() {
        let registry = registry();
        let filter = FilterConfig::new()
            .exclude_many(&["*_test.go", "users_*.go"])
            .unwrap();

        assert_eq!(
            filter.select(&registry, Path::new("pkg/walker_test.go")),
            Selection::Skipped(SkipReason::Pattern)
        );
        assert_eq!(
            filter.select(&registry, Path::new("users_api.go")),
            Selection::Skipped(SkipReason::Pattern)
        );
        assert_eq!(
            language_of(filter.select(&registry, Path::new("walker.go"))),
            Some("Go".to_string())
        );
        // patterns only see the base name
        assert!(!filter.excludes_file("pkg/walker.go"));
    }

    #[test]
    fn test_unsupported_files_are_not_pattern_skips() {
        let registry = registry();
        let filter = FilterConfig::new().exclude("*.xyz").unwrap();
        assert_eq!(
            filter.select(&registry, Path::new("data.xyz")),
            Selection::Skipped(SkipReason::UnknownLanguage)
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FilterConfig::new().exclude("[unclosed").unwrap_err();
        assert!(matches!(err, LoccError::InvalidGlob { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(".env"));
        assert!(is_hidden(".git"));
        assert!(!is_hidden("."));
        assert!(!is_hidden(".."));
        assert!(!is_hidden("main.go"));
    }
}
