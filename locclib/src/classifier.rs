//! Line classification for a single file.
//!
//! A [`Classifier`] makes one forward pass over a file and decides for each
//! line whether it is blank, comment, or code. The only state carried from
//! one line to the next is the open multi-line comment span: a depth that
//! is 0 or 1 for most languages, and may go deeper for languages whose block
//! comments nest.
//!
//! Per trimmed line, in order:
//!
//! 1. inside a span: comment; the span closes if the end marker appears
//! 2. empty: blank
//! 3. starts with the block start marker: comment; opens a span unless the
//!    rest of the line already holds the end marker
//! 4. starts with the line comment marker: comment
//! 5. otherwise: code
//!
//! Markers are only recognised at the start of a line (or, for the end
//! marker, anywhere inside a span), so a marker that appears inside a string
//! on a code line never opens a span. Text after a closing marker does not
//! make the line code: telling `*/ foo();` apart needs a real lexer.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::LoccError;
use crate::language::{extension_of, BlockComment, Language};
use crate::stats::{FileStats, LineKind, Locs};
use crate::Result;

/// Counts the lines of one file. Owned by whichever worker is processing it.
pub struct Classifier<'a, R: Read> {
    reader: BufReader<R>,
    language: &'a Language,
    span: Span,
}

impl<'a> Classifier<'a, File> {
    /// Open a file for classification.
    pub fn new(path: impl AsRef<Path>, language: &'a Language) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoccError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_reader(file, language))
    }
}

impl<'a, R: Read> Classifier<'a, R> {
    /// Classify any reader. Useful for testing without actual files.
    pub fn from_reader(reader: R, language: &'a Language) -> Self {
        Self {
            reader: BufReader::new(reader),
            language,
            span: Span::default(),
        }
    }

    /// Read to the end and return the line counts.
    ///
    /// Lines end at `\n`; an unterminated last line still counts and an empty
    /// input has no lines. Invalid UTF-8 is decoded lossily.
    pub fn classify(mut self) -> std::io::Result<Locs> {
        let mut locs = Locs::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let kind = self.classify_line(line.trim());
            locs.record(kind);
        }
        Ok(locs)
    }

    fn classify_line(&mut self, line: &str) -> LineKind {
        let language = self.language;

        if self.span.is_open() {
            if let Some(block) = &language.block_comment {
                self.span.scan(line, block, language.nested);
            }
            return LineKind::Comment;
        }

        if line.is_empty() {
            return LineKind::Blank;
        }
        if language.is_plain() {
            return LineKind::Code;
        }

        if let Some(block) = &language.block_comment {
            if let Some(rest) = line.strip_prefix(block.start.as_str()) {
                self.span.open(rest, block, language.nested);
                return LineKind::Comment;
            }
        }

        if let Some(marker) = &language.line_comment {
            if line.starts_with(marker.as_str()) {
                return LineKind::Comment;
            }
        }

        LineKind::Code
    }
}

/// Open multi-line comment span. Depth 0 means not in a comment.
#[derive(Debug, Default)]
struct Span {
    depth: usize,
}

impl Span {
    fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// Enter a span; `rest` is the text after the start marker.
    fn open(&mut self, rest: &str, block: &BlockComment, nested: bool) {
        self.depth = 1;
        self.scan(rest, block, nested);
    }

    /// Account for markers in `text`, which lies inside the span.
    fn scan(&mut self, text: &str, block: &BlockComment, nested: bool) {
        if !nested {
            if text.contains(block.end.as_str()) {
                self.depth = 0;
            }
            return;
        }

        let mut rest = text;
        while self.depth > 0 && !rest.is_empty() {
            if let Some(after) = rest.strip_prefix(block.end.as_str()) {
                self.depth -= 1;
                rest = after;
            } else if let Some(after) = rest.strip_prefix(block.start.as_str()) {
                self.depth += 1;
                rest = after;
            } else {
                let mut chars = rest.chars();
                chars.next();
                rest = chars.as_str();
            }
        }
    }
}

/// Classify a file. `None` counts it generically: blank or code, no comments.
///
/// # Example
///
/// ```rust,ignore
/// use locclib::{classify_file, LanguageRegistry};
///
/// let registry = LanguageRegistry::builtin();
/// let stats = classify_file("src/main.go", registry.resolve_by_extension("go"))?;
/// println!("code: {}", stats.stats.code);
/// ```
pub fn classify_file(path: impl AsRef<Path>, language: Option<&Language>) -> Result<FileStats> {
    let path = path.as_ref();
    let extension = extension_of(path).unwrap_or("").to_lowercase();
    match language {
        Some(language) => classify_as(path, extension, language),
        None => classify_as(path, extension, &Language::generic()),
    }
}

/// Classify a file as `language`, recording `extension` on the result.
pub(crate) fn classify_as(path: &Path, extension: String, language: &Language) -> Result<FileStats> {
    let locs = Classifier::new(path, language)?
        .classify()
        .map_err(|e| LoccError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(FileStats::new(path, language.name.as_str(), extension, locs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageRegistry;
    use std::fs;
    use tempfile::tempdir;

    fn c_like() -> Language {
        Language::new("C", &["c"]).line("//").block("/*", "*/")
    }

    fn nested_like() -> Language {
        Language::new("Rust", &["rs"]).line("//").block("/*", "*/").nested()
    }

    fn stats(content: &str, language: &Language) -> Locs {
        let locs = Classifier::from_reader(content.as_bytes(), language)
            .classify()
            .unwrap();
        assert!(locs.is_consistent(), "inconsistent counts: {locs:?}");
        locs
    }

    fn builtin(ext: &str) -> Language {
        LanguageRegistry::builtin()
            .resolve_by_extension(ext)
            .unwrap()
            .clone()
    }

    #[test]
    fn empty_file() {
        let locs = stats("", &c_like());
        assert_eq!(locs, Locs::new());
    }

    #[test]
    fn plain_language_ignores_comment_markers() {
        let plain = Language::new("Text", &["txt"]);
        let locs = stats("// not a comment\n/* nor this */\n\nwords\n", &plain);
        assert_eq!(locs.code, 3);
        assert_eq!(locs.comment, 0);
        assert_eq!(locs.blank, 1);
    }

    #[test]
    fn mixed_comment_styles() {
        let locs = stats("// c\n/* c */\nint x = 1;\n\n", &c_like());
        assert_eq!(locs.comment, 2);
        assert_eq!(locs.code, 1);
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.total, 4);
    }

    #[test]
    fn generic_counting() {
        let locs = stats("a\n\nb\n", &Language::generic());
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.code, 2);
        assert_eq!(locs.comment, 0);
        assert_eq!(locs.total, 3);
    }

    #[test]
    fn generic_ignores_comment_markers() {
        let locs = stats("// not a comment\n/* nor this */\n# nor this\n", &Language::generic());
        assert_eq!(locs.code, 3);
        assert_eq!(locs.comment, 0);
    }

    #[test]
    fn unterminated_last_line_counts() {
        let locs = stats("a\nb", &c_like());
        assert_eq!(locs.code, 2);
        assert_eq!(locs.total, 2);
    }

    #[test]
    fn lone_newline_is_one_blank_line() {
        let locs = stats("\n", &c_like());
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.total, 1);
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        let locs = stats("\n\n   \n\t\n", &c_like());
        assert_eq!(locs.blank, 4);
        assert_eq!(locs.total, 4);
    }

    #[test]
    fn crlf_line_endings() {
        let locs = stats("int a;\r\n\r\n// c\r\n", &c_like());
        assert_eq!(locs.code, 1);
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.comment, 1);
    }

    #[test]
    fn multiline_block() {
        let content = "/*\n\ncomment\n*/\ncode();\n";
        let locs = stats(content, &c_like());
        // the blank line inside the span is a comment line
        assert_eq!(locs.comment, 4);
        assert_eq!(locs.code, 1);
        assert_eq!(locs.blank, 0);
    }

    #[test]
    fn code_after_closing_marker_is_comment() {
        let locs = stats("/* a\nb */ int x;\nint y;\n", &c_like());
        assert_eq!(locs.comment, 2);
        assert_eq!(locs.code, 1);
    }

    #[test]
    fn block_marker_after_code_does_not_open_span() {
        let locs = stats("int x; /* trailing\nint y;\n", &c_like());
        assert_eq!(locs.code, 2);
        assert_eq!(locs.comment, 0);
    }

    #[test]
    fn marker_inside_string_on_code_line() {
        let locs = stats("let s = \"/* not a comment\";\nlet a = 1;\n", &c_like());
        assert_eq!(locs.code, 2);
        assert_eq!(locs.comment, 0);
    }

    #[test]
    fn go_file() {
        let content = r#"package main

// This is a comment
import "fmt"

/*
Multi-line comment
*/
func main() {
	fmt.Println("Hello")
}
"#;
        let locs = stats(content, &builtin("go"));
        assert_eq!(locs.blank, 2);
        assert_eq!(locs.comment, 4);
        assert_eq!(locs.code, 5);
        assert_eq!(locs.total, 11);
    }

    #[test]
    fn python_file() {
        let content = "# This is a comment\ndef hello():\n    print(\"Hello\")\n\n# Another comment\n";
        let locs = stats(content, &builtin("py"));
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.comment, 2);
        assert_eq!(locs.code, 2);
        assert_eq!(locs.total, 5);
    }

    #[test]
    fn python_docstrings_share_markers() {
        let python = builtin("py");

        let one_line = stats("\"\"\"Module doc.\"\"\"\nx = 1\n", &python);
        assert_eq!(one_line.comment, 1);
        assert_eq!(one_line.code, 1);

        let spanning = stats("\"\"\"\nDoc\n\"\"\"\nx = 1\n", &python);
        assert_eq!(spanning.comment, 3);
        assert_eq!(spanning.code, 1);
    }

    #[test]
    fn javascript_file() {
        let content = "// Single line comment\nconst x = 1;\n/* Multi-line\n   comment */\nconsole.log(x);\n";
        let locs = stats(content, &builtin("js"));
        assert_eq!(locs.blank, 0);
        assert_eq!(locs.comment, 3);
        assert_eq!(locs.code, 2);
        assert_eq!(locs.total, 5);
    }

    #[test]
    fn html_file() {
        let content = "<!DOCTYPE html>\n<html>\n<!-- This is a comment -->\n<body>\n</body>\n</html>\n";
        let locs = stats(content, &builtin("html"));
        assert_eq!(locs.comment, 1);
        assert_eq!(locs.code, 5);
        assert_eq!(locs.total, 6);
    }

    #[test]
    fn yaml_file() {
        let content = "# Configuration file\nname: test\n# Another comment\nvalue: 123\n";
        let locs = stats(content, &builtin("yaml"));
        assert_eq!(locs.comment, 2);
        assert_eq!(locs.code, 2);
        assert_eq!(locs.total, 4);
    }

    #[test]
    fn shell_script() {
        let content = "#!/bin/bash\n# This is a comment\necho \"Hello\"\n\n# Another comment\nexit 0\n";
        let locs = stats(content, &builtin("sh"));
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.comment, 3);
        assert_eq!(locs.code, 2);
        assert_eq!(locs.total, 6);
    }

    #[test]
    fn lua_block_wins_over_line_marker() {
        let content = "--[[\nblock\n]]\n-- line\nprint(1)\n";
        let locs = stats(content, &builtin("lua"));
        assert_eq!(locs.comment, 4);
        assert_eq!(locs.code, 1);
    }

    #[test]
    fn plain_language_has_no_comments() {
        let locs = stats("{\n  \"a\": 1\n}\n\n", &builtin("json"));
        assert_eq!(locs.code, 3);
        assert_eq!(locs.blank, 1);
        assert_eq!(locs.comment, 0);
    }

    #[test]
    fn flat_block_closes_at_first_end_marker() {
        // without nesting the inner start marker is just text
        let locs = stats("/* outer\n/* inner */\ncode();\n", &c_like());
        assert_eq!(locs.comment, 2);
        assert_eq!(locs.code, 1);
    }

    #[test]
    fn nested_block_tracks_depth() {
        let content = "/* outer\n/* inner */\nstill comment\n*/\ncode();\n";
        let locs = stats(content, &nested_like());
        assert_eq!(locs.comment, 4);
        assert_eq!(locs.code, 1);
    }

    #[test]
    fn nested_block_opened_and_closed_on_one_line() {
        let locs = stats("/* a /* b */ c */\ncode();\n", &nested_like());
        assert_eq!(locs.comment, 1);
        assert_eq!(locs.code, 1);
    }

    #[test]
    fn nested_block_multiple_markers_per_line() {
        let content = "/*\n/* /* */\n*/ still open\n*/\nx\n";
        let locs = stats(content, &nested_like());
        assert_eq!(locs.comment, 4);
        assert_eq!(locs.code, 1);
    }

    #[test]
    fn idempotent() {
        let content = "/* a\nb */\n\nint main() {}\n// end\n";
        let lang = c_like();
        assert_eq!(stats(content, &lang), stats(content, &lang));
    }

    #[test]
    fn invalid_utf8_is_counted() {
        let bytes: &[u8] = b"\xff\xfe code\n// \xc3\x28\n";
        let locs = Classifier::from_reader(bytes, &c_like()).classify().unwrap();
        assert_eq!(locs.code, 1);
        assert_eq!(locs.comment, 1);
    }

    #[test]
    fn classify_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.GO");
        fs::write(&path, "package main\n\n// comment\n").unwrap();

        let registry = LanguageRegistry::builtin();
        let stats = classify_file(&path, registry.resolve_by_extension("go")).unwrap();

        assert_eq!(stats.path, path);
        assert_eq!(stats.language, "Go");
        assert_eq!(stats.extension, "go");
        assert_eq!(stats.stats.code, 1);
        assert_eq!(stats.stats.blank, 1);
        assert_eq!(stats.stats.comment, 1);
    }

    #[test]
    fn classify_file_generic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "line 1\nline 2\n\nline 4\n").unwrap();

        let stats = classify_file(&path, None).unwrap();
        assert_eq!(stats.language, "Unknown");
        assert_eq!(stats.stats.blank, 1);
        assert_eq!(stats.stats.code, 3);
        assert_eq!(stats.stats.total, 4);
    }

    #[test]
    fn classify_missing_file() {
        let err = classify_file("/nonexistent/file.go", Some(&c_like())).unwrap_err();
        assert!(matches!(err, LoccError::FileRead { .. }));
        assert!(!err.is_configuration());
    }
}
