//! Language descriptors and the registry that resolves files to them.
//!
//! A [`Language`] carries only the comment markers the line classifier needs.
//! The [`LanguageRegistry`] is built once, before any traversal, and is never
//! mutated afterwards; it is shared by reference with every worker.
//!
//! Lookups:
//!
//! - **by extension**: case-sensitive first, then lowercase (`.R` finds `r`)
//! - **by filename**: exact base name (`Makefile`, `Dockerfile`, `.gitignore`)
//! - **binary extensions**: always case-insensitive
//!
//! Filename entries starting with `.` double as the hidden-file registry: a
//! dotfile listed there is counted even when hidden files are excluded.

use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Multi-line comment delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComment {
    pub start: String,
    pub end: String,
}

/// Comment syntax of a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Display name, also the aggregation key
    pub name: String,
    /// Extensions without the leading dot
    pub extensions: Vec<String>,
    /// Single-line comment marker
    pub line_comment: Option<String>,
    /// Multi-line comment start/end markers
    pub block_comment: Option<BlockComment>,
    /// Whether multi-line comments nest (`/* /* */ */` in Rust)
    pub nested: bool,
}

impl Language {
    /// Create a language with no comment syntax.
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            line_comment: None,
            block_comment: None,
            nested: false,
        }
    }

    /// Descriptor used for files whose language is unknown: every non-blank
    /// line is code.
    pub fn generic() -> Self {
        Self::new("Unknown", &[])
    }

    /// Set the single-line comment marker. An empty marker means none.
    pub fn line(mut self, marker: &str) -> Self {
        self.line_comment = (!marker.is_empty()).then(|| marker.to_string());
        self
    }

    /// Set the multi-line comment markers. Empty markers mean none.
    pub fn block(mut self, start: &str, end: &str) -> Self {
        self.block_comment = (!start.is_empty() && !end.is_empty()).then(|| BlockComment {
            start: start.to_string(),
            end: end.to_string(),
        });
        self
    }

    /// Mark multi-line comments as nesting.
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    /// True when the language has neither comment style.
    pub fn is_plain(&self) -> bool {
        self.line_comment.is_none() && self.block_comment.is_none()
    }
}

/// Immutable lookup table from extensions and filenames to languages.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
    by_extension: HashMap<String, usize>,
    by_filename: HashMap<String, usize>,
    binary_extensions: HashSet<String>,
}

impl LanguageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in language table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for def in BUILTIN {
            let mut language = Language::new(def.name, def.extensions)
                .line(def.line)
                .block(def.block.0, def.block.1);
            language.nested = def.nested;
            registry = registry.with_language(language);
            for filename in def.filenames {
                registry = registry.with_filename(filename, def.name);
            }
        }
        for ext in BINARY_EXTENSIONS {
            registry = registry.with_binary_extension(ext);
        }
        registry
    }

    /// Register a language under each of its extensions. Later registrations
    /// win for a shared extension.
    pub fn with_language(mut self, language: Language) -> Self {
        let index = self.languages.len();
        for ext in &language.extensions {
            if !ext.is_empty() {
                self.by_extension.insert(ext.clone(), index);
            }
        }
        self.languages.push(language);
        self
    }

    /// Map an exact filename onto an already-registered language.
    /// Unknown language names are ignored.
    pub fn with_filename(mut self, filename: &str, language: &str) -> Self {
        if let Some(index) = self.languages.iter().rposition(|l| l.name == language) {
            self.by_filename.insert(filename.to_string(), index);
        }
        self
    }

    /// Mark an extension as binary.
    pub fn with_binary_extension(mut self, ext: &str) -> Self {
        self.binary_extensions.insert(ext.to_lowercase());
        self
    }

    /// Resolve an extension (without dot): exact match first, then lowercase.
    pub fn resolve_by_extension(&self, ext: &str) -> Option<&Language> {
        if ext.is_empty() {
            return None;
        }
        self.by_extension
            .get(ext)
            .or_else(|| self.by_extension.get(&ext.to_lowercase()))
            .map(|&i| &self.languages[i])
    }

    /// Resolve an exact base filename.
    pub fn resolve_by_filename(&self, name: &str) -> Option<&Language> {
        self.by_filename.get(name).map(|&i| &self.languages[i])
    }

    /// Resolve a path by its extension, falling back to its base filename.
    pub fn resolve_path(&self, path: &Path) -> Option<&Language> {
        extension_of(path)
            .and_then(|ext| self.resolve_by_extension(ext))
            .or_else(|| {
                let name = path.file_name()?.to_str()?;
                self.resolve_by_filename(name)
            })
    }

    /// Whether files with this extension are skipped as binary.
    pub fn is_binary_extension(&self, ext: &str) -> bool {
        !ext.is_empty() && self.binary_extensions.contains(&ext.to_lowercase())
    }

    /// All registered languages, in registration order.
    pub fn languages(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    /// Filenames registered for a language, sorted.
    pub fn filenames_for(&self, language: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_filename
            .iter()
            .filter(|(_, &i)| self.languages[i].name == language)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Extension of `path` as written, without the dot. Dotfiles such as
/// `.gitignore` have none.
pub(crate) fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

struct LanguageDef {
    name: &'static str,
    extensions: &'static [&'static str],
    line: &'static str,
    block: (&'static str, &'static str),
    nested: bool,
    filenames: &'static [&'static str],
}

const NO_BLOCK: (&str, &str) = ("", "");
const C_BLOCK: (&str, &str) = ("/*", "*/");
const XML_BLOCK: (&str, &str) = ("<!--", "-->");

macro_rules! lang {
    ($name:expr, [$($ext:expr),*], $line:expr, $block:expr) => {
        lang!($name, [$($ext),*], $line, $block, false, [])
    };
    ($name:expr, [$($ext:expr),*], $line:expr, $block:expr, nested) => {
        lang!($name, [$($ext),*], $line, $block, true, [])
    };
    ($name:expr, [$($ext:expr),*], $line:expr, $block:expr, files [$($file:expr),*]) => {
        lang!($name, [$($ext),*], $line, $block, false, [$($file),*])
    };
    ($name:expr, [$($ext:expr),*], $line:expr, $block:expr, $nested:expr, [$($file:expr),*]) => {
        LanguageDef {
            name: $name,
            extensions: &[$($ext),*],
            line: $line,
            block: $block,
            nested: $nested,
            filenames: &[$($file),*],
        }
    };
}

const BUILTIN: &[LanguageDef] = &[
    lang!("Go", ["go"], "//", C_BLOCK),
    lang!("JavaScript", ["js", "mjs", "cjs", "jsx"], "//", C_BLOCK),
    lang!("TypeScript", ["ts", "mts", "cts", "tsx"], "//", C_BLOCK),
    lang!("Python", ["py", "pyw", "pyi"], "#", ("\"\"\"", "\"\"\"")),
    lang!("Java", ["java"], "//", C_BLOCK),
    lang!("C", ["c", "h"], "//", C_BLOCK),
    lang!("C++", ["cpp", "cc", "cxx", "hpp", "hh", "hxx"], "//", C_BLOCK),
    lang!("C#", ["cs"], "//", C_BLOCK),
    lang!("Ruby", ["rb", "rake", "gemspec"], "#", ("=begin", "=end"), files ["Gemfile", "Rakefile", "Vagrantfile"]),
    lang!("PHP", ["php"], "//", C_BLOCK),
    lang!("Swift", ["swift"], "//", C_BLOCK, nested),
    lang!("Kotlin", ["kt", "kts"], "//", C_BLOCK, nested),
    lang!("Rust", ["rs"], "//", C_BLOCK, nested),
    lang!("Scala", ["scala", "sc"], "//", C_BLOCK, nested),
    lang!("Groovy", ["groovy", "gradle"], "//", C_BLOCK, files ["Jenkinsfile"]),
    lang!("Dart", ["dart"], "//", C_BLOCK),
    lang!("Objective-C", ["m", "mm"], "//", C_BLOCK),
    lang!("HTML", ["html", "htm"], "", XML_BLOCK),
    lang!("CSS", ["css"], "", C_BLOCK),
    lang!("SCSS", ["scss"], "//", C_BLOCK),
    lang!("Sass", ["sass"], "//", C_BLOCK),
    lang!("Less", ["less"], "//", C_BLOCK),
    lang!("SQL", ["sql"], "--", C_BLOCK),
    lang!("Shell", ["sh", "bash", "zsh", "fish", "ksh"], "#", NO_BLOCK, files [".bashrc", ".bash_profile", ".zshrc", ".profile"]),
    lang!("PowerShell", ["ps1", "psm1", "psd1"], "#", ("<#", "#>")),
    lang!("Batch", ["bat", "cmd"], "REM", NO_BLOCK),
    lang!("YAML", ["yaml", "yml"], "#", NO_BLOCK, files [".clang-format", ".yamllint"]),
    lang!("JSON", ["json"], "", NO_BLOCK, files [".babelrc", ".prettierrc", ".eslintrc"]),
    lang!("Markdown", ["md", "markdown"], "", XML_BLOCK),
    lang!("XML", ["xml", "xsd", "xsl", "xslt", "svg", "plist"], "", XML_BLOCK),
    lang!("Vue", ["vue"], "//", XML_BLOCK),
    lang!("Svelte", ["svelte"], "//", XML_BLOCK),
    lang!("Lua", ["lua"], "--", ("--[[", "]]")),
    lang!("R", ["r"], "#", NO_BLOCK),
    lang!("Perl", ["pl", "pm"], "#", ("=pod", "=cut")),
    lang!("Elixir", ["ex", "exs"], "#", NO_BLOCK),
    lang!("Erlang", ["erl", "hrl"], "%", NO_BLOCK),
    lang!("Haskell", ["hs", "lhs"], "--", ("{-", "-}"), nested),
    lang!("OCaml", ["ml", "mli"], "", ("(*", "*)"), nested),
    lang!("Clojure", ["clj", "cljs", "cljc", "edn"], ";", NO_BLOCK),
    lang!("TOML", ["toml"], "#", NO_BLOCK, files ["Cargo.lock", "Pipfile"]),
    lang!("INI", ["ini", "cfg", "conf"], ";", NO_BLOCK, files [".editorconfig", ".gitconfig", ".npmrc"]),
    lang!("Terraform", ["tf", "tfvars", "hcl"], "#", C_BLOCK),
    lang!("Protocol Buffers", ["proto"], "//", C_BLOCK),
    lang!("GraphQL", ["graphql", "gql"], "#", NO_BLOCK),
    lang!("Assembly", ["asm", "s"], ";", NO_BLOCK),
    lang!("Makefile", ["mk", "mak"], "#", NO_BLOCK, files ["Makefile", "makefile", "GNUmakefile"]),
    lang!("Dockerfile", ["dockerfile"], "#", NO_BLOCK, files ["Dockerfile", "Containerfile"]),
    lang!("CMake", ["cmake"], "#", NO_BLOCK),
    lang!("Ignore List", [], "#", NO_BLOCK, files [".gitignore", ".dockerignore", ".npmignore", ".gitattributes", ".gitmodules"]),
    lang!("Dotenv", ["env"], "#", NO_BLOCK, files [".env", ".env.example"]),
    lang!("Plain Text", ["txt", "text"], "", NO_BLOCK, files ["LICENSE", "LICENCE", "COPYING", "AUTHORS", "NOTICE"]),
    lang!("reStructuredText", ["rst"], "", NO_BLOCK),
    lang!("CSV", ["csv", "tsv"], "", NO_BLOCK),
];

const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tif", "tiff", "psd",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "war",
    // compiled
    "exe", "dll", "so", "dylib", "a", "o", "obj", "lib", "bin", "class", "pyc", "pyo", "wasm",
    // media
    "mp3", "mp4", "wav", "flac", "ogg", "avi", "mov", "mkv", "webm",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // data
    "db", "sqlite", "iso", "dmg",
];
