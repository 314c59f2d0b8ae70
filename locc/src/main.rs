//! # locc
//!
//! A fast lines-of-code counter that reports blank, comment and code lines
//! per language.
//!
//! ## Overview
//!
//! locc is built on top of locclib and provides a command-line interface for
//! counting a file or a whole directory tree. Directory walks run in
//! parallel and skip dependency, build and VCS directories by default.
//!
//! ## Features
//!
//! - **Multi-language**: Line and block comment syntax for dozens of languages
//! - **Parallel**: One traversal thread feeding a pool of workers
//! - **Exclusions**: Directory names, hidden files and file-name glob patterns
//! - **Multiple output formats**: Table (default), formatted, compact, JSON
//! - **Interruptible**: Ctrl-C stops the walk and prints what was counted
//!
//! ## Usage
//!
//! ```bash
//! # Count LOC in current directory
//! locc
//!
//! # Count another directory with 8 workers
//! locc ~/src/project -w 8
//!
//! # Output as JSON
//! locc . --format json
//!
//! # Skip extra directories and test files
//! locc . -x testdata,fixtures -i "*_test.go,*.min.js"
//!
//! # Per-file breakdown
//! locc . --by-file
//! ```

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use locclib::{
    classify_file, FilterConfig, LanguageRegistry, LoccError, RunError, WalkOptions, Walker,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::render::{render, render_errors, render_languages, Format, Report};

/// Environment variable overriding the log filter
const LOG_ENV: &str = "LOCC_LOG";

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("locc")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Fast lines-of-code counter: blank, comment and code lines per language")
        .arg(
            Arg::new("path")
                .help("File or directory to analyze (defaults to current directory)")
                .conflicts_with("path-flag"),
        )
        .arg(
            Arg::new("path-flag")
                .short('p')
                .long("path")
                .value_name("PATH")
                .help("File or directory to analyze"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_parser(value_parser!(usize))
                .help("Number of worker threads (defaults to the number of CPUs)"),
        )
        .arg(
            Arg::new("hidden")
                .short('H')
                .long("hidden")
                .action(ArgAction::SetTrue)
                .help("Include hidden files and directories"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_parser(Format::NAMES)
                .default_value("default")
                .help("Output format"),
        )
        .arg(
            Arg::new("exclude")
                .short('x')
                .long("exclude")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Comma-separated directory names to exclude, on top of the defaults"),
        )
        .arg(
            Arg::new("no-default-excludes")
                .long("no-default-excludes")
                .action(ArgAction::SetTrue)
                .help("Do not exclude node_modules, target, .git and the other default directories"),
        )
        .arg(
            Arg::new("ignore")
                .short('i')
                .long("ignore")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Comma-separated glob patterns of file names to exclude (e.g. \"*_test.go,*.log\")"),
        )
        .arg(
            Arg::new("errors")
                .short('e')
                .long("errors")
                .action(ArgAction::SetTrue)
                .help("Show detailed error messages"),
        )
        .arg(
            Arg::new("by-file")
                .long("by-file")
                .action(ArgAction::SetTrue)
                .help("Show breakdown by file"),
        )
        .arg(
            Arg::new("follow-links")
                .short('L')
                .long("follow-links")
                .action(ArgAction::SetTrue)
                .help("Follow symbolic links"),
        )
        .arg(
            Arg::new("languages")
                .long("languages")
                .action(ArgAction::SetTrue)
                .help("List supported languages and exit"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress non-essential output"),
        )
}

/// Route logs to stderr. `LOCC_LOG` takes precedence over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("locc=debug,locclib=debug,warn")
        } else if quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build filter config from matches
fn build_filter(matches: &ArgMatches) -> Result<FilterConfig> {
    let mut filter = FilterConfig::new().include_hidden(matches.get_flag("hidden"));

    if matches.get_flag("no-default-excludes") {
        filter = filter.exclude_dirs(Vec::<String>::new());
    }

    if let Some(dirs) = matches.get_many::<String>("exclude") {
        for dir in dirs.map(|d| d.trim()).filter(|d| !d.is_empty()) {
            filter = filter.add_exclude_dir(dir);
        }
    }

    if let Some(patterns) = matches.get_many::<String>("ignore") {
        for pattern in patterns.map(|p| p.trim()).filter(|p| !p.is_empty()) {
            filter = filter.exclude(pattern)?;
        }
    }

    Ok(filter)
}

/// Count a single file, resolving its language the same way a walk would.
fn count_file(path: &Path, registry: &LanguageRegistry) -> Report {
    let mut report = Report {
        root: path.to_path_buf(),
        ..Report::default()
    };

    let Some(language) = registry.resolve_path(path) else {
        debug!(path = %path.display(), "no language for file");
        report.skipped = 1;
        return report;
    };

    match classify_file(path, Some(language)) {
        Ok(stats) => {
            report.processed = 1;
            report.files.push(stats);
        }
        Err(err) => report.errors.push(RunError::classification(&err, path)),
    }
    report
}

/// Walk a directory tree. Ctrl-C stops the walk and keeps partial results.
fn count_tree(path: &Path, registry: &LanguageRegistry, matches: &ArgMatches) -> Result<Report> {
    let mut options = WalkOptions::new()
        .filter(build_filter(matches)?)
        .follow_links(matches.get_flag("follow-links"));
    if let Some(&workers) = matches.get_one::<usize>("workers") {
        options = options.workers(workers);
    }

    let walker = Walker::new(registry, options)?;
    debug!(path = %path.display(), workers = walker.workers(), "counting directory");

    let cancel = walker.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping...");
        cancel.store(true, Ordering::SeqCst);
    })
    .context("failed to set Ctrl-C handler")?;

    let outcome = walker.run(path)?;
    Ok(Report {
        root: path.to_path_buf(),
        files: outcome.files,
        errors: outcome.errors,
        processed: walker.processed_count(),
        skipped: walker.skipped_count(),
        cancelled: outcome.cancelled,
    })
}

fn run(matches: &ArgMatches) -> Result<()> {
    let start = Instant::now();
    let registry = LanguageRegistry::builtin();

    if matches.get_flag("languages") {
        print!("{}", render_languages(&registry));
        return Ok(());
    }

    let path = matches
        .get_one::<String>("path")
        .or_else(|| matches.get_one::<String>("path-flag"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    if !path.exists() {
        return Err(LoccError::PathNotFound(path).into());
    }

    let report = if path.is_file() {
        count_file(&path, &registry)
    } else {
        count_tree(&path, &registry, matches)?
    };

    let format = matches
        .get_one::<String>("format")
        .map(|f| Format::from_name(f))
        .unwrap_or(Format::Default);
    print!("{}", render(&report, format, matches.get_flag("by-file"))?);

    if matches.get_flag("errors") && !report.errors.is_empty() {
        eprint!("{}", render_errors(&report.errors));
    }
    if report.cancelled {
        eprintln!("Interrupted: results are partial");
    }

    if !matches.get_flag("quiet") {
        let elapsed = format!("Time elapsed: {:.3?}", start.elapsed());
        // keep stdout parseable for JSON consumers
        if format == Format::Json {
            eprintln!("{elapsed}");
        } else {
            println!("{elapsed}");
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_flag("verbose"), matches.get_flag("quiet"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
