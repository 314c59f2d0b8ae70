//! Text and JSON rendering for CLI output

use std::fmt::Write as _;
use std::path::PathBuf;

use console::Style;
use locclib::{
    aggregate, FileStats, LanguageRegistry, LanguageStats, LocTable, RunError, TableRow,
    TotalStats,
};
use serde::Serialize;

/// Widest a label column may get before names are truncated
const MAX_LABEL_WIDTH: usize = 60;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Default,
    Json,
    Compact,
    Formatted,
}

impl Format {
    pub const NAMES: [&'static str; 4] = ["default", "json", "compact", "formatted"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Format::Json,
            "compact" => Format::Compact,
            "formatted" => Format::Formatted,
            _ => Format::Default,
        }
    }
}

/// Everything one invocation counted.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Path the user asked for, used to shorten file labels
    pub root: PathBuf,
    pub files: Vec<FileStats>,
    pub errors: Vec<RunError>,
    pub processed: u64,
    pub skipped: u64,
    pub cancelled: bool,
}

impl Report {
    fn table(&self, by_file: bool) -> LocTable {
        if by_file {
            LocTable::by_file(&self.files, Some(&self.root))
        } else {
            LocTable::by_language(&aggregate(&self.files))
        }
    }
}

/// JSON document for `--format json`
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    languages: Vec<LanguageStats>,
    total: TotalStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<&'a [FileStats]>,
    processed: u64,
    skipped: u64,
    errors: &'a [RunError],
    cancelled: bool,
}

/// Render a report in the requested format.
pub fn render(report: &Report, format: Format, by_file: bool) -> serde_json::Result<String> {
    match format {
        Format::Default => Ok(render_plain(&report.table(by_file), report)),
        Format::Formatted => Ok(render_formatted(&report.table(by_file), report)),
        Format::Compact => Ok(render_compact(report)),
        Format::Json => render_json(report, by_file),
    }
}

fn render_plain(table: &LocTable, report: &Report) -> String {
    let widths = column_widths(table);
    let label_width = label_width(table);
    let line_width = label_width + widths.iter().map(|w| w + 2).sum::<usize>();
    let separator = "-".repeat(line_width);

    let mut out = String::new();
    push_line(&mut out, &table.headers[0], &table.headers[1..], label_width, &widths);
    out.push_str(&separator);
    out.push('\n');
    for row in &table.rows {
        push_line(&mut out, &row.label, &row.values, label_width, &widths);
    }
    out.push_str(&separator);
    out.push('\n');
    push_line(&mut out, &table.footer.label, &table.footer.values, label_width, &widths);
    out.push('\n');
    out.push_str(&summary_line(report));
    out
}

fn render_formatted(table: &LocTable, report: &Report) -> String {
    let header_style = Style::new().bold();
    let rule_style = Style::new().dim();
    let total_style = Style::new().bold();
    let label_style = Style::new().cyan();

    let total_code = table.footer.stats.code;
    let format_row = |row: &TableRow| -> Vec<String> {
        let mut values: Vec<String> = row.values.iter().map(|v| group_digits(v)).collect();
        values.push(percentage(row.stats.code, total_code));
        values
    };

    let mut headers: Vec<String> = table.headers[1..].to_vec();
    headers.push("Code %".to_string());
    let rows: Vec<Vec<String>> = table.rows.iter().map(format_row).collect();
    let footer = format_row(&table.footer);

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for values in rows.iter().chain(std::iter::once(&footer)) {
        for (width, value) in widths.iter_mut().zip(values) {
            *width = (*width).max(value.chars().count());
        }
    }
    let label_width = label_width(table);
    let line_width = label_width + widths.iter().map(|w| w + 2).sum::<usize>();
    let rule = rule_style.apply_to("─".repeat(line_width)).to_string();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        header_style.apply_to(format_line(&table.headers[0], &headers, label_width, &widths))
    );
    let _ = writeln!(out, "{rule}");
    for (row, values) in table.rows.iter().zip(&rows) {
        let label = format!("{:<label_width$}", truncate_name(&row.label, label_width));
        let cells = format_cells(values, &widths);
        let _ = writeln!(out, "{}{}", label_style.apply_to(label), cells);
    }
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "{}",
        total_style.apply_to(format_line(&table.footer.label, &footer, label_width, &widths))
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "Processed: {}  Skipped: {}  Errors: {}",
        group_digits(&report.processed.to_string()),
        group_digits(&report.skipped.to_string()),
        group_digits(&report.errors.len().to_string()),
    );
    out
}

fn render_compact(report: &Report) -> String {
    let total = locclib::total(&aggregate(&report.files));
    format!(
        "Files: {} | Lines: {} | Code: {} | Comments: {} | Blank: {}\n",
        total.file_count, total.stats.total, total.stats.code, total.stats.comment, total.stats.blank
    )
}

fn render_json(report: &Report, by_file: bool) -> serde_json::Result<String> {
    let languages_by_name = aggregate(&report.files);
    let table = LocTable::by_language(&languages_by_name);
    // keep the table's ranking
    let languages = table
        .rows
        .iter()
        .filter_map(|row| languages_by_name.get(&row.label).cloned())
        .collect();
    let document = JsonReport {
        languages,
        total: locclib::total(&languages_by_name),
        files: by_file.then_some(report.files.as_slice()),
        processed: report.processed,
        skipped: report.skipped,
        errors: &report.errors,
        cancelled: report.cancelled,
    };
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    Ok(json)
}

/// One line per recorded error.
pub fn render_errors(errors: &[RunError]) -> String {
    let mut out = format!("Errors ({}):\n", errors.len());
    for err in errors {
        let _ = writeln!(out, "  {err}");
    }
    out
}

/// Supported languages with their extensions and filenames, sorted by name.
pub fn render_languages(registry: &LanguageRegistry) -> String {
    let mut languages: Vec<_> = registry.languages().collect();
    languages.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let width = languages
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for language in languages {
        let mut matches: Vec<String> = language.extensions.iter().map(|e| format!(".{e}")).collect();
        matches.extend(registry.filenames_for(&language.name).into_iter().map(String::from));
        let _ = writeln!(out, "{:<width$}  {}", language.name, matches.join(", "));
    }
    out
}

fn summary_line(report: &Report) -> String {
    format!(
        "Processed: {}  Skipped: {}  Errors: {}\n",
        report.processed,
        report.skipped,
        report.errors.len()
    )
}

fn column_widths(table: &LocTable) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers[1..].iter().map(|h| h.chars().count()).collect();
    for row in table.rows.iter().chain(std::iter::once(&table.footer)) {
        for (width, value) in widths.iter_mut().zip(&row.values) {
            *width = (*width).max(value.chars().count());
        }
    }
    widths
}

fn label_width(table: &LocTable) -> usize {
    table
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain([
            table.headers[0].chars().count(),
            table.footer.label.chars().count(),
        ])
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH)
}

fn push_line(out: &mut String, label: &str, values: &[String], label_width: usize, widths: &[usize]) {
    out.push_str(&format_line(label, values, label_width, widths));
    out.push('\n');
}

fn format_line(label: &str, values: &[String], label_width: usize, widths: &[usize]) -> String {
    format!(
        "{:<label_width$}{}",
        truncate_name(label, label_width),
        format_cells(values, widths)
    )
}

fn format_cells(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("  {value:>width$}"))
        .collect()
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len > max_len && max_len > 2 {
        let tail: String = name.chars().skip(len - max_len + 2).collect();
        format!("..{tail}")
    } else {
        name.to_string()
    }
}

/// Insert thousands separators into a plain integer. Anything else is
/// returned unchanged.
fn group_digits(value: &str) -> String {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + value.len() / 3);
    for (i, ch) in value.chars().enumerate() {
        if i > 0 && (value.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn percentage(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locclib::Locs;

    fn locs(blank: u64, comment: u64, code: u64) -> Locs {
        Locs {
            blank,
            comment,
            code,
            total: blank + comment + code,
        }
    }

    fn sample_report() -> Report {
        Report {
            root: PathBuf::from("/repo"),
            files: vec![
                FileStats::new("/repo/main.go", "Go", "go", locs(2, 1, 1500)),
                FileStats::new("/repo/web/app.js", "JavaScript", "js", locs(1, 0, 500)),
            ],
            errors: vec![RunError::path_access("/repo/locked", "permission denied")],
            processed: 2,
            skipped: 3,
            cancelled: false,
        }
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("0"), "0");
        assert_eq!(group_digits("999"), "999");
        assert_eq!(group_digits("1000"), "1,000");
        assert_eq!(group_digits("1234567"), "1,234,567");
        assert_eq!(group_digits("Go"), "Go");
        assert_eq!(group_digits(""), "");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), "25.0%");
        assert_eq!(percentage(0, 0), "0.0%");
        assert_eq!(percentage(2, 3), "66.7%");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("a/very/long/path.go", 10), "../path.go");
        assert_eq!(truncate_name("a/very/long/path.go", 10).chars().count(), 10);
    }

    #[test]
    fn test_plain_table() {
        let out = render(&sample_report(), Format::Default, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Language"));
        assert!(lines[0].contains("Comment"));
        assert!(lines[2].starts_with("Go"));
        assert!(lines[2].ends_with("1503"));
        assert!(lines[3].starts_with("JavaScript"));
        assert!(out.contains("Total (2 languages)"));
        assert!(out.contains("Processed: 2  Skipped: 3  Errors: 1"));
    }

    #[test]
    fn test_plain_table_by_file() {
        let out = render(&sample_report(), Format::Default, true).unwrap();
        assert!(out.contains("File"));
        assert!(out.contains("web/app.js"));
        assert!(!out.contains("/repo/web/app.js"));
        assert!(out.contains("Total (2 files)"));
    }

    #[test]
    fn test_formatted_table() {
        console::set_colors_enabled(false);
        let out = render(&sample_report(), Format::Formatted, false).unwrap();
        assert!(out.contains("1,500"));
        assert!(out.contains("Code %"));
        assert!(out.contains("75.0%"));
        assert!(out.contains("100.0%"));
    }

    #[test]
    fn test_compact() {
        let out = render(&sample_report(), Format::Compact, false).unwrap();
        assert_eq!(
            out,
            "Files: 2 | Lines: 2004 | Code: 2000 | Comments: 1 | Blank: 3\n"
        );
    }

    #[test]
    fn test_json() {
        let out = render(&sample_report(), Format::Json, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["languages"][0]["language"], "Go");
        assert_eq!(parsed["languages"][1]["language"], "JavaScript");
        assert_eq!(parsed["total"]["file_count"], 2);
        assert_eq!(parsed["total"]["stats"]["code"], 2000);
        assert_eq!(parsed["processed"], 2);
        assert_eq!(parsed["skipped"], 3);
        assert_eq!(parsed["errors"][0]["kind"], "path_access");
        assert!(parsed.get("files").is_none());

        let out = render(&sample_report(), Format::Json, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["files"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_errors() {
        let out = render_errors(&sample_report().errors);
        assert!(out.starts_with("Errors (1):"));
        assert!(out.contains("/repo/locked"));
        assert!(out.contains("permission denied"));
    }

    #[test]
    fn test_render_languages() {
        let out = render_languages(&LanguageRegistry::builtin());
        assert!(out.lines().any(|l| l.starts_with("Go ") && l.contains(".go")));
        assert!(out.lines().any(|l| l.starts_with("Makefile") && l.contains("Makefile")));
    }

    #[test]
    fn test_format_names() {
        for name in Format::NAMES {
            let format = Format::from_name(name);
            assert_eq!(format == Format::Default, name == "default");
        }
    }
}
