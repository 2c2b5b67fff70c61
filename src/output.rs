//! Report rendering and persistence.
//!
//! Markdown for pasting into an LLM conversation, JSON for tooling.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::record::FileRecord;
use crate::scan::{ScanStats, ScanWarning};
use crate::tokens::{tally, Encoding};
use crate::tree::{format_number, format_size, render_tree, FileNode, RenderOptions};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown report format: {0} (expected markdown or json)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            _ => Err(OutputError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// Heading and tree root label.
    pub title: String,
    pub encoding: Encoding,
    pub include_tree: bool,
    pub include_summary: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Markdown,
            title: "project".to_string(),
            encoding: Encoding::default(),
            include_tree: true,
            include_summary: true,
        }
    }
}

/// Render records, totals and warnings in the requested format.
pub fn format_report(
    records: &[FileRecord],
    stats: &ScanStats,
    warnings: &[ScanWarning],
    options: &ReportOptions,
) -> Result<String, OutputError> {
    match options.format {
        ReportFormat::Markdown => Ok(format_markdown(records, stats, warnings, options)),
        ReportFormat::Json => format_json(records, stats, warnings, options),
    }
}

/// Write `text` to `path`, creating parent directories.
pub fn write_report(path: &Path, text: &str) -> Result<(), OutputError> {
    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, text).map_err(write_err)
}

// ============================================================================
// Markdown
// ============================================================================

fn format_markdown(
    records: &[FileRecord],
    stats: &ScanStats,
    warnings: &[ScanWarning],
    options: &ReportOptions,
) -> String {
    let capacity = records.iter().map(|r| r.content.len() + r.relative_path.len() + 32).sum::<usize>();
    let mut out = String::with_capacity(capacity + 1024);

    out.push_str(&format!("# {}\n\n", options.title));

    if options.include_summary {
        let tokens = tally(records, options.encoding);
        out.push_str("## Summary\n\n");
        out.push_str(&format!("- Files: {}\n", format_number(stats.files_accepted)));
        out.push_str(&format!("- Size: {}\n", format_size(stats.bytes_accepted)));
        out.push_str(&format!(
            "- Estimated tokens: {} ({})\n",
            format_number(tokens.total),
            options.encoding
        ));
        if stats.files_truncated > 0 {
            out.push_str(&format!("- Truncated files: {}\n", stats.files_truncated));
        }
        out.push('\n');
    }

    if !warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for warning in warnings {
            out.push_str(&format!("- {warning}\n"));
        }
        out.push('\n');
    }

    if options.include_tree && !records.is_empty() {
        let tree = FileNode::from_records(options.title.as_str(), records);
        out.push_str("## Structure\n\n```text\n");
        out.push_str(&render_tree(&tree, &RenderOptions::with_metadata()));
        out.push_str("```\n\n");
    }

    if !records.is_empty() {
        out.push_str("## Files\n");
        for record in records {
            push_file_block(&mut out, record);
        }
    }

    out
}

fn push_file_block(out: &mut String, record: &FileRecord) {
    let fence = fence_for(&record.content);
    let tag = record.language.map(|l| l.fence_tag()).unwrap_or("");

    out.push_str(&format!("\n### {}\n\n", record.relative_path));
    out.push_str(&fence);
    out.push_str(tag);
    out.push('\n');
    out.push_str(&record.content);
    if !record.content.is_empty() && !record.content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out.push('\n');
}

/// A backtick fence longer than any backtick run in `content`.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile<'a>>,
    stats: &'a ScanStats,
    encoding: Encoding,
    total_tokens: usize,
    warnings: Vec<JsonWarning<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    size_bytes: u64,
    line_count: usize,
    truncated: bool,
    tokens: usize,
    content: &'a str,
}

#[derive(Serialize)]
struct JsonWarning<'a> {
    message: String,
    #[serde(flatten)]
    detail: &'a ScanWarning,
}

fn format_json(
    records: &[FileRecord],
    stats: &ScanStats,
    warnings: &[ScanWarning],
    options: &ReportOptions,
) -> Result<String, OutputError> {
    let tokens = tally(records, options.encoding);
    let files = records
        .iter()
        .zip(&tokens.per_file)
        .map(|(record, &tokens)| JsonFile {
            path: &record.relative_path,
            language: record.language.map(|l| l.to_string()),
            size_bytes: record.size_bytes,
            line_count: record.line_count,
            truncated: record.truncated,
            tokens,
            content: &record.content,
        })
        .collect();

    let report = JsonReport {
        files,
        stats,
        encoding: options.encoding,
        total_tokens: tokens.total,
        warnings: warnings
            .iter()
            .map(|w| JsonWarning {
                message: w.to_string(),
                detail: w,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Language;
    use tempfile::TempDir;

    fn record(path: &str, content: &str, language: Option<Language>) -> FileRecord {
        FileRecord {
            absolute_path: PathBuf::from("/p").join(path),
            relative_path: path.into(),
            content: content.into(),
            size_bytes: content.len() as u64,
            line_count: content.lines().count(),
            language,
            truncated: false,
        }
    }

    fn stats_for(records: &[FileRecord]) -> ScanStats {
        let mut stats = ScanStats::default();
        for r in records {
            stats.record(r);
        }
        stats
    }

    #[test]
    fn test_fence_for() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("a `b` c"), "```");
        assert_eq!(fence_for("```rust\n```"), "````");
        assert_eq!(fence_for("``````"), "```````");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_markdown_sections() {
        let records = vec![
            record("src/a.php", "<?php\necho 1;\n", Some(Language::Php)),
            record("notes", "no newline", None),
        ];
        let options = ReportOptions {
            title: "demo".into(),
            ..Default::default()
        };
        let text = format_report(&records, &stats_for(&records), &[], &options).unwrap();

        assert!(text.starts_with("# demo\n\n## Summary\n\n- Files: 2\n"));
        assert!(text.contains("## Structure\n\n```text\ndemo/\n"));
        assert!(text.contains("│   └── a.php [PHP, 2 lines, 14B]\n"));
        assert!(text.contains("### src/a.php\n\n```php\n<?php\necho 1;\n```\n"));
        assert!(text.contains("### notes\n\n```\nno newline\n```\n"));
        assert!(!text.contains("## Warnings"));
    }

    #[test]
    fn test_markdown_lists_warnings() {
        let warnings = vec![ScanWarning::FileLimitReached { limit: 1 }];
        let text = format_report(&[], &ScanStats::default(), &warnings, &ReportOptions::default()).unwrap();
        assert!(text.contains("## Warnings\n\n- file limit of 1 reached, stopping scan\n"));
        assert!(!text.contains("## Files"));
    }

    #[test]
    fn test_markdown_lengthens_fence() {
        let records = vec![record("README.md", "```sh\nls\n```\n", Some(Language::Markdown))];
        let text = format_report(&records, &stats_for(&records), &[], &ReportOptions::default()).unwrap();
        assert!(text.contains("````markdown\n```sh\nls\n```\n````\n"));
    }

    #[test]
    fn test_json_document() {
        let records = vec![record("a.php", "<?php\n", Some(Language::Php))];
        let warnings = vec![ScanWarning::RootMissing { root: "gone".into() }];
        let options = ReportOptions {
            format: ReportFormat::Json,
            ..Default::default()
        };
        let text = format_report(&records, &stats_for(&records), &warnings, &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["files"][0]["path"], "a.php");
        assert_eq!(json["files"][0]["language"], "PHP");
        assert_eq!(json["files"][0]["content"], "<?php\n");
        assert_eq!(json["stats"]["files_accepted"], 1);
        assert_eq!(json["encoding"], "cl100k_base");
        assert_eq!(json["warnings"][0]["kind"], "root_missing");
        assert_eq!(json["warnings"][0]["root"], "gone");
    }

    #[test]
    fn test_write_report_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/nested/report.md");
        write_report(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_report_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_report(&blocker.join("report.md"), "x").unwrap_err();
        assert!(matches!(err, OutputError::Write { .. }));
    }
}
