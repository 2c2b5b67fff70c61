//! Turning one file on disk into a [`FileRecord`].

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::{detect_language, is_binary, Language};
use crate::strip::strip_comments;

/// A processed file ready for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub absolute_path: PathBuf,
    /// Relative to the project root, `/`-separated.
    pub relative_path: String,
    /// Content after stripping and truncation.
    pub content: String,
    /// Size of `content`, not of the file on disk.
    pub size_bytes: u64,
    pub line_count: usize,
    pub language: Option<Language>,
    /// The line budget cut this file short.
    pub truncated: bool,
}

/// Why a file produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable(String),
    Binary,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(message) => write!(f, "unreadable: {message}"),
            SkipReason::Binary => f.write_str("binary content"),
        }
    }
}

/// Outcome of [`FileRecordBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    Accepted(FileRecord),
    Skipped(SkipReason),
}

/// Reads, classifies, strips, and truncates single files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRecordBuilder {
    strip_comments: bool,
    max_lines: usize,
}

impl FileRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove comments before truncating.
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    /// Keep at most this many lines (0 = unlimited).
    pub fn max_lines(mut self, max: usize) -> Self {
        self.max_lines = max;
        self
    }

    /// Build a record for `path`. Never fails: I/O problems and binary
    /// content come back as [`BuildResult::Skipped`].
    pub fn build(&self, path: &Path, relative_path: &str) -> BuildResult {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return BuildResult::Skipped(SkipReason::Unreadable(e.to_string())),
        };

        if is_binary(&bytes) {
            return BuildResult::Skipped(SkipReason::Binary);
        }

        let language = detect_language(path);
        let text = String::from_utf8_lossy(&bytes);
        let content = if self.strip_comments {
            strip_comments(&text, language)
        } else {
            text.into_owned()
        };

        let cut = match truncate_lines(&content, self.max_lines) {
            Cow::Owned(shorter) => Some(shorter),
            Cow::Borrowed(_) => None,
        };
        let (content, truncated) = match cut {
            Some(shorter) => (shorter, true),
            None => (content, false),
        };

        BuildResult::Accepted(FileRecord {
            absolute_path: path.to_path_buf(),
            relative_path: relative_path.to_string(),
            size_bytes: content.len() as u64,
            line_count: line_count(&content),
            content,
            language,
            truncated,
        })
    }
}

/// Number of lines as [`str::lines`] sees them.
pub fn line_count(content: &str) -> usize {
    content.lines().count()
}

const MARKER_PREFIX: &str = "... [truncated: limited to ";

/// The marker line appended after a cut.
pub fn truncation_marker(max_lines: usize) -> String {
    format!("{MARKER_PREFIX}{max_lines} lines]")
}

fn is_marker(line: &str) -> bool {
    line.starts_with(MARKER_PREFIX) && line.ends_with(" lines]")
}

/// Keep the first `max_lines` lines and append a marker line.
///
/// Content that was already cut at `max_lines` or fewer comes back
/// unchanged, so truncating twice is a no-op.
///
/// # Examples
///
/// ```
/// use sift::record::truncate_lines;
///
/// let cut = truncate_lines("1\n2\n3\n4\n", 2);
/// assert_eq!(cut, "1\n2\n... [truncated: limited to 2 lines]");
/// assert_eq!(truncate_lines(&cut, 2), cut);
/// ```
pub fn truncate_lines(content: &str, max_lines: usize) -> Cow<'_, str> {
    if max_lines == 0 {
        return Cow::Borrowed(content);
    }

    // Lines keep their own terminators so CRLF survives the cut.
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    if lines.len() <= max_lines {
        return Cow::Borrowed(content);
    }

    let already_cut = lines
        .last()
        .is_some_and(|last| is_marker(last.trim_end_matches(['\r', '\n'])));
    if already_cut && lines.len() - 1 <= max_lines {
        return Cow::Borrowed(content);
    }

    let mut out = lines[..max_lines].concat();
    out.push_str(&truncation_marker(max_lines));
    Cow::Owned(out)
}
