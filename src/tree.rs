//! Directory tree of accepted files, rendered with box-drawing characters.

use std::cmp::Ordering;

use crate::filter::Language;
use crate::record::FileRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File {
        language: Option<Language>,
        size: u64,
        lines: usize,
        truncated: bool,
    },
}

/// A node in the file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Single path segment.
    pub name: String,
    pub kind: NodeKind,
    children: Vec<FileNode>,
}

impl FileNode {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children: Vec::new(),
        }
    }

    pub fn file(name: impl Into<String>, record: &FileRecord) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File {
                language: record.language,
                size: record.size_bytes,
                lines: record.line_count,
                truncated: record.truncated,
            },
            children: Vec::new(),
        }
    }

    /// Build a sorted tree from records' relative paths.
    ///
    /// Records sharing a relative path (overlapping roots) each get a node.
    pub fn from_records(root_name: impl Into<String>, records: &[FileRecord]) -> Self {
        let mut root = Self::directory(root_name);
        for record in records {
            let segments: Vec<&str> = record
                .relative_path
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            root.insert(&segments, record);
        }
        root.sort_children();
        root
    }

    fn insert(&mut self, segments: &[&str], record: &FileRecord) {
        match segments {
            [] => {}
            [name] => self.children.push(Self::file(*name, record)),
            [dir, rest @ ..] => {
                let index = match self
                    .children
                    .iter()
                    .position(|c| c.is_directory() && c.name == *dir)
                {
                    Some(index) => index,
                    None => {
                        self.children.push(Self::directory(*dir));
                        self.children.len() - 1
                    }
                };
                self.children[index].insert(rest, record);
            }
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    pub fn children(&self) -> &[FileNode] {
        &self.children
    }

    /// Directories first, then case-insensitive by name.
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| match (a.is_directory(), b.is_directory()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });
        for child in &mut self.children {
            child.sort_children();
        }
    }

    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File { .. } => 1,
            NodeKind::Directory => self.children.iter().map(FileNode::file_count).sum(),
        }
    }

    /// Directories below this node, not counting itself.
    pub fn directory_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.is_directory())
            .map(|c| 1 + c.directory_count())
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub show_size: bool,
    pub show_lines: bool,
    pub show_language: bool,
    /// Append `(truncated)` to files the line budget cut.
    pub mark_truncated: bool,
}

impl RenderOptions {
    pub fn with_metadata() -> Self {
        Self {
            show_size: true,
            show_lines: true,
            show_language: true,
            mark_truncated: true,
        }
    }
}

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const VERTICAL: &str = "│   ";
const SPACE: &str = "    ";

/// Render a tree with box-drawing characters.
///
/// ```
/// use sift::tree::{FileNode, RenderOptions, render_tree};
///
/// let root = FileNode::from_records("project", &[]);
/// assert_eq!(render_tree(&root, &RenderOptions::default()), "project/\n");
/// ```
pub fn render_tree(root: &FileNode, options: &RenderOptions) -> String {
    let mut output = String::with_capacity(4096);
    output.push_str(&root.name);
    output.push_str("/\n");
    render_children(&mut output, root, "", options);
    output
}

fn render_children(output: &mut String, node: &FileNode, prefix: &str, options: &RenderOptions) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        output.push_str(prefix);
        output.push_str(if last { LAST_BRANCH } else { BRANCH });
        output.push_str(&child.name);

        match &child.kind {
            NodeKind::Directory => output.push('/'),
            NodeKind::File {
                language,
                size,
                lines,
                truncated,
            } => {
                let mut metadata = Vec::new();
                if options.show_language {
                    if let Some(lang) = language {
                        metadata.push(lang.to_string());
                    }
                }
                if options.show_lines {
                    metadata.push(format!("{lines} lines"));
                }
                if options.show_size {
                    metadata.push(format_size(*size));
                }
                if !metadata.is_empty() {
                    output.push_str(" [");
                    output.push_str(&metadata.join(", "));
                    output.push(']');
                }
                if options.mark_truncated && *truncated {
                    output.push_str(" (truncated)");
                }
            }
        }
        output.push('\n');

        if child.is_directory() {
            let next = format!("{prefix}{}", if last { SPACE } else { VERTICAL });
            render_children(output, child, &next, options);
        }
    }
}

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{bytes}B")
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}

/// Number with thousands separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(path: &str, size: u64, truncated: bool) -> FileRecord {
        FileRecord {
            absolute_path: PathBuf::from("/p").join(path),
            relative_path: path.into(),
            content: String::new(),
            size_bytes: size,
            line_count: 3,
            language: crate::filter::detect_language(std::path::Path::new(path)),
            truncated,
        }
    }

    #[test]
    fn test_from_records_nests_and_sorts() {
        let records = vec![
            record("z.php", 10, false),
            record("src/b.php", 10, false),
            record("src/lib/a.php", 10, false),
            record("README.md", 10, false),
        ];
        let root = FileNode::from_records("project", &records);

        assert_eq!(root.file_count(), 4);
        assert_eq!(root.directory_count(), 2);
        let names: Vec<_> = root.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["src", "README.md", "z.php"]);
        assert_eq!(root.children()[0].children()[0].name, "lib");
    }

    #[test]
    fn test_duplicate_paths_both_kept() {
        let records = vec![record("x/y.php", 1, false), record("x/y.php", 1, false)];
        let root = FileNode::from_records("p", &records);
        assert_eq!(root.file_count(), 2);
        assert_eq!(root.directory_count(), 1);
    }

    #[test]
    fn test_render_nested() {
        let records = vec![
            record("src/main.rs", 100, false),
            record("src/lib.rs", 200, false),
            record("Cargo.toml", 50, false),
        ];
        let output = render_tree(
            &FileNode::from_records("project", &records),
            &RenderOptions::default(),
        );
        assert_eq!(
            output,
            "project/\n├── src/\n│   ├── lib.rs\n│   └── main.rs\n└── Cargo.toml\n"
        );
    }

    #[test]
    fn test_render_with_metadata() {
        let records = vec![record("a.php", 2048, true)];
        let output = render_tree(
            &FileNode::from_records("p", &records),
            &RenderOptions::with_metadata(),
        );
        assert!(output.contains("└── a.php [PHP, 3 lines, 2.0KB] (truncated)"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(1024 * 1024), "1.0MB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
