//! Language classification and binary detection.
//!
//! Languages are inferred purely from the file extension. The comment
//! family a language belongs to decides which stripper handles it
//! (see [`crate::strip`]).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing language names.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}

/// Languages with a known comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Php,
    C,
    Cpp,
    CSharp,
    Java,
    Kotlin,
    Swift,
    Go,
    Rust,
    JavaScript,
    TypeScript,
    Css,
    Scss,
    Python,
    Shell,
    Ruby,
    Perl,
    Yaml,
    Toml,
    Html,
    Xml,
    Json,
    Markdown,
    Text,
}

/// How comments are written in a language, used to pick a stripper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFamily {
    /// `/* */` blocks, usually with `//` line comments.
    Block,
    /// `#` line comments.
    Hash,
    /// `<!-- -->` comments.
    Markup,
    /// Content is never stripped.
    Verbatim,
}

impl fmt::Display for CommentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommentFamily::Block => "block",
            CommentFamily::Hash => "hash",
            CommentFamily::Markup => "markup",
            CommentFamily::Verbatim => "verbatim",
        };
        f.write_str(name)
    }
}

impl Language {
    /// Every supported language, in display order.
    pub fn all() -> &'static [Language] {
        &[
            Language::Php,
            Language::C,
            Language::Cpp,
            Language::CSharp,
            Language::Java,
            Language::Kotlin,
            Language::Swift,
            Language::Go,
            Language::Rust,
            Language::JavaScript,
            Language::TypeScript,
            Language::Css,
            Language::Scss,
            Language::Python,
            Language::Shell,
            Language::Ruby,
            Language::Perl,
            Language::Yaml,
            Language::Toml,
            Language::Html,
            Language::Xml,
            Language::Json,
            Language::Markdown,
            Language::Text,
        ]
    }

    /// File extensions (lowercase, without the dot) for this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Php => &["php", "phtml", "inc"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            Language::CSharp => &["cs"],
            Language::Java => &["java"],
            Language::Kotlin => &["kt", "kts"],
            Language::Swift => &["swift"],
            Language::Go => &["go"],
            Language::Rust => &["rs"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::Css => &["css"],
            Language::Scss => &["scss", "less"],
            Language::Python => &["py", "pyi", "pyw"],
            Language::Shell => &["sh", "bash", "zsh"],
            Language::Ruby => &["rb"],
            Language::Perl => &["pl", "pm"],
            Language::Yaml => &["yml", "yaml"],
            Language::Toml => &["toml"],
            Language::Html => &["html", "htm"],
            Language::Xml => &["xml", "svg", "xsd", "xsl"],
            Language::Json => &["json"],
            Language::Markdown => &["md", "markdown"],
            Language::Text => &["txt"],
        }
    }

    /// Comment family of this language.
    pub fn comment_family(&self) -> CommentFamily {
        match self {
            Language::Php
            | Language::C
            | Language::Cpp
            | Language::CSharp
            | Language::Java
            | Language::Kotlin
            | Language::Swift
            | Language::Go
            | Language::Rust
            | Language::JavaScript
            | Language::TypeScript
            | Language::Css
            | Language::Scss => CommentFamily::Block,
            Language::Python
            | Language::Shell
            | Language::Ruby
            | Language::Perl
            | Language::Yaml
            | Language::Toml => CommentFamily::Hash,
            Language::Html | Language::Xml => CommentFamily::Markup,
            Language::Json | Language::Markdown | Language::Text => CommentFamily::Verbatim,
        }
    }

    /// Info string for a markdown code fence.
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Language::Php => "php",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Python => "python",
            Language::Shell => "bash",
            Language::Ruby => "ruby",
            Language::Perl => "perl",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Html => "html",
            Language::Xml => "xml",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Text => "text",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Php => "PHP",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Java => "Java",
            Language::Kotlin => "Kotlin",
            Language::Swift => "Swift",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Css => "CSS",
            Language::Scss => "SCSS",
            Language::Python => "Python",
            Language::Shell => "Shell",
            Language::Ruby => "Ruby",
            Language::Perl => "Perl",
            Language::Yaml => "YAML",
            Language::Toml => "TOML",
            Language::Html => "HTML",
            Language::Xml => "XML",
            Language::Json => "JSON",
            Language::Markdown => "Markdown",
            Language::Text => "Text",
        };
        f.write_str(name)
    }
}

/// Parses an extension (with or without the leading dot).
impl FromStr for Language {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim_start_matches('.').to_ascii_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
            .ok_or_else(|| FilterError::UnknownLanguage(s.to_string()))
    }
}

/// Lowercased extension of a path, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Detect the language of a file from its extension.
pub fn detect_language(path: &Path) -> Option<Language> {
    extension_of(path).and_then(|ext| ext.parse().ok())
}

/// True if the content holds a NUL byte anywhere.
pub fn is_binary(content: &[u8]) -> bool {
    content.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("src/a.php")), Some(Language::Php));
        assert_eq!(detect_language(Path::new("A.PY")), Some(Language::Python));
        assert_eq!(detect_language(Path::new("x.tsx")), Some(Language::TypeScript));
        assert_eq!(detect_language(Path::new("Makefile")), None);
        assert_eq!(detect_language(Path::new("data.bin")), None);
    }

    #[test]
    fn test_from_str_accepts_dot() {
        assert_eq!(".yml".parse::<Language>().unwrap(), Language::Yaml);
        assert_eq!("HTML".parse::<Language>().unwrap(), Language::Html);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_extensions_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for lang in Language::all() {
            for ext in lang.extensions() {
                assert!(seen.insert(*ext), "duplicate extension {ext}");
            }
        }
    }

    #[test]
    fn test_comment_family() {
        assert_eq!(Language::Php.comment_family(), CommentFamily::Block);
        assert_eq!(Language::Css.comment_family(), CommentFamily::Block);
        assert_eq!(Language::Yaml.comment_family(), CommentFamily::Hash);
        assert_eq!(Language::Xml.comment_family(), CommentFamily::Markup);
        assert_eq!(Language::Json.comment_family(), CommentFamily::Verbatim);
    }

    #[test]
    fn test_is_binary() {
        assert!(is_binary(b"abc\0def"));
        assert!(is_binary(b"\0"));
        assert!(!is_binary(b"plain text\n"));
        assert!(!is_binary(b""));
    }
}
