//! Comment removal that preserves line numbering.
//!
//! Every stripper maps each input line to exactly one output line: text
//! inside a block comment is removed but its line breaks stay, so line `N`
//! of the stripped output is line `N` of the source. Lines left empty or
//! holding only whitespace are blanked.
//!
//! Strategies are picked per language through [`stripper_for`]:
//!
//! - block-comment languages (PHP, C family, CSS) and hash-comment
//!   languages (Python, shell, YAML) share the string-aware [`lexer`]
//! - markup (HTML, XML) removes `<!-- -->` spans
//! - JSON, Markdown and plain text pass through untouched
//! - anything unrecognized gets a best-effort [`generic`] pass

mod code;
mod generic;
pub mod lexer;
mod markup;
mod syntax;

use crate::filter::Language;

pub use code::LexicalStripper;
pub use generic::GenericStripper;
pub use markup::MarkupStripper;

/// A comment-removal strategy for one family of languages.
pub trait CommentStripper: Send + Sync {
    /// Remove comments from `content`. The result has the same number of
    /// `\n` characters as the input.
    fn strip(&self, content: &str) -> String;
}

/// Leaves content untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimStripper;

impl CommentStripper for VerbatimStripper {
    fn strip(&self, content: &str) -> String {
        content.to_string()
    }
}

static PHP: LexicalStripper = LexicalStripper::new(&syntax::PHP);
static C_FAMILY: LexicalStripper = LexicalStripper::new(&syntax::C_FAMILY);
static GO: LexicalStripper = LexicalStripper::new(&syntax::GO);
static RUST: LexicalStripper = LexicalStripper::new(&syntax::RUST);
static JAVASCRIPT: LexicalStripper = LexicalStripper::new(&syntax::JAVASCRIPT);
static CSS: LexicalStripper = LexicalStripper::new(&syntax::CSS);
static PYTHON: LexicalStripper = LexicalStripper::new(&syntax::PYTHON);
static SHELL: LexicalStripper = LexicalStripper::new(&syntax::SHELL);
static YAML: LexicalStripper = LexicalStripper::new(&syntax::YAML);
static HASH: LexicalStripper = LexicalStripper::new(&syntax::HASH);
static MARKUP: MarkupStripper = MarkupStripper;
static VERBATIM: VerbatimStripper = VerbatimStripper;
static GENERIC: GenericStripper = GenericStripper;

/// The stripper for a language; `None` (unrecognized extension) gets the
/// generic fallback.
pub fn stripper_for(language: Option<Language>) -> &'static dyn CommentStripper {
    let Some(language) = language else {
        return &GENERIC;
    };

    match language {
        Language::Php => &PHP,
        Language::C
        | Language::Cpp
        | Language::CSharp
        | Language::Java
        | Language::Kotlin
        | Language::Swift
        | Language::Scss => &C_FAMILY,
        Language::Go => &GO,
        Language::Rust => &RUST,
        Language::JavaScript | Language::TypeScript => &JAVASCRIPT,
        Language::Css => &CSS,
        Language::Python => &PYTHON,
        Language::Shell | Language::Perl => &SHELL,
        Language::Yaml => &YAML,
        Language::Ruby | Language::Toml => &HASH,
        Language::Html | Language::Xml => &MARKUP,
        Language::Json | Language::Markdown | Language::Text => &VERBATIM,
    }
}

/// Strip comments from `content` as `language`.
///
/// # Examples
///
/// ```
/// use sift::filter::Language;
/// use sift::strip::strip_comments;
///
/// let php = "$x = \"// fake\"; // real\n/* gone\n   too */\necho $x;\n";
/// let out = strip_comments(php, Some(Language::Php));
/// assert_eq!(out, "$x = \"// fake\";\n\n\necho $x;\n");
/// ```
pub fn strip_comments(content: &str, language: Option<Language>) -> String {
    stripper_for(language).strip(content)
}

/// Apply `f` to every line, keeping `\n` separators and `\r` endings.
pub(crate) fn map_lines(content: &str, mut f: impl FnMut(usize, &str) -> String) -> String {
    let mut out = String::with_capacity(content.len());
    for (index, raw) in content.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let (line, cr) = match raw.strip_suffix('\r') {
            Some(line) => (line, true),
            None => (raw, false),
        };
        out.push_str(&f(index, line));
        if cr {
            out.push('\r');
        }
    }
    out
}

/// Blank whitespace-only lines and trim what a removed comment left behind.
pub(crate) fn finish_line(text: String, touched: bool) -> String {
    if text.trim().is_empty() {
        String::new()
    } else if touched {
        text.trim_end().to_string()
    } else {
        text
    }
}
