use super::lexer::{strip_line, LexState, Syntax};
use super::{finish_line, map_lines, CommentStripper};

/// String-aware stripper driven by a [`Syntax`] table.
///
/// Lexer state carries across lines, so block comments and multi-line
/// strings are tracked for the whole file.
#[derive(Debug, Clone, Copy)]
pub struct LexicalStripper {
    syntax: &'static Syntax,
}

impl LexicalStripper {
    pub const fn new(syntax: &'static Syntax) -> Self {
        Self { syntax }
    }
}

impl CommentStripper for LexicalStripper {
    fn strip(&self, content: &str) -> String {
        let mut state = LexState::Normal;
        map_lines(content, |index, line| {
            if index == 0 && self.syntax.shebang && line.starts_with("#!") {
                return line.to_string();
            }
            let (text, touched) = strip_line(line, &mut state, self.syntax);
            finish_line(text, touched)
        })
    }
}
