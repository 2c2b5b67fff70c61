//! Character-level lexer shared by the block- and hash-comment strippers.
//!
//! The lexer only knows about strings and comments. [`step`] is a pure
//! transition function: given the current state and the text ahead of the
//! cursor it returns the next state, how many characters it consumed, and
//! whether those characters survive.

/// A line comment marker such as `//` or `#`.
#[derive(Debug, Clone, Copy)]
pub struct LineComment {
    pub marker: &'static str,
    /// Only a comment at line start or after whitespace (`echo a#b` is not).
    pub needs_boundary: bool,
    /// The marker does not start a comment when followed by this character
    /// (PHP attributes: `#[Route]`).
    pub not_before: Option<char>,
}

impl LineComment {
    pub const fn new(marker: &'static str) -> Self {
        Self {
            marker,
            needs_boundary: false,
            not_before: None,
        }
    }

    pub const fn at_boundary(marker: &'static str) -> Self {
        Self {
            marker,
            needs_boundary: true,
            not_before: None,
        }
    }

    pub const fn not_before(mut self, c: char) -> Self {
        self.not_before = Some(c);
        self
    }

    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        if !cursor.starts_with(self.marker) {
            return false;
        }
        if self.needs_boundary && !cursor.prev.map_or(true, char::is_whitespace) {
            return false;
        }
        match self.not_before {
            Some(c) => cursor.rest.get(self.marker.chars().count()) != Some(&c),
            None => true,
        }
    }
}

/// Comment and string syntax of one language group.
#[derive(Debug, Clone, Copy)]
pub struct Syntax {
    pub line_comments: &'static [LineComment],
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Characters that open and close a string literal.
    pub quotes: &'static [char],
    /// Quotes whose strings may continue past the end of a line.
    pub multiline_quotes: &'static [char],
    /// A quote only opens a string at line start or after whitespace and
    /// structural punctuation (YAML plain scalars such as `it's`).
    pub quotes_need_boundary: bool,
    /// Tripled quotes (`"""`, `'''`) open a string that may span lines.
    pub triple_quotes: bool,
    /// `'` may start a lifetime or label rather than a character literal.
    pub lifetimes: bool,
    /// A `#!` first line is kept as-is.
    pub shebang: bool,
}

impl Syntax {
    fn block_open(&self) -> Option<&'static str> {
        self.block_comment.map(|(open, _)| open)
    }

    fn block_close(&self) -> Option<&'static str> {
        self.block_comment.map(|(_, close)| close)
    }
}

/// Lexer state. Exactly one is active at any position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexState {
    #[default]
    Normal,
    InString(char),
    InTripleString(char),
    InBlockComment,
}

/// What happens to the characters a step consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Keep,
    Drop,
    /// Drop everything up to the end of the line.
    DropRest,
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub state: LexState,
    /// Characters consumed, at least one.
    pub width: usize,
    pub emit: Emit,
}

impl Step {
    fn keep(state: LexState, width: usize) -> Self {
        Self {
            state,
            width,
            emit: Emit::Keep,
        }
    }

    fn drop(state: LexState, width: usize) -> Self {
        Self {
            state,
            width,
            emit: Emit::Drop,
        }
    }
}

/// The text ahead of the lexer on the current line.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    /// Current character first.
    pub rest: &'a [char],
    /// Character before the cursor on this line.
    pub prev: Option<char>,
}

impl<'a> Cursor<'a> {
    pub fn new(rest: &'a [char], prev: Option<char>) -> Self {
        Self { rest, prev }
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut ahead = self.rest.iter();
        s.chars().all(|c| ahead.next() == Some(&c))
    }

    fn starts_with_triple(&self, q: char) -> bool {
        self.rest.len() >= 3 && self.rest[..3].iter().all(|&c| c == q)
    }
}

/// `'x'` or `'\n'` rather than a lifetime such as `'a` or `'static`.
fn is_char_literal(rest: &[char]) -> bool {
    match rest.get(1) {
        Some('\\') => true,
        Some(_) => rest.get(2) == Some(&'\''),
        None => false,
    }
}

fn quote_boundary(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, ':' | '[' | '{' | ',' | '-' | '='),
    }
}

/// Advance the lexer by one token.
///
/// Inside strings a backslash consumes itself and the following character,
/// so `"\\"` closes on its last quote while `"\""` does not.
pub fn step(state: LexState, cursor: &Cursor<'_>, syntax: &Syntax) -> Step {
    let Some(&c) = cursor.rest.first() else {
        return Step::keep(state, 1);
    };

    match state {
        LexState::Normal => step_normal(c, cursor, syntax),
        LexState::InString(q) => {
            if c == '\\' {
                Step::keep(state, cursor.rest.len().min(2))
            } else if c == q {
                Step::keep(LexState::Normal, 1)
            } else {
                Step::keep(state, 1)
            }
        }
        LexState::InTripleString(q) => {
            if c == '\\' {
                Step::keep(state, cursor.rest.len().min(2))
            } else if cursor.starts_with_triple(q) {
                Step::keep(LexState::Normal, 3)
            } else {
                Step::keep(state, 1)
            }
        }
        LexState::InBlockComment => match syntax.block_close() {
            Some(close) if cursor.starts_with(close) => {
                Step::drop(LexState::Normal, close.chars().count())
            }
            Some(_) => Step::drop(state, 1),
            // Unreachable for well-formed syntax tables; recover instead of eating the file.
            None => Step::keep(LexState::Normal, 1),
        },
    }
}

fn step_normal(c: char, cursor: &Cursor<'_>, syntax: &Syntax) -> Step {
    if let Some(open) = syntax.block_open() {
        if cursor.starts_with(open) {
            return Step::drop(LexState::InBlockComment, open.chars().count());
        }
    }

    if syntax.line_comments.iter().any(|lc| lc.matches(cursor)) {
        return Step {
            state: LexState::Normal,
            width: cursor.rest.len(),
            emit: Emit::DropRest,
        };
    }

    if syntax.quotes.contains(&c) {
        if syntax.quotes_need_boundary && !quote_boundary(cursor.prev) {
            return Step::keep(LexState::Normal, 1);
        }
        if syntax.triple_quotes && cursor.starts_with_triple(c) {
            return Step::keep(LexState::InTripleString(c), 3);
        }
        if syntax.lifetimes && c == '\'' && !is_char_literal(cursor.rest) {
            return Step::keep(LexState::Normal, 1);
        }
        return Step::keep(LexState::InString(c), 1);
    }

    Step::keep(LexState::Normal, 1)
}

/// Strip one line, carrying `state` across calls.
///
/// Returns the surviving text and whether anything was removed.
pub fn strip_line(line: &str, state: &mut LexState, syntax: &Syntax) -> (String, bool) {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut touched = false;
    let mut i = 0;

    while i < chars.len() {
        let cursor = Cursor::new(&chars[i..], i.checked_sub(1).map(|p| chars[p]));
        let step = step(*state, &cursor, syntax);
        let width = step.width.clamp(1, chars.len() - i);

        *state = step.state;
        match step.emit {
            Emit::Keep => out.extend(&chars[i..i + width]),
            Emit::Drop => touched = true,
            Emit::DropRest => {
                touched = true;
                break;
            }
        }
        i += width;
    }

    if let LexState::InString(q) = *state {
        if !syntax.multiline_quotes.contains(&q) {
            *state = LexState::Normal;
        }
    }

    (out, touched)
}
