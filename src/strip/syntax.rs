//! Comment and string syntax tables.

use super::lexer::{LineComment, Syntax};

const SLASHES: &[LineComment] = &[LineComment::new("//")];

pub(super) const PHP: Syntax = Syntax {
    line_comments: &[LineComment::new("//"), LineComment::new("#").not_before('[')],
    block_comment: Some(("/*", "*/")),
    quotes: &['"', '\''],
    multiline_quotes: &['"', '\''],
    quotes_need_boundary: false,
    triple_quotes: false,
    lifetimes: false,
    shebang: true,
};

pub(super) const C_FAMILY: Syntax = Syntax {
    line_comments: SLASHES,
    block_comment: Some(("/*", "*/")),
    quotes: &['"', '\''],
    multiline_quotes: &[],
    quotes_need_boundary: false,
    triple_quotes: false,
    lifetimes: false,
    shebang: false,
};

pub(super) const GO: Syntax = Syntax {
    quotes: &['"', '\'', '`'],
    multiline_quotes: &['`'],
    ..C_FAMILY
};

pub(super) const RUST: Syntax = Syntax {
    multiline_quotes: &['"'],
    lifetimes: true,
    ..C_FAMILY
};

pub(super) const JAVASCRIPT: Syntax = Syntax {
    quotes: &['"', '\'', '`'],
    multiline_quotes: &['`'],
    shebang: true,
    ..C_FAMILY
};

pub(super) const CSS: Syntax = Syntax {
    line_comments: &[],
    ..C_FAMILY
};

pub(super) const PYTHON: Syntax = Syntax {
    line_comments: &[LineComment::new("#")],
    block_comment: None,
    quotes: &['"', '\''],
    multiline_quotes: &[],
    quotes_need_boundary: false,
    triple_quotes: true,
    lifetimes: false,
    shebang: true,
};

pub(super) const SHELL: Syntax = Syntax {
    line_comments: &[LineComment::at_boundary("#")],
    block_comment: None,
    quotes: &['"', '\''],
    multiline_quotes: &['"', '\''],
    quotes_need_boundary: false,
    triple_quotes: false,
    lifetimes: false,
    shebang: true,
};

pub(super) const YAML: Syntax = Syntax {
    multiline_quotes: &[],
    quotes_need_boundary: true,
    shebang: false,
    ..SHELL
};

pub(super) const HASH: Syntax = Syntax {
    line_comments: &[LineComment::new("#")],
    multiline_quotes: &[],
    ..SHELL
};
