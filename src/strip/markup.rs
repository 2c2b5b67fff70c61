use super::{finish_line, map_lines, CommentStripper};

const OPEN: &str = "<!--";
const CLOSE: &str = "-->";

/// Removes `<!-- ... -->` spans, keeping the line breaks they covered.
///
/// No string awareness: markup comments cannot hide inside attribute values
/// the way code comments hide inside string literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupStripper;

impl CommentStripper for MarkupStripper {
    fn strip(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];
            let (comment, remainder) = match after.find(CLOSE) {
                Some(end) => (&after[..end], &after[end + CLOSE.len()..]),
                // Unterminated: the comment runs to end of file.
                None => (after, ""),
            };
            let breaks = bytecount::count(comment.as_bytes(), b'\n');
            out.extend(std::iter::repeat('\n').take(breaks));
            rest = remainder;
        }
        out.push_str(rest);

        map_lines(&out, |_, line| finish_line(line.to_string(), false))
    }
}
