use super::{finish_line, map_lines, CommentStripper};

/// Best-effort fallback for unrecognized file types.
///
/// Removes `/* ... */` spans within a line, then cuts at the first `//` or
/// `#`. It has no notion of strings, so `"http://x"` loses everything after
/// `http:`; only used when no language-specific stripper applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericStripper;

impl CommentStripper for GenericStripper {
    fn strip(&self, content: &str) -> String {
        map_lines(content, |_, line| {
            let (text, touched) = strip_generic_line(line);
            finish_line(text, touched)
        })
    }
}

fn strip_generic_line(line: &str) -> (String, bool) {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    let mut touched = false;

    loop {
        let block = rest.find("/*");
        let cut = [rest.find("//"), rest.find('#')].into_iter().flatten().min();

        match (block, cut) {
            (Some(start), cut) if cut.map_or(true, |c| start < c) => {
                out.push_str(&rest[..start]);
                touched = true;
                let body = &rest[start + 2..];
                match body.find("*/") {
                    Some(end) => rest = &body[end + 2..],
                    None => return (out, touched),
                }
            }
            (_, Some(at)) => {
                out.push_str(&rest[..at]);
                return (out, true);
            }
            _ => {
                out.push_str(rest);
                return (out, touched);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_slashes() {
        assert_eq!(GenericStripper.strip("a = 1 # c\nb = 2 // d\n"), "a = 1\nb = 2\n");
    }

    #[test]
    fn test_inline_block() {
        assert_eq!(GenericStripper.strip("a /* x */ b /* y */ c"), "a  b  c");
    }

    #[test]
    fn test_block_before_line_comment() {
        assert_eq!(GenericStripper.strip("a /* // */ b # c"), "a  b");
    }

    #[test]
    fn test_not_string_aware() {
        assert_eq!(GenericStripper.strip("url = \"http://x\""), "url = \"http:");
    }

    #[test]
    fn test_unterminated_block_cuts_line_only() {
        assert_eq!(GenericStripper.strip("a /* open\nb\n"), "a\nb\n");
    }
}
