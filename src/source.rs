// File: src/source.rs
//
// Source preprocessing done by the driver before scanning.
// Comments start with # and run to the end of the line.

/// Removes `#` comments outside string literals.
///
/// Lines are kept (a comment-only line becomes empty) so that line numbers
/// in diagnostics still match the file on disk. Trailing whitespace left
/// behind by a removed comment is trimmed.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_string = false;

    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut kept = String::with_capacity(line.len());
        let mut had_comment = false;
        for ch in line.chars() {
            match ch {
                '"' => {
                    in_string = !in_string;
                    kept.push(ch);
                }
                '#' if !in_string => {
                    had_comment = true;
                    break;
                }
                _ => kept.push(ch),
            }
        }
        if had_comment {
            out.push_str(kept.trim_end());
        } else {
            out.push_str(&kept);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_full_line_and_trailing_comments() {
        let src = "# header\nx = 1 # set x\n\nprint x";
        assert_eq!(strip_comments(src), "\nx = 1\n\nprint x");
    }

    #[test]
    fn test_hash_inside_string_is_kept() {
        assert_eq!(strip_comments("print \"#1\" # note"), "print \"#1\"");
    }

    #[test]
    fn test_multiline_string_keeps_state() {
        let src = "print \"a\n# not a comment\" # comment";
        assert_eq!(strip_comments(src), "print \"a\n# not a comment\"");
    }

    #[test]
    fn test_line_count_is_preserved() {
        let src = "a = 1\n# c\n# c\nprint a";
        assert_eq!(strip_comments(src).lines().count(), 4);
    }
}
