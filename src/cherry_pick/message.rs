//! Commit-message normalization: sign-off trailers go last, in one block.
//!
//! `git cherry-pick -x --signoff` appends the provenance line after the
//! author's existing trailers and then adds a new sign-off, splitting the
//! sign-offs apart. DCO checks expect them contiguous at the end.

/// Trailer keyword identifying a sign-off line
pub const SIGNOFF_PREFIX: &str = "Signed-off-by:";

/// Move every sign-off line to one trailing block
///
/// Sign-offs keep their relative order and are separated from the rest of
/// the message by exactly one blank line. CRLF messages keep CRLF line
/// endings. A message without sign-offs is returned unchanged.
pub fn normalize_signoffs(message: &str) -> String {
    let (signoffs, body): (Vec<&str>, Vec<&str>) = message
        .lines()
        .partition(|line| line.starts_with(SIGNOFF_PREFIX));

    if signoffs.is_empty() {
        return message.to_string();
    }

    let body_end = body
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |i| i + 1);
    let body = &body[..body_end];

    let eol = if message.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::new();
    if !body.is_empty() {
        out.push_str(&body.join(eol));
        out.push_str(eol);
        out.push_str(eol);
    }
    out.push_str(&signoffs.join(eol));
    out.push_str(eol);
    out
}

/// Whether normalizing would change the message beyond trailing whitespace
pub fn needs_normalization(message: &str) -> bool {
    normalize_signoffs(message).trim_end() != message.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PICKED: &str = "Fix crash on empty input\n\
\n\
Guard the parser against zero-length buffers.\n\
\n\
Signed-off-by: Ada <ada@example.com>\n\
(cherry picked from commit 0123456789abcdef)\n\
Signed-off-by: Bot <bot@example.com>\n";

    #[test]
    fn test_signoffs_moved_to_end() {
        let normalized = normalize_signoffs(PICKED);
        assert_eq!(
            normalized,
            "Fix crash on empty input\n\
\n\
Guard the parser against zero-length buffers.\n\
\n\
(cherry picked from commit 0123456789abcdef)\n\
\n\
Signed-off-by: Ada <ada@example.com>\n\
Signed-off-by: Bot <bot@example.com>\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_signoffs(PICKED);
        let twice = normalize_signoffs(&once);
        assert_eq!(once, twice);
        assert!(!needs_normalization(&once));
        assert!(needs_normalization(PICKED));
    }

    #[test]
    fn test_no_signoffs_unchanged_byte_for_byte() {
        for msg in [
            "Subject only",
            "Subject\n\nBody\n\n\n",
            "Subject\r\n\r\nBody with CRLF\r\n",
            "",
            "Mentions Signed-off-by: mid-line but not as a trailer\n",
        ] {
            assert_eq!(normalize_signoffs(msg), msg);
            assert!(!needs_normalization(msg));
        }
    }

    #[test]
    fn test_preserves_signoff_multiset_and_order() {
        let msg = "Subject\n\
Signed-off-by: C <c@x>\n\
middle line\n\
Signed-off-by: A <a@x>\n\
\n\
Signed-off-by: C <c@x>\n\
\n\
\n";
        let normalized = normalize_signoffs(msg);
        let signoffs: Vec<&str> = normalized
            .lines()
            .filter(|l| l.starts_with(SIGNOFF_PREFIX))
            .collect();
        assert_eq!(
            signoffs,
            vec![
                "Signed-off-by: C <c@x>",
                "Signed-off-by: A <a@x>",
                "Signed-off-by: C <c@x>"
            ]
        );
        assert_eq!(
            normalized,
            "Subject\nmiddle line\n\nSigned-off-by: C <c@x>\nSigned-off-by: A <a@x>\nSigned-off-by: C <c@x>\n"
        );
    }

    #[test]
    fn test_exactly_one_blank_line_before_block() {
        let msg = "Subject\n\n\n\nSigned-off-by: A <a@x>\n";
        assert_eq!(normalize_signoffs(msg), "Subject\n\nSigned-off-by: A <a@x>\n");
    }

    #[test]
    fn test_whitespace_only_trailing_lines_trimmed() {
        let msg = "Subject\n  \n\t\nSigned-off-by: A <a@x>\n";
        assert_eq!(normalize_signoffs(msg), "Subject\n\nSigned-off-by: A <a@x>\n");
    }

    #[test]
    fn test_only_signoffs() {
        let msg = "Signed-off-by: A <a@x>\n\nSigned-off-by: B <b@x>";
        assert_eq!(
            normalize_signoffs(msg),
            "Signed-off-by: A <a@x>\nSigned-off-by: B <b@x>\n"
        );
    }

    #[test]
    fn test_crlf_line_endings_kept() {
        let msg = "Subject\r\n\r\nSigned-off-by: A <a@x>\r\n(cherry picked from commit abc)\r\n";
        let normalized = normalize_signoffs(msg);
        assert_eq!(
            normalized,
            "Subject\r\n\r\n(cherry picked from commit abc)\r\n\r\nSigned-off-by: A <a@x>\r\n"
        );
        assert!(!needs_normalization(&normalized));
    }

    #[test]
    fn test_already_canonical_needs_nothing() {
        let msg = "Subject\n\nBody\n\nSigned-off-by: A <a@x>\n";
        assert!(!needs_normalization(msg));
        // git log %B may add a trailing blank line
        assert!(!needs_normalization(&format!("{msg}\n")));
    }
}
