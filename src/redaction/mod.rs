//! Hidden annotations.
//!
//! # Responsibilities
//! - Embed internal data in text in a form that survives formatting
//! - Strip every embedded annotation before text leaves the process
//!
//! # Design Decisions
//! - Annotations are framed by two private-use code points that never
//!   appear in ordinary log text
//! - An unterminated annotation hides the remainder of the text
//! - `clean` borrows when there is nothing to strip

use std::borrow::Cow;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Wrap `data` as a hidden annotation.
///
/// The result can be embedded in error messages and context values; it is
/// removed by [`clean`] before any record is written or reported.
pub fn hide(data: &str) -> String {
    let mut out = String::with_capacity(data.len() + 2 * OPEN.len_utf8());
    out.push(OPEN);
    // Nested markers would end the annotation early.
    out.extend(data.chars().filter(|c| *c != OPEN && *c != CLOSE));
    out.push(CLOSE);
    out
}

/// Remove every hidden annotation from `text`.
pub fn clean(text: &str) -> Cow<'_, str> {
    if !text.contains(OPEN) && !text.contains(CLOSE) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut hidden = false;
    for c in text.chars() {
        match c {
            OPEN => hidden = true,
            CLOSE => hidden = false,
            _ if !hidden => out.push(c),
            _ => {}
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_hidden(text: &str) -> bool {
        text.contains(OPEN)
    }

    #[test]
    fn test_clean_plain_text_borrows() {
        let text = "nothing to see";
        assert!(matches!(clean(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_hide_then_clean() {
        let text = format!("user {} failed", hide("id=42"));
        assert!(has_hidden(&text));
        assert_eq!(clean(&text), "user  failed");
    }

    #[test]
    fn test_multiple_annotations() {
        let text = format!("a{}b{}c", hide("x"), hide("y"));
        assert_eq!(clean(&text), "abc");
    }

    #[test]
    fn test_unterminated_hides_rest() {
        let text = format!("visible{}secret", OPEN);
        assert_eq!(clean(&text), "visible");
    }

    #[test]
    fn test_hide_strips_nested_markers() {
        let inner = format!("a{}b", CLOSE);
        let text = format!("x{}y", hide(&inner));
        assert_eq!(clean(&text), "xy");
    }
}
