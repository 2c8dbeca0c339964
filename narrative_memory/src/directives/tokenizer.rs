//! Bracket scanner for directive markup.
//!
//! Directives never nest, so a `[` seen before the closing `]` abandons the
//! open candidate and starts a new one there.

/// A `[...]` span of the input, by byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bracketed<'a> {
    /// Offset of the opening `[`.
    pub start: usize,
    /// Offset one past the closing `]`.
    pub end: usize,
    /// Text between the brackets.
    pub body: &'a str,
}

/// Every innermost bracketed span of `text`, left to right.
pub(crate) fn bracketed_spans(text: &str) -> Vec<Bracketed<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('[') {
        let start = cursor + offset;
        let rest = &text[start + 1..];
        match rest.find(['[', ']']) {
            Some(i) if rest.as_bytes()[i] == b']' => {
                let end = start + 1 + i + 1;
                spans.push(Bracketed {
                    start,
                    end,
                    body: &rest[..i],
                });
                cursor = end;
            }
            Some(i) => cursor = start + 1 + i,
            None => break,
        }
    }

    spans
}

/// Split a directive body into its head and trimmed fields.
///
/// The head is kept verbatim so it must match a keyword exactly. Returns
/// `None` when any field is blank.
pub(crate) fn fields(body: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = body.split('|');
    let head = parts.next()?;
    let fields: Vec<&str> = parts.map(str::trim).collect();
    if head.is_empty() || fields.iter().any(|f| f.is_empty()) {
        return None;
    }
    Some((head, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_spans_with_offsets() {
        let text = "a [x|y] b [z]";
        let spans = bracketed_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].start..spans[0].end], "[x|y]");
        assert_eq!(spans[0].body, "x|y");
        assert_eq!(spans[1].body, "z");
    }

    #[test]
    fn test_reopened_bracket_restarts_candidate() {
        let spans = bracketed_spans("[SAVE:LIEU|a [SAVE:LIEU|b|c|d]");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].body, "SAVE:LIEU|b|c|d");
        assert_eq!(spans[0].start, 13);
    }

    #[test]
    fn test_unclosed_bracket_yields_nothing() {
        assert!(bracketed_spans("fin [SAVE:LIEU|a|b").is_empty());
        assert!(bracketed_spans("pas de crochet").is_empty());
    }

    #[test]
    fn test_multibyte_text_around_spans() {
        let text = "Élan « [é|è] » à";
        let spans = bracketed_spans(text);
        assert_eq!(spans[0].body, "é|è");
        assert_eq!(&text[spans[0].end..], " » à");
    }

    #[test]
    fn test_fields_trims_and_rejects_blanks() {
        assert_eq!(
            fields("SAVE:LIEU| Forêt | Sombre | a,b "),
            Some(("SAVE:LIEU", vec!["Forêt", "Sombre", "a,b"]))
        );
        assert_eq!(
            fields(" SAVE:LIEU |a|b|c"),
            Some((" SAVE:LIEU ", vec!["a", "b", "c"]))
        );
        assert_eq!(fields("SAVE:LIEU|Forêt||a"), None);
        assert_eq!(fields("SAVE:LIEU|Forêt|  |a"), None);
    }
}
