//! Shared definitions from <https://infra.spec.whatwg.org>

// Characters that are hard to read
pub const TAB: char = '\u{0009}';
pub const LINE_FEED: char = '\u{000A}';
pub const FORM_FEED: char = '\u{000C}';
pub const CARRIAGE_RETURN: char = '\u{000D}';
pub const SPACE: char = '\u{0020}';
pub const UNICODE_REPLACEMENT: char = '\u{FFFD}';

/// <https://infra.spec.whatwg.org/#namespaces>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    HTML,
    MathML,
    SVG,
    XLink,
    XML,
    XMLNS,
}

impl Namespace {
    #[must_use]
    pub const fn url(&self) -> &'static str {
        match self {
            Self::HTML => "http://www.w3.org/1999/xhtml",
            Self::MathML => "http://www.w3.org/1998/Math/MathML",
            Self::SVG => "http://www.w3.org/2000/svg",
            Self::XLink => "http://www.w3.org/1999/xlink",
            Self::XML => "http://www.w3.org/XML/1998/namespace",
            Self::XMLNS => "http://www.w3.org/2000/xmlns/",
        }
    }

    /// The prefix used when dumping trees in the html5lib test format
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::HTML => "html",
            Self::MathML => "math",
            Self::SVG => "svg",
            Self::XLink => "xlink",
            Self::XML => "xml",
            Self::XMLNS => "xmlns",
        }
    }
}

/// <https://infra.spec.whatwg.org/#ascii-whitespace>
///
/// Note that this excludes U+000D, which never reaches the tokenizer
/// because newlines are normalized beforehand.
#[inline]
#[must_use]
pub const fn is_ascii_whitespace(c: char) -> bool {
    matches!(c, TAB | LINE_FEED | FORM_FEED | SPACE)
}

/// <https://infra.spec.whatwg.org/#normalize-newlines>
#[must_use]
pub fn normalize_newlines(source: &str) -> String {
    if !source.contains(CARRIAGE_RETURN) {
        return source.to_owned();
    }

    let mut normalized = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == CARRIAGE_RETURN {
            // Replace every U+000D CR U+000A LF code point pair with a single U+000A LF code point,
            // and every remaining U+000D CR code point with a U+000A LF code point.
            if chars.peek() == Some(&LINE_FEED) {
                chars.next();
            }
            normalized.push(LINE_FEED);
        } else {
            normalized.push(c);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_normalization() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_newlines("\r\r\n"), "\n\n");
    }

    #[test]
    fn whitespace() {
        assert!(is_ascii_whitespace(' '));
        assert!(is_ascii_whitespace('\u{000C}'));
        assert!(!is_ascii_whitespace('\u{00A0}'));
    }
}
