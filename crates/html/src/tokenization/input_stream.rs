//! Byte decoding and the [input stream](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream)

use super::Position;
use crate::infra::{self, LINE_FEED};

/// The character encodings the input stream can decode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    UTF8,
    UTF16LE,
    UTF16BE,
    Windows1252,
}

impl Encoding {
    /// <https://encoding.spec.whatwg.org/#concept-encoding-get>
    ///
    /// Only labels of the supported encodings are recognized.
    #[must_use]
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label
            .trim_matches(|c: char| infra::is_ascii_whitespace(c) || c == '\r')
            .to_ascii_lowercase();

        let encoding = match label.as_str() {
            "unicode-1-1-utf-8" | "unicode11utf8" | "unicode20utf8" | "utf-8" | "utf8"
            | "x-unicode20utf8" => Self::UTF8,
            "csunicode" | "iso-10646-ucs-2" | "ucs-2" | "unicode" | "unicodefeff" | "utf-16"
            | "utf-16le" => Self::UTF16LE,
            "unicodefffe" | "utf-16be" => Self::UTF16BE,
            "ansi_x3.4-1968" | "ascii" | "cp1252" | "cp819" | "csisolatin1" | "ibm819"
            | "iso-8859-1" | "iso-ir-100" | "iso8859-1" | "iso88591" | "iso_8859-1"
            | "iso_8859-1:1987" | "l1" | "latin1" | "us-ascii" | "windows-1252"
            | "x-cp1252" => Self::Windows1252,
            _ => return None,
        };
        Some(encoding)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UTF8 => "utf-8",
            Self::UTF16LE => "utf-16le",
            Self::UTF16BE => "utf-16be",
            Self::Windows1252 => "windows-1252",
        }
    }

    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::UTF8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::UTF16LE => decode_utf16(bytes, u16::from_le_bytes),
            Self::UTF16BE => decode_utf16(bytes, u16::from_be_bytes),
            Self::Windows1252 => bytes.iter().map(|&b| decode_windows_1252(b)).collect(),
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks(2).map(|chunk| match *chunk {
        [first, second] => to_unit([first, second]),
        // A trailing odd byte can never form a valid code unit
        _ => 0xFFFD,
    });

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(infra::UNICODE_REPLACEMENT))
        .collect()
}

/// <https://encoding.spec.whatwg.org/index-windows-1252.txt>
fn decode_windows_1252(byte: u8) -> char {
    const HIGH_CONTROLS: [char; 32] = [
        '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}',
        '\u{2021}', '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}',
        '\u{017D}', '\u{008F}', '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
        '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}',
        '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
    ];

    match byte {
        0x80..=0x9F => HIGH_CONTROLS[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#concept-encoding-confidence>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confidence {
    Tentative,
    Certain,
}

/// The decoded characters of a document, along with the encoding they were decoded with
#[derive(Clone, Debug)]
pub struct InputStream {
    /// The undecoded input, `None` if the stream was created from a string
    bytes: Option<Vec<u8>>,
    encoding: Encoding,
    confidence: Confidence,
    chars: Vec<char>,

    /// Index of the first character of every line
    line_starts: Vec<usize>,

    /// Index of the next character
    ptr: usize,
}

impl InputStream {
    /// Creates a stream over text that is already decoded
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut stream = Self {
            bytes: None,
            encoding: Encoding::UTF8,
            confidence: Confidence::Certain,
            chars: vec![],
            line_starts: vec![],
            ptr: 0,
        };
        stream.load(&infra::normalize_newlines(text));
        stream
    }

    /// Creates a stream over raw bytes
    ///
    /// If `override_encoding` names a supported encoding, it is used with certain confidence.
    /// Otherwise the encoding is sniffed from the byte order mark or guessed.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, override_encoding: Option<&str>) -> Self {
        let (encoding, confidence, bom_length) = Self::sniff(&bytes, override_encoding);
        log::debug!(
            "Decoding input as {} ({confidence:?})",
            encoding.name()
        );

        let text = encoding.decode(&bytes[bom_length..]);
        let mut stream = Self {
            bytes: Some(bytes),
            encoding,
            confidence,
            chars: vec![],
            line_starts: vec![],
            ptr: 0,
        };
        stream.load(&infra::normalize_newlines(&text));
        stream
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#encoding-sniffing-algorithm>
    fn sniff(bytes: &[u8], override_encoding: Option<&str>) -> (Encoding, Confidence, usize) {
        // A byte order mark always wins
        if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            return (Encoding::UTF8, Confidence::Certain, 3);
        }
        if bytes.starts_with(&[0xFE, 0xFF]) {
            return (Encoding::UTF16BE, Confidence::Certain, 2);
        }
        if bytes.starts_with(&[0xFF, 0xFE]) {
            return (Encoding::UTF16LE, Confidence::Certain, 2);
        }

        if let Some(label) = override_encoding {
            match Encoding::for_label(label) {
                Some(encoding) => return (encoding, Confidence::Certain, 0),
                None => log::warn!("Ignoring unknown encoding label {label:?}"),
            }
        }

        if std::str::from_utf8(bytes).is_ok() {
            (Encoding::UTF8, Confidence::Tentative, 0)
        } else {
            (Encoding::Windows1252, Confidence::Tentative, 0)
        }
    }

    fn load(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.line_starts = std::iter::once(0)
            .chain(
                self.chars
                    .iter()
                    .enumerate()
                    .filter(|&(_, &c)| c == LINE_FEED)
                    .map(|(i, _)| i + 1),
            )
            .collect();
        self.ptr = 0;
    }

    #[inline]
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[inline]
    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Reads the next character
    ///
    /// The pointer advances even past the end of the input, so reconsuming
    /// after the end of file works like reconsuming any other character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.ptr).copied();
        self.ptr += 1;
        c
    }

    /// Moves back by one character
    pub fn unread(&mut self) {
        self.ptr -= 1;
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.ptr).copied()
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.ptr >= self.chars.len()
    }

    /// The characters that have not been consumed yet
    #[must_use]
    pub fn remaining(&self) -> &[char] {
        self.chars.get(self.ptr..).unwrap_or_default()
    }

    /// Consumes `expected` if the input continues with it
    pub fn consume_if_starts_with(&mut self, expected: &str, case_sensitive: bool) -> bool {
        let remaining = self.remaining();
        let expected_length = expected.chars().count();
        if remaining.len() < expected_length {
            return false;
        }

        let matches = remaining.iter().zip(expected.chars()).all(|(&a, b)| {
            if case_sensitive {
                a == b
            } else {
                a.eq_ignore_ascii_case(&b)
            }
        });

        if matches {
            self.ptr += expected_length;
        }
        matches
    }

    /// Skips `n` characters
    pub fn advance(&mut self, n: usize) {
        self.ptr += n;
    }

    /// The position of the most recently consumed character
    #[must_use]
    pub fn position(&self) -> Position {
        let index = self.ptr.saturating_sub(1).min(self.chars.len());
        let line = self.line_starts.partition_point(|&start| start <= index);
        let line_start = self.line_starts[line.saturating_sub(1)];
        Position {
            line: line.max(1),
            column: index - line_start,
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing>
    ///
    /// Returns `true` if the stream switched encodings and restarted from the beginning.
    pub fn change_encoding(&mut self, label: &str) -> bool {
        // 1. If the encoding that is already being used to interpret the input stream is a
        //    UTF-16 encoding, then set the confidence to certain and return.
        if matches!(self.encoding, Encoding::UTF16LE | Encoding::UTF16BE) {
            self.confidence = Confidence::Certain;
            return false;
        }

        if self.confidence == Confidence::Certain {
            return false;
        }

        let Some(mut new_encoding) = Encoding::for_label(label) else {
            log::warn!("Ignoring unknown encoding label {label:?}");
            return false;
        };

        // 2. If the new encoding is UTF-16BE/LE, then change it to UTF-8.
        if matches!(new_encoding, Encoding::UTF16LE | Encoding::UTF16BE) {
            new_encoding = Encoding::UTF8;
        }

        // 4. If the new encoding is identical or equivalent to the encoding that is already
        //    being used to interpret the input stream, then set the confidence to certain and
        //    return.
        if new_encoding == self.encoding {
            self.confidence = Confidence::Certain;
            return false;
        }

        // 6. Otherwise, navigate to the document again, with historyHandling set to "replace",
        //    and using the same source browsing context, but this time skip the encoding
        //    sniffing algorithm and instead just set the encoding to the new encoding and the
        //    confidence to certain.
        let Some(bytes) = &self.bytes else {
            self.confidence = Confidence::Certain;
            return false;
        };

        log::info!(
            "Switching encoding from {} to {}, restarting",
            self.encoding.name(),
            new_encoding.name()
        );
        let text = new_encoding.decode(bytes);
        self.encoding = new_encoding;
        self.confidence = Confidence::Certain;
        self.load(&infra::normalize_newlines(&text));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order_marks() {
        let stream = InputStream::from_bytes(vec![0xEF, 0xBB, 0xBF, b'a'], None);
        assert_eq!(stream.encoding(), Encoding::UTF8);
        assert_eq!(stream.confidence(), Confidence::Certain);
        assert_eq!(stream.remaining(), &['a']);

        let stream = InputStream::from_bytes(vec![0xFF, 0xFE, b'h', 0, b'i', 0], None);
        assert_eq!(stream.encoding(), Encoding::UTF16LE);
        assert_eq!(stream.remaining(), &['h', 'i']);

        let stream = InputStream::from_bytes(vec![0xFE, 0xFF, 0, b'h', 0, b'i'], None);
        assert_eq!(stream.encoding(), Encoding::UTF16BE);
        assert_eq!(stream.remaining(), &['h', 'i']);
    }

    #[test]
    fn guessing() {
        let stream = InputStream::from_bytes("grüße".as_bytes().to_vec(), None);
        assert_eq!(stream.encoding(), Encoding::UTF8);
        assert_eq!(stream.confidence(), Confidence::Tentative);

        let stream = InputStream::from_bytes(vec![b'a', 0x80, 0xE9], None);
        assert_eq!(stream.encoding(), Encoding::Windows1252);
        assert_eq!(stream.remaining(), &['a', '\u{20AC}', 'é']);
    }

    #[test]
    fn override_is_certain() {
        let stream = InputStream::from_bytes(vec![b'a'], Some(" Latin1 "));
        assert_eq!(stream.encoding(), Encoding::Windows1252);
        assert_eq!(stream.confidence(), Confidence::Certain);
    }

    #[test]
    fn changing_the_encoding() {
        let mut stream = InputStream::from_bytes("é".as_bytes().to_vec(), None);
        stream.next_char();

        assert!(stream.change_encoding("windows-1252"));
        assert_eq!(stream.confidence(), Confidence::Certain);
        assert_eq!(stream.remaining(), &['Ã', '©']);

        // The encoding is pinned now
        assert!(!stream.change_encoding("utf-8"));
    }

    #[test]
    fn same_encoding_pins() {
        let mut stream = InputStream::from_bytes(b"abc".to_vec(), None);
        assert!(!stream.change_encoding("utf-16"));
        assert_eq!(stream.confidence(), Confidence::Certain);
    }

    #[test]
    fn positions() {
        let mut stream = InputStream::from_text("ab\r\ncd");
        assert_eq!(stream.position(), Position { line: 1, column: 0 });
        stream.next_char();
        stream.next_char();
        assert_eq!(stream.position(), Position { line: 1, column: 1 });
        stream.next_char();
        stream.next_char();
        assert_eq!(stream.position(), Position { line: 2, column: 0 });
    }
}
