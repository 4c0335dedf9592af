use super::named_character_references::NAMED_CHARACTER_REFERENCES;

/// The longest name in the table (`&CounterClockwiseContourIntegral;`), without the ampersand
const LONGEST_NAME: usize = 32;

/// Finds the longest named character reference at the start of `input`
///
/// Returns the number of characters that make up the name and the replacement text.
#[must_use]
pub fn lookup_character_reference(input: &[char]) -> Option<(usize, &'static str)> {
    let mut candidate: String = input
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric())
        .take(LONGEST_NAME)
        .collect();
    if input.get(candidate.len()) == Some(&';') {
        candidate.push(';');
    }

    (1..=candidate.len()).rev().find_map(|length| {
        let prefix = &candidate[..length];
        NAMED_CHARACTER_REFERENCES
            .binary_search_by_key(&prefix, |&(name, _)| name)
            .ok()
            .map(|index| (length, NAMED_CHARACTER_REFERENCES[index].1))
    })
}

/// The replacements applied to numeric references to C1 control characters
///
/// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state>
#[must_use]
pub fn numeric_reference_replacement(code: u32) -> Option<char> {
    let replacement = match code {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => return None,
    };
    Some(replacement)
}

/// <https://infra.spec.whatwg.org/#noncharacter>
#[must_use]
pub fn is_noncharacter(code: u32) -> bool {
    matches!(code, 0xFDD0..=0xFDEF) || (code & 0xFFFE == 0xFFFE && code <= 0x10FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(input: &str) -> Option<(usize, &'static str)> {
        let chars: Vec<char> = input.chars().collect();
        lookup_character_reference(&chars)
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(lookup("amp;"), Some((4, "&")));
        assert_eq!(lookup("notin;"), Some((6, "\u{2209}")));

        // "notit" is not a reference, but its prefix "not" is
        assert_eq!(lookup("notit;"), Some((3, "\u{AC}")));
    }

    #[test]
    fn legacy_references_without_semicolon() {
        assert_eq!(lookup("copy"), Some((4, "\u{A9}")));
        assert_eq!(lookup("hellip"), None);
        assert_eq!(lookup("hellip;"), Some((7, "\u{2026}")));
    }

    #[test]
    fn table_is_sorted() {
        assert!(NAMED_CHARACTER_REFERENCES
            .windows(2)
            .all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn noncharacters() {
        assert!(is_noncharacter(0xFDD0));
        assert!(is_noncharacter(0x1FFFF));
        assert!(!is_noncharacter(0x41));
    }
}
