//! <https://dom.spec.whatwg.org/#concept-document-quirks>

use crate::{dom::QuirksMode, tokenization::Doctype};

/// Public identifiers that trigger quirks mode when the doctype's public identifier starts with them
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

const QUIRKY_PUBLIC_IDENTIFIERS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

const QUIRKY_SYSTEM_IDENTIFIER: &str =
    "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Quirky without a system identifier, limited-quirky with one
const HTML_401_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

const LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

/// Determines the document mode from the doctype seen in the "initial" insertion mode
///
/// <https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode>
#[must_use]
pub fn quirks_mode_for(doctype: &Doctype) -> QuirksMode {
    let public_id = doctype
        .public_ident
        .as_deref()
        .map(str::to_ascii_lowercase);
    let system_id = doctype
        .system_ident
        .as_deref()
        .map(str::to_ascii_lowercase);

    let public_starts_with = |prefixes: &[&str]| {
        public_id
            .as_deref()
            .is_some_and(|public_id| prefixes.iter().any(|prefix| public_id.starts_with(prefix)))
    };

    let is_quirky = !doctype.is_correct()
        || doctype.name.as_deref() != Some("html")
        || public_id
            .as_deref()
            .is_some_and(|public_id| QUIRKY_PUBLIC_IDENTIFIERS.contains(&public_id))
        || system_id.as_deref() == Some(QUIRKY_SYSTEM_IDENTIFIER)
        || public_starts_with(QUIRKY_PUBLIC_PREFIXES)
        || (system_id.is_none() && public_starts_with(HTML_401_PREFIXES));

    if is_quirky {
        return QuirksMode::Quirks;
    }

    if public_starts_with(LIMITED_QUIRKY_PUBLIC_PREFIXES)
        || (system_id.is_some() && public_starts_with(HTML_401_PREFIXES))
    {
        return QuirksMode::LimitedQuirks;
    }

    QuirksMode::NoQuirks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype(name: &str, public_id: Option<&str>, system_id: Option<&str>) -> Doctype {
        Doctype {
            name: Some(name.to_string()),
            public_ident: public_id.map(str::to_string),
            system_ident: system_id.map(str::to_string),
            force_quirks: false,
        }
    }

    #[test]
    fn html5_doctype() {
        assert_eq!(
            quirks_mode_for(&doctype("html", None, None)),
            QuirksMode::NoQuirks
        );
        assert_eq!(
            quirks_mode_for(&doctype("html", None, Some("about:legacy-compat"))),
            QuirksMode::NoQuirks
        );
    }

    #[test]
    fn legacy_doctypes() {
        assert_eq!(
            quirks_mode_for(&doctype(
                "html",
                Some("-//W3C//DTD HTML 4.01 Frameset//EN"),
                None
            )),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for(&doctype(
                "html",
                Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
                Some("http://www.w3.org/TR/html4/loose.dtd")
            )),
            QuirksMode::LimitedQuirks
        );
        assert_eq!(
            quirks_mode_for(&doctype(
                "html",
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                None
            )),
            QuirksMode::LimitedQuirks
        );
        assert_eq!(
            quirks_mode_for(&doctype("html", Some("HTML"), None)),
            QuirksMode::Quirks
        );
        assert_eq!(
            quirks_mode_for(&doctype(
                "html",
                None,
                Some("http://www.IBM.com/data/dtd/v11/ibmxhtml1-transitional.dtd")
            )),
            QuirksMode::Quirks
        );
    }

    #[test]
    fn broken_doctypes() {
        assert_eq!(
            quirks_mode_for(&doctype("foo", None, None)),
            QuirksMode::Quirks
        );

        let mut forced = doctype("html", None, None);
        forced.force_quirks = true;
        assert_eq!(quirks_mode_for(&forced), QuirksMode::Quirks);
    }
}
