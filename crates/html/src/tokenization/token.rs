use crate::{
    dom::Attribute,
    error::{ErrorCode, ErrorVars},
    infra::is_ascii_whitespace,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A run of text that contains at least one non-whitespace character
    Characters(String),

    /// A run of ASCII whitespace
    SpaceCharacters(String),
    StartTag(TagData),
    EndTag(TagData),
    Comment(String),
    Doctype(Doctype),
    ParseError {
        code: ErrorCode,
        vars: ErrorVars,
    },
    EOF,
}

impl Token {
    /// Builds a text token of the right kind for `text`
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() && text.chars().all(is_ascii_whitespace) {
            Self::SpaceCharacters(text)
        } else {
            Self::Characters(text)
        }
    }

    #[must_use]
    pub fn parse_error(code: ErrorCode) -> Self {
        Self::ParseError { code, vars: vec![] }
    }

    /// A short name for the kind of this token
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Characters(_) => "Characters",
            Self::SpaceCharacters(_) => "SpaceCharacters",
            Self::StartTag(_) => "StartTag",
            Self::EndTag(_) => "EndTag",
            Self::Comment(_) => "Comment",
            Self::Doctype(_) => "Doctype",
            Self::ParseError { .. } => "ParseError",
            Self::EOF => "EOF",
        }
    }

    /// The tag name for tag tokens
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::StartTag(tag) | Self::EndTag(tag) => Some(&tag.name),
            Self::Doctype(doctype) => doctype.name.as_deref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doctype {
    pub name: Option<String>,
    pub public_ident: Option<String>,
    pub system_ident: Option<String>,
    pub force_quirks: bool,
}

impl Doctype {
    /// Whether the tokenizer could parse the doctype without forcing quirks mode
    #[inline]
    #[must_use]
    pub fn is_correct(&self) -> bool {
        !self.force_quirks
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagData {
    /// The tag identifier.
    ///
    /// For `<script>`, this would be `"script"` for example.
    pub name: String,

    /// Whether the tag declaration closes itself (`<tag/>`)
    pub self_closing: bool,

    /// A list of tag attributes.
    ///
    /// For example, the tag `<tag foo=bar baz=boo>` has two attributes, `("foo", "bar")` and `("baz", "boo")`.
    pub attributes: Vec<Attribute>,
}

impl TagData {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: &[(&str, &str)]) -> Self {
        self.attributes = attributes
            .iter()
            .map(|(name, value)| Attribute::new(*name, *value))
            .collect();
        self
    }

    #[must_use]
    pub fn lookup_attribute(&self, want: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == want)
            .map(|attribute| attribute.value.as_str())
    }

    /// Drops every attribute whose name already appeared earlier in the tag
    pub fn remove_duplicate_attributes(&mut self) {
        let mut index = 0;
        while index < self.attributes.len() {
            let name = &self.attributes[index].name;
            if self.attributes[..index]
                .iter()
                .any(|earlier| &earlier.name == name)
            {
                self.attributes.remove(index);
            } else {
                index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attribute_wins() {
        let mut tag =
            TagData::new("a").with_attributes(&[("href", "1"), ("id", "x"), ("href", "2")]);
        tag.remove_duplicate_attributes();

        assert_eq!(tag.attributes.len(), 2);
        assert_eq!(tag.lookup_attribute("href"), Some("1"));
    }

    #[test]
    fn text_kind() {
        assert_eq!(Token::text(" \n"), Token::SpaceCharacters(" \n".to_string()));
        assert_eq!(Token::text(" a "), Token::Characters(" a ".to_string()));
    }
}
