//! Diagnostics reported while building a tree
//!
//! Parsing HTML never fails on malformed input. Instead, every violation is recorded
//! as a [Diagnostic] and the parser recovers the way a browser would. Only in strict
//! mode does the first diagnostic abort the parse.

use crate::tokenization::Position;
use error_derive::{Error, ErrorCode};
use std::fmt;

/// Every diagnostic code the tokenizer and tree builder can produce
///
/// The string codes are stable and part of the public interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ErrorCode)]
pub enum ErrorCode {
    // Tree construction
    #[code = "expected-doctype-but-got-chars"]
    #[msg = "Unexpected non-space characters. Expected DOCTYPE."]
    ExpectedDoctypeButGotChars,

    #[code = "expected-doctype-but-got-start-tag"]
    #[msg = "Unexpected start tag ({name}). Expected DOCTYPE."]
    ExpectedDoctypeButGotStartTag,

    #[code = "expected-doctype-but-got-end-tag"]
    #[msg = "Unexpected end tag ({name}). Expected DOCTYPE."]
    ExpectedDoctypeButGotEndTag,

    #[code = "expected-doctype-but-got-eof"]
    #[msg = "Unexpected End of file. Expected DOCTYPE."]
    ExpectedDoctypeButGotEof,

    #[code = "unknown-doctype"]
    #[msg = "Erroneous DOCTYPE."]
    UnknownDoctype,

    #[code = "unexpected-doctype"]
    #[msg = "Unexpected DOCTYPE. Ignored."]
    UnexpectedDoctype,

    #[code = "non-html-root"]
    #[msg = "html needs to be the first start tag."]
    NonHtmlRoot,

    #[code = "unexpected-end-tag-before-html"]
    #[msg = "Unexpected end tag ({name}) before html."]
    UnexpectedEndTagBeforeHtml,

    #[code = "end-tag-after-implied-root"]
    #[msg = "Unexpected end tag ({name}) after the (implied) root element."]
    EndTagAfterImpliedRoot,

    #[code = "two-heads-are-not-better-than-one"]
    #[msg = "Unexpected start tag head in existing head. Ignored."]
    TwoHeadsAreNotBetterThanOne,

    #[code = "unexpected-start-tag-out-of-my-head"]
    #[msg = "Unexpected start tag ({name}) that can be in head. Moved."]
    UnexpectedStartTagOutOfMyHead,

    #[code = "unexpected-start-tag"]
    #[msg = "Unexpected start tag ({name})."]
    UnexpectedStartTag,

    #[code = "unexpected-end-tag"]
    #[msg = "Unexpected end tag ({name}). Ignored."]
    UnexpectedEndTag,

    #[code = "unexpected-start-tag-implies-end-tag"]
    #[msg = "Unexpected start tag ({startName}) implies end tag ({endName})."]
    UnexpectedStartTagImpliesEndTag,

    #[code = "unexpected-start-tag-treated-as"]
    #[msg = "Unexpected start tag ({originalName}). Treated as {newName}."]
    UnexpectedStartTagTreatedAs,

    #[code = "unexpected-end-tag-treated-as"]
    #[msg = "Unexpected end tag ({originalName}). Treated as {newName}."]
    UnexpectedEndTagTreatedAs,

    #[code = "unexpected-start-tag-ignored"]
    #[msg = "Unexpected start tag {name}. Ignored."]
    UnexpectedStartTagIgnored,

    #[code = "deprecated-tag"]
    #[msg = "Unexpected start tag {name}. Don't use it!"]
    DeprecatedTag,

    #[code = "end-tag-too-early"]
    #[msg = "End tag ({name}) seen too early. Expected other end tag."]
    EndTagTooEarly,

    #[code = "end-tag-too-early-named"]
    #[msg = "Unexpected end tag ({gotName}). Expected end tag ({expectedName})."]
    EndTagTooEarlyNamed,

    #[code = "end-tag-too-early-ignored"]
    #[msg = "End tag ({name}) seen too early. Ignored."]
    EndTagTooEarlyIgnored,

    #[code = "expected-one-end-tag-but-got-another"]
    #[msg = "Unexpected end tag ({gotName}). Missing end tag ({expectedName})."]
    ExpectedOneEndTagButGotAnother,

    #[code = "adoption-agency-1.2"]
    #[msg = "End tag ({name}) violates step 1, paragraph 2 of the adoption agency algorithm."]
    AdoptionAgencyNotOnStack,

    #[code = "adoption-agency-1.3"]
    #[msg = "End tag ({name}) violates step 1, paragraph 3 of the adoption agency algorithm."]
    AdoptionAgencyNotCurrentNode,

    #[code = "adoption-agency-4.4"]
    #[msg = "End tag ({name}) violates step 4, paragraph 4 of the adoption agency algorithm."]
    AdoptionAgencyNotInScope,

    #[code = "non-void-element-with-trailing-solidus"]
    #[msg = "Trailing solidus not allowed on element {name}."]
    NonVoidElementWithTrailingSolidus,

    #[code = "expected-closing-tag-but-got-eof"]
    #[msg = "Unexpected end of file. Expected end tag ({name})."]
    ExpectedClosingTagButGotEof,

    #[code = "expected-named-closing-tag-but-got-eof"]
    #[msg = "Unexpected end of file. Expected end tag ({name})."]
    ExpectedNamedClosingTagButGotEof,

    #[code = "eof-in-table"]
    #[msg = "Unexpected end of file. Expected table content."]
    EofInTable,

    #[code = "eof-in-select"]
    #[msg = "Unexpected end of file. Expected select content."]
    EofInSelect,

    #[code = "eof-in-frameset"]
    #[msg = "Unexpected end of file. Expected frameset content."]
    EofInFrameset,

    #[code = "unexpected-start-tag-implies-table-voodoo"]
    #[msg = "Unexpected start tag ({name}) in table context caused voodoo mode."]
    UnexpectedStartTagImpliesTableVoodoo,

    #[code = "unexpected-end-tag-implies-table-voodoo"]
    #[msg = "Unexpected end tag ({name}) in table context caused voodoo mode."]
    UnexpectedEndTagImpliesTableVoodoo,

    #[code = "unexpected-hidden-input-in-table"]
    #[msg = "Unexpected input with type hidden in table context."]
    UnexpectedHiddenInputInTable,

    #[code = "unexpected-form-in-table"]
    #[msg = "Unexpected form in table context."]
    UnexpectedFormInTable,

    #[code = "unexpected-implied-end-tag-in-table"]
    #[msg = "Unexpected implied end tag ({name}) in the table phase."]
    UnexpectedImpliedEndTagInTable,

    #[code = "unexpected-cell-in-table-body"]
    #[msg = "Unexpected table cell start tag ({name}) in the table body phase."]
    UnexpectedCellInTableBody,

    #[code = "unexpected-end-tag-in-table-body"]
    #[msg = "Unexpected end tag ({name}) in the table body phase. Ignored."]
    UnexpectedEndTagInTableBody,

    #[code = "unexpected-implied-end-tag-in-table-row"]
    #[msg = "Unexpected implied end tag ({name}) in the table row phase."]
    UnexpectedImpliedEndTagInTableRow,

    #[code = "unexpected-end-tag-in-table-row"]
    #[msg = "Unexpected end tag ({name}) in the table row phase. Ignored."]
    UnexpectedEndTagInTableRow,

    #[code = "unexpected-cell-end-tag"]
    #[msg = "Got table cell end tag ({name}) while required end tags are missing."]
    UnexpectedCellEndTag,

    #[code = "no-end-tag"]
    #[msg = "This element ({name}) has no end tag."]
    NoEndTag,

    #[code = "unexpected-select-in-select"]
    #[msg = "Unexpected select start tag in the select phase treated as select end tag."]
    UnexpectedSelectInSelect,

    #[code = "unexpected-input-in-select"]
    #[msg = "Unexpected input start tag in the select phase."]
    UnexpectedInputInSelect,

    #[code = "unexpected-start-tag-in-select"]
    #[msg = "Unexpected start tag token ({name}) in the select phase. Ignored."]
    UnexpectedStartTagInSelect,

    #[code = "unexpected-end-tag-in-select"]
    #[msg = "Unexpected end tag ({name}) in the select phase. Ignored."]
    UnexpectedEndTagInSelect,

    #[code = "unexpected-table-element-start-tag-in-select-in-table"]
    #[msg = "Unexpected table element start tag ({name}) in the select in table phase."]
    UnexpectedTableElementStartTagInSelectInTable,

    #[code = "unexpected-table-element-end-tag-in-select-in-table"]
    #[msg = "Unexpected table element end tag ({name}) in the select in table phase."]
    UnexpectedTableElementEndTagInSelectInTable,

    #[code = "unexpected-char-after-body"]
    #[msg = "Unexpected non-space characters in the after body phase."]
    UnexpectedCharAfterBody,

    #[code = "unexpected-start-tag-after-body"]
    #[msg = "Unexpected start tag token ({name}) in the after body phase."]
    UnexpectedStartTagAfterBody,

    #[code = "unexpected-end-tag-after-body"]
    #[msg = "Unexpected end tag token ({name}) in the after body phase."]
    UnexpectedEndTagAfterBody,

    #[code = "unexpected-end-tag-after-body-innerhtml"]
    #[msg = "Unexpected end tag after body(innerHtml)"]
    UnexpectedEndTagAfterBodyInnerHtml,

    #[code = "unexpected-char-in-frameset"]
    #[msg = "Unexpected characters in the frameset phase. Characters ignored."]
    UnexpectedCharInFrameset,

    #[code = "unexpected-start-tag-in-frameset"]
    #[msg = "Unexpected start tag token ({name}) in the frameset phase. Ignored."]
    UnexpectedStartTagInFrameset,

    #[code = "unexpected-frameset-in-frameset-innerhtml"]
    #[msg = "Unexpected end tag token (frameset) in the frameset phase (innerHTML)."]
    UnexpectedFramesetInFramesetInnerHtml,

    #[code = "unexpected-end-tag-in-frameset"]
    #[msg = "Unexpected end tag token ({name}) in the frameset phase. Ignored."]
    UnexpectedEndTagInFrameset,

    #[code = "unexpected-char-after-frameset"]
    #[msg = "Unexpected non-space characters in the after frameset phase. Ignored."]
    UnexpectedCharAfterFrameset,

    #[code = "unexpected-start-tag-after-frameset"]
    #[msg = "Unexpected start tag ({name}) in the after frameset phase. Ignored."]
    UnexpectedStartTagAfterFrameset,

    #[code = "unexpected-end-tag-after-frameset"]
    #[msg = "Unexpected end tag ({name}) in the after frameset phase. Ignored."]
    UnexpectedEndTagAfterFrameset,

    #[code = "expected-eof-but-got-char"]
    #[msg = "Unexpected non-space characters. Expected end of file."]
    ExpectedEofButGotChar,

    #[code = "expected-eof-but-got-start-tag"]
    #[msg = "Unexpected start tag ({name}). Expected end of file."]
    ExpectedEofButGotStartTag,

    #[code = "expected-eof-but-got-end-tag"]
    #[msg = "Unexpected end tag ({name}). Expected end of file."]
    ExpectedEofButGotEndTag,

    #[code = "unexpected-html-element-in-foreign-content"]
    #[msg = "Element {name} not allowed in a non-html context"]
    UnexpectedHtmlElementInForeignContent,

    // Tokenization
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-closing-of-empty-comment>
    #[code = "abrupt-closing-of-empty-comment"]
    #[msg = "Comment closed abruptly."]
    AbruptClosingOfEmptyComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-doctype-public-identifier>
    #[code = "abrupt-doctype-public-identifier"]
    #[msg = "DOCTYPE public identifier closed abruptly."]
    AbruptDoctypePublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-doctype-system-identifier>
    #[code = "abrupt-doctype-system-identifier"]
    #[msg = "DOCTYPE system identifier closed abruptly."]
    AbruptDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-absence-of-digits-in-numeric-character-reference>
    #[code = "absence-of-digits-in-numeric-character-reference"]
    #[msg = "Numeric entity expected but none found."]
    AbsenceOfDigitsInNumericCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-cdata-in-html-content>
    #[code = "cdata-in-html-content"]
    #[msg = "CDATA section outside of foreign content."]
    CDATAInHtmlContent,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-character-reference-outside-unicode-range>
    #[code = "character-reference-outside-unicode-range"]
    #[msg = "Numeric entity represents a code point outside of the unicode range."]
    CharacterReferenceOutsideUnicodeRange,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-control-character-reference>
    #[code = "control-character-reference"]
    #[msg = "Numeric entity represents the control character {charAsInt}."]
    ControlCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-duplicate-attribute>
    #[code = "duplicate-attribute"]
    #[msg = "Dropped duplicate attribute ({name}) on tag."]
    DuplicateAttribute,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-end-tag-with-attributes>
    #[code = "end-tag-with-attributes"]
    #[msg = "End tag contains unexpected attributes."]
    EndTagWithAttributes,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-end-tag-with-trailing-solidus>
    #[code = "end-tag-with-trailing-solidus"]
    #[msg = "End tag contains unexpected self-closing flag."]
    EndTagWithTrailingSolidus,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-before-tag-name>
    #[code = "eof-before-tag-name"]
    #[msg = "Expected tag name. Got end of file instead."]
    EofBeforeTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-cdata>
    #[code = "eof-in-cdata"]
    #[msg = "Unexpected end of file in CDATA section."]
    EofInCdata,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-comment>
    #[code = "eof-in-comment"]
    #[msg = "Unexpected end of file in comment."]
    EofInComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-doctype>
    #[code = "eof-in-doctype"]
    #[msg = "Unexpected end of file in DOCTYPE."]
    EofInDoctype,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-script-html-comment-like-text>
    #[code = "eof-in-script-html-comment-like-text"]
    #[msg = "Unexpected end of file in comment-like text inside script."]
    EofInScriptHtmlCommentLikeText,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-tag>
    #[code = "eof-in-tag"]
    #[msg = "Unexpected end of file in tag."]
    EofInTag,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-incorrectly-closed-comment>
    #[code = "incorrectly-closed-comment"]
    #[msg = "Comment closed with --!>."]
    IncorrectlyClosedComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-incorrectly-opened-comment>
    #[code = "incorrectly-opened-comment"]
    #[msg = "Expected '--' or 'DOCTYPE'. Not found."]
    IncorrectlyOpenedComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-invalid-character-sequence-after-doctype-name>
    #[code = "invalid-character-sequence-after-doctype-name"]
    #[msg = "Expected PUBLIC or SYSTEM after DOCTYPE name."]
    InvalidCharacterSequenceAfterDoctypeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-invalid-first-character-of-tag-name>
    #[code = "invalid-first-character-of-tag-name"]
    #[msg = "Expected tag name. Got something else instead."]
    InvalidFirstCharacterOfTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-attribute-value>
    #[code = "missing-attribute-value"]
    #[msg = "Expected attribute value. Got '>' instead."]
    MissingAttributeValue,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-doctype-name>
    #[code = "missing-doctype-name"]
    #[msg = "DOCTYPE without a name."]
    MissingDoctypeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-doctype-public-identifier>
    #[code = "missing-doctype-public-identifier"]
    #[msg = "DOCTYPE PUBLIC keyword without an identifier."]
    MissingDoctypePublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-doctype-system-identifier>
    #[code = "missing-doctype-system-identifier"]
    #[msg = "DOCTYPE SYSTEM keyword without an identifier."]
    MissingDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-end-tag-name>
    #[code = "missing-end-tag-name"]
    #[msg = "Expected closing tag. Got '>' instead. Ignoring '</>'."]
    MissingEndTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-quote-before-doctype-public-identifier>
    #[code = "missing-quote-before-doctype-public-identifier"]
    #[msg = "Unquoted DOCTYPE public identifier."]
    MissingQuoteBeforeDoctypePublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-quote-before-doctype-system-identifier>
    #[code = "missing-quote-before-doctype-system-identifier"]
    #[msg = "Unquoted DOCTYPE system identifier."]
    MissingQuoteBeforeDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-semicolon-after-character-reference>
    #[code = "missing-semicolon-after-character-reference"]
    #[msg = "Named entity didn't end with ';'."]
    MissingSemicolonAfterCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-after-doctype-public-keyword>
    #[code = "missing-whitespace-after-doctype-public-keyword"]
    #[msg = "Expected space after the PUBLIC keyword."]
    MissingWhitespaceAfterDoctypePublicKeyword,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-after-doctype-system-keyword>
    #[code = "missing-whitespace-after-doctype-system-keyword"]
    #[msg = "Expected space after the SYSTEM keyword."]
    MissingWhitespaceAfterDoctypeSystemKeyword,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-before-doctype-name>
    #[code = "missing-whitespace-before-doctype-name"]
    #[msg = "No space after literal string 'DOCTYPE'."]
    MissingWhitespaceBeforeDoctypeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-between-attributes>
    #[code = "missing-whitespace-between-attributes"]
    #[msg = "Expected space between attributes."]
    MissingWhitespaceBetweenAttributes,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-between-doctype-public-and-system-identifiers>
    #[code = "missing-whitespace-between-doctype-public-and-system-identifiers"]
    #[msg = "Expected space between DOCTYPE public and system identifiers."]
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-nested-comment>
    #[code = "nested-comment"]
    #[msg = "Unexpected '<!--' inside a comment."]
    NestedComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-noncharacter-character-reference>
    #[code = "noncharacter-character-reference"]
    #[msg = "Numeric entity represents the noncharacter {charAsInt}."]
    NoncharacterCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-null-character-reference>
    #[code = "null-character-reference"]
    #[msg = "Numeric entity represents the null character."]
    NullCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-surrogate-character-reference>
    #[code = "surrogate-character-reference"]
    #[msg = "Numeric entity represents a surrogate."]
    SurrogateCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-character-after-doctype-system-identifier>
    #[code = "unexpected-character-after-doctype-system-identifier"]
    #[msg = "Unexpected character after the DOCTYPE system identifier."]
    UnexpectedCharacterAfterDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-character-in-attribute-name>
    #[code = "unexpected-character-in-attribute-name"]
    #[msg = "Invalid character in attribute name."]
    UnexpectedCharacterInAttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-character-in-unquoted-attribute-value>
    #[code = "unexpected-character-in-unquoted-attribute-value"]
    #[msg = "Unexpected character in unquoted attribute value."]
    UnexpectedCharacterInUnquotedAttributeValue,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-equals-sign-before-attribute-name>
    #[code = "unexpected-equals-sign-before-attribute-name"]
    #[msg = "Unexpected = before attribute name."]
    UnexpectedEqualsSignBeforeAttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-null-character>
    #[code = "unexpected-null-character"]
    #[msg = "Null character in input stream."]
    UnexpectedNullCharacter,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-question-mark-instead-of-tag-name>
    #[code = "unexpected-question-mark-instead-of-tag-name"]
    #[msg = "Expected tag name. Got '?' instead."]
    UnexpectedQuestionMarkInsteadOfTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-solidus-in-tag>
    #[code = "unexpected-solidus-in-tag"]
    #[msg = "Solidus (/) incorrectly placed in tag."]
    UnexpectedSolidusInTag,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unknown-named-character-reference>
    #[code = "unknown-named-character-reference"]
    #[msg = "Named entity without a known name."]
    UnknownNamedCharacterReference,
}

/// Named values substituted into the `{var}` placeholders of a message template
pub type ErrorVars = Vec<(&'static str, String)>;

/// A single recorded parse error
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub position: Position,
    pub code: ErrorCode,
    pub vars: ErrorVars,
}

impl Diagnostic {
    #[must_use]
    pub fn new(position: Position, code: ErrorCode, vars: ErrorVars) -> Self {
        Self {
            position,
            code,
            vars,
        }
    }

    #[must_use]
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The human readable message, with all known placeholders substituted
    ///
    /// Placeholders without a matching variable are left untouched.
    #[must_use]
    pub fn message(&self) -> String {
        let template = self.code.message_template();
        let mut message = String::with_capacity(template.len());
        let mut remaining = template;

        while let Some(start) = remaining.find('{') {
            message.push_str(&remaining[..start]);
            let after_brace = &remaining[start + 1..];

            match after_brace.find('}') {
                Some(end) => {
                    let name = &after_brace[..end];
                    match self.var(name) {
                        Some(value) => message.push_str(value),
                        None => {
                            message.push('{');
                            message.push_str(name);
                            message.push('}');
                        },
                    }
                    remaining = &after_brace[end + 1..];
                },
                None => {
                    message.push_str(&remaining[start..]);
                    remaining = "";
                },
            }
        }
        message.push_str(remaining);
        message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} ({})",
            self.position.line,
            self.position.column,
            self.message(),
            self.code
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Why a call to [parse](crate::parse) did not produce a tree
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[msg = "parse error in strict mode"]
    Strict(Diagnostic),

    #[msg = "the input stream requested a second encoding correction during the same parse"]
    RepeatedEncodingCorrection,
}

/// Collects the diagnostics of a single parse attempt
#[derive(Clone, Debug, Default)]
pub struct ErrorSink {
    strict: bool,
    diagnostics: Vec<Diagnostic>,
    aborted: bool,
}

impl ErrorSink {
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            ..Default::default()
        }
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        log::debug!(
            "Parse error at {}:{}: {}",
            diagnostic.position.line,
            diagnostic.position.column,
            diagnostic.code
        );

        if self.aborted {
            return;
        }

        self.aborted = self.strict;
        self.diagnostics.push(diagnostic);
    }

    /// Whether parsing must stop because a diagnostic was recorded in strict mode
    #[inline]
    #[must_use]
    pub fn has_aborted(&self) -> bool {
        self.aborted
    }

    /// The diagnostic that aborted a strict parse
    pub fn take_failure(&mut self) -> Option<ParseFailure> {
        if !self.aborted {
            return None;
        }
        self.diagnostics.pop().map(ParseFailure::Strict)
    }

    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.aborted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(code: ErrorCode, vars: ErrorVars) -> Diagnostic {
        Diagnostic::new(Position::default(), code, vars)
    }

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(ErrorCode::EofInTable.code(), "eof-in-table");
        assert_eq!(
            ErrorCode::AdoptionAgencyNotOnStack.code(),
            "adoption-agency-1.2"
        );
        assert_eq!(
            ErrorCode::from_code("unexpected-doctype"),
            Some(ErrorCode::UnexpectedDoctype)
        );
        assert_eq!(ErrorCode::from_code("not-a-real-code"), None);
        assert_eq!(ErrorCode::UnknownDoctype.to_string(), "unknown-doctype");
    }

    #[test]
    fn message_substitution() {
        let error = diagnostic(
            ErrorCode::UnexpectedStartTagImpliesEndTag,
            vec![("startName", "a".to_string()), ("endName", "a".to_string())],
        );
        assert_eq!(
            error.message(),
            "Unexpected start tag (a) implies end tag (a)."
        );

        // Unknown placeholders are kept
        let error = diagnostic(ErrorCode::UnexpectedEndTag, vec![]);
        assert_eq!(error.message(), "Unexpected end tag ({name}). Ignored.");
    }

    #[test]
    fn strict_sink_keeps_first_error() {
        let mut sink = ErrorSink::new(true);
        sink.record(diagnostic(ErrorCode::EofInTable, vec![]));
        sink.record(diagnostic(ErrorCode::EofInSelect, vec![]));

        assert!(sink.has_aborted());
        let Some(ParseFailure::Strict(first)) = sink.take_failure() else {
            panic!("strict sink did not abort");
        };
        assert_eq!(first.code, ErrorCode::EofInTable);
    }

    #[test]
    fn lenient_sink_never_aborts() {
        let mut sink = ErrorSink::new(false);
        sink.record(diagnostic(ErrorCode::EofInTable, vec![]));
        sink.record(diagnostic(ErrorCode::EofInSelect, vec![]));

        assert!(!sink.has_aborted());
        assert!(sink.take_failure().is_none());
        assert_eq!(sink.diagnostics().len(), 2);
    }
}
