//! The [HTML Tokenizer](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
use super::{
    character_reference::{
        is_noncharacter, lookup_character_reference, numeric_reference_replacement,
    },
    input_stream::{Confidence, InputStream},
    Doctype, EncodingChange, Position, TagData, Token, TokenSource,
};
use crate::{
    dom::Attribute,
    error::ErrorCode,
    infra::{is_ascii_whitespace, FORM_FEED, LINE_FEED, SPACE, TAB, UNICODE_REPLACEMENT},
};
use std::collections::VecDeque;

/// The different states of the [Tokenizer] state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#data-state>
    DataState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state>
    RCDATAState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state>
    RAWTEXTState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-state>
    ScriptDataState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state>
    PLAINTEXTState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state>
    TagOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state>
    EndTagOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state>
    TagNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state>
    RCDATALessThanSignState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state>
    RCDATAEndTagOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state>
    RCDATAEndTagNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state>
    RAWTEXTLessThanSignState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state>
    RAWTEXTEndTagOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state>
    RAWTEXTEndTagNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state>
    ScriptDataLessThanSignState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state>
    ScriptDataEndTagOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state>
    ScriptDataEndTagNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state>
    ScriptDataEscapeStartState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state>
    ScriptDataEscapeStartDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state>
    ScriptDataEscapedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state>
    ScriptDataEscapedDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state>
    ScriptDataEscapedDashDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state>
    ScriptDataEscapedLessThanSignState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state>
    ScriptDataEscapedEndTagOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state>
    ScriptDataEscapedEndTagNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state>
    ScriptDataDoubleEscapeStartState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state>
    ScriptDataDoubleEscapedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state>
    ScriptDataDoubleEscapedDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state>
    ScriptDataDoubleEscapedDashDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state>
    ScriptDataDoubleEscapedLessThanSignState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state>
    ScriptDataDoubleEscapeEndState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state>
    BeforeAttributeNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state>
    AttributeNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state>
    AfterAttributeNameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state>
    BeforeAttributeValueState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state>
    AttributeValueDoublequotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state>
    AttributeValueSinglequotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state>
    AttributeValueUnquotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state>
    AfterAttributeValueQuotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state>
    SelfClosingStartTagState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state>
    BogusCommentState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state>
    MarkupDeclarationOpenState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state>
    CommentStartState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state>
    CommentStartDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-state>
    CommentState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state>
    CommentLessThanSignState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state>
    CommentLessThanSignBangState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state>
    CommentLessThanSignBangDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state>
    CommentLessThanSignBangDashDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state>
    CommentEndDashState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state>
    CommentEndState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state>
    CommentEndBangState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-state>
    DOCTYPEState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state>
    BeforeDOCTYPENameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state>
    DOCTYPENameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state>
    AfterDOCTYPENameState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state>
    AfterDOCTYPEPublicKeywordState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state>
    BeforeDOCTYPEPublicIdentifierState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state>
    DOCTYPEPublicIdentifierDoublequotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state>
    DOCTYPEPublicIdentifierSinglequotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state>
    AfterDOCTYPEPublicIdentifierState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state>
    BetweenDOCTYPEPublicAndSystemIdentifiersState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state>
    AfterDOCTYPESystemKeywordState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state>
    BeforeDOCTYPESystemIdentifierState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state>
    DOCTYPESystemIdentifierDoublequotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state>
    DOCTYPESystemIdentifierSinglequotedState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state>
    AfterDOCTYPESystemIdentifierState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state>
    BogusDOCTYPEState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state>
    CDATASectionState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state>
    CDATASectionBracketState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state>
    CDATASectionEndState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state>
    CharacterReferenceState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state>
    NamedCharacterReferenceState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state>
    AmbiguousAmpersandState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state>
    NumericCharacterReferenceState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state>
    HexadecimalCharacterReferenceStartState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state>
    DecimalCharacterReferenceStartState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state>
    HexadecimalCharacterReferenceState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state>
    DecimalCharacterReferenceState,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state>
    NumericCharacterReferenceEndState,
}

/// The token that is currently being built
#[derive(Debug, Default)]
enum CurrentToken {
    #[default]
    None,
    StartTag(TagData),
    EndTag(TagData),
    Comment(String),
    Doctype(Doctype),
}

impl CurrentToken {
    fn tag_mut(&mut self) -> Option<&mut TagData> {
        match self {
            Self::StartTag(tag) | Self::EndTag(tag) => Some(tag),
            _ => None,
        }
    }

    fn doctype_mut(&mut self) -> Option<&mut Doctype> {
        match self {
            Self::Doctype(doctype) => Some(doctype),
            _ => None,
        }
    }

    fn append_to_tag_name(&mut self, c: char) {
        if let Some(tag) = self.tag_mut() {
            tag.name.push(c);
        }
    }

    fn start_new_attribute(&mut self) {
        if let Some(tag) = self.tag_mut() {
            tag.attributes.push(Attribute::new(String::new(), String::new()));
        }
    }

    fn append_to_attribute_name(&mut self, c: char) {
        if let Some(attribute) = self.tag_mut().and_then(|tag| tag.attributes.last_mut()) {
            attribute.name.push(c);
        }
    }

    fn append_to_attribute_value(&mut self, c: char) {
        if let Some(attribute) = self.tag_mut().and_then(|tag| tag.attributes.last_mut()) {
            attribute.value.push(c);
        }
    }

    fn set_self_closing(&mut self) {
        if let Some(tag) = self.tag_mut() {
            tag.self_closing = true;
        }
    }

    fn append_to_comment(&mut self, data: &str) {
        if let Self::Comment(comment) = self {
            comment.push_str(data);
        }
    }

    fn set_force_quirks(&mut self) {
        if let Some(doctype) = self.doctype_mut() {
            doctype.force_quirks = true;
        }
    }

    fn append_to_doctype_name(&mut self, c: char) {
        if let Some(doctype) = self.doctype_mut() {
            doctype.name.get_or_insert_with(String::new).push(c);
        }
    }

    fn init_doctype_public_ident(&mut self) {
        if let Some(doctype) = self.doctype_mut() {
            doctype.public_ident = Some(String::new());
        }
    }

    fn append_to_doctype_public_ident(&mut self, c: char) {
        if let Some(public_ident) = self
            .doctype_mut()
            .and_then(|doctype| doctype.public_ident.as_mut())
        {
            public_ident.push(c);
        }
    }

    fn init_doctype_system_ident(&mut self) {
        if let Some(doctype) = self.doctype_mut() {
            doctype.system_ident = Some(String::new());
        }
    }

    fn append_to_doctype_system_ident(&mut self, c: char) {
        if let Some(system_ident) = self
            .doctype_mut()
            .and_then(|doctype| doctype.system_ident.as_mut())
        {
            system_ident.push(c);
        }
    }
}

pub struct Tokenizer {
    input: InputStream,

    /// The current state of the state machine
    state: TokenizerState,

    /// Whether the end of file token has been emitted
    done: bool,

    /// The tokens produced by the [Tokenizer]
    token_buffer: VecDeque<Token>,

    /// Character tokens are collected here and emitted as a single token
    pending_text: String,

    /// Used by [TokenizerState::CharacterReferenceState]
    return_state: Option<TokenizerState>,
    last_emitted_start_tag_name: Option<String>,

    /// A general-purpose temporary buffer
    buffer: String,

    current_token: CurrentToken,
    character_reference_code: u32,

    /// Whether `<![CDATA[` opens a CDATA section, which is only the case in foreign content
    cdata_allowed: bool,
}

impl Tokenizer {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self::from_input_stream(InputStream::from_text(source))
    }

    #[must_use]
    pub fn from_input_stream(input: InputStream) -> Self {
        Self {
            input,
            state: TokenizerState::DataState,
            done: false,
            token_buffer: VecDeque::new(),
            pending_text: String::new(),
            return_state: None,
            last_emitted_start_tag_name: None,
            buffer: String::new(),
            current_token: CurrentToken::None,
            character_reference_code: 0,
            cdata_allowed: false,
        }
    }

    /// Restarts tokenization from the beginning of the input
    fn restart(&mut self) {
        self.state = TokenizerState::DataState;
        self.done = false;
        self.token_buffer.clear();
        self.pending_text.clear();
        self.return_state = None;
        self.last_emitted_start_tag_name = None;
        self.buffer.clear();
        self.current_token = CurrentToken::None;
        self.character_reference_code = 0;
        self.cdata_allowed = false;
    }

    #[must_use]
    pub fn input(&self) -> &InputStream {
        &self.input
    }

    fn flush_pending_text(&mut self) {
        if !self.pending_text.is_empty() {
            let text = std::mem::take(&mut self.pending_text);
            self.token_buffer.push_back(Token::text(text));
        }
    }

    fn emit(&mut self, token: Token) {
        self.flush_pending_text();
        if let Token::StartTag(tag) = &token {
            self.last_emitted_start_tag_name = Some(tag.name.clone());
        }
        if token == Token::EOF {
            self.done = true;
        }
        self.token_buffer.push_back(token);
    }

    /// Emits a character token
    ///
    /// Runs of whitespace and runs of other text are emitted as separate tokens.
    fn emit_char(&mut self, c: char) {
        let pending_is_whitespace = !self.pending_text.is_empty()
            && self.pending_text.chars().all(is_ascii_whitespace);
        if pending_is_whitespace && !is_ascii_whitespace(c) {
            self.flush_pending_text();
        }
        self.pending_text.push(c);
    }

    fn emit_str(&mut self, text: &str) {
        text.chars().for_each(|c| self.emit_char(c));
    }

    /// U+0000 in the data state is its own token, the tree builder decides what happens to it
    fn emit_null(&mut self) {
        self.flush_pending_text();
        self.token_buffer
            .push_back(Token::Characters('\0'.to_string()));
    }

    fn parse_error(&mut self, code: ErrorCode) {
        self.emit(Token::parse_error(code));
    }

    fn emit_current_token(&mut self) {
        match std::mem::take(&mut self.current_token) {
            CurrentToken::StartTag(mut tag) => {
                let attribute_count = tag.attributes.len();
                tag.remove_duplicate_attributes();
                for _ in tag.attributes.len()..attribute_count {
                    self.parse_error(ErrorCode::DuplicateAttribute);
                }
                self.emit(Token::StartTag(tag));
            },
            CurrentToken::EndTag(mut tag) => {
                if !tag.attributes.is_empty() {
                    self.parse_error(ErrorCode::EndTagWithAttributes);
                    tag.attributes.clear();
                }
                if tag.self_closing {
                    self.parse_error(ErrorCode::EndTagWithTrailingSolidus);
                    tag.self_closing = false;
                }
                self.emit(Token::EndTag(tag));
            },
            CurrentToken::Comment(data) => self.emit(Token::Comment(data)),
            CurrentToken::Doctype(doctype) => self.emit(Token::Doctype(doctype)),
            CurrentToken::None => {
                panic!("Trying to emit a token but no token has been constructed")
            },
        }
    }

    fn emit_eof(&mut self) {
        self.emit(Token::EOF);
    }

    fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.input.unread();
        self.switch_to(new_state)
    }

    /// Sets the current state to a specific state.
    /// All state transitions should call this method, which will
    /// ease debugging.
    pub fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    fn read_next(&mut self) -> Option<char> {
        self.input.next_char()
    }

    fn return_state(&self) -> TokenizerState {
        self.return_state
            .expect("character reference state entered without a return state")
    }

    /// Whether the current token is an end tag token whose name matches
    /// the name of the last start tag token that was emitted.
    fn is_appropriate_end_token(&self) -> bool {
        match (&self.last_emitted_start_tag_name, &self.current_token) {
            (Some(open_name), CurrentToken::EndTag(tag)) => *open_name == tag.name,
            _ => false,
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#charref-in-attribute>
    const fn is_inside_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoublequotedState
                    | TokenizerState::AttributeValueSinglequotedState
                    | TokenizerState::AttributeValueUnquotedState
            )
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#flush-code-points-consumed-as-a-character-reference>
    fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        if self.is_inside_attribute() {
            buffer
                .chars()
                .for_each(|c| self.current_token.append_to_attribute_value(c));
        } else {
            self.emit_str(&buffer);
        }
    }

    /// The shared logic of the `RCDATA`, `RAWTEXT`, script data and escaped script data
    /// end tag open states
    fn end_tag_open(&mut self, name_state: TokenizerState, fallback_state: TokenizerState) {
        match self.read_next() {
            Some('a'..='z' | 'A'..='Z') => {
                self.current_token = CurrentToken::EndTag(TagData::default());
                self.reconsume_in(name_state);
            },
            _ => {
                self.emit_str("</");
                self.reconsume_in(fallback_state);
            },
        }
    }

    /// The shared logic of the `RCDATA`, `RAWTEXT`, script data and escaped script data
    /// end tag name states
    fn end_tag_name(&mut self, fallback_state: TokenizerState) {
        match self.read_next() {
            Some(TAB | LINE_FEED | FORM_FEED | SPACE) if self.is_appropriate_end_token() => {
                self.switch_to(TokenizerState::BeforeAttributeNameState);
            },
            Some('/') if self.is_appropriate_end_token() => {
                self.switch_to(TokenizerState::SelfClosingStartTagState);
            },
            Some('>') if self.is_appropriate_end_token() => {
                self.switch_to(TokenizerState::DataState);
                self.emit_current_token();
            },
            Some(c @ ('a'..='z' | 'A'..='Z')) => {
                self.current_token
                    .append_to_tag_name(c.to_ascii_lowercase());
                self.buffer.push(c);
            },
            _ => {
                self.current_token = CurrentToken::None;
                self.emit_str("</");
                let buffer = std::mem::take(&mut self.buffer);
                self.emit_str(&buffer);
                self.reconsume_in(fallback_state);
            },
        }
    }

    pub fn step(&mut self) {
        match self.state {
            // https://html.spec.whatwg.org/multipage/parsing.html#data-state
            TokenizerState::DataState => match self.read_next() {
                Some('&') => {
                    self.return_state = Some(TokenizerState::DataState);
                    self.switch_to(TokenizerState::CharacterReferenceState);
                },
                Some('<') => self.switch_to(TokenizerState::TagOpenState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_null();
                },
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state
            TokenizerState::RCDATAState => match self.read_next() {
                Some('&') => {
                    self.return_state = Some(TokenizerState::RCDATAState);
                    self.switch_to(TokenizerState::CharacterReferenceState);
                },
                Some('<') => self.switch_to(TokenizerState::RCDATALessThanSignState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state
            TokenizerState::RAWTEXTState => match self.read_next() {
                Some('<') => self.switch_to(TokenizerState::RAWTEXTLessThanSignState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-state
            TokenizerState::ScriptDataState => match self.read_next() {
                Some('<') => self.switch_to(TokenizerState::ScriptDataLessThanSignState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state
            TokenizerState::PLAINTEXTState => match self.read_next() {
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => self.emit_char(c),
                None => self.emit_eof(),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state
            TokenizerState::TagOpenState => match self.read_next() {
                Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpenState),
                Some('/') => self.switch_to(TokenizerState::EndTagOpenState),
                Some('a'..='z' | 'A'..='Z') => {
                    self.current_token = CurrentToken::StartTag(TagData::default());
                    self.reconsume_in(TokenizerState::TagNameState);
                },
                Some('?') => {
                    self.parse_error(ErrorCode::UnexpectedQuestionMarkInsteadOfTagName);
                    self.current_token = CurrentToken::Comment(String::new());
                    self.reconsume_in(TokenizerState::BogusCommentState);
                },
                Some(_) => {
                    self.parse_error(ErrorCode::InvalidFirstCharacterOfTagName);
                    self.emit_char('<');
                    self.reconsume_in(TokenizerState::DataState);
                },
                None => {
                    self.parse_error(ErrorCode::EofBeforeTagName);
                    self.emit_char('<');
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state
            TokenizerState::EndTagOpenState => match self.read_next() {
                Some('a'..='z' | 'A'..='Z') => {
                    self.current_token = CurrentToken::EndTag(TagData::default());
                    self.reconsume_in(TokenizerState::TagNameState);
                },
                Some('>') => {
                    self.parse_error(ErrorCode::MissingEndTagName);
                    self.switch_to(TokenizerState::DataState);
                },
                Some(_) => {
                    self.parse_error(ErrorCode::InvalidFirstCharacterOfTagName);
                    self.current_token = CurrentToken::Comment(String::new());
                    self.reconsume_in(TokenizerState::BogusCommentState);
                },
                None => {
                    self.parse_error(ErrorCode::EofBeforeTagName);
                    self.emit_str("</");
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state
            TokenizerState::TagNameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BeforeAttributeNameState);
                },
                Some('/') => self.switch_to(TokenizerState::SelfClosingStartTagState),
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token.append_to_tag_name(UNICODE_REPLACEMENT);
                },
                Some(c) => self
                    .current_token
                    .append_to_tag_name(c.to_ascii_lowercase()),
                None => {
                    self.parse_error(ErrorCode::EofInTag);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state
            TokenizerState::RCDATALessThanSignState => match self.read_next() {
                Some('/') => {
                    self.buffer.clear();
                    self.switch_to(TokenizerState::RCDATAEndTagOpenState);
                },
                _ => {
                    self.emit_char('<');
                    self.reconsume_in(TokenizerState::RCDATAState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state
            TokenizerState::RCDATAEndTagOpenState => self.end_tag_open(
                TokenizerState::RCDATAEndTagNameState,
                TokenizerState::RCDATAState,
            ),
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state
            TokenizerState::RCDATAEndTagNameState => self.end_tag_name(TokenizerState::RCDATAState),
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state
            TokenizerState::RAWTEXTLessThanSignState => match self.read_next() {
                Some('/') => {
                    self.buffer.clear();
                    self.switch_to(TokenizerState::RAWTEXTEndTagOpenState);
                },
                _ => {
                    self.emit_char('<');
                    self.reconsume_in(TokenizerState::RAWTEXTState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state
            TokenizerState::RAWTEXTEndTagOpenState => self.end_tag_open(
                TokenizerState::RAWTEXTEndTagNameState,
                TokenizerState::RAWTEXTState,
            ),
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state
            TokenizerState::RAWTEXTEndTagNameState => {
                self.end_tag_name(TokenizerState::RAWTEXTState)
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state
            TokenizerState::ScriptDataLessThanSignState => match self.read_next() {
                Some('/') => {
                    self.buffer.clear();
                    self.switch_to(TokenizerState::ScriptDataEndTagOpenState);
                },
                Some('!') => {
                    self.switch_to(TokenizerState::ScriptDataEscapeStartState);
                    self.emit_str("<!");
                },
                _ => {
                    self.emit_char('<');
                    self.reconsume_in(TokenizerState::ScriptDataState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state
            TokenizerState::ScriptDataEndTagOpenState => self.end_tag_open(
                TokenizerState::ScriptDataEndTagNameState,
                TokenizerState::ScriptDataState,
            ),
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state
            TokenizerState::ScriptDataEndTagNameState => {
                self.end_tag_name(TokenizerState::ScriptDataState)
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state
            TokenizerState::ScriptDataEscapeStartState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::ScriptDataEscapeStartDashState);
                    self.emit_char('-');
                },
                _ => self.reconsume_in(TokenizerState::ScriptDataState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state
            TokenizerState::ScriptDataEscapeStartDashState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::ScriptDataEscapedDashDashState);
                    self.emit_char('-');
                },
                _ => self.reconsume_in(TokenizerState::ScriptDataState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state
            TokenizerState::ScriptDataEscapedState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::ScriptDataEscapedDashState);
                    self.emit_char('-');
                },
                Some('<') => self.switch_to(TokenizerState::ScriptDataEscapedLessThanSignState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => self.emit_char(c),
                None => {
                    self.parse_error(ErrorCode::EofInScriptHtmlCommentLikeText);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state
            TokenizerState::ScriptDataEscapedDashState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::ScriptDataEscapedDashDashState);
                    self.emit_char('-');
                },
                Some('<') => self.switch_to(TokenizerState::ScriptDataEscapedLessThanSignState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.switch_to(TokenizerState::ScriptDataEscapedState);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => {
                    self.switch_to(TokenizerState::ScriptDataEscapedState);
                    self.emit_char(c);
                },
                None => {
                    self.parse_error(ErrorCode::EofInScriptHtmlCommentLikeText);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state
            TokenizerState::ScriptDataEscapedDashDashState => match self.read_next() {
                Some('-') => self.emit_char('-'),
                Some('<') => self.switch_to(TokenizerState::ScriptDataEscapedLessThanSignState),
                Some('>') => {
                    self.switch_to(TokenizerState::ScriptDataState);
                    self.emit_char('>');
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.switch_to(TokenizerState::ScriptDataEscapedState);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => {
                    self.switch_to(TokenizerState::ScriptDataEscapedState);
                    self.emit_char(c);
                },
                None => {
                    self.parse_error(ErrorCode::EofInScriptHtmlCommentLikeText);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state
            TokenizerState::ScriptDataEscapedLessThanSignState => match self.read_next() {
                Some('/') => {
                    self.buffer.clear();
                    self.switch_to(TokenizerState::ScriptDataEscapedEndTagOpenState);
                },
                Some('a'..='z' | 'A'..='Z') => {
                    self.buffer.clear();
                    self.emit_char('<');
                    self.reconsume_in(TokenizerState::ScriptDataDoubleEscapeStartState);
                },
                _ => {
                    self.emit_char('<');
                    self.reconsume_in(TokenizerState::ScriptDataEscapedState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state
            TokenizerState::ScriptDataEscapedEndTagOpenState => self.end_tag_open(
                TokenizerState::ScriptDataEscapedEndTagNameState,
                TokenizerState::ScriptDataEscapedState,
            ),
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state
            TokenizerState::ScriptDataEscapedEndTagNameState => {
                self.end_tag_name(TokenizerState::ScriptDataEscapedState)
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state
            TokenizerState::ScriptDataDoubleEscapeStartState => match self.read_next() {
                Some(c @ (TAB | LINE_FEED | FORM_FEED | SPACE | '/' | '>')) => {
                    if self.buffer == "script" {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedState);
                    } else {
                        self.switch_to(TokenizerState::ScriptDataEscapedState);
                    }
                    self.emit_char(c);
                },
                Some(c @ ('a'..='z' | 'A'..='Z')) => {
                    self.buffer.push(c.to_ascii_lowercase());
                    self.emit_char(c);
                },
                _ => self.reconsume_in(TokenizerState::ScriptDataEscapedState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state
            TokenizerState::ScriptDataDoubleEscapedState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedDashState);
                    self.emit_char('-');
                },
                Some('<') => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSignState);
                    self.emit_char('<');
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => self.emit_char(c),
                None => {
                    self.parse_error(ErrorCode::EofInScriptHtmlCommentLikeText);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state
            TokenizerState::ScriptDataDoubleEscapedDashState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedDashDashState);
                    self.emit_char('-');
                },
                Some('<') => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSignState);
                    self.emit_char('<');
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedState);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedState);
                    self.emit_char(c);
                },
                None => {
                    self.parse_error(ErrorCode::EofInScriptHtmlCommentLikeText);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state
            TokenizerState::ScriptDataDoubleEscapedDashDashState => match self.read_next() {
                Some('-') => self.emit_char('-'),
                Some('<') => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSignState);
                    self.emit_char('<');
                },
                Some('>') => {
                    self.switch_to(TokenizerState::ScriptDataState);
                    self.emit_char('>');
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedState);
                    self.emit_char(UNICODE_REPLACEMENT);
                },
                Some(c) => {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapedState);
                    self.emit_char(c);
                },
                None => {
                    self.parse_error(ErrorCode::EofInScriptHtmlCommentLikeText);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state
            TokenizerState::ScriptDataDoubleEscapedLessThanSignState => match self.read_next() {
                Some('/') => {
                    self.buffer.clear();
                    self.switch_to(TokenizerState::ScriptDataDoubleEscapeEndState);
                    self.emit_char('/');
                },
                _ => self.reconsume_in(TokenizerState::ScriptDataDoubleEscapedState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state
            TokenizerState::ScriptDataDoubleEscapeEndState => match self.read_next() {
                Some(c @ (TAB | LINE_FEED | FORM_FEED | SPACE | '/' | '>')) => {
                    if self.buffer == "script" {
                        self.switch_to(TokenizerState::ScriptDataEscapedState);
                    } else {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedState);
                    }
                    self.emit_char(c);
                },
                Some(c @ ('a'..='z' | 'A'..='Z')) => {
                    self.buffer.push(c.to_ascii_lowercase());
                    self.emit_char(c);
                },
                _ => self.reconsume_in(TokenizerState::ScriptDataDoubleEscapedState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state
            TokenizerState::BeforeAttributeNameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some('/' | '>') | None => {
                    self.reconsume_in(TokenizerState::AfterAttributeNameState)
                },
                Some('=') => {
                    self.parse_error(ErrorCode::UnexpectedEqualsSignBeforeAttributeName);
                    self.current_token.start_new_attribute();
                    self.current_token.append_to_attribute_name('=');
                    self.switch_to(TokenizerState::AttributeNameState);
                },
                Some(_) => {
                    self.current_token.start_new_attribute();
                    self.reconsume_in(TokenizerState::AttributeNameState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state
            TokenizerState::AttributeNameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE | '/' | '>') | None => {
                    self.reconsume_in(TokenizerState::AfterAttributeNameState)
                },
                Some('=') => self.switch_to(TokenizerState::BeforeAttributeValueState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token
                        .append_to_attribute_name(UNICODE_REPLACEMENT);
                },
                Some(c @ ('"' | '\'' | '<')) => {
                    self.parse_error(ErrorCode::UnexpectedCharacterInAttributeName);
                    self.current_token.append_to_attribute_name(c);
                },
                Some(c) => self
                    .current_token
                    .append_to_attribute_name(c.to_ascii_lowercase()),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state
            TokenizerState::AfterAttributeNameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some('/') => self.switch_to(TokenizerState::SelfClosingStartTagState),
                Some('=') => self.switch_to(TokenizerState::BeforeAttributeValueState),
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    self.current_token.start_new_attribute();
                    self.reconsume_in(TokenizerState::AttributeNameState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInTag);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state
            TokenizerState::BeforeAttributeValueState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some('"') => self.switch_to(TokenizerState::AttributeValueDoublequotedState),
                Some('\'') => self.switch_to(TokenizerState::AttributeValueSinglequotedState),
                Some('>') => {
                    self.parse_error(ErrorCode::MissingAttributeValue);
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                _ => self.reconsume_in(TokenizerState::AttributeValueUnquotedState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state
            TokenizerState::AttributeValueDoublequotedState
            | TokenizerState::AttributeValueSinglequotedState => {
                let quote = if self.state == TokenizerState::AttributeValueDoublequotedState {
                    '"'
                } else {
                    '\''
                };

                match self.read_next() {
                    Some(c) if c == quote => {
                        self.switch_to(TokenizerState::AfterAttributeValueQuotedState)
                    },
                    Some('&') => {
                        self.return_state = Some(self.state);
                        self.switch_to(TokenizerState::CharacterReferenceState);
                    },
                    Some('\0') => {
                        self.parse_error(ErrorCode::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_attribute_value(UNICODE_REPLACEMENT);
                    },
                    Some(c) => self.current_token.append_to_attribute_value(c),
                    None => {
                        self.parse_error(ErrorCode::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state
            TokenizerState::AttributeValueUnquotedState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BeforeAttributeNameState)
                },
                Some('&') => {
                    self.return_state = Some(TokenizerState::AttributeValueUnquotedState);
                    self.switch_to(TokenizerState::CharacterReferenceState);
                },
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token
                        .append_to_attribute_value(UNICODE_REPLACEMENT);
                },
                Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                    self.parse_error(ErrorCode::UnexpectedCharacterInUnquotedAttributeValue);
                    self.current_token.append_to_attribute_value(c);
                },
                Some(c) => self.current_token.append_to_attribute_value(c),
                None => {
                    self.parse_error(ErrorCode::EofInTag);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state
            TokenizerState::AfterAttributeValueQuotedState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BeforeAttributeNameState)
                },
                Some('/') => self.switch_to(TokenizerState::SelfClosingStartTagState),
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    self.parse_error(ErrorCode::MissingWhitespaceBetweenAttributes);
                    self.reconsume_in(TokenizerState::BeforeAttributeNameState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInTag);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state
            TokenizerState::SelfClosingStartTagState => match self.read_next() {
                Some('>') => {
                    self.current_token.set_self_closing();
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    self.parse_error(ErrorCode::UnexpectedSolidusInTag);
                    self.reconsume_in(TokenizerState::BeforeAttributeNameState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInTag);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state
            TokenizerState::BogusCommentState => match self.read_next() {
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token.append_to_comment("\u{FFFD}");
                },
                Some(c) => self.current_token.append_to_comment(c.encode_utf8(&mut [0; 4])),
                None => {
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state
            TokenizerState::MarkupDeclarationOpenState => {
                if self.input.consume_if_starts_with("--", true) {
                    self.current_token = CurrentToken::Comment(String::new());
                    self.switch_to(TokenizerState::CommentStartState);
                } else if self.input.consume_if_starts_with("DOCTYPE", false) {
                    self.switch_to(TokenizerState::DOCTYPEState);
                } else if self.input.consume_if_starts_with("[CDATA[", true) {
                    if self.cdata_allowed {
                        self.switch_to(TokenizerState::CDATASectionState);
                    } else {
                        self.parse_error(ErrorCode::CDATAInHtmlContent);
                        self.current_token = CurrentToken::Comment("[CDATA[".to_string());
                        self.switch_to(TokenizerState::BogusCommentState);
                    }
                } else {
                    self.parse_error(ErrorCode::IncorrectlyOpenedComment);
                    self.current_token = CurrentToken::Comment(String::new());
                    self.switch_to(TokenizerState::BogusCommentState);
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state
            TokenizerState::CommentStartState => match self.read_next() {
                Some('-') => self.switch_to(TokenizerState::CommentStartDashState),
                Some('>') => {
                    self.parse_error(ErrorCode::AbruptClosingOfEmptyComment);
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                _ => self.reconsume_in(TokenizerState::CommentState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state
            TokenizerState::CommentStartDashState => match self.read_next() {
                Some('-') => self.switch_to(TokenizerState::CommentEndState),
                Some('>') => {
                    self.parse_error(ErrorCode::AbruptClosingOfEmptyComment);
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    self.current_token.append_to_comment("-");
                    self.reconsume_in(TokenizerState::CommentState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInComment);
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-state
            TokenizerState::CommentState => match self.read_next() {
                Some('<') => {
                    self.current_token.append_to_comment("<");
                    self.switch_to(TokenizerState::CommentLessThanSignState);
                },
                Some('-') => self.switch_to(TokenizerState::CommentEndDashState),
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token.append_to_comment("\u{FFFD}");
                },
                Some(c) => self.current_token.append_to_comment(c.encode_utf8(&mut [0; 4])),
                None => {
                    self.parse_error(ErrorCode::EofInComment);
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state
            TokenizerState::CommentLessThanSignState => match self.read_next() {
                Some('!') => {
                    self.current_token.append_to_comment("!");
                    self.switch_to(TokenizerState::CommentLessThanSignBangState);
                },
                Some('<') => self.current_token.append_to_comment("<"),
                _ => self.reconsume_in(TokenizerState::CommentState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state
            TokenizerState::CommentLessThanSignBangState => match self.read_next() {
                Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDashState),
                _ => self.reconsume_in(TokenizerState::CommentState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state
            TokenizerState::CommentLessThanSignBangDashState => match self.read_next() {
                Some('-') => {
                    self.switch_to(TokenizerState::CommentLessThanSignBangDashDashState)
                },
                _ => self.reconsume_in(TokenizerState::CommentEndDashState),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state
            TokenizerState::CommentLessThanSignBangDashDashState => match self.read_next() {
                Some('>') | None => self.reconsume_in(TokenizerState::CommentEndState),
                Some(_) => {
                    self.parse_error(ErrorCode::NestedComment);
                    self.reconsume_in(TokenizerState::CommentEndState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state
            TokenizerState::CommentEndDashState => match self.read_next() {
                Some('-') => self.switch_to(TokenizerState::CommentEndState),
                Some(_) => {
                    self.current_token.append_to_comment("-");
                    self.reconsume_in(TokenizerState::CommentState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInComment);
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state
            TokenizerState::CommentEndState => match self.read_next() {
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some('!') => self.switch_to(TokenizerState::CommentEndBangState),
                Some('-') => self.current_token.append_to_comment("-"),
                Some(_) => {
                    self.current_token.append_to_comment("--");
                    self.reconsume_in(TokenizerState::CommentState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInComment);
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state
            TokenizerState::CommentEndBangState => match self.read_next() {
                Some('-') => {
                    self.current_token.append_to_comment("--!");
                    self.switch_to(TokenizerState::CommentEndDashState);
                },
                Some('>') => {
                    self.parse_error(ErrorCode::IncorrectlyClosedComment);
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    self.current_token.append_to_comment("--!");
                    self.reconsume_in(TokenizerState::CommentState);
                },
                None => {
                    self.parse_error(ErrorCode::EofInComment);
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-state
            TokenizerState::DOCTYPEState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BeforeDOCTYPENameState)
                },
                Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPENameState),
                Some(_) => {
                    self.parse_error(ErrorCode::MissingWhitespaceBeforeDoctypeName);
                    self.reconsume_in(TokenizerState::BeforeDOCTYPENameState);
                },
                None => self.eof_in_doctype(true),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state
            TokenizerState::BeforeDOCTYPENameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token = CurrentToken::Doctype(Doctype::default());
                    self.current_token
                        .append_to_doctype_name(UNICODE_REPLACEMENT);
                    self.switch_to(TokenizerState::DOCTYPENameState);
                },
                Some('>') => {
                    self.parse_error(ErrorCode::MissingDoctypeName);
                    self.current_token = CurrentToken::Doctype(Doctype {
                        force_quirks: true,
                        ..Default::default()
                    });
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(c) => {
                    self.current_token = CurrentToken::Doctype(Doctype::default());
                    self.current_token
                        .append_to_doctype_name(c.to_ascii_lowercase());
                    self.switch_to(TokenizerState::DOCTYPENameState);
                },
                None => self.eof_in_doctype(true),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state
            TokenizerState::DOCTYPENameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::AfterDOCTYPENameState)
                },
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some('\0') => {
                    self.parse_error(ErrorCode::UnexpectedNullCharacter);
                    self.current_token
                        .append_to_doctype_name(UNICODE_REPLACEMENT);
                },
                Some(c) => self
                    .current_token
                    .append_to_doctype_name(c.to_ascii_lowercase()),
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state
            TokenizerState::AfterDOCTYPENameState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    self.input.unread();
                    if self.input.consume_if_starts_with("PUBLIC", false) {
                        self.switch_to(TokenizerState::AfterDOCTYPEPublicKeywordState);
                    } else if self.input.consume_if_starts_with("SYSTEM", false) {
                        self.switch_to(TokenizerState::AfterDOCTYPESystemKeywordState);
                    } else {
                        self.parse_error(ErrorCode::InvalidCharacterSequenceAfterDoctypeName);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::BogusDOCTYPEState);
                    }
                },
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state
            TokenizerState::AfterDOCTYPEPublicKeywordState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BeforeDOCTYPEPublicIdentifierState)
                },
                Some(c @ ('"' | '\'')) => {
                    self.parse_error(ErrorCode::MissingWhitespaceAfterDoctypePublicKeyword);
                    self.begin_public_identifier(c);
                },
                Some('>') => self.missing_doctype_identifier(ErrorCode::MissingDoctypePublicIdentifier),
                Some(_) => self.bogus_doctype(ErrorCode::MissingQuoteBeforeDoctypePublicIdentifier),
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state
            TokenizerState::BeforeDOCTYPEPublicIdentifierState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some(c @ ('"' | '\'')) => self.begin_public_identifier(c),
                Some('>') => self.missing_doctype_identifier(ErrorCode::MissingDoctypePublicIdentifier),
                Some(_) => self.bogus_doctype(ErrorCode::MissingQuoteBeforeDoctypePublicIdentifier),
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state
            TokenizerState::DOCTYPEPublicIdentifierDoublequotedState
            | TokenizerState::DOCTYPEPublicIdentifierSinglequotedState => {
                let quote =
                    if self.state == TokenizerState::DOCTYPEPublicIdentifierDoublequotedState {
                        '"'
                    } else {
                        '\''
                    };

                match self.read_next() {
                    Some(c) if c == quote => {
                        self.switch_to(TokenizerState::AfterDOCTYPEPublicIdentifierState)
                    },
                    Some('\0') => {
                        self.parse_error(ErrorCode::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_doctype_public_ident(UNICODE_REPLACEMENT);
                    },
                    Some('>') => {
                        self.missing_doctype_identifier(ErrorCode::AbruptDoctypePublicIdentifier)
                    },
                    Some(c) => self.current_token.append_to_doctype_public_ident(c),
                    None => self.eof_in_doctype(false),
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state
            TokenizerState::AfterDOCTYPEPublicIdentifierState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiersState)
                },
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(c @ ('"' | '\'')) => {
                    self.parse_error(
                        ErrorCode::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                    );
                    self.begin_system_identifier(c);
                },
                Some(_) => self.bogus_doctype(ErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier),
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state
            TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiersState => {
                match self.read_next() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                    Some('>') => {
                        self.switch_to(TokenizerState::DataState);
                        self.emit_current_token();
                    },
                    Some(c @ ('"' | '\'')) => self.begin_system_identifier(c),
                    Some(_) => {
                        self.bogus_doctype(ErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier)
                    },
                    None => self.eof_in_doctype(false),
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state
            TokenizerState::AfterDOCTYPESystemKeywordState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                    self.switch_to(TokenizerState::BeforeDOCTYPESystemIdentifierState)
                },
                Some(c @ ('"' | '\'')) => {
                    self.parse_error(ErrorCode::MissingWhitespaceAfterDoctypeSystemKeyword);
                    self.begin_system_identifier(c);
                },
                Some('>') => self.missing_doctype_identifier(ErrorCode::MissingDoctypeSystemIdentifier),
                Some(_) => self.bogus_doctype(ErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier),
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state
            TokenizerState::BeforeDOCTYPESystemIdentifierState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some(c @ ('"' | '\'')) => self.begin_system_identifier(c),
                Some('>') => self.missing_doctype_identifier(ErrorCode::MissingDoctypeSystemIdentifier),
                Some(_) => self.bogus_doctype(ErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier),
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state
            TokenizerState::DOCTYPESystemIdentifierDoublequotedState
            | TokenizerState::DOCTYPESystemIdentifierSinglequotedState => {
                let quote =
                    if self.state == TokenizerState::DOCTYPESystemIdentifierDoublequotedState {
                        '"'
                    } else {
                        '\''
                    };

                match self.read_next() {
                    Some(c) if c == quote => {
                        self.switch_to(TokenizerState::AfterDOCTYPESystemIdentifierState)
                    },
                    Some('\0') => {
                        self.parse_error(ErrorCode::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_doctype_system_ident(UNICODE_REPLACEMENT);
                    },
                    Some('>') => {
                        self.missing_doctype_identifier(ErrorCode::AbruptDoctypeSystemIdentifier)
                    },
                    Some(c) => self.current_token.append_to_doctype_system_ident(c),
                    None => self.eof_in_doctype(false),
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state
            TokenizerState::AfterDOCTYPESystemIdentifierState => match self.read_next() {
                Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {},
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some(_) => {
                    // This does *not* set the force-quirks flag
                    self.parse_error(ErrorCode::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                    self.reconsume_in(TokenizerState::BogusDOCTYPEState);
                },
                None => self.eof_in_doctype(false),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state
            TokenizerState::BogusDOCTYPEState => match self.read_next() {
                Some('>') => {
                    self.switch_to(TokenizerState::DataState);
                    self.emit_current_token();
                },
                Some('\0') => self.parse_error(ErrorCode::UnexpectedNullCharacter),
                Some(_) => {},
                None => {
                    self.emit_current_token();
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state
            TokenizerState::CDATASectionState => match self.read_next() {
                Some(']') => self.switch_to(TokenizerState::CDATASectionBracketState),
                Some(c) => self.emit_char(c),
                None => {
                    self.parse_error(ErrorCode::EofInCdata);
                    self.emit_eof();
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state
            TokenizerState::CDATASectionBracketState => match self.read_next() {
                Some(']') => self.switch_to(TokenizerState::CDATASectionEndState),
                _ => {
                    self.emit_char(']');
                    self.reconsume_in(TokenizerState::CDATASectionState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state
            TokenizerState::CDATASectionEndState => match self.read_next() {
                Some(']') => self.emit_char(']'),
                Some('>') => self.switch_to(TokenizerState::DataState),
                _ => {
                    self.emit_str("]]");
                    self.reconsume_in(TokenizerState::CDATASectionState);
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state
            TokenizerState::CharacterReferenceState => {
                self.buffer.clear();
                self.buffer.push('&');

                match self.read_next() {
                    Some('a'..='z' | 'A'..='Z' | '0'..='9') => {
                        self.reconsume_in(TokenizerState::NamedCharacterReferenceState)
                    },
                    Some('#') => {
                        self.buffer.push('#');
                        self.switch_to(TokenizerState::NumericCharacterReferenceState);
                    },
                    _ => {
                        self.flush_code_points_consumed_as_character_reference();
                        self.reconsume_in(self.return_state());
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state
            TokenizerState::NamedCharacterReferenceState => {
                match lookup_character_reference(self.input.remaining()) {
                    Some((length, replacement)) => {
                        let name: String = self.input.remaining()[..length].iter().collect();
                        self.input.advance(length);
                        self.buffer.push_str(&name);

                        let ends_with_semicolon = name.ends_with(';');
                        let next_is_ambiguous = self
                            .input
                            .peek()
                            .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric());

                        if self.is_inside_attribute() && !ends_with_semicolon && next_is_ambiguous
                        {
                            // For historical reasons, the reference is not resolved
                            self.flush_code_points_consumed_as_character_reference();
                        } else {
                            if !ends_with_semicolon {
                                self.parse_error(
                                    ErrorCode::MissingSemicolonAfterCharacterReference,
                                );
                            }
                            self.buffer = replacement.to_string();
                            self.flush_code_points_consumed_as_character_reference();
                        }
                        self.switch_to(self.return_state());
                    },
                    None => {
                        self.flush_code_points_consumed_as_character_reference();
                        self.switch_to(TokenizerState::AmbiguousAmpersandState);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state
            TokenizerState::AmbiguousAmpersandState => match self.read_next() {
                Some(c @ ('a'..='z' | 'A'..='Z' | '0'..='9')) => {
                    if self.is_inside_attribute() {
                        self.current_token.append_to_attribute_value(c);
                    } else {
                        self.emit_char(c);
                    }
                },
                Some(';') => {
                    self.parse_error(ErrorCode::UnknownNamedCharacterReference);
                    self.reconsume_in(self.return_state());
                },
                _ => self.reconsume_in(self.return_state()),
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state
            TokenizerState::NumericCharacterReferenceState => {
                self.character_reference_code = 0;

                match self.read_next() {
                    Some(c @ ('X' | 'x')) => {
                        self.buffer.push(c);
                        self.switch_to(TokenizerState::HexadecimalCharacterReferenceStartState);
                    },
                    _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStartState),
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state
            TokenizerState::HexadecimalCharacterReferenceStartState => match self.read_next() {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.reconsume_in(TokenizerState::HexadecimalCharacterReferenceState)
                },
                _ => {
                    self.parse_error(ErrorCode::AbsenceOfDigitsInNumericCharacterReference);
                    self.flush_code_points_consumed_as_character_reference();
                    self.reconsume_in(self.return_state());
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state
            TokenizerState::DecimalCharacterReferenceStartState => match self.read_next() {
                Some(c) if c.is_ascii_digit() => {
                    self.reconsume_in(TokenizerState::DecimalCharacterReferenceState)
                },
                _ => {
                    self.parse_error(ErrorCode::AbsenceOfDigitsInNumericCharacterReference);
                    self.flush_code_points_consumed_as_character_reference();
                    self.reconsume_in(self.return_state());
                },
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state
            // https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state
            TokenizerState::HexadecimalCharacterReferenceState
            | TokenizerState::DecimalCharacterReferenceState => {
                let radix = if self.state == TokenizerState::HexadecimalCharacterReferenceState {
                    16
                } else {
                    10
                };

                match self.read_next() {
                    Some(c) if c.is_digit(radix) => {
                        // Values above the unicode range are all treated the same, so saturating is fine
                        let digit = c.to_digit(radix).unwrap_or_default();
                        self.character_reference_code = self
                            .character_reference_code
                            .saturating_mul(radix)
                            .saturating_add(digit);
                    },
                    Some(';') => self.switch_to(TokenizerState::NumericCharacterReferenceEndState),
                    _ => {
                        self.parse_error(ErrorCode::MissingSemicolonAfterCharacterReference);
                        self.reconsume_in(TokenizerState::NumericCharacterReferenceEndState);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state
            TokenizerState::NumericCharacterReferenceEndState => {
                let code = self.character_reference_code;
                let c = match code {
                    0x00 => {
                        self.parse_error(ErrorCode::NullCharacterReference);
                        UNICODE_REPLACEMENT
                    },
                    0x110000.. => {
                        self.parse_error(ErrorCode::CharacterReferenceOutsideUnicodeRange);
                        UNICODE_REPLACEMENT
                    },
                    0xD800..=0xDFFF => {
                        self.parse_error(ErrorCode::SurrogateCharacterReference);
                        UNICODE_REPLACEMENT
                    },
                    _ => {
                        if is_noncharacter(code) {
                            self.parse_error(ErrorCode::NoncharacterCharacterReference);
                        }

                        let is_control = code == 0x0D
                            || ((code < 0x20 || (0x7F..=0x9F).contains(&code))
                                && !matches!(code, 0x09 | 0x0A | 0x0C | 0x20));
                        if is_control {
                            self.parse_error(ErrorCode::ControlCharacterReference);
                        }

                        numeric_reference_replacement(code)
                            .or_else(|| char::from_u32(code))
                            .unwrap_or(UNICODE_REPLACEMENT)
                    },
                };

                self.buffer.clear();
                self.buffer.push(c);
                self.flush_code_points_consumed_as_character_reference();
                self.switch_to(self.return_state());
            },
        }
    }

    fn begin_public_identifier(&mut self, quote: char) {
        self.current_token.init_doctype_public_ident();
        if quote == '"' {
            self.switch_to(TokenizerState::DOCTYPEPublicIdentifierDoublequotedState);
        } else {
            self.switch_to(TokenizerState::DOCTYPEPublicIdentifierSinglequotedState);
        }
    }

    fn begin_system_identifier(&mut self, quote: char) {
        self.current_token.init_doctype_system_ident();
        if quote == '"' {
            self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoublequotedState);
        } else {
            self.switch_to(TokenizerState::DOCTYPESystemIdentifierSinglequotedState);
        }
    }

    /// Emits the current DOCTYPE with the force-quirks flag set after a `>` that came too early
    fn missing_doctype_identifier(&mut self, error: ErrorCode) {
        self.parse_error(error);
        self.current_token.set_force_quirks();
        self.switch_to(TokenizerState::DataState);
        self.emit_current_token();
    }

    fn bogus_doctype(&mut self, error: ErrorCode) {
        self.parse_error(error);
        self.current_token.set_force_quirks();
        self.reconsume_in(TokenizerState::BogusDOCTYPEState);
    }

    fn eof_in_doctype(&mut self, create_doctype: bool) {
        self.parse_error(ErrorCode::EofInDoctype);
        if create_doctype {
            self.current_token = CurrentToken::Doctype(Doctype::default());
        }
        self.current_token.set_force_quirks();
        self.emit_current_token();
        self.emit_eof();
    }
}

impl TokenSource for Tokenizer {
    fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.token_buffer.pop_front() {
                return token;
            }
            if self.done {
                return Token::EOF;
            }
            self.step();
        }
    }

    fn set_state(&mut self, state: TokenizerState) {
        self.switch_to(state);
    }

    fn state(&self) -> TokenizerState {
        self.state
    }

    fn position(&self) -> Position {
        self.input.position()
    }

    fn change_encoding(&mut self, label: &str) -> EncodingChange {
        if self.input.change_encoding(label) {
            self.restart();
            EncodingChange::Reparse
        } else {
            EncodingChange::Unchanged
        }
    }

    fn is_encoding_tentative(&self) -> bool {
        self.input.confidence() == Confidence::Tentative
    }

    fn set_cdata_allowed(&mut self, allowed: bool) {
        self.cdata_allowed = allowed;
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    /// Produces every token up to and including the end of file token
    fn next(&mut self) -> Option<Self::Item> {
        if self.done && self.token_buffer.is_empty() {
            return None;
        }
        Some(self.next_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        Tokenizer::new(source)
            .filter(|token| !matches!(token, Token::ParseError { .. }))
            .collect()
    }

    fn errors(source: &str) -> Vec<ErrorCode> {
        Tokenizer::new(source)
            .filter_map(|token| match token {
                Token::ParseError { code, .. } => Some(code),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn text_runs_are_batched() {
        assert_eq!(
            tokenize("  hello world<br>"),
            vec![
                Token::SpaceCharacters("  ".to_string()),
                Token::Characters("hello world".to_string()),
                Token::StartTag(TagData::new("br")),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn tags_and_attributes() {
        let tokens = tokenize("<DIV Class=a id='b' hidden data-x=\"&amp;\"/></div>");
        let Token::StartTag(tag) = &tokens[0] else {
            panic!("expected a start tag, got {:?}", tokens[0]);
        };
        assert_eq!(tag.name, "div");
        assert!(tag.self_closing);
        assert_eq!(tag.lookup_attribute("class"), Some("a"));
        assert_eq!(tag.lookup_attribute("id"), Some("b"));
        assert_eq!(tag.lookup_attribute("hidden"), Some(""));
        assert_eq!(tag.lookup_attribute("data-x"), Some("&"));
        assert_eq!(tokens[1], Token::EndTag(TagData::new("div")));
    }

    #[test]
    fn duplicate_attributes() {
        let tokens = tokenize("<a href=1 href=2>");
        let Token::StartTag(tag) = &tokens[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(tag.attributes.len(), 1);
        assert_eq!(tag.lookup_attribute("href"), Some("1"));
        assert_eq!(errors("<a href=1 href=2>"), vec![ErrorCode::DuplicateAttribute]);
    }

    #[test]
    fn comments() {
        assert_eq!(
            tokenize("<!-- hi --><!--->"),
            vec![
                Token::Comment(" hi ".to_string()),
                Token::Comment(String::new()),
                Token::EOF,
            ]
        );
        assert_eq!(
            errors("<!--->"),
            vec![ErrorCode::AbruptClosingOfEmptyComment]
        );
    }

    #[test]
    fn doctypes() {
        let tokens = tokenize(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" 'http://www.w3.org/TR/html4/strict.dtd'>",
        );
        assert_eq!(
            tokens[0],
            Token::Doctype(Doctype {
                name: Some("html".to_string()),
                public_ident: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
                system_ident: Some("http://www.w3.org/TR/html4/strict.dtd".to_string()),
                force_quirks: false,
            })
        );

        let tokens = tokenize("<!DOCTYPE>");
        let Token::Doctype(doctype) = &tokens[0] else {
            panic!("expected a doctype");
        };
        assert!(doctype.force_quirks);
        assert_eq!(doctype.name, None);
    }

    #[test]
    fn character_references() {
        assert_eq!(
            tokenize("&lt;&#x41;&#66;&not; x"),
            vec![Token::Characters("<AB¬ x".to_string()), Token::EOF]
        );

        // Parse errors split text runs
        assert_eq!(
            tokenize("a&notit;"),
            vec![
                Token::Characters("a".to_string()),
                Token::Characters("¬it;".to_string()),
                Token::EOF,
            ]
        );
        assert_eq!(
            errors("&notit; &bogus;"),
            vec![
                ErrorCode::MissingSemicolonAfterCharacterReference,
                ErrorCode::UnknownNamedCharacterReference,
            ]
        );

        // Legacy references in attributes followed by alphanumerics are not resolved
        let tokens = tokenize("<a href='?a=1&copy=2'>");
        let Token::StartTag(tag) = &tokens[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(tag.lookup_attribute("href"), Some("?a=1&copy=2"));

        assert_eq!(tokenize("&#x80;"), vec![Token::Characters("€".to_string()), Token::EOF]);
        assert_eq!(errors("&#0;"), vec![ErrorCode::NullCharacterReference]);
    }

    #[test]
    fn rcdata_end_tags() {
        let mut tokenizer = Tokenizer::new("<title>a</b></title>");
        assert_eq!(tokenizer.next_token(), Token::StartTag(TagData::new("title")));
        tokenizer.set_state(TokenizerState::RCDATAState);
        assert_eq!(tokenizer.next_token(), Token::Characters("a</b>".to_string()));
        assert_eq!(tokenizer.next_token(), Token::EndTag(TagData::new("title")));
        assert_eq!(tokenizer.next_token(), Token::EOF);
    }

    #[test]
    fn null_in_data_is_its_own_token() {
        assert_eq!(
            tokenize("a\0b"),
            vec![
                Token::Characters("a".to_string()),
                Token::Characters("\0".to_string()),
                Token::Characters("b".to_string()),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn cdata_only_in_foreign_content() {
        assert_eq!(
            tokenize("<![CDATA[x]]>"),
            vec![Token::Comment("[CDATA[x]]".to_string()), Token::EOF]
        );

        let mut tokenizer = Tokenizer::new("<![CDATA[x<y]]>");
        tokenizer.set_cdata_allowed(true);
        assert_eq!(tokenizer.next_token(), Token::Characters("x<y".to_string()));
    }

    #[test]
    fn script_data_escapes() {
        let mut tokenizer = Tokenizer::new("<script><!--<script></script>--></script>");
        assert_eq!(tokenizer.next_token(), Token::StartTag(TagData::new("script")));
        tokenizer.set_state(TokenizerState::ScriptDataState);
        assert_eq!(
            tokenizer.next_token(),
            Token::Characters("<!--<script></script>-->".to_string())
        );
        assert_eq!(tokenizer.next_token(), Token::EndTag(TagData::new("script")));
    }
}
