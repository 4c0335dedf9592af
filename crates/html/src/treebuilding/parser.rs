//! Implements the [Tree Construction Stage](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

use super::{
    foreign::{is_html_integration_point, is_mathml_text_integration_point},
    tree_builder::TreeBuilder,
};
use crate::{
    dom::{Document, Fragment, NodeId},
    error::{Diagnostic, ErrorCode, ErrorSink, ErrorVars, ParseFailure},
    infra::{Namespace, LINE_FEED},
    tokenization::{EncodingChange, TagData, Token, TokenSource, TokenizerState},
    ParserOptions,
};

/// <https://html.spec.whatwg.org/multipage/parsing.html#parse-state>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FramesetOkFlag {
    #[default]
    Ok,
    NotOk,
}

/// The set of rules that processed a token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    Mode(InsertionMode),

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign>
    ForeignContent,
}

/// One step of the debug trace, recorded whenever a set of rules processes a token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub tokenizer_state: TokenizerState,

    /// The insertion mode at the time the token was processed
    pub phase: InsertionMode,

    /// The rules that were used, which differs from `phase` when a mode
    /// delegates to another one or the token is foreign content
    pub handler: Handler,
    pub token_kind: &'static str,
    pub token_name: Option<String>,
}

/// How a single pass over the input ended
enum Pass {
    Finished,
    EncodingChanged,
}

pub struct Parser<S: TokenSource> {
    pub(super) source: S,
    options: ParserOptions,
    pub(super) tree: TreeBuilder,
    errors: ErrorSink,
    trace: Vec<TraceEntry>,

    /// The name of the context element when parsing a fragment
    context: Option<String>,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode>
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#insertion-mode>
    pub(super) insertion_mode: InsertionMode,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag>
    pub(super) frameset_ok: FramesetOkFlag,

    /// Set by the `<html>` start tag in "before html", cleared once the root
    /// element received its attributes
    pub(super) first_start_tag: bool,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag>
    self_closing_acknowledged: bool,

    /// Drop the next line feed, used after `<pre>`, `<listing>` and `<textarea>`
    pub(super) skip_next_newline: bool,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens>
    pub(super) pending_table_character_tokens: Vec<String>,

    /// Set when a `<meta>` element caused the input to be decoded again
    reparse_requested: bool,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S, options: ParserOptions) -> Self {
        Self {
            source,
            tree: TreeBuilder::new(options.namespace_html_elements),
            errors: ErrorSink::new(options.strict),
            options,
            trace: vec![],
            context: None,
            original_insertion_mode: None,
            insertion_mode: InsertionMode::Initial,
            frameset_ok: FramesetOkFlag::default(),
            first_start_tag: false,
            self_closing_acknowledged: false,
            skip_next_newline: false,
            pending_table_character_tokens: vec![],
            reparse_requested: false,
        }
    }

    /// Creates a parser for the [fragment parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// `context` is the (html) name of the element whose contents are parsed.
    pub fn new_fragment(source: S, context: &str, options: ParserOptions) -> Self {
        let mut parser = Self::new(source, options);
        parser.context = Some(context.to_ascii_lowercase());
        parser
    }

    /// Runs the parser until the end of input
    ///
    /// If the encoding of the input changes because of a `<meta>` element, everything is
    /// discarded and parsing starts again exactly once.
    pub fn run(&mut self) -> Result<(), ParseFailure> {
        self.reset();
        if let Pass::Finished = self.main_loop()? {
            return Ok(());
        }

        log::info!("The input encoding changed, parsing the document again");
        self.reset();
        match self.main_loop()? {
            Pass::Finished => Ok(()),
            Pass::EncodingChanged => Err(ParseFailure::RepeatedEncodingCorrection),
        }
    }

    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.errors.diagnostics()
    }

    /// The debug trace of the last parse, empty unless [ParserOptions::debug] is set
    #[inline]
    #[must_use]
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        self.tree.document()
    }

    #[must_use]
    pub fn finish(self) -> Document {
        self.tree.into_document()
    }

    #[must_use]
    pub fn finish_fragment(self) -> Fragment {
        self.tree.into_fragment()
    }

    /// Like [finish](Self::finish), but also hands out the diagnostics
    #[must_use]
    pub fn finish_with_diagnostics(self) -> (Document, Vec<Diagnostic>) {
        (self.tree.into_document(), self.errors.into_diagnostics())
    }

    /// Throws away all state that was built by a previous pass
    fn reset(&mut self) {
        self.tree.reset();
        self.errors.clear();
        self.trace.clear();
        self.original_insertion_mode = None;
        self.insertion_mode = InsertionMode::Initial;
        self.frameset_ok = FramesetOkFlag::Ok;
        self.first_start_tag = false;
        self.self_closing_acknowledged = false;
        self.skip_next_newline = false;
        self.pending_table_character_tokens.clear();
        self.reparse_requested = false;

        if let Some(context) = self.context.clone() {
            let state = match context.as_str() {
                "title" | "textarea" => TokenizerState::RCDATAState,
                "style" | "script" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                    TokenizerState::RAWTEXTState
                },
                "plaintext" => TokenizerState::PLAINTEXTState,
                _ => TokenizerState::DataState,
            };
            log::debug!("Parsing a fragment in the context of <{context}>, starting in {state:?}");
            self.source.set_state(state);

            self.tree.insert_root(&TagData::new("html"));
            self.insertion_mode = InsertionMode::BeforeHead;
            self.reset_insertion_mode_appropriately();
        }
    }

    fn main_loop(&mut self) -> Result<Pass, ParseFailure> {
        loop {
            let in_foreign_content = self
                .tree
                .open_elements
                .bottommost_node()
                .is_some_and(|node| self.tree.element(node).namespace != Namespace::HTML);
            self.source.set_cdata_allowed(in_foreign_content);

            let token = self.source.next_token();
            if matches!(token, Token::EOF) {
                break;
            }

            let Some(mut token) = self.drop_leading_newline_if_requested(token) else {
                continue;
            };

            // Token sources other than the tokenizer may hand out duplicate attributes
            if let Token::StartTag(tag) = &mut token {
                tag.remove_duplicate_attributes();
            }

            self.self_closing_acknowledged = false;
            let self_closing_tag = match &token {
                Token::StartTag(tag) if tag.self_closing => Some(tag.name.clone()),
                _ => None,
            };

            // A token might need to be reprocessed multiple times, possibly by different insertion modes
            let mut reprocess = Some(token);
            while let Some(token) = reprocess.take() {
                reprocess = self.dispatch(token);

                if self.reparse_requested {
                    return Ok(Pass::EncodingChanged);
                }
                self.abort_if_strict()?;
            }

            if let Some(name) = self_closing_tag {
                if !self.self_closing_acknowledged {
                    self.parse_error_named(ErrorCode::NonVoidElementWithTrailingSolidus, &name);
                    self.abort_if_strict()?;
                }
            }
        }

        // End of file is never routed to the rules for foreign content
        let mut visited_modes = vec![];
        let mut reprocess = Some(Token::EOF);
        while let Some(eof) = reprocess.take() {
            assert!(
                !visited_modes.contains(&self.insertion_mode),
                "end of file was reprocessed in {:?} twice",
                self.insertion_mode
            );
            visited_modes.push(self.insertion_mode);

            reprocess = self.process_using_rules_for(self.insertion_mode, eof);
            self.abort_if_strict()?;
        }

        Ok(Pass::Finished)
    }

    fn drop_leading_newline_if_requested(&mut self, token: Token) -> Option<Token> {
        if !std::mem::take(&mut self.skip_next_newline) {
            return Some(token);
        }

        match token {
            Token::Characters(text) | Token::SpaceCharacters(text)
                if text.starts_with(LINE_FEED) =>
            {
                let remaining = &text[LINE_FEED.len_utf8()..];
                if remaining.is_empty() {
                    None
                } else {
                    Some(Token::text(remaining))
                }
            },
            other => Some(other),
        }
    }

    fn abort_if_strict(&mut self) -> Result<(), ParseFailure> {
        match self.errors.take_failure() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher>
    fn dispatch(&mut self, token: Token) -> Option<Token> {
        if let Token::ParseError { code, vars } = token {
            self.parse_error_with(code, vars);
            return None;
        }

        if self.use_current_insertion_mode_for(&token) {
            self.process_using_rules_for(self.insertion_mode, token)
        } else {
            self.record_trace(Handler::ForeignContent, &token);
            self.process_in_foreign_content(token)
        }
    }

    fn use_current_insertion_mode_for(&self, token: &Token) -> bool {
        let Some(current_node) = self.tree.open_elements.bottommost_node() else {
            return true;
        };
        let element = self.tree.element(current_node);
        let is_text = matches!(token, Token::Characters(_) | Token::SpaceCharacters(_));

        // If the adjusted current node is an element in the HTML namespace
        if element.namespace == Namespace::HTML {
            return true;
        }

        // If the adjusted current node is a MathML text integration point and the token is a start tag
        // whose tag name is neither "mglyph" nor "malignmark", or a character token
        if is_mathml_text_integration_point(element) {
            let is_allowed_start_tag = matches!(
                token,
                Token::StartTag(tag) if !matches!(tag.name.as_str(), "mglyph" | "malignmark")
            );
            if is_allowed_start_tag || is_text {
                return true;
            }
        }

        // If the adjusted current node is a MathML annotation-xml element and the token is a start tag
        // whose tag name is "svg"
        if element.is(Namespace::MathML, "annotation-xml")
            && matches!(token, Token::StartTag(tag) if tag.name == "svg")
        {
            return true;
        }

        // If the adjusted current node is an HTML integration point and the token is a start tag
        // or a character token
        is_html_integration_point(element) && (is_text || matches!(token, Token::StartTag(_)))
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#using-the-rules-for>
    pub(super) fn process_using_rules_for(
        &mut self,
        mode: InsertionMode,
        token: Token,
    ) -> Option<Token> {
        self.record_trace(Handler::Mode(mode), &token);

        match mode {
            InsertionMode::Initial => self.process_in_initial(token),
            InsertionMode::BeforeHtml => self.process_before_html(token),
            InsertionMode::BeforeHead => self.process_before_head(token),
            InsertionMode::InHead => self.process_in_head(token),
            InsertionMode::AfterHead => self.process_after_head(token),
            InsertionMode::InBody => self.process_in_body(token),
            InsertionMode::Text => self.process_in_text(token),
            InsertionMode::InTable => self.process_in_table(token),
            InsertionMode::InTableText => self.process_in_table_text(token),
            InsertionMode::InCaption => self.process_in_caption(token),
            InsertionMode::InColumnGroup => self.process_in_column_group(token),
            InsertionMode::InTableBody => self.process_in_table_body(token),
            InsertionMode::InRow => self.process_in_row(token),
            InsertionMode::InCell => self.process_in_cell(token),
            InsertionMode::InSelect => self.process_in_select(token),
            InsertionMode::InSelectInTable => self.process_in_select_in_table(token),
            InsertionMode::AfterBody => self.process_after_body(token),
            InsertionMode::InFrameset => self.process_in_frameset(token),
            InsertionMode::AfterFrameset => self.process_after_frameset(token),
            InsertionMode::AfterAfterBody => self.process_after_after_body(token),
            InsertionMode::AfterAfterFrameset => self.process_after_after_frameset(token),
        }
    }

    fn record_trace(&mut self, handler: Handler, token: &Token) {
        log::trace!(
            "Processing {} {:?} in {:?} using {handler:?}",
            token.kind(),
            token.name(),
            self.insertion_mode
        );

        if !self.options.debug {
            return;
        }

        let token_name = match token {
            Token::StartTag(tag) | Token::EndTag(tag) => Some(tag.name.clone()),
            _ => None,
        };
        self.trace.push(TraceEntry {
            tokenizer_state: self.source.state(),
            phase: self.insertion_mode,
            handler,
            token_kind: token.kind(),
            token_name,
        });
    }

    pub(super) fn parse_error(&mut self, code: ErrorCode) {
        self.parse_error_with(code, vec![]);
    }

    pub(super) fn parse_error_named(&mut self, code: ErrorCode, name: &str) {
        self.parse_error_with(code, vec![("name", name.to_string())]);
    }

    pub(super) fn parse_error_with(&mut self, code: ErrorCode, vars: ErrorVars) {
        let position = self.source.position();
        self.errors.record(Diagnostic::new(position, code, vars));
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#acknowledge-self-closing-flag>
    #[inline]
    pub(super) fn acknowledge_self_closing_flag_if_set(&mut self, tag: &TagData) {
        if tag.self_closing {
            self.self_closing_acknowledged = true;
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element>
    pub(super) fn insert_html_element_for_token(&mut self, tag: &TagData) -> NodeId {
        self.tree.insert_element(tag, Namespace::HTML)
    }

    /// Inserts a void element, which is popped off the stack right away
    pub(super) fn insert_void_element(&mut self, tag: &TagData) {
        self.insert_html_element_for_token(tag);
        self.tree.open_elements.pop();
        self.acknowledge_self_closing_flag_if_set(tag);
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm>
    /// and <https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm>
    pub(super) fn parse_text_element(&mut self, tag: &TagData, state: TokenizerState) {
        // Insert an HTML element for the token.
        self.insert_html_element_for_token(tag);

        // If the algorithm that was invoked is the generic raw text element parsing algorithm,
        // switch the tokenizer to the RAWTEXT state;
        // otherwise the algorithm invoked was the generic RCDATA element parsing algorithm,
        // switch the tokenizer to the RCDATA state.
        self.source.set_state(state);

        // Let the original insertion mode be the current insertion mode.
        self.original_insertion_mode = Some(self.insertion_mode);

        // Then, switch the insertion mode to "text".
        self.insertion_mode = InsertionMode::Text;
    }

    pub(super) fn switch_back_to_original_insertion_mode(&mut self) {
        self.insertion_mode = self
            .original_insertion_mode
            .take()
            .expect("Original insertion mode has not been set");
    }

    /// Asks the input to switch to the encoding with the given label
    ///
    /// <https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing>
    pub(super) fn change_encoding(&mut self, label: &str) {
        if self.source.change_encoding(label) == EncodingChange::Reparse {
            self.reparse_requested = true;
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately>
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        let open_elements = self.tree.open_elements.list();

        // 1. Let last be false.
        // 2. Let node be the last node in the stack of open elements.
        for (index, &node) in open_elements.iter().enumerate().rev() {
            let element = self.tree.element(node);
            let mut name = element.name.as_str();

            // 3. Loop: If node is the first node in the stack of open elements, then set last to true, and,
            //    if the parser was created as part of the HTML fragment parsing algorithm (fragment case),
            //    set node to the context element passed to that algorithm.
            let last = index == 0;
            if last {
                if let Some(context) = &self.context {
                    name = context;
                }
            } else if element.namespace != Namespace::HTML {
                continue;
            }

            let new_mode = match name {
                "select" => Some(InsertionMode::InSelect),
                "td" | "th" => Some(InsertionMode::InCell),
                "tr" => Some(InsertionMode::InRow),
                "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
                "caption" => Some(InsertionMode::InCaption),
                "colgroup" => Some(InsertionMode::InColumnGroup),
                "table" => Some(InsertionMode::InTable),
                "head" | "body" => Some(InsertionMode::InBody),
                "frameset" => Some(InsertionMode::InFrameset),
                "html" if self.tree.head.is_none() => Some(InsertionMode::BeforeHead),
                "html" => Some(InsertionMode::AfterHead),
                _ if last => Some(InsertionMode::InBody),
                _ => None,
            };

            if let Some(new_mode) = new_mode {
                self.insertion_mode = new_mode;
                return;
            }
        }
    }

    #[inline]
    #[must_use]
    pub(super) fn is_fragment_case(&self) -> bool {
        self.context.is_some()
    }
}
