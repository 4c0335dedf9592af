use html_treebuilding_match::html_treebuilding_match;

use crate::{
    dom::QuirksMode,
    error::ErrorCode,
    tokenization::{TagData, Token, TokenSource},
    treebuilding::{
        parser::{InsertionMode, Parser},
        quirks::quirks_mode_for,
    },
};

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode>
    pub(crate) fn process_in_initial(&mut self, token: Token) -> Option<Token> {
        match token {
            Token::SpaceCharacters(_) => {
                // Ignore the token.
                None
            },
            Token::Comment(data) => {
                // Insert a comment as the last child of the Document object.
                let document = self.tree.document().root();
                self.tree.insert_comment(&data, Some(document));
                None
            },
            Token::Doctype(doctype) => {
                // If the DOCTYPE token's name is not "html", or the token's public identifier is not missing,
                // or the token's system identifier is neither missing nor "about:legacy-compat", then there is a parse error.
                if doctype.name.as_deref() != Some("html")
                    || doctype.public_ident.is_some()
                    || doctype
                        .system_ident
                        .as_deref()
                        .is_some_and(|system_ident| system_ident != "about:legacy-compat")
                {
                    self.parse_error(ErrorCode::UnknownDoctype);
                }

                // Append a DocumentType node to the Document node
                self.tree.insert_doctype(&doctype);

                // Then, if the document is not an iframe srcdoc document, and the parser cannot change the mode flag is false,
                // and the DOCTYPE token matches one of the conditions in the following list, then set the Document to quirks mode
                // (or limited-quirks mode)
                let quirks_mode = quirks_mode_for(&doctype);
                self.tree.document_mut().set_quirks_mode(quirks_mode);

                // Then, switch the insertion mode to "before html".
                self.insertion_mode = InsertionMode::BeforeHtml;
                None
            },
            other => {
                match &other {
                    Token::Characters(_) => self.parse_error(ErrorCode::ExpectedDoctypeButGotChars),
                    Token::StartTag(tag) => {
                        self.parse_error_named(ErrorCode::ExpectedDoctypeButGotStartTag, &tag.name)
                    },
                    Token::EndTag(tag) => {
                        self.parse_error_named(ErrorCode::ExpectedDoctypeButGotEndTag, &tag.name)
                    },
                    _ => self.parse_error(ErrorCode::ExpectedDoctypeButGotEof),
                }

                // If the document is not an iframe srcdoc document, then this is a parse error;
                // if the parser cannot change the mode flag is false, set the Document to quirks mode.
                self.tree.document_mut().set_quirks_mode(QuirksMode::Quirks);

                // In any case, switch the insertion mode to "before html", then reprocess the token.
                self.insertion_mode = InsertionMode::BeforeHtml;
                Some(other)
            },
        }
    }

    /// Creates the `<html>` element that every document starts with
    fn insert_html_element(&mut self) {
        self.tree.insert_root(&TagData::new("html"));
        self.insertion_mode = InsertionMode::BeforeHead;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode>
    pub(crate) fn process_before_html(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Doctype(_) => {
                // Parse error. Ignore the token.
                self.parse_error(ErrorCode::UnexpectedDoctype);
                None
            },
            Token::Comment(data) => {
                // Insert a comment as the last child of the Document object.
                let document = self.tree.document().root();
                self.tree.insert_comment(&data, Some(document));
                None
            },
            Token::SpaceCharacters(_) => {
                // Ignore the token.
                None
            },
            <html> => {
                // The attributes end up on the root element once the token
                // is reprocessed in "in body"
                self.first_start_tag = true;
                self.insert_html_element();
                Some(Token::StartTag(tag))
            },
            </head> | </body> | </html> | </br> => {
                // Act as described in the "anything else" entry below.
                self.insert_html_element();
                Some(Token::EndTag(tag))
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagBeforeHtml, &tag.name);
                None
            },
            other => {
                // Create an html element whose node document is the Document object.
                // Append it to the Document object. Put this element in the stack of open elements.
                // Switch the insertion mode to "before head", then reprocess the token.
                self.insert_html_element();
                Some(other)
            }
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode>
    pub(crate) fn process_before_head(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(_) => {
                // Ignore the token.
                None
            },
            Token::Comment(data) => {
                // Insert a comment.
                self.tree.insert_comment(&data, None);
                None
            },
            Token::Doctype(_) => {
                // Parse error. Ignore the token.
                self.parse_error(ErrorCode::UnexpectedDoctype);
                None
            },
            <html> => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(tag))
            },
            <head> => {
                self.insert_head_element(&tag);
                None
            },
            </head> | </body> | </html> | </br> => {
                // Act as described in the "anything else" entry below.
                self.insert_head_element(&TagData::new("head"));
                Some(Token::EndTag(tag))
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::EndTagAfterImpliedRoot, &tag.name);
                None
            },
            other => {
                // Insert an HTML element for a "head" start tag token with no attributes.
                // Set the head element pointer to the newly created head element.
                // Switch the insertion mode to "in head".
                // Reprocess the current token.
                self.insert_head_element(&TagData::new("head"));
                Some(other)
            }
        )
    }

    fn insert_head_element(&mut self, tag: &TagData) {
        // Insert an HTML element for the token.
        let head = self.insert_html_element_for_token(tag);

        // Set the head element pointer to the newly created head element.
        self.tree.head = Some(head);

        // Switch the insertion mode to "in head".
        self.insertion_mode = InsertionMode::InHead;
    }
}
