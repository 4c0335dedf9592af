//! The insertion modes that are active once the body or the frameset has been closed

use html_treebuilding_match::html_treebuilding_match;

use crate::{
    error::ErrorCode,
    tokenization::{Token, TokenSource},
    treebuilding::parser::{InsertionMode, Parser},
};

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody>
    pub(crate) fn process_after_body(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(text) => {
                self.tree.insert_text(&text, None);
                None
            },
            Token::Characters(_) => {
                // Parse error. Switch the insertion mode to "in body" and reprocess the token.
                self.parse_error(ErrorCode::UnexpectedCharAfterBody);
                self.insertion_mode = InsertionMode::InBody;
                Some(token)
            },
            Token::Comment(data) => {
                // Insert a comment as the last child of the first element in the stack of open elements (the html element).
                let html = self.tree.open_elements.top_node();
                self.tree.insert_comment(&data, html);
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
            Token::StartTag(tag) => {
                // Parse error. Switch the insertion mode to "in body" and reprocess the token.
                self.parse_error_named(ErrorCode::UnexpectedStartTagAfterBody, &tag.name);
                self.insertion_mode = InsertionMode::InBody;
                Some(Token::StartTag(tag))
            },
            </html> => {
                // If the parser was created as part of the HTML fragment parsing algorithm, this is a parse error;
                // ignore the token. (fragment case)
                // Otherwise, switch the insertion mode to "after after body".
                if self.is_fragment_case() {
                    self.parse_error(ErrorCode::UnexpectedEndTagAfterBodyInnerHtml);
                } else {
                    self.insertion_mode = InsertionMode::AfterAfterBody;
                }
                None
            },
            Token::EndTag(tag) => {
                // Parse error. Switch the insertion mode to "in body" and reprocess the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagAfterBody, &tag.name);
                self.insertion_mode = InsertionMode::InBody;
                Some(Token::EndTag(tag))
            },
            Token::EOF => {
                // Stop parsing.
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset>
    pub(crate) fn process_in_frameset(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(text) => {
                // Insert the character.
                self.tree.insert_text(&text, None);
                None
            },
            Token::Characters(_) => {
                // Parse error. Ignore the token.
                self.parse_error(ErrorCode::UnexpectedCharInFrameset);
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
            Token::EOF => {
                // If the current node is not the root html element, then this is a parse error.
                // Note: The current node can only be the root html element in the fragment case.
                if !self.tree.current_node_is(&["html"]) {
                    self.parse_error(ErrorCode::EofInFrameset);
                }

                // Stop parsing.
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <frameset> => {
                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <frame> => {
                // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);
                None
            },
            <noframes> => {
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(tag))
            },
            Token::StartTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedStartTagInFrameset, &tag.name);
                None
            },
            </frameset> => {
                // If the current node is the root html element, then this is a parse error; ignore the token. (fragment case)
                if self.tree.current_node_is(&["html"]) {
                    self.parse_error(ErrorCode::UnexpectedFramesetInFramesetInnerHtml);
                } else {
                    // Otherwise, pop the current node from the stack of open elements.
                    self.tree.open_elements.pop();
                }

                // If the parser was not created as part of the HTML fragment parsing algorithm (fragment case),
                // and the current node is no longer a frameset element, then switch the insertion mode to "after frameset".
                if !self.is_fragment_case() && !self.tree.current_node_is(&["frameset"]) {
                    self.insertion_mode = InsertionMode::AfterFrameset;
                }
                None
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagInFrameset, &tag.name);
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset>
    pub(crate) fn process_after_frameset(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(text) => {
                // Insert the character.
                self.tree.insert_text(&text, None);
                None
            },
            Token::Characters(_) => {
                self.parse_error(ErrorCode::UnexpectedCharAfterFrameset);
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
            Token::EOF => {
                // Stop parsing.
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <noframes> => {
                // Process the token using the rules for the "in head" insertion mode.
                self.process_using_rules_for(InsertionMode::InHead, Token::StartTag(tag))
            },
            Token::StartTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedStartTagAfterFrameset, &tag.name);
                None
            },
            </html> => {
                // Switch the insertion mode to "after after frameset".
                self.insertion_mode = InsertionMode::AfterAfterFrameset;
                None
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagAfterFrameset, &tag.name);
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode>
    pub(crate) fn process_after_after_body(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Comment(data) => {
                // Insert a comment as the last child of the Document object.
                let document = self.tree.document().root();
                self.tree.insert_comment(&data, Some(document));
                None
            },
            Token::SpaceCharacters(_) | Token::Doctype(_) => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, token)
            },
            Token::Characters(_) => {
                // Parse error. Switch the insertion mode to "in body" and reprocess the token.
                self.parse_error(ErrorCode::ExpectedEofButGotChar);
                self.insertion_mode = InsertionMode::InBody;
                Some(token)
            },
            <html> => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(tag))
            },
            Token::StartTag(tag) => {
                // Parse error. Switch the insertion mode to "in body" and reprocess the token.
                self.parse_error_named(ErrorCode::ExpectedEofButGotStartTag, &tag.name);
                self.insertion_mode = InsertionMode::InBody;
                Some(Token::StartTag(tag))
            },
            Token::EndTag(tag) => {
                // Parse error. Switch the insertion mode to "in body" and reprocess the token.
                self.parse_error_named(ErrorCode::ExpectedEofButGotEndTag, &tag.name);
                self.insertion_mode = InsertionMode::InBody;
                Some(Token::EndTag(tag))
            },
            Token::EOF => {
                // Stop parsing.
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode>
    pub(crate) fn process_after_after_frameset(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Comment(data) => {
                // Insert a comment as the last child of the Document object.
                let document = self.tree.document().root();
                self.tree.insert_comment(&data, Some(document));
                None
            },
            Token::SpaceCharacters(_) | Token::Doctype(_) => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, token)
            },
            Token::Characters(_) => {
                // Parse error. Ignore the token.
                self.parse_error(ErrorCode::ExpectedEofButGotChar);
                None
            },
            <html> => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(tag))
            },
            <noframes> => {
                // Process the token using the rules for the "in head" insertion mode.
                self.process_using_rules_for(InsertionMode::InHead, Token::StartTag(tag))
            },
            Token::StartTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::ExpectedEofButGotStartTag, &tag.name);
                None
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::ExpectedEofButGotEndTag, &tag.name);
                None
            },
            Token::EOF => {
                // Stop parsing.
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }
}
