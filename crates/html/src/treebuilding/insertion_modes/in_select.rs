use html_treebuilding_match::html_treebuilding_match;

use crate::{
    error::ErrorCode,
    tokenization::{TagData, Token, TokenSource},
    treebuilding::{
        parser::{InsertionMode, Parser},
        tree_builder::Scope,
    },
};

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect>
    pub(crate) fn process_in_select(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Characters(text) if text == "\0" => {
                // Parse error. Ignore the token.
                None
            },
            Token::Characters(text) | Token::SpaceCharacters(text) => {
                // Insert the token's character.
                self.tree.insert_text(&text, None);
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
                if !self.tree.current_node_is(&["html"]) {
                    self.parse_error(ErrorCode::EofInSelect);
                }
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <option> => {
                // If the current node is an option element, pop that node from the stack of open elements.
                if self.tree.current_node_is(&["option"]) {
                    self.tree.open_elements.pop();
                }

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <optgroup> => {
                // If the current node is an option element, pop that node from the stack of open elements.
                if self.tree.current_node_is(&["option"]) {
                    self.tree.open_elements.pop();
                }

                // If the current node is an optgroup element, pop that node from the stack of open elements.
                if self.tree.current_node_is(&["optgroup"]) {
                    self.tree.open_elements.pop();
                }

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <select> => {
                // Parse error.
                self.parse_error(ErrorCode::UnexpectedSelectInSelect);

                // If the stack of open elements does not have a select element in select scope, ignore the token. (fragment case)
                // Otherwise:
                // Pop elements from the stack of open elements until a select element has been popped from the stack.
                // Reset the insertion mode appropriately.
                self.close_select();
                None
            },
            <input> | <keygen> | <textarea> => {
                // Parse error.
                self.parse_error(ErrorCode::UnexpectedInputInSelect);

                // If the stack of open elements does not have a select element in select scope, ignore the token. (fragment case)
                if !self.tree.element_in_scope("select", Scope::Select) {
                    return None;
                }

                // Pop elements from the stack of open elements until a select element has been popped from the stack.
                // Reset the insertion mode appropriately.
                self.close_select();

                // Reprocess the token.
                Some(Token::StartTag(tag))
            },
            <script> => {
                // Process the token using the rules for the "in head" insertion mode.
                self.process_using_rules_for(InsertionMode::InHead, Token::StartTag(tag))
            },
            Token::StartTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedStartTagInSelect, &tag.name);
                None
            },
            </option> => {
                // If the current node is an option element, then pop that node from the stack of open elements.
                // Otherwise, this is a parse error; ignore the token.
                if self.tree.current_node_is(&["option"]) {
                    self.tree.open_elements.pop();
                } else {
                    self.parse_error_named(ErrorCode::UnexpectedEndTagInSelect, "option");
                }
                None
            },
            </optgroup> => {
                // First, if the current node is an option element, and the node immediately before it in the stack of open elements
                // is an optgroup element, then pop the current node from the stack of open elements.
                let open_elements = self.tree.open_elements.list();
                let option_in_optgroup = open_elements.len() >= 2
                    && self.tree.current_node_is(&["option"])
                    && self
                        .tree
                        .element(open_elements[open_elements.len() - 2])
                        .is_html("optgroup");
                if option_in_optgroup {
                    self.tree.open_elements.pop();
                }

                // If the current node is an optgroup element, then pop that node from the stack of open elements.
                // Otherwise, this is a parse error; ignore the token.
                if self.tree.current_node_is(&["optgroup"]) {
                    self.tree.open_elements.pop();
                } else {
                    self.parse_error_named(ErrorCode::UnexpectedEndTagInSelect, "optgroup");
                }
                None
            },
            </select> => {
                self.close_select();
                None
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagInSelect, &tag.name);
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    fn close_select(&mut self) {
        // If the stack of open elements does not have a select element in select scope,
        // this is a parse error; ignore the token. (fragment case)
        if !self.tree.element_in_scope("select", Scope::Select) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "select");
            return;
        }

        // Otherwise:
        // Pop elements from the stack of open elements until a select element has been popped from the stack.
        self.tree.pop_until("select");

        // Reset the insertion mode appropriately.
        self.reset_insertion_mode_appropriately();
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable>
    pub(crate) fn process_in_select_in_table(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            <caption> | <table> | <tbody> | <tfoot> | <thead> | <tr> | <td> | <th> => {
                // Parse error.
                self.parse_error_named(
                    ErrorCode::UnexpectedTableElementStartTagInSelectInTable,
                    &tag.name,
                );

                // Pop elements from the stack of open elements until a select element has been popped from the stack.
                // Reset the insertion mode appropriately.
                self.process_using_rules_for(InsertionMode::InSelect, Token::EndTag(TagData::new("select")));

                // Reprocess the token.
                Some(Token::StartTag(tag))
            },
            </caption> | </table> | </tbody> | </tfoot> | </thead> | </tr> | </td> | </th> => {
                // Parse error.
                self.parse_error_named(
                    ErrorCode::UnexpectedTableElementEndTagInSelectInTable,
                    &tag.name,
                );

                // If the stack of open elements does not have an element in table scope that is an HTML element
                // with the same tag name as that of the token, then ignore the token.
                if !self.tree.element_in_scope(tag.name.as_str(), Scope::Table) {
                    return None;
                }

                // Otherwise:
                // Pop elements from the stack of open elements until a select element has been popped from the stack.
                // Reset the insertion mode appropriately.
                self.process_using_rules_for(InsertionMode::InSelect, Token::EndTag(TagData::new("select")));

                // Reprocess the token.
                Some(Token::EndTag(tag))
            },
            other => {
                // Process the token using the rules for the "in select" insertion mode.
                self.process_using_rules_for(InsertionMode::InSelect, other)
            }
        )
    }
}
