//! The insertion modes that deal with tables and their contents

use html_treebuilding_match::html_treebuilding_match;

use crate::{
    error::ErrorCode,
    infra::is_ascii_whitespace,
    tokenization::{TagData, Token, TokenSource},
    treebuilding::{
        parser::{InsertionMode, Parser},
        tree_builder::Scope,
    },
};

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable>
    pub(crate) fn process_in_table(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Characters(_) | Token::SpaceCharacters(_) => {
                // Let the pending table character tokens be an empty list of tokens.
                self.pending_table_character_tokens.clear();

                // Let the original insertion mode be the current insertion mode.
                self.original_insertion_mode = Some(self.insertion_mode);

                // Switch the insertion mode to "in table text" and reprocess the token.
                self.insertion_mode = InsertionMode::InTableText;
                Some(token)
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
                // The current node is only the root element in the fragment case
                if !self.tree.current_node_is(&["html"]) {
                    self.parse_error(ErrorCode::EofInTable);
                }

                // Stop parsing.
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <caption> => {
                // Clear the stack back to a table context.
                self.clear_stack_back_to_table_context();

                // Insert a marker at the end of the list of active formatting elements.
                self.tree.active_formatting_elements.push_marker();

                // Insert an HTML element for the token, then switch the insertion mode to "in caption".
                self.insert_html_element_for_token(&tag);
                self.insertion_mode = InsertionMode::InCaption;
                None
            },
            <colgroup> => {
                self.insert_column_group(&tag);
                None
            },
            <col> => {
                // Insert an HTML element for a "colgroup" start tag token with no attributes,
                // then switch the insertion mode to "in column group".
                self.insert_column_group(&TagData::new("colgroup"));

                // Reprocess the current token.
                Some(Token::StartTag(tag))
            },
            <tbody> | <tfoot> | <thead> => {
                self.insert_table_section(&tag);
                None
            },
            <td> | <th> | <tr> => {
                // Insert an HTML element for a "tbody" start tag token with no attributes,
                // then switch the insertion mode to "in table body".
                self.insert_table_section(&TagData::new("tbody"));

                // Reprocess the current token.
                Some(Token::StartTag(tag))
            },
            <table> => {
                // Parse error.
                self.parse_error_with(
                    ErrorCode::UnexpectedStartTagImpliesEndTag,
                    vec![("startName", "table".to_string()), ("endName", "table".to_string())],
                );

                // If the stack of open elements does not have a table element in table scope, ignore the token.
                let table_in_scope = self.tree.element_in_scope("table", Scope::Table);

                // 1. Pop elements from this stack until a table element has been popped from the stack.
                // 2. Reset the insertion mode appropriately.
                self.process_using_rules_for(self.insertion_mode, Token::EndTag(TagData::new("table")));

                // 3. Reprocess the token.
                table_in_scope.then_some(Token::StartTag(tag))
            },
            <style> | <script> => {
                // Process the token using the rules for the "in head" insertion mode.
                self.process_using_rules_for(InsertionMode::InHead, Token::StartTag(tag))
            },
            <input> if tag
                .lookup_attribute("type")
                .is_some_and(|input_type| input_type.eq_ignore_ascii_case("hidden")) => {
                // Parse error.
                self.parse_error(ErrorCode::UnexpectedHiddenInputInTable);

                // Insert an HTML element for the token.
                // Pop that input element off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);
                None
            },
            <form> => {
                // Parse error.
                self.parse_error(ErrorCode::UnexpectedFormInTable);

                // If there is a template element on the stack of open elements, or if the form element pointer is not null,
                // ignore the token.
                if self.tree.form.is_some() {
                    return None;
                }

                // Otherwise:
                // Insert an HTML element for the token, and set the form element pointer to point to the element created.
                // Pop that form element off the stack of open elements.
                let form = self.insert_html_element_for_token(&tag);
                self.tree.form = Some(form);
                self.tree.open_elements.pop();
                None
            },
            Token::StartTag(tag) => {
                // Parse error. Enable foster parenting, process the token using the rules for the "in body" insertion mode,
                // and then disable foster parenting.
                self.parse_error_named(ErrorCode::UnexpectedStartTagImpliesTableVoodoo, &tag.name);
                self.process_with_foster_parenting(Token::StartTag(tag))
            },
            </table> => {
                self.close_table();
                None
            },
            </body> | </caption> | </col> | </colgroup> | </html> | </tbody> | </td> | </tfoot> | </th> | </thead> | </tr> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                None
            },
            Token::EndTag(tag) => {
                // Parse error. Enable foster parenting, process the token using the rules for the "in body" insertion mode,
                // and then disable foster parenting.
                self.parse_error_named(ErrorCode::UnexpectedEndTagImpliesTableVoodoo, &tag.name);
                self.process_with_foster_parenting(Token::EndTag(tag))
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    /// Processes a misplaced token as if it was found in the body, moving whatever it inserts in front of the table
    fn process_with_foster_parenting(&mut self, token: Token) -> Option<Token> {
        self.tree.insert_from_table = true;
        let reprocess = self.process_using_rules_for(InsertionMode::InBody, token);
        self.tree.insert_from_table = false;
        reprocess
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context>
    fn clear_stack_back_to_table_context(&mut self) {
        // While the current node is not a table, template, or html element, pop elements from the stack of open elements.
        while !self.tree.current_node_is(&["table", "html"]) {
            self.tree.open_elements.pop();
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-body-context>
    fn clear_stack_back_to_table_body_context(&mut self) {
        // While the current node is not a tbody, tfoot, thead, template, or html element,
        // pop elements from the stack of open elements.
        while !self.tree.current_node_is(&["tbody", "tfoot", "thead", "html"]) {
            self.tree.open_elements.pop();
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-row-context>
    fn clear_stack_back_to_table_row_context(&mut self) {
        // While the current node is not a tr, template, or html element, pop elements from the stack of open elements.
        while !self.tree.current_node_is(&["tr", "html"]) {
            let name = self.tree.current_element().name.clone();
            self.parse_error_named(ErrorCode::UnexpectedImpliedEndTagInTableRow, &name);
            self.tree.open_elements.pop();
        }
    }

    fn insert_column_group(&mut self, tag: &TagData) {
        // Clear the stack back to a table context.
        self.clear_stack_back_to_table_context();

        // Insert an HTML element for the token, then switch the insertion mode to "in column group".
        self.insert_html_element_for_token(tag);
        self.insertion_mode = InsertionMode::InColumnGroup;
    }

    fn insert_table_section(&mut self, tag: &TagData) {
        // Clear the stack back to a table context.
        self.clear_stack_back_to_table_context();

        // Insert an HTML element for the token, then switch the insertion mode to "in table body".
        self.insert_html_element_for_token(tag);
        self.insertion_mode = InsertionMode::InTableBody;
    }

    /// Handles a `</table>` end tag in the "in table" insertion mode
    fn close_table(&mut self) {
        // If the stack of open elements does not have a table element in table scope, this is a parse error;
        // ignore the token.
        if !self.tree.element_in_scope("table", Scope::Table) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "table");
            return;
        }

        self.tree.generate_implied_end_tags(None);
        if !self.tree.current_node_is(&["table"]) {
            let current = self.tree.current_element().name.clone();
            self.parse_error_with(
                ErrorCode::EndTagTooEarlyNamed,
                vec![("gotName", "table".to_string()), ("expectedName", current)],
            );
        }

        // Pop elements from this stack until a table element has been popped from the stack.
        self.tree.pop_until("table");

        // Reset the insertion mode appropriately.
        self.reset_insertion_mode_appropriately();
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext>
    pub(crate) fn process_in_table_text(&mut self, token: Token) -> Option<Token> {
        match token {
            Token::Characters(text) if text == "\0" => {
                // Parse error. Ignore the token.
                None
            },
            Token::Characters(text) | Token::SpaceCharacters(text) => {
                // Append the character token to the pending table character tokens list.
                self.pending_table_character_tokens.push(text);
                None
            },
            other => {
                self.flush_pending_table_character_tokens();

                // Switch the insertion mode to the original insertion mode and reprocess the token.
                self.switch_back_to_original_insertion_mode();
                Some(other)
            },
        }
    }

    /// Inserts the text collected in the "in table text" insertion mode
    pub(crate) fn flush_pending_table_character_tokens(&mut self) {
        let text = std::mem::take(&mut self.pending_table_character_tokens).concat();

        // If any of the tokens in the pending table character tokens list are character tokens that are not
        // ASCII whitespace, then this is a parse error: reprocess the character tokens in the pending table character tokens list
        // using the rules given in the "anything else" entry in the "in table" insertion mode.
        if !text.chars().all(is_ascii_whitespace) {
            self.process_with_foster_parenting(Token::Characters(text));
        } else if !text.is_empty() {
            // Otherwise, insert the characters given by the pending table character tokens list.
            self.tree.insert_text(&text, None);
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption>
    pub(crate) fn process_in_caption(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(text) => {
                self.tree.insert_text(&text, None);
                None
            },
            Token::Comment(data) => {
                self.tree.insert_comment(&data, None);
                None
            },
            Token::Doctype(_) => {
                self.parse_error(ErrorCode::UnexpectedDoctype);
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <caption> | <col> | <colgroup> | <tbody> | <td> | <tfoot> | <th> | <thead> | <tr> => {
                self.parse_error_named(ErrorCode::UnexpectedStartTag, &tag.name);
                self.close_caption_and_reprocess(Token::StartTag(tag))
            },
            </table> => {
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                self.close_caption_and_reprocess(Token::EndTag(tag))
            },
            </caption> => {
                self.close_caption();
                None
            },
            </body> | </col> | </colgroup> | </html> | </tbody> | </td> | </tfoot> | </th> | </thead> | </tr> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                None
            },
            other => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, other)
            }
        )
    }

    /// Closes the caption and asks for `token` to be reprocessed, unless there was no caption to close
    fn close_caption_and_reprocess(&mut self, token: Token) -> Option<Token> {
        // If the stack of open elements does not have a caption element in table scope, this is a parse error;
        // ignore the token. (fragment case)
        let caption_in_scope = self.tree.element_in_scope("caption", Scope::Table);

        self.process_using_rules_for(self.insertion_mode, Token::EndTag(TagData::new("caption")));
        caption_in_scope.then_some(token)
    }

    fn close_caption(&mut self) {
        // 1. If the stack of open elements does not have a caption element in table scope, this is a parse error;
        //    ignore the token. (fragment case)
        if !self.tree.element_in_scope("caption", Scope::Table) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "caption");
            return;
        }

        // 2. Generate implied end tags.
        self.tree.generate_implied_end_tags(None);

        // 3. Now, if the current node is not a caption element, then this is a parse error.
        if !self.tree.current_node_is(&["caption"]) {
            let current = self.tree.current_element().name.clone();
            self.parse_error_with(
                ErrorCode::ExpectedOneEndTagButGotAnother,
                vec![("gotName", "caption".to_string()), ("expectedName", current)],
            );
        }

        // 4. Pop elements from this stack until a caption element has been popped from the stack.
        self.tree.pop_until("caption");

        // 5. Clear the list of active formatting elements up to the last marker.
        self.tree.clear_active_formatting_elements();

        // 6. Switch the insertion mode to "in table".
        self.insertion_mode = InsertionMode::InTable;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup>
    pub(crate) fn process_in_column_group(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(text) => {
                // Insert the character.
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
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <col> => {
                // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);
                None
            },
            </colgroup> => {
                self.close_column_group();
                None
            },
            </col> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::NoEndTag, "col");
                None
            },
            Token::EOF if self.tree.current_node_is(&["html"]) => {
                // Stop parsing. (fragment case)
                None
            },
            other => {
                // If the current node is not a colgroup element, then this is a parse error; ignore the token.
                let ignored = self.tree.current_node_is(&["html"]);

                // Otherwise, pop the current node from the stack of open elements.
                // Switch the insertion mode to "in table".
                // Reprocess the token.
                self.close_column_group();
                (!ignored).then_some(other)
            }
        )
    }

    fn close_column_group(&mut self) {
        // If the current node is not a colgroup element, then this is a parse error; ignore the token.
        if self.tree.current_node_is(&["html"]) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "colgroup");
            return;
        }

        // Otherwise, pop the current node from the stack of open elements. Switch the insertion mode to "in table".
        self.tree.open_elements.pop();
        self.insertion_mode = InsertionMode::InTable;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody>
    pub(crate) fn process_in_table_body(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Comment(data) => {
                self.tree.insert_comment(&data, None);
                None
            },
            Token::Doctype(_) => {
                self.parse_error(ErrorCode::UnexpectedDoctype);
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <tr> => {
                self.insert_table_row(&tag);
                None
            },
            <th> | <td> => {
                // Parse error.
                self.parse_error_named(ErrorCode::UnexpectedCellInTableBody, &tag.name);

                // Clear the stack back to a table body context.
                // Insert an HTML element for a "tr" start tag token with no attributes, then switch the insertion mode to "in row".
                self.insert_table_row(&TagData::new("tr"));

                // Reprocess the current token.
                Some(Token::StartTag(tag))
            },
            <caption> | <col> | <colgroup> | <tbody> | <tfoot> | <thead> => {
                self.close_table_section_and_reprocess(Token::StartTag(tag))
            },
            </table> => {
                self.close_table_section_and_reprocess(Token::EndTag(tag))
            },
            </tbody> | </tfoot> | </thead> => {
                self.close_table_section(&tag.name);
                None
            },
            </body> | </caption> | </col> | </colgroup> | </html> | </td> | </th> | </tr> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagInTableBody, &tag.name);
                None
            },
            other => {
                // Process the token using the rules for the "in table" insertion mode.
                self.process_using_rules_for(InsertionMode::InTable, other)
            }
        )
    }

    fn insert_table_row(&mut self, tag: &TagData) {
        // Clear the stack back to a table body context.
        self.clear_stack_back_to_table_body_context();

        // Insert an HTML element for the token, then switch the insertion mode to "in row".
        self.insert_html_element_for_token(tag);
        self.insertion_mode = InsertionMode::InRow;
    }

    fn close_table_section_and_reprocess(&mut self, token: Token) -> Option<Token> {
        // If the stack of open elements does not have a tbody, thead, or tfoot element in table scope, this is a parse error;
        // ignore the token.
        let section_in_scope = TABLE_SECTIONS
            .iter()
            .any(|&section| self.tree.element_in_scope(section, Scope::Table));
        if !section_in_scope {
            match &token {
                Token::StartTag(tag) => self.parse_error_named(ErrorCode::UnexpectedStartTag, &tag.name),
                Token::EndTag(tag) => self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name),
                _ => {},
            }
            return None;
        }

        // Otherwise:
        // 1. Clear the stack back to a table body context.
        self.clear_stack_back_to_table_body_context();

        // 2. Pop the current node from the stack of open elements. Switch the insertion mode to "in table".
        let section = self.tree.current_element().name.clone();
        self.close_table_section(&section);

        // 3. Reprocess the token.
        Some(token)
    }

    fn close_table_section(&mut self, name: &str) {
        // If the stack of open elements does not have an element in table scope that is an HTML element
        // with the same tag name as the token, this is a parse error; ignore the token.
        if !self.tree.element_in_scope(name, Scope::Table) {
            self.parse_error_named(ErrorCode::UnexpectedEndTagInTableBody, name);
            return;
        }

        // Otherwise:
        // 1. Clear the stack back to a table body context.
        self.clear_stack_back_to_table_body_context();

        // 2. Pop the current node from the stack of open elements. Switch the insertion mode to "in table".
        self.tree.open_elements.pop();
        self.insertion_mode = InsertionMode::InTable;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr>
    pub(crate) fn process_in_row(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Comment(data) => {
                self.tree.insert_comment(&data, None);
                None
            },
            Token::Doctype(_) => {
                self.parse_error(ErrorCode::UnexpectedDoctype);
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <th> | <td> => {
                // Clear the stack back to a table row context.
                self.clear_stack_back_to_table_row_context();

                // Insert an HTML element for the token, then switch the insertion mode to "in cell".
                self.insert_html_element_for_token(&tag);
                self.insertion_mode = InsertionMode::InCell;

                // Insert a marker at the end of the list of active formatting elements.
                self.tree.active_formatting_elements.push_marker();
                None
            },
            <caption> | <col> | <colgroup> | <tbody> | <tfoot> | <thead> | <tr> => {
                self.close_table_row_and_reprocess(Token::StartTag(tag))
            },
            </table> => {
                self.close_table_row_and_reprocess(Token::EndTag(tag))
            },
            </tr> => {
                self.close_table_row();
                None
            },
            </tbody> | </tfoot> | </thead> => {
                // If the stack of open elements does not have an element in table scope that is an HTML element
                // with the same tag name as the token, this is a parse error; ignore the token.
                if !self.tree.element_in_scope(tag.name.as_str(), Scope::Table) {
                    self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                    return None;
                }

                // If the stack of open elements does not have a tr element in table scope, ignore the token.
                // Otherwise:
                // 1. Clear the stack back to a table row context.
                // 2. Pop the current node (which will be a tr element) from the stack of open elements.
                //    Switch the insertion mode to "in table body".
                // 3. Reprocess the token.
                self.close_table_row();
                Some(Token::EndTag(tag))
            },
            </body> | </caption> | </col> | </colgroup> | </html> | </td> | </th> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTagInTableRow, &tag.name);
                None
            },
            other => {
                // Process the token using the rules for the "in table" insertion mode.
                self.process_using_rules_for(InsertionMode::InTable, other)
            }
        )
    }

    fn close_table_row_and_reprocess(&mut self, token: Token) -> Option<Token> {
        // If the stack of open elements does not have a tr element in table scope, this is a parse error;
        // ignore the token.
        let row_in_scope = self.tree.element_in_scope("tr", Scope::Table);
        self.close_table_row();
        row_in_scope.then_some(token)
    }

    fn close_table_row(&mut self) {
        // If the stack of open elements does not have a tr element in table scope, this is a parse error;
        // ignore the token.
        if !self.tree.element_in_scope("tr", Scope::Table) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "tr");
            return;
        }

        // 1. Clear the stack back to a table row context.
        self.clear_stack_back_to_table_row_context();

        // 2. Pop the current node (which will be a tr element) from the stack of open elements.
        //    Switch the insertion mode to "in table body".
        self.tree.open_elements.pop();
        self.insertion_mode = InsertionMode::InTableBody;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd>
    pub(crate) fn process_in_cell(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::SpaceCharacters(text) => {
                self.tree.insert_text(&text, None);
                None
            },
            Token::Comment(data) => {
                self.tree.insert_comment(&data, None);
                None
            },
            Token::Doctype(_) => {
                self.parse_error(ErrorCode::UnexpectedDoctype);
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <caption> | <col> | <colgroup> | <tbody> | <td> | <tfoot> | <th> | <thead> | <tr> => {
                // Assert: The stack of open elements has a td or th element in table scope.
                if !self.tree.element_in_scope("td", Scope::Table)
                    && !self.tree.element_in_scope("th", Scope::Table)
                {
                    self.parse_error_named(ErrorCode::UnexpectedStartTag, &tag.name);
                    return None;
                }

                // Close the cell and reprocess the token.
                self.close_the_cell();
                Some(Token::StartTag(tag))
            },
            </td> | </th> => {
                self.close_table_cell(&tag.name);
                None
            },
            </body> | </caption> | </col> | </colgroup> | </html> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                None
            },
            </table> | </tbody> | </tfoot> | </thead> | </tr> => {
                // If the stack of open elements does not have an element in table scope that is an HTML element
                // with the same tag name as that of the token, then this is a parse error; ignore the token.
                if !self.tree.element_in_scope(tag.name.as_str(), Scope::Table) {
                    self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                    return None;
                }

                // Otherwise, close the cell and reprocess the token.
                self.close_the_cell();
                Some(Token::EndTag(tag))
            },
            other => {
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, other)
            }
        )
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell>
    fn close_the_cell(&mut self) {
        if self.tree.element_in_scope("td", Scope::Table) {
            self.close_table_cell("td");
        } else if self.tree.element_in_scope("th", Scope::Table) {
            self.close_table_cell("th");
        }
    }

    fn close_table_cell(&mut self, name: &str) {
        // If the stack of open elements does not have an element in table scope that is an HTML element
        // with the same tag name as that of the token, then this is a parse error; ignore the token.
        if !self.tree.element_in_scope(name, Scope::Table) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, name);
            return;
        }

        // 1. Generate implied end tags.
        self.tree.generate_implied_end_tags(Some(name));

        // 2. Now, if the current node is not an HTML element with the same tag name as the token,
        //    then this is a parse error.
        if !self.tree.current_node_is(&[name]) {
            self.parse_error_named(ErrorCode::UnexpectedCellEndTag, name);
        }

        // 3. Pop elements from the stack of open elements stack until an HTML element
        //    with the same tag name as the token has been popped from the stack.
        self.tree.pop_until(name);

        // 4. Clear the list of active formatting elements up to the last marker.
        self.tree.clear_active_formatting_elements();

        // 5. Switch the insertion mode to "in row".
        self.insertion_mode = InsertionMode::InRow;
    }
}
