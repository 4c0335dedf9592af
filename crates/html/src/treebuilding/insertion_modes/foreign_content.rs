use crate::{
    error::ErrorCode,
    infra::{is_ascii_whitespace, Namespace},
    tokenization::{Token, TokenSource},
    treebuilding::{
        foreign::{
            adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
            adjust_svg_tag_name, breaks_out_of_foreign_content, is_html_integration_point,
            is_mathml_text_integration_point,
        },
        parser::{FramesetOkFlag, InsertionMode, Parser},
    },
};

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign>
    pub(crate) fn process_in_foreign_content(&mut self, token: Token) -> Option<Token> {
        match token {
            Token::Characters(text) => {
                // A character token that is U+0000 NULL:
                // Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character.
                // (The tokenizer already reported the error)
                // Any other character token:
                // Insert the token's character. Set the frameset-ok flag to "not ok".
                if text.chars().any(|c| !is_ascii_whitespace(c) && c != '\0') {
                    self.frameset_ok = FramesetOkFlag::NotOk;
                }
                self.tree.insert_text(&text.replace('\0', "\u{FFFD}"), None);
                None
            },
            Token::SpaceCharacters(text) => {
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
            Token::StartTag(tag) if breaks_out_of_foreign_content(&tag) => {
                // Parse error.
                self.parse_error_named(ErrorCode::UnexpectedHtmlElementInForeignContent, &tag.name);

                // While the current node is not a MathML text integration point, an HTML integration point,
                // or an element in the HTML namespace, pop elements from the stack of open elements.
                loop {
                    let current = self.tree.current_element();
                    if current.namespace == Namespace::HTML
                        || is_mathml_text_integration_point(current)
                        || is_html_integration_point(current)
                    {
                        break;
                    }
                    self.tree.open_elements.pop();
                }

                // Reprocess the token according to the rules given in the section corresponding to
                // the current insertion mode in HTML content.
                Some(Token::StartTag(tag))
            },
            Token::StartTag(mut tag) => {
                let namespace = self.tree.current_element().namespace;
                match namespace {
                    // If the adjusted current node is an element in the MathML namespace, adjust MathML attributes for the token.
                    Namespace::MathML => adjust_mathml_attributes(&mut tag),

                    // If the adjusted current node is an element in the SVG namespace, and the token's tag name is one of
                    // the ones in the first column of the following table, change the tag name to the name given in the
                    // corresponding cell in the second column.
                    // If the adjusted current node is an element in the SVG namespace, adjust SVG attributes for the token.
                    Namespace::SVG => {
                        adjust_svg_tag_name(&mut tag);
                        adjust_svg_attributes(&mut tag);
                    },
                    _ => {},
                }

                // Adjust foreign attributes for the token.
                adjust_foreign_attributes(&mut tag);

                // Insert a foreign element for the token, with adjusted current node's namespace and false.
                self.insert_foreign_element_for_token(&tag, namespace);
                None
            },
            Token::EndTag(tag) => {
                // 1. Initialize node to be the current node (the bottommost node of the stack).
                let mut index = self.tree.open_elements.len() - 1;

                // 2. If node's tag name, converted to ASCII lowercase, is not the same as the tag name of the token,
                //    then this is a parse error.
                if !self
                    .tree
                    .current_element()
                    .name
                    .eq_ignore_ascii_case(&tag.name)
                {
                    self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                }

                // 3. Loop: If node is the topmost element in the stack of open elements, then return. (fragment case)
                while index != 0 {
                    let node = self.tree.open_elements.list()[index];

                    // 4. If node's tag name, converted to ASCII lowercase, is the same as the tag name of the token,
                    //    pop elements from the stack of open elements until node has been popped from the stack, and then return.
                    if self.tree.element(node).name.eq_ignore_ascii_case(&tag.name) {
                        // Pending table text belongs in front of the foreign element that is about to be closed
                        if self.insertion_mode == InsertionMode::InTableText {
                            self.flush_pending_table_character_tokens();
                            self.switch_back_to_original_insertion_mode();
                        }
                        self.tree.pop_until_node(node);
                        return None;
                    }

                    // 5. Set node to the previous entry in the stack of open elements.
                    index -= 1;
                    let node = self.tree.open_elements.list()[index];

                    // 6. If node is not an element in the HTML namespace, return to the step labeled loop.
                    // 7. Otherwise, process the token according to the rules given in the section corresponding
                    //    to the current insertion mode in HTML content.
                    if self.tree.element(node).namespace == Namespace::HTML {
                        return self.process_using_rules_for(self.insertion_mode, Token::EndTag(tag));
                    }
                }
                None
            },
            Token::EOF => {
                // End of file is always handled by the current insertion mode
                self.process_using_rules_for(self.insertion_mode, Token::EOF)
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            },
        }
    }
}
