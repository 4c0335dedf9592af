use html_treebuilding_match::html_treebuilding_match;

use crate::{
    dom::{Attribute, NodeId, QuirksMode},
    error::ErrorCode,
    infra::{is_ascii_whitespace, Namespace},
    tokenization::{TagData, Token, TokenSource, TokenizerState},
    treebuilding::{
        foreign::{adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes},
        parser::{FramesetOkFlag, InsertionMode, Parser},
        tree_builder::{is_special, Scope},
    },
};

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that may still be open when the body ends without causing a parse error
const ALLOWED_OPEN_AT_EOF: &[&str] = &[
    "dd", "dt", "li", "p", "tbody", "td", "tfoot", "th", "thead", "tr", "body", "html",
];

const ALLOWED_OPEN_AT_BODY_END: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rp", "rt", "tbody", "td", "tfoot", "th",
    "thead", "tr", "body", "html",
];

const ISINDEX_DEFAULT_PROMPT: &str = "This is a searchable index. Enter search keywords: ";

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody>
    pub(crate) fn process_in_body(&mut self, token: Token) -> Option<Token> {
        html_treebuilding_match!(token,
            Token::Characters(text) if text == "\0" => {
                // Parse error. Ignore the token.
                None
            },
            Token::Characters(text) => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert the token's character.
                self.tree.insert_text(&text, None);

                // Set the frameset-ok flag to "not ok".
                if !text.chars().all(is_ascii_whitespace) {
                    self.frameset_ok = FramesetOkFlag::NotOk;
                }
                None
            },
            Token::SpaceCharacters(text) => {
                // Reconstruct the active formatting elements, if any.
                // Insert the token's character.
                self.tree.reconstruct_active_formatting_elements();
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
                // If there is a node in the stack of open elements that is not either a dd element, a dt element,
                // an li element, an optgroup element, an option element, a p element, an rb element, an rp element,
                // an rt element, an rtc element, a tbody element, a td element, a tfoot element, a th element,
                // a thead element, a tr element, the body element, or the html element, then this is a parse error.
                let unclosed = self
                    .tree
                    .open_elements
                    .list()
                    .iter()
                    .rev()
                    .map(|&node| self.tree.element(node))
                    .find(|element| !ALLOWED_OPEN_AT_EOF.contains(&element.name.as_str()))
                    .map(|element| element.name.clone());
                if let Some(name) = unclosed {
                    self.parse_error_named(ErrorCode::ExpectedClosingTagButGotEof, &name);
                }

                // Stop parsing.
                None
            },
            <html> => {
                self.merge_attributes_into_root_element(&tag);
                None
            },
            <base> | <basefont> | <bgsound> | <command> | <link> | <meta> | <script> | <style> | <title> => {
                // Process the token using the rules for the "in head" insertion mode.
                self.process_using_rules_for(InsertionMode::InHead, Token::StartTag(tag))
            },
            <body> => {
                // Parse error.
                self.parse_error_named(ErrorCode::UnexpectedStartTag, "body");

                // If the second element on the stack of open elements is not a body element, if the stack of open elements
                // has only one node on it, or if there is a template element on the stack of open elements, then ignore the token.
                // (fragment case or there is a template element on the stack)
                let Some(body) = self.second_element_if_body() else {
                    debug_assert!(self.is_fragment_case());
                    return None;
                };

                // Otherwise, set the frameset-ok flag to "not ok"; then, for each attribute on the token,
                // check to see if the attribute is already present on the body element (the second element on the stack of open elements),
                // and if it is not, add the attribute and its corresponding value to that element.
                self.frameset_ok = FramesetOkFlag::NotOk;
                if let Some(element) = self.tree.document_mut().element_mut(body) {
                    element.merge_missing_attributes(&tag.attributes);
                }
                None
            },
            <frameset> => {
                // Parse error.
                self.parse_error_named(ErrorCode::UnexpectedStartTag, "frameset");

                // If the stack of open elements has only one node on it, or if the second element on the stack of open elements
                // is not a body element, then ignore the token. (fragment case or there is a template element on the stack)
                let Some(body) = self.second_element_if_body() else {
                    debug_assert!(self.is_fragment_case());
                    return None;
                };

                // If the frameset-ok flag is set to "not ok", ignore the token.
                if self.frameset_ok == FramesetOkFlag::NotOk {
                    return None;
                }

                // 1. Remove the second element on the stack of open elements from its parent node, if it has one.
                self.tree.document_mut().detach(body);

                // 2. Pop all the nodes from the bottom of the stack of open elements, from the current node up to,
                //    but not including, the root html element.
                while self.tree.open_elements.len() > 1 {
                    self.tree.open_elements.pop();
                }

                // 3. Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // 4. Switch the insertion mode to "in frameset".
                self.insertion_mode = InsertionMode::InFrameset;
                None
            },
            <address> | <article> | <aside> | <blockquote> | <center> | <details> | <dir> | <div> | <dl>
            | <fieldset> | <figcaption> | <figure> | <footer> | <header> | <hgroup> | <main> | <menu>
            | <nav> | <ol> | <p> | <section> | <summary> | <ul> => {
                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <h1> | <h2> | <h3> | <h4> | <h5> | <h6> => {
                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // If the current node is an HTML element whose tag name is one of "h1", "h2", "h3", "h4", "h5", or "h6",
                // then this is a parse error; pop the current node off the stack of open elements.
                if self.tree.current_node_is(HEADINGS) {
                    self.parse_error_named(ErrorCode::UnexpectedStartTag, &tag.name);
                    self.tree.open_elements.pop();
                }

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <pre> | <listing> => {
                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // If the next token is a U+000A LINE FEED (LF) character token, then ignore that token and move on to the next one.
                // (Newlines at the start of pre blocks are ignored as an authoring convenience.)
                self.skip_next_newline = true;

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;
                None
            },
            <form> => {
                // If the form element pointer is not null, and there is no template element on the stack of open elements,
                // then this is a parse error; ignore the token.
                if self.tree.form.is_some() {
                    self.parse_error_named(ErrorCode::UnexpectedStartTag, "form");
                    return None;
                }

                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // Insert an HTML element for the token, and, if there is no template element on the stack of open elements,
                // set the form element pointer to point to the element created.
                let form = self.insert_html_element_for_token(&tag);
                self.tree.form = Some(form);
                None
            },
            <li> | <dd> | <dt> => {
                // 1. Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;

                let stop_names: &[&str] = if tag.name == "li" { &["li"] } else { &["dd", "dt"] };

                // 2. Initialize node to be the current node (the bottommost node of the stack).
                // 3. Loop: If node is one of the elements to stop at, then generate implied end tags for its name,
                //    which closes it.
                let to_close = self
                    .tree
                    .open_elements
                    .list()
                    .iter()
                    .rev()
                    .map(|&node| self.tree.element(node))
                    .find_map(|element| {
                        if element.namespace == Namespace::HTML
                            && stop_names.contains(&element.name.as_str())
                        {
                            Some(Some(element.name.clone()))
                        } else if is_special(element)
                            && !["address", "div", "p"].contains(&element.name.as_str())
                        {
                            // If node is in the special category, but is not an address, div, or p element,
                            // then jump to the step labeled done below.
                            Some(None)
                        } else {
                            None
                        }
                    })
                    .flatten();
                if let Some(name) = to_close {
                    self.process_using_rules_for(self.insertion_mode, Token::EndTag(TagData::new(name)));
                }

                // 6. Done: If the stack of open elements has a p element in button scope, then close a p element.
                if self.tree.element_in_scope("p", Scope::Button) {
                    self.process_using_rules_for(self.insertion_mode, Token::EndTag(TagData::new("p")));
                }

                // 7. Finally, insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <plaintext> => {
                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // Switch the tokenizer to the PLAINTEXT state.
                self.source.set_state(TokenizerState::PLAINTEXTState);
                None
            },
            <a> => {
                // If the list of active formatting elements contains an a element between the end of the list
                // and the last marker on the list (or the start of the list if there is no marker on the list),
                // then this is a parse error; run the adoption agency algorithm for the token,
                // then remove that element from the list of active formatting elements and the stack of open elements
                // if the adoption agency algorithm didn't already remove it (it might not have if the element is not in table scope).
                let previous_a = self
                    .tree
                    .active_formatting_elements
                    .find_since_last_marker("a", self.tree.document());
                if let Some(previous_a) = previous_a {
                    self.parse_error_with(
                        ErrorCode::UnexpectedStartTagImpliesEndTag,
                        vec![("startName", "a".to_string()), ("endName", "a".to_string())],
                    );
                    self.run_adoption_agency_algorithm(&TagData::new("a"));
                    self.tree.open_elements.remove(previous_a);
                    self.tree.active_formatting_elements.remove(previous_a);
                }

                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert an HTML element for the token. Push onto the list of active formatting elements that element.
                self.insert_formatting_element(&tag);
                None
            },
            <b> | <big> | <code> | <em> | <font> | <i> | <s> | <small> | <strike> | <strong> | <tt> | <u> => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert an HTML element for the token. Push onto the list of active formatting elements that element.
                self.insert_formatting_element(&tag);
                None
            },
            <nobr> => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // If the stack of open elements has a nobr element in scope, then this is a parse error;
                // run the adoption agency algorithm for the token, then once again reconstruct the active formatting elements, if any.
                if self.tree.element_in_scope("nobr", Scope::Default) {
                    self.parse_error_with(
                        ErrorCode::UnexpectedStartTagImpliesEndTag,
                        vec![("startName", "nobr".to_string()), ("endName", "nobr".to_string())],
                    );
                    self.process_using_rules_for(InsertionMode::InBody, Token::EndTag(TagData::new("nobr")));
                    self.tree.reconstruct_active_formatting_elements();
                }

                // Insert an HTML element for the token. Push onto the list of active formatting elements that element.
                self.insert_formatting_element(&tag);
                None
            },
            <button> => {
                // 1. If the stack of open elements has a button element in scope, then run these substeps:
                if self.tree.element_in_scope("button", Scope::Default) {
                    // 1. Parse error.
                    self.parse_error_with(
                        ErrorCode::UnexpectedStartTagImpliesEndTag,
                        vec![("startName", "button".to_string()), ("endName", "button".to_string())],
                    );

                    // 2. Generate implied end tags.
                    // 3. Pop elements from the stack of open elements until a button element has been popped from the stack.
                    self.process_using_rules_for(InsertionMode::InBody, Token::EndTag(TagData::new("button")));

                    // Reprocess the token.
                    return Some(Token::StartTag(tag));
                }

                // 2. Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // 3. Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // 4. Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;
                None
            },
            <applet> | <marquee> | <object> => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // Insert a marker at the end of the list of active formatting elements.
                self.tree.active_formatting_elements.push_marker();

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;
                None
            },
            <xmp> => {
                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;

                // Follow the generic raw text element parsing algorithm.
                self.parse_text_element(&tag, TokenizerState::RAWTEXTState);
                None
            },
            <table> => {
                // If the Document is not set to quirks mode, and the stack of open elements has a p element in button scope,
                // then close a p element.
                if self.tree.document().quirks_mode() != QuirksMode::Quirks
                    && self.tree.element_in_scope("p", Scope::Button)
                {
                    self.process_using_rules_for(InsertionMode::InBody, Token::EndTag(TagData::new("p")));
                }

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;

                // Switch the insertion mode to "in table".
                self.insertion_mode = InsertionMode::InTable;
                None
            },
            <area> | <br> | <embed> | <img> | <keygen> | <wbr> => {
                self.insert_void_formatting_element(&tag);
                None
            },
            <input> => {
                let frameset_ok = self.frameset_ok;
                self.insert_void_formatting_element(&tag);

                // If the token does not have an attribute with the name "type", or if it does,
                // but that attribute's value is not an ASCII case-insensitive match for the string "hidden",
                // then: set the frameset-ok flag to "not ok".
                if tag
                    .lookup_attribute("type")
                    .is_some_and(|input_type| input_type.eq_ignore_ascii_case("hidden"))
                {
                    self.frameset_ok = frameset_ok;
                }
                None
            },
            <param> | <source> | <track> => {
                // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);
                None
            },
            <hr> => {
                // If the stack of open elements has a p element in button scope, then close a p element.
                self.close_p_element_if_in_button_scope();

                // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;
                None
            },
            <image> => {
                // Parse error. Change the token's tag name to "img" and reprocess it. (Don't ask.)
                self.parse_error_with(
                    ErrorCode::UnexpectedStartTagTreatedAs,
                    vec![("originalName", "image".to_string()), ("newName", "img".to_string())],
                );
                let img = TagData {
                    name: "img".to_string(),
                    ..tag
                };
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(img))
            },
            <isindex> => {
                self.parse_error_named(ErrorCode::DeprecatedTag, "isindex");
                if self.tree.form.is_some() {
                    return None;
                }
                self.expand_isindex(tag);
                None
            },
            <textarea> => {
                // 1. Insert an HTML element for the token.
                // 2. Switch the tokenizer to the RCDATA state.
                // 4. Let the original insertion mode be the current insertion mode.
                // 6. Switch the insertion mode to "text".
                self.parse_text_element(&tag, TokenizerState::RCDATAState);

                // 3. If the next token is a U+000A LINE FEED (LF) character token, then ignore that token and move on to the next one.
                //    (Newlines at the start of textarea elements are ignored as an authoring convenience.)
                self.skip_next_newline = true;

                // 5. Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;
                None
            },
            <iframe> => {
                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;

                // Follow the generic raw text element parsing algorithm.
                self.parse_text_element(&tag, TokenizerState::RAWTEXTState);
                None
            },
            <noembed> | <noframes> | <noscript> => {
                // Follow the generic raw text element parsing algorithm.
                self.parse_text_element(&tag, TokenizerState::RAWTEXTState);
                None
            },
            <select> => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;

                // If the insertion mode is one of "in table", "in caption", "in table body", "in row", or "in cell",
                // then switch the insertion mode to "in select in table". Otherwise, switch the insertion mode to "in select".
                self.insertion_mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InColumnGroup
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
                None
            },
            <rp> | <rt> => {
                // If the stack of open elements has a ruby element in scope, then generate implied end tags.
                // If the current node is not now a ruby element, this is a parse error.
                if self.tree.element_in_scope("ruby", Scope::Default) {
                    self.tree.generate_implied_end_tags(None);
                    if !self.tree.current_node_is(&["ruby"]) {
                        self.parse_error_named(ErrorCode::UnexpectedStartTag, &tag.name);
                    }
                }

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <option> | <optgroup> => {
                // If the current node is an option element, then pop the current node off the stack of open elements.
                if self.tree.current_node_is(&["option"]) {
                    self.process_using_rules_for(self.insertion_mode, Token::EndTag(TagData::new("option")));
                }

                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            <math> => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Adjust MathML attributes for the token. (This fixes the case of MathML attributes that are not all lowercase.)
                // Adjust foreign attributes for the token. (This fixes the use of namespaced attributes, in particular XLink.)
                let mut tag = tag;
                adjust_mathml_attributes(&mut tag);
                adjust_foreign_attributes(&mut tag);

                // Insert a foreign element for the token, with MathML namespace and false.
                self.insert_foreign_element_for_token(&tag, Namespace::MathML);
                None
            },
            <svg> => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Adjust SVG attributes for the token. (This fixes the case of SVG attributes that are not all lowercase.)
                // Adjust foreign attributes for the token. (This fixes the use of namespaced attributes, in particular XLink in SVG.)
                let mut tag = tag;
                adjust_svg_attributes(&mut tag);
                adjust_foreign_attributes(&mut tag);

                // Insert a foreign element for the token, with SVG namespace and false.
                self.insert_foreign_element_for_token(&tag, Namespace::SVG);
                None
            },
            <caption> | <col> | <colgroup> | <frame> | <head> | <tbody> | <td> | <tfoot> | <th> | <thead> | <tr> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedStartTagIgnored, &tag.name);
                None
            },
            Token::StartTag(tag) => {
                // Reconstruct the active formatting elements, if any.
                self.tree.reconstruct_active_formatting_elements();

                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);
                None
            },
            </body> => {
                self.close_body_element();
                None
            },
            </html> => {
                // If the stack of open elements does not have a body element in scope, ignore the token.
                if !self.tree.element_in_scope("body", Scope::Default) {
                    return None;
                }

                // Switch the insertion mode to "after body".
                self.close_body_element();

                // Reprocess the token.
                Some(Token::EndTag(tag))
            },
            </address> | </article> | </aside> | </blockquote> | </button> | </center> | </details> | </dialog>
            | </dir> | </div> | </dl> | </fieldset> | </figcaption> | </figure> | </footer> | </header>
            | </hgroup> | </listing> | </main> | </menu> | </nav> | </ol> | </pre> | </section>
            | </summary> | </ul> => {
                self.close_block_element(&tag.name);
                None
            },
            </form> => {
                // 1. Let node be the element that the form element pointer is set to, or null if it is not set to an element.
                // 2. Set the form element pointer to null.
                let node = self.tree.form.take();

                // 3. If node is null or if the stack of open elements does not have node in scope,
                //    then this is a parse error; return and ignore the token.
                let Some(node) = node.filter(|&node| self.tree.element_in_scope(node, Scope::Default)) else {
                    self.parse_error_named(ErrorCode::UnexpectedEndTag, "form");
                    return None;
                };

                // 4. Generate implied end tags.
                self.tree.generate_implied_end_tags(None);

                // 5. If the current node is not node, then this is a parse error.
                if self.tree.current_node() != node {
                    self.parse_error_named(ErrorCode::EndTagTooEarlyIgnored, "form");
                }

                // 6. Remove node from the stack of open elements.
                self.tree.open_elements.remove(node);
                None
            },
            </p> => {
                self.close_p_element();
                None
            },
            </li> | </dd> | </dt> => {
                let scope = if tag.name == "li" { Scope::List } else { Scope::Default };

                // If the stack of open elements does not have an element in (list item) scope that is an HTML element
                // with the same tag name as that of the token, then this is a parse error; ignore the token.
                if !self.tree.element_in_scope(tag.name.as_str(), scope) {
                    self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                    return None;
                }

                // 1. Generate implied end tags, except for HTML elements with the same tag name as the token.
                self.tree.generate_implied_end_tags(Some(&tag.name));

                // 2. If the current node is not an HTML element with the same tag name as that of the token,
                //    then this is a parse error.
                if !self.tree.current_node_is(&[tag.name.as_str()]) {
                    self.parse_error_named(ErrorCode::EndTagTooEarly, &tag.name);
                }

                // 3. Pop elements from the stack of open elements until an HTML element with the same tag name
                //    as the token has been popped from the stack.
                self.tree.pop_until(&tag.name);
                None
            },
            </h1> | </h2> | </h3> | </h4> | </h5> | </h6> => {
                let heading_in_scope = HEADINGS
                    .iter()
                    .any(|&heading| self.tree.element_in_scope(heading, Scope::Default));

                // 1. Generate implied end tags.
                if heading_in_scope {
                    self.tree.generate_implied_end_tags(None);
                }

                // 2. If the current node is not an HTML element with the same tag name as that of the token,
                //    then this is a parse error.
                if !self.tree.current_node_is(&[tag.name.as_str()]) {
                    self.parse_error_named(ErrorCode::EndTagTooEarly, &tag.name);
                }

                // 3. Pop elements from the stack of open elements until an HTML element whose tag name is one of
                //    "h1", "h2", "h3", "h4", "h5", or "h6" has been popped from the stack.
                if heading_in_scope {
                    self.tree.pop_until_one_of(HEADINGS);
                }
                None
            },
            </a> | </b> | </big> | </code> | </em> | </font> | </i> | </nobr> | </s> | </small> | </strike>
            | </strong> | </tt> | </u> => {
                // Run the adoption agency algorithm for the token.
                self.run_adoption_agency_algorithm(&tag);
                None
            },
            </applet> | </marquee> | </object> => {
                if self.close_block_element(&tag.name) {
                    // Clear the list of active formatting elements up to the last marker.
                    self.tree.clear_active_formatting_elements();
                }
                None
            },
            </br> => {
                // Parse error. Drop the attributes from the token, and act as described in the next entry;
                // i.e. act as if this was a "br" start tag token with no attributes, rather than the end tag token that it actually is.
                self.parse_error_with(
                    ErrorCode::UnexpectedEndTagTreatedAs,
                    vec![("originalName", "br".to_string()), ("newName", "br element".to_string())],
                );
                self.tree.reconstruct_active_formatting_elements();
                self.insert_html_element_for_token(&TagData::new("br"));
                self.tree.open_elements.pop();
                None
            },
            Token::EndTag(tag) => {
                self.any_other_end_tag_in_body(&tag);
                None
            },
            Token::ParseError { .. } => {
                unreachable!("parse errors are reported by the dispatcher")
            }
        )
    }

    /// Copies the attributes of an `<html>` start tag onto the root element
    pub(super) fn merge_attributes_into_root_element(&mut self, tag: &TagData) {
        // Parse error.
        if !self.first_start_tag {
            self.parse_error_named(ErrorCode::NonHtmlRoot, &tag.name);
        }
        self.first_start_tag = false;

        // Otherwise, for each attribute on the token, check to see if the attribute is already present on the top element
        // of the stack of open elements. If it is not, add the attribute and its corresponding value to that element.
        let Some(root) = self.tree.open_elements.top_node() else {
            return;
        };
        if let Some(element) = self.tree.document_mut().element_mut(root) {
            element.merge_missing_attributes(&tag.attributes);
        }
    }

    /// Returns the second element on the stack of open elements if it is a `<body>` element
    fn second_element_if_body(&self) -> Option<NodeId> {
        self.tree
            .open_elements
            .get(1)
            .filter(|&node| self.tree.element(node).is_html("body"))
    }

    /// Inserts an element and pushes it onto the list of active formatting elements
    fn insert_formatting_element(&mut self, tag: &TagData) {
        let element = self.insert_html_element_for_token(tag);
        self.tree.push_active_formatting_element(element);
    }

    /// Handles `<area>`, `<br>`, `<embed>`, `<img>`, `<keygen>`, `<wbr>` and `<input>`
    fn insert_void_formatting_element(&mut self, tag: &TagData) {
        // Reconstruct the active formatting elements, if any.
        self.tree.reconstruct_active_formatting_elements();

        // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
        // Acknowledge the token's self-closing flag, if it is set.
        self.insert_void_element(tag);

        // Set the frameset-ok flag to "not ok".
        self.frameset_ok = FramesetOkFlag::NotOk;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element>
    pub(crate) fn insert_foreign_element_for_token(&mut self, tag: &TagData, namespace: Namespace) {
        self.tree.insert_element(tag, namespace);

        // If the token has its self-closing flag set, pop the current node off the stack of open elements and acknowledge the token's self-closing flag.
        if tag.self_closing {
            self.tree.open_elements.pop();
            self.acknowledge_self_closing_flag_if_set(tag);
        }
    }

    /// Replaces the obsolete `<isindex>` element with the form it used to stand for
    fn expand_isindex(&mut self, tag: TagData) {
        let mut form = TagData::new("form");
        if let Some(action) = tag.lookup_attribute("action") {
            form.attributes.push(Attribute::new("action", action));
        }
        self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(form));
        self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(TagData::new("hr")));
        self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(TagData::new("label")));

        let prompt = tag
            .lookup_attribute("prompt")
            .unwrap_or(ISINDEX_DEFAULT_PROMPT)
            .to_string();
        self.process_using_rules_for(InsertionMode::InBody, Token::text(prompt));

        let mut attributes: Vec<Attribute> = tag
            .attributes
            .into_iter()
            .filter(|attribute| !matches!(attribute.name.as_str(), "action" | "prompt" | "name"))
            .collect();
        attributes.push(Attribute::new("name", "isindex"));
        let input = TagData {
            name: "input".to_string(),
            self_closing: tag.self_closing,
            attributes,
        };
        self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(input));

        self.process_using_rules_for(InsertionMode::InBody, Token::EndTag(TagData::new("label")));
        self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(TagData::new("hr")));
        self.process_using_rules_for(InsertionMode::InBody, Token::EndTag(TagData::new("form")));
    }

    /// Handles a `</body>` end tag and the body part of `</html>`
    fn close_body_element(&mut self) {
        // If the stack of open elements does not have a body element in scope, this is a parse error; ignore the token.
        if !self.tree.element_in_scope("body", Scope::Default) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "body");
            return;
        }

        // Otherwise, if there is a node in the stack of open elements that is not either a dd element, a dt element,
        // an li element, an optgroup element, an option element, a p element, an rb element, an rp element, an rt element,
        // an rtc element, a tbody element, a td element, a tfoot element, a th element, a thead element, a tr element,
        // the body element, or the html element, then this is a parse error.
        if !self.tree.current_node_is(&["body"]) {
            let unclosed = self
                .tree
                .open_elements
                .list()
                .iter()
                .skip(2)
                .map(|&node| self.tree.element(node))
                .find(|element| !ALLOWED_OPEN_AT_BODY_END.contains(&element.name.as_str()))
                .map(|element| element.name.clone());
            if let Some(name) = unclosed {
                self.parse_error_with(
                    ErrorCode::ExpectedOneEndTagButGotAnother,
                    vec![("gotName", "body".to_string()), ("expectedName", name)],
                );
            }
        }

        // Switch the insertion mode to "after body".
        self.insertion_mode = InsertionMode::AfterBody;
    }

    /// Shared by the end tags of block elements
    ///
    /// Returns whether an element with the given name was in scope and has been popped.
    fn close_block_element(&mut self, name: &str) -> bool {
        // If the stack of open elements does not have an element in scope that is an HTML element
        // with the same tag name as that of the token, then this is a parse error; ignore the token.
        let in_scope = self.tree.element_in_scope(name, Scope::Default);

        // 1. Generate implied end tags.
        if in_scope {
            self.tree.generate_implied_end_tags(None);
        }

        // 2. If the current node is not an HTML element with the same tag name as that of the token,
        //    then this is a parse error.
        if !self.tree.current_node_is(&[name]) {
            self.parse_error_named(ErrorCode::EndTagTooEarly, name);
        }

        // 3. Pop elements from the stack of open elements until an HTML element with the same tag name
        //    as the token has been popped from the stack.
        if in_scope {
            self.tree.pop_until(name);
        }
        in_scope
    }

    fn close_p_element_if_in_button_scope(&mut self) {
        if self.tree.element_in_scope("p", Scope::Button) {
            self.close_p_element();
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element>
    ///
    /// Also covers a `</p>` end tag without a matching `<p>`, which inserts an empty paragraph.
    fn close_p_element(&mut self) {
        // If the stack of open elements does not have a p element in button scope, then this is a parse error;
        // insert an HTML element for a "p" start tag token with no attributes.
        if !self.tree.element_in_scope("p", Scope::Button) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "p");
            self.insert_html_element_for_token(&TagData::new("p"));
        }

        // 1. Generate implied end tags, except for p elements.
        self.tree.generate_implied_end_tags(Some("p"));

        // 2. If the current node is not a p element, then this is a parse error.
        if !self.tree.current_node_is(&["p"]) {
            self.parse_error_named(ErrorCode::UnexpectedEndTag, "p");
        }

        // 3. Pop elements from the stack of open elements until a p element has been popped from the stack.
        self.tree.pop_until("p");
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody:anything-else-2>
    pub(crate) fn any_other_end_tag_in_body(&mut self, tag: &TagData) {
        // 1. Initialize node to be the current node (the bottommost node of the stack).
        let open_elements = self.tree.open_elements.list().to_vec();
        for node in open_elements.into_iter().rev() {
            let element = self.tree.element(node);

            // 2. Loop: If node is an HTML element with the same tag name as the token, then:
            if element.is_html(&tag.name) {
                // 1. Generate implied end tags, except for HTML elements with the same tag name as the token.
                self.tree.generate_implied_end_tags(Some(&tag.name));

                // 2. If node is not the current node, then this is a parse error.
                if self.tree.current_node() != node {
                    self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                }

                // 3. Pop all the nodes from the current node up to node, including node, then stop these steps.
                self.tree.pop_until_node(node);
                return;
            }

            // 3. Otherwise, if node is in the special category, then this is a parse error; ignore the token, and return.
            if is_special(element) {
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                return;
            }

            // 4. Set node to the previous entry in the stack of open elements.
            // 5. Return to the step labeled loop.
        }
    }
}
