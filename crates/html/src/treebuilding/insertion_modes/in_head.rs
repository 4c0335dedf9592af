use html_treebuilding_match::html_treebuilding_match;

use crate::{
    error::ErrorCode,
    infra::is_ascii_whitespace,
    tokenization::{TagData, Token, TokenSource, TokenizerState},
    treebuilding::parser::{FramesetOkFlag, InsertionMode, Parser},
};

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead>
    pub(crate) fn process_in_head(&mut self, token: Token) -> Option<Token> {
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
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(tag))
            },
            <base> | <basefont> | <bgsound> | <command> | <link> => {
                // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);
                None
            },
            <meta> => {
                // Insert an HTML element for the token. Immediately pop the current node off the stack of open elements.
                // Acknowledge the token's self-closing flag, if it is set.
                self.insert_void_element(&tag);

                // If the active speculative HTML parser is null, then:
                // 1. If the element has a charset attribute, and getting an encoding from its value results in an encoding,
                //    and the confidence is currently tentative, then change the encoding to the resulting encoding.
                // 2. Otherwise, if the element has an http-equiv attribute whose value is an ASCII case-insensitive match
                //    for the string "Content-Type", and the element has a content attribute, and applying the algorithm
                //    for extracting a character encoding from a meta element to that attribute's value returns an encoding,
                //    and the confidence is currently tentative, then change the encoding to the extracted encoding.
                if self.source.is_encoding_tentative() {
                    if let Some(charset) = tag.lookup_attribute("charset") {
                        self.change_encoding(charset);
                    } else if tag
                        .lookup_attribute("http-equiv")
                        .is_some_and(|value| value.eq_ignore_ascii_case("content-type"))
                    {
                        let encoding = tag
                            .lookup_attribute("content")
                            .and_then(extract_character_encoding_from_meta_content);
                        if let Some(encoding) = encoding {
                            self.change_encoding(encoding);
                        }
                    }
                }
                None
            },
            <title> => {
                // Follow the generic RCDATA element parsing algorithm.
                self.parse_text_element(&tag, TokenizerState::RCDATAState);
                None
            },
            <noscript> | <noframes> | <style> => {
                // Follow the generic raw text element parsing algorithm.
                self.parse_text_element(&tag, TokenizerState::RAWTEXTState);
                None
            },
            <script> => {
                // Insert the element at the adjusted insertion location and push it onto the stack of open elements
                self.insert_html_element_for_token(&tag);

                // Switch the tokenizer to the script data state.
                self.source.set_state(TokenizerState::ScriptDataState);

                // Let the original insertion mode be the current insertion mode.
                self.original_insertion_mode = Some(self.insertion_mode);

                // Switch the insertion mode to "text".
                self.insertion_mode = InsertionMode::Text;
                None
            },
            <head> => {
                // Parse error. Ignore the token.
                self.parse_error(ErrorCode::TwoHeadsAreNotBetterThanOne);
                None
            },
            </head> => {
                self.leave_head_element();
                None
            },
            </br> | </html> | </body> => {
                // Act as described in the "anything else" entry below.
                self.leave_head_element();
                Some(Token::EndTag(tag))
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                None
            },
            other => {
                // Pop the current node (which will be the head element) off the stack of open elements.
                // Switch the insertion mode to "after head".
                // Reprocess the token.
                self.leave_head_element();
                Some(other)
            }
        )
    }

    fn leave_head_element(&mut self) {
        // Pop the current node (which will be the head element) off the stack of open elements.
        let head = self.tree.open_elements.pop();
        debug_assert!(head.is_some_and(|head| self.tree.element(head).is_html("head")));

        // Switch the insertion mode to "after head".
        self.insertion_mode = InsertionMode::AfterHead;
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode>
    pub(crate) fn process_after_head(&mut self, token: Token) -> Option<Token> {
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
                // Process the token using the rules for the "in body" insertion mode.
                self.process_using_rules_for(InsertionMode::InBody, Token::StartTag(tag))
            },
            <body> => {
                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // Set the frameset-ok flag to "not ok".
                self.frameset_ok = FramesetOkFlag::NotOk;

                // Switch the insertion mode to "in body".
                self.insertion_mode = InsertionMode::InBody;
                None
            },
            <frameset> => {
                // Insert an HTML element for the token.
                self.insert_html_element_for_token(&tag);

                // Switch the insertion mode to "in frameset".
                self.insertion_mode = InsertionMode::InFrameset;
                None
            },
            <base> | <basefont> | <bgsound> | <link> | <meta> | <noframes> | <script> | <style> | <title> => {
                // Parse error.
                self.parse_error_named(ErrorCode::UnexpectedStartTagOutOfMyHead, &tag.name);

                // Push the node pointed to by the head element pointer onto the stack of open elements.
                let head = self.tree.head.expect("head element was inserted before \"after head\"");
                self.tree.open_elements.push(head);

                // Process the token using the rules for the "in head" insertion mode.
                self.process_using_rules_for(InsertionMode::InHead, Token::StartTag(tag));

                // Remove the node pointed to by the head element pointer from the stack of open elements.
                // (It might not be the current node at this point.)
                self.tree.open_elements.remove(head);
                None
            },
            <head> => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedStartTag, &tag.name);
                None
            },
            </body> | </html> | </br> => {
                // Act as described in the "anything else" entry below.
                self.insert_implied_body_element();
                Some(Token::EndTag(tag))
            },
            Token::EndTag(tag) => {
                // Parse error. Ignore the token.
                self.parse_error_named(ErrorCode::UnexpectedEndTag, &tag.name);
                None
            },
            other => {
                // Insert an HTML element for a "body" start tag token with no attributes.
                // Switch the insertion mode to "in body".
                // Reprocess the current token.
                self.insert_implied_body_element();
                Some(other)
            }
        )
    }

    fn insert_implied_body_element(&mut self) {
        self.insert_html_element_for_token(&TagData::new("body"));
        self.insertion_mode = InsertionMode::InBody;
        self.frameset_ok = FramesetOkFlag::Ok;
    }
}

/// <https://html.spec.whatwg.org/multipage/urls-and-fetching.html#algorithm-for-extracting-a-character-encoding-from-a-meta-element>
///
/// Returns the encoding label found in the `content` attribute of a `<meta http-equiv=content-type>` element.
#[must_use]
pub fn extract_character_encoding_from_meta_content(content: &str) -> Option<&str> {
    const CHARSET: &str = "charset";

    // 1. Let position be a pointer into s, initially pointing at the start of the string.
    let mut position = 0;

    loop {
        // 2. Loop: Find the first seven characters in s after position that are an ASCII case-insensitive match
        //    for the word "charset". If no such match is found, return nothing.
        let remaining = content.get(position..)?;
        let offset = remaining
            .char_indices()
            .map(|(index, _)| index)
            .find(|&index| {
                remaining
                    .get(index..index + CHARSET.len())
                    .is_some_and(|word| word.eq_ignore_ascii_case(CHARSET))
            })?;
        position += offset + CHARSET.len();

        // 3. Skip any ASCII whitespace that immediately follow the word "charset"
        //    (there might not be any).
        let after_charset = content[position..].trim_start_matches(is_ascii_whitespace);

        // 4. If the next character is not a U+003D EQUALS SIGN (=), then move position to point
        //    just before that next character, and jump back to the step labeled loop.
        let Some(after_equals) = after_charset.strip_prefix('=') else {
            continue;
        };

        // 5. Skip any ASCII whitespace that immediately follow the equals sign (there might not be any).
        let value = after_equals.trim_start_matches(is_ascii_whitespace);

        // 6. Process the next character as follows:
        let mut chars = value.chars();
        return match chars.next() {
            // If it is a U+0022 QUOTATION MARK character (") and there is a later U+0022 QUOTATION MARK character (") in s
            // If it is a U+0027 APOSTROPHE character (') and there is a later U+0027 APOSTROPHE character (') in s
            //    Return the result of getting an encoding from the substring that is between
            //    this character and the next earliest occurrence of this character.
            // If it is an unmatched U+0022 QUOTATION MARK character (")
            // If it is an unmatched U+0027 APOSTROPHE character (')
            // If there is no next character
            //    Return nothing.
            Some(quote @ ('"' | '\'')) => {
                let quoted = chars.as_str();
                quoted.find(quote).map(|end| &quoted[..end])
            },
            None => None,

            // Otherwise
            //    Return the result of getting an encoding from the substring that consists of this character
            //    up to but not including the first ASCII whitespace or U+003B SEMICOLON character (;), or the end of s,
            //    whichever comes first.
            Some(_) => {
                let end = value
                    .find(|c| is_ascii_whitespace(c) || c == ';')
                    .unwrap_or(value.len());
                Some(&value[..end])
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::extract_character_encoding_from_meta_content as extract;

    #[test]
    fn meta_content_charset() {
        assert_eq!(extract("text/html; charset=utf-8"), Some("utf-8"));
        assert_eq!(extract("text/html; CHARSET = \"koi8-r\" "), Some("koi8-r"));
        assert_eq!(extract("text/html; charset='windows-1252'"), Some("windows-1252"));
        assert_eq!(extract("text/html; charset=iso-8859-1;foo"), Some("iso-8859-1"));
    }

    #[test]
    fn meta_content_without_charset() {
        assert_eq!(extract("text/html"), None);
        assert_eq!(extract("text/html; charset"), None);
        assert_eq!(extract("text/html; charset=\"utf-8"), None);

        // The first "charset" is not followed by an equals sign, so the search continues
        assert_eq!(extract("charsetcharset=utf-8"), Some("utf-8"));
    }
}
