use crate::{
    error::ErrorCode,
    tokenization::{Token, TokenSource},
    treebuilding::parser::Parser,
};

impl<S: TokenSource> Parser<S> {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata>
    pub(crate) fn process_in_text(&mut self, token: Token) -> Option<Token> {
        match token {
            Token::Characters(text) | Token::SpaceCharacters(text) => {
                // Insert the token's character.
                self.tree.insert_text(&text, None);
                None
            },
            Token::EOF => {
                // Parse error.
                let name = self.tree.current_element().name.clone();
                self.parse_error_named(ErrorCode::ExpectedNamedClosingTagButGotEof, &name);

                // Pop the current node off the stack of open elements.
                self.tree.open_elements.pop();

                // Switch the insertion mode to the original insertion mode and reprocess the token.
                self.switch_back_to_original_insertion_mode();
                Some(Token::EOF)
            },
            Token::EndTag(_) => {
                // Pop the current node off the stack of open elements.
                self.tree.open_elements.pop();

                // Switch the insertion mode to the original insertion mode.
                self.switch_back_to_original_insertion_mode();
                None
            },
            Token::Comment(data) => {
                self.tree.insert_comment(&data, None);
                None
            },
            _ => {
                // A token source in a text state only produces text and end tags
                panic!("{} token in text mode", token.kind());
            },
        }
    }
}
