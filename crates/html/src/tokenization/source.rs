use super::{Token, TokenizerState};

/// A location in the decoded input
///
/// Lines start at `1`, columns at `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// The result of asking a [TokenSource] to switch to a different character encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingChange {
    /// The encoding stays the same, parsing continues
    Unchanged,

    /// The source switched to a different encoding and restarted from the beginning.
    ///
    /// Everything parsed so far must be discarded.
    Reparse,
}

/// Everything the tree builder needs from a tokenizer
///
/// A token source produces a finite sequence of tokens that ends with [Token::EOF].
/// Once the end has been reached, every further call to [next_token](TokenSource::next_token)
/// returns [Token::EOF] again.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;

    /// Switches the lexer state, used for elements whose content is not markup
    /// (`<title>`, `<script>`, `<plaintext>` ...)
    fn set_state(&mut self, state: TokenizerState);

    fn state(&self) -> TokenizerState;

    /// The position of the most recently produced token, used for diagnostics
    fn position(&self) -> Position;

    /// <https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing>
    ///
    /// Sources that do not decode bytes never need to reparse.
    fn change_encoding(&mut self, label: &str) -> EncodingChange {
        _ = label;
        EncodingChange::Unchanged
    }

    /// Whether the encoding could still change because of a `<meta>` element
    fn is_encoding_tentative(&self) -> bool {
        false
    }

    /// Tells the source whether `<![CDATA[` starts a CDATA section (only true in foreign content)
    fn set_cdata_allowed(&mut self, allowed: bool) {
        _ = allowed;
    }
}

/// Replays a fixed list of tokens, followed by [Token::EOF]
///
/// Useful for driving the tree builder directly, without any markup.
#[derive(Clone, Debug, Default)]
pub struct TokenList {
    tokens: std::collections::VecDeque<Token>,
    state: Option<TokenizerState>,
    emitted: usize,
}

impl TokenList {
    #[must_use]
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
            state: None,
            emitted: 0,
        }
    }
}

impl TokenSource for TokenList {
    fn next_token(&mut self) -> Token {
        match self.tokens.pop_front() {
            Some(token) => {
                self.emitted += 1;
                token
            },
            None => Token::EOF,
        }
    }

    fn set_state(&mut self, state: TokenizerState) {
        self.state = Some(state);
    }

    fn state(&self) -> TokenizerState {
        self.state.unwrap_or(TokenizerState::DataState)
    }

    fn position(&self) -> Position {
        // There is no markup, so the token index serves as the column
        Position {
            line: 1,
            column: self.emitted,
        }
    }
}
