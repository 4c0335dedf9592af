//! The tokenization stage and everything that feeds into it

mod character_reference;
mod input_stream;
mod named_character_references;
mod source;
mod token;
mod tokenizer;

pub use character_reference::lookup_character_reference;
pub use input_stream::{Confidence, Encoding, InputStream};
pub use source::{EncodingChange, Position, TokenList, TokenSource};
pub use token::{Doctype, TagData, Token};
pub use tokenizer::{Tokenizer, TokenizerState};
