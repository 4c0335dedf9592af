//! The rules for each [insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#insertion-mode)
//!
//! Every mode is an `impl` block on the [Parser](super::Parser) that turns one token into
//! tree mutations and optionally hands the token back to be reprocessed.

mod after;
mod foreign_content;
mod in_body;
mod in_head;
mod in_select;
mod in_table;
mod initial;
mod text;

pub use in_head::extract_character_encoding_from_meta_content;
