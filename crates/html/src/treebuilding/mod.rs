//! The [tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction) stage

mod active_formatting_elements;
mod adoption_agency;
pub mod foreign;
mod insertion_modes;
mod open_elements;
pub mod parser;
pub mod quirks;
mod tree_builder;

pub use active_formatting_elements::{ActiveFormattingElements, FormatEntry};
pub use insertion_modes::extract_character_encoding_from_meta_content;
pub use open_elements::StackOfOpenElements;
pub use parser::{FramesetOkFlag, Handler, InsertionMode, Parser, TraceEntry};
pub use quirks::quirks_mode_for;
pub use tree_builder::{is_special, Scope, ScopeTarget, TreeBuilder};
