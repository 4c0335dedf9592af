//! A browser-grade HTML parser
//!
//! Markup is turned into a [Document] the same way a web browser would do it,
//! including all the error recovery for malformed input.
//!
//! ```
//! let document = html::parse_str("<p>Hello<b>World", html::ParserOptions::default()).unwrap();
//! assert_eq!(
//!     html::serialize::to_html(&document, document.root()),
//!     "<html><head></head><body><p>Hello<b>World</b></p></body></html>"
//! );
//! ```

pub mod dom;
pub mod error;
pub mod infra;
pub mod serialize;
pub mod tokenization;
pub mod treebuilding;

pub use dom::{Document, Fragment, NodeId, QuirksMode};
pub use error::{Diagnostic, ErrorCode, ParseFailure};
pub use tokenization::{InputStream, TokenSource, Tokenizer};
pub use treebuilding::Parser;

/// Settings that apply to a single parse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Abort on the first parse error instead of recovering from it
    pub strict: bool,

    /// Place HTML elements in the XHTML namespace.
    ///
    /// When this is `false`, [Document::namespace_uri] reports no namespace for them.
    pub namespace_html_elements: bool,

    /// Record a [TraceEntry](treebuilding::TraceEntry) for every processed token
    pub debug: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict: false,
            namespace_html_elements: true,
            debug: false,
        }
    }
}

/// Builds a document from the tokens produced by `source`
pub fn parse<S: TokenSource>(source: S, options: ParserOptions) -> Result<Document, ParseFailure> {
    let mut parser = Parser::new(source, options);
    parser.run()?;
    Ok(parser.finish())
}

/// Builds a fragment as if the tokens were the contents of a `context` element
///
/// This is what setting `innerHTML` does.
pub fn parse_fragment<S: TokenSource>(
    source: S,
    context: &str,
    options: ParserOptions,
) -> Result<Fragment, ParseFailure> {
    let mut parser = Parser::new_fragment(source, context, options);
    parser.run()?;
    Ok(parser.finish_fragment())
}

pub fn parse_str(source: &str, options: ParserOptions) -> Result<Document, ParseFailure> {
    parse(Tokenizer::new(source), options)
}

/// Decodes `bytes` and parses the result
///
/// `encoding` overrides any encoding that would otherwise be detected, including
/// the one declared by a `<meta>` element.
pub fn parse_bytes(
    bytes: Vec<u8>,
    encoding: Option<&str>,
    options: ParserOptions,
) -> Result<Document, ParseFailure> {
    let input = InputStream::from_bytes(bytes, encoding);
    parse(Tokenizer::from_input_stream(input), options)
}

pub fn parse_fragment_str(
    source: &str,
    context: &str,
    options: ParserOptions,
) -> Result<Fragment, ParseFailure> {
    parse_fragment(Tokenizer::new(source), context, options)
}

pub fn parse_fragment_bytes(
    bytes: Vec<u8>,
    encoding: Option<&str>,
    context: &str,
    options: ParserOptions,
) -> Result<Fragment, ParseFailure> {
    let input = InputStream::from_bytes(bytes, encoding);
    parse_fragment(Tokenizer::from_input_stream(input), context, options)
}
