use html::{
    dom::{Document, NodeData},
    serialize::{to_html, to_test_format},
    tokenization::{EncodingChange, Position, TagData, Token, TokenList, TokenSource, TokenizerState},
    treebuilding::{Handler, InsertionMode},
    ErrorCode, ParseFailure, Parser, ParserOptions, QuirksMode, Tokenizer,
};

fn parse(source: &str) -> Document {
    html::parse_str(source, ParserOptions::default()).expect("non-strict parsing never fails")
}

fn count_elements(document: &Document, name: &str) -> usize {
    document
        .descendants(document.root())
        .into_iter()
        .filter(|&node| document.element(node).is_some_and(|element| element.is_html(name)))
        .count()
}

#[test]
fn garbage_still_has_a_single_skeleton() {
    let document = parse("<html><head><head></head><body><body></html></html>text<head><frameset></body>");

    assert_eq!(count_elements(&document, "html"), 1);
    assert_eq!(count_elements(&document, "head"), 1);
    assert_eq!(count_elements(&document, "body"), 1);
    assert_eq!(count_elements(&document, "frameset"), 0);
}

#[test]
fn first_attribute_wins() {
    let document = parse("<a href=\"1\" href=\"2\">");
    let body = to_html(&document, document.root());
    assert!(body.contains("<a href=\"1\"></a>"), "{body}");
}

#[test]
fn quirks_mode_from_doctype() {
    assert_eq!(parse("<p>").quirks_mode(), QuirksMode::Quirks);
    assert_eq!(parse("<!DOCTYPE html><p>").quirks_mode(), QuirksMode::NoQuirks);
    assert_eq!(
        parse("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Frameset//EN\"><p>").quirks_mode(),
        QuirksMode::Quirks
    );
    assert_eq!(
        parse("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \"\"><p>")
            .quirks_mode(),
        QuirksMode::LimitedQuirks
    );
}

#[test]
fn misnested_formatting_elements() {
    let document = parse("<b>1<i>2<p>3</b>4</p>5");
    assert_eq!(
        to_html(&document, document.root()),
        "<html><head></head><body><b>1<i>2</i></b><i><p><b>3</b>4</p>5</i></body></html>"
    );
}

#[test]
fn text_in_table_is_foster_parented() {
    let document = parse("<table>X<tr></tr></table>");
    assert_eq!(
        to_html(&document, document.root()),
        "<html><head></head><body>X<table><tbody><tr></tr></tbody></table></body></html>"
    );
}

#[test]
fn serialized_tree_parses_to_the_same_tree() {
    let source = "<!DOCTYPE html><html><head><title>a &amp; b</title></head>\
                  <body><p class=\"x\">one<br>two</p><pre>\n\nthree</pre>\
                  <svg viewBox=\"0 0 1 1\"><path d=\"M0\"></path></svg></body></html>";

    let mut parser = Parser::new(Tokenizer::new(source), ParserOptions::default());
    parser.run().unwrap();
    assert!(parser.diagnostics().is_empty(), "{:?}", parser.diagnostics());
    let first = parser.finish();

    let second = parse(&to_html(&first, first.root()));
    assert_eq!(to_test_format(&first), to_test_format(&second));
}

#[test]
fn select_fragment_ignores_input() {
    let fragment =
        html::parse_fragment_str("<option>a<input>b", "select", ParserOptions::default())
            .unwrap();
    assert_eq!(
        to_test_format(&fragment),
        "| <option>\n|   \"ab\""
    );
}

#[test]
fn cell_fragment() {
    let fragment =
        html::parse_fragment_str("<b>x</td>y", "td", ParserOptions::default()).unwrap();
    assert_eq!(to_html(&fragment, fragment.root()), "<b>xy</b>");
}

#[test]
fn strict_mode_aborts_on_first_error() {
    let options = ParserOptions {
        strict: true,
        ..Default::default()
    };

    let Err(ParseFailure::Strict(diagnostic)) = html::parse_str("<p>", options) else {
        panic!("missing doctype did not abort");
    };
    assert_eq!(diagnostic.code, ErrorCode::ExpectedDoctypeButGotStartTag);
    assert_eq!(diagnostic.var("name"), Some("p"));

    assert!(html::parse_str("<!DOCTYPE html><p>x</p>", options).is_ok());
}

#[test]
fn unacknowledged_self_closing_flag() {
    let mut parser = Parser::new(
        Tokenizer::new("<!DOCTYPE html><br/><div/></div>"),
        ParserOptions::default(),
    );
    parser.run().unwrap();

    let codes: Vec<ErrorCode> = parser
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.code)
        .collect();
    assert_eq!(codes, [ErrorCode::NonVoidElementWithTrailingSolidus]);
    assert_eq!(parser.diagnostics()[0].var("name"), Some("div"));
}

#[test]
fn trace_records_handlers() {
    let options = ParserOptions {
        debug: true,
        ..Default::default()
    };
    let mut parser = Parser::new(Tokenizer::new("<svg><path/></svg>"), options);
    parser.run().unwrap();

    let trace = parser.trace();
    assert_eq!(trace[0].phase, InsertionMode::Initial);
    assert_eq!(trace[0].token_kind, "StartTag");
    assert_eq!(trace[0].token_name.as_deref(), Some("svg"));

    let foreign: Vec<&str> = trace
        .iter()
        .filter(|entry| entry.handler == Handler::ForeignContent)
        .filter_map(|entry| entry.token_name.as_deref())
        .collect();
    assert_eq!(foreign, ["path", "svg"]);

    // Nothing is recorded without the debug flag
    let mut parser = Parser::new(Tokenizer::new("<p>"), ParserOptions::default());
    parser.run().unwrap();
    assert!(parser.trace().is_empty());
}

#[test]
fn driven_by_tokens() {
    let tokens = TokenList::new([
        Token::StartTag(TagData::new("p")),
        Token::text("Hello"),
        Token::StartTag(TagData::new("b")),
        Token::text(" world"),
    ]);
    let document = html::parse(tokens, ParserOptions::default()).unwrap();
    assert_eq!(
        to_html(&document, document.root()),
        "<html><head></head><body><p>Hello<b> world</b></p></body></html>"
    );
}

#[test]
fn html_elements_without_namespace() {
    let options = ParserOptions {
        namespace_html_elements: false,
        ..Default::default()
    };
    let document = html::parse_str("<svg></svg>", options).unwrap();
    let html = document.document_element().unwrap();
    assert_eq!(document.namespace_uri(html), None);

    let svg = document
        .descendants(html)
        .into_iter()
        .find(|&node| document.element(node).is_some_and(|element| element.name == "svg"))
        .unwrap();
    assert_eq!(document.namespace_uri(svg), Some("http://www.w3.org/2000/svg"));
}

#[test]
fn meta_charset_restarts_the_parse() {
    // "é" in UTF-8, which is valid UTF-8 and therefore only tentatively decoded as such
    let bytes = b"<meta charset=\"windows-1252\"><p>\xC3\xA9</p>".to_vec();
    let document = html::parse_bytes(bytes, None, ParserOptions::default()).unwrap();

    let text = document.text_content(document.root());
    assert_eq!(text, "\u{00C3}\u{00A9}");

    // An explicit encoding can not be overridden by the document
    let bytes = b"<meta charset=\"windows-1252\"><p>\xC3\xA9</p>".to_vec();
    let document = html::parse_bytes(bytes, Some("utf-8"), ParserOptions::default()).unwrap();
    assert_eq!(document.text_content(document.root()), "é");
}

/// A source that asks for a reparse every time an encoding is declared
struct AlwaysReparse {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenSource for AlwaysReparse {
    fn next_token(&mut self) -> Token {
        let token = self.tokens.get(self.index).cloned().unwrap_or(Token::EOF);
        self.index += 1;
        token
    }

    fn set_state(&mut self, _: TokenizerState) {}

    fn state(&self) -> TokenizerState {
        TokenizerState::DataState
    }

    fn position(&self) -> Position {
        Position::default()
    }

    fn change_encoding(&mut self, _: &str) -> EncodingChange {
        self.index = 0;
        EncodingChange::Reparse
    }

    fn is_encoding_tentative(&self) -> bool {
        true
    }
}

#[test]
fn second_encoding_correction_fails() {
    let source = AlwaysReparse {
        tokens: vec![Token::StartTag(
            TagData::new("meta").with_attributes(&[("charset", "utf-8")]),
        )],
        index: 0,
    };

    assert!(matches!(
        html::parse(source, ParserOptions::default()),
        Err(ParseFailure::RepeatedEncodingCorrection)
    ));
}

#[test]
fn comments_and_doctype_nodes() {
    let document = parse("<!DOCTYPE html><!--a--><html><!--b--></html><!--c-->");
    let kinds: Vec<&str> = document
        .children(document.root())
        .iter()
        .map(|&child| match document.node(child).data() {
            NodeData::Doctype { .. } => "doctype",
            NodeData::Comment(_) => "comment",
            NodeData::Element(_) => "element",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["doctype", "comment", "element", "comment"]);
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let mut parser = Parser::new(Tokenizer::new(source), ParserOptions::default());
    parser.run().unwrap();
    parser
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.code)
        .collect()
}

#[test]
fn duplicate_attributes_from_any_token_source() {
    let tokens = TokenList::new([
        Token::StartTag(TagData::new("a").with_attributes(&[("href", "1"), ("href", "2")])),
        Token::text("x"),
    ]);
    let document = html::parse(tokens, ParserOptions::default()).unwrap();
    assert_eq!(
        to_html(&document, document.root()),
        "<html><head></head><body><a href=\"1\">x</a></body></html>"
    );
}

#[test]
fn formatting_end_tag_outside_of_scope() {
    // The table is a scope boundary, so the </b> is dropped instead of running the adoption agency
    assert_eq!(
        error_codes("<!DOCTYPE html><b><table></b>"),
        [
            ErrorCode::UnexpectedEndTagImpliesTableVoodoo,
            ErrorCode::UnexpectedEndTag,
            ErrorCode::EofInTable,
        ]
    );

    let document = parse("<!DOCTYPE html><b><table></b>x");
    assert_eq!(
        to_html(&document, document.root()),
        "<!DOCTYPE html><html><head></head><body><b>x<table></table></b></body></html>"
    );
}

#[test]
fn html_end_tag_without_body_in_scope() {
    assert_eq!(
        error_codes("<!DOCTYPE html><object></html>x"),
        [ErrorCode::ExpectedClosingTagButGotEof]
    );

    let document = parse("<!DOCTYPE html><object></html>x");
    assert_eq!(
        to_html(&document, document.root()),
        "<!DOCTYPE html><html><head></head><body><object>x</object></body></html>"
    );
}

#[test]
#[should_panic(expected = "StartTag token in text mode")]
fn start_tag_inside_text_element() {
    // A token list ignores the switch to RCDATA, so the start tag reaches the text insertion mode
    let tokens = TokenList::new([
        Token::StartTag(TagData::new("title")),
        Token::StartTag(TagData::new("b")),
    ]);
    _ = html::parse(tokens, ParserOptions::default());
}
