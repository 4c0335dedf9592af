//! Turns a parsed tree back into text
//!
//! [to_html] implements the [HTML fragment serialization algorithm](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments),
//! [to_test_format] produces the tree dumps used by the html5lib test suite.

use std::fmt::Write;

use crate::{
    dom::{Attribute, Document, ElementData, NodeData, NodeId},
    infra::Namespace,
};

/// Elements that can not have any children and therefore never get an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
];

/// Elements that drop a single leading newline when parsed
const NEWLINE_SENSITIVE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Serializes `node` as markup
///
/// Document and fragment nodes are serialized as the concatenation of their children.
#[must_use]
pub fn to_html(document: &Document, node: NodeId) -> String {
    let mut output = String::new();
    match document.node(node).data() {
        NodeData::Document | NodeData::DocumentFragment => {
            serialize_children(document, node, &mut output);
        },
        _ => serialize_node(document, node, &mut output),
    }
    output
}

fn serialize_children(document: &Document, node: NodeId, output: &mut String) {
    for &child in document.children(node) {
        serialize_node(document, child, output);
    }
}

fn serialize_node(document: &Document, node: NodeId, output: &mut String) {
    match document.node(node).data() {
        NodeData::Document | NodeData::DocumentFragment => {
            serialize_children(document, node, output);
        },
        NodeData::Doctype { name, .. } => {
            _ = write!(output, "<!DOCTYPE {name}>");
        },
        NodeData::Comment(data) => {
            _ = write!(output, "<!--{data}-->");
        },
        NodeData::Text(text) => {
            let parent_is_raw_text = document
                .parent(node)
                .and_then(|parent| document.element(parent))
                .is_some_and(|parent| {
                    RAW_TEXT_ELEMENTS
                        .iter()
                        .any(|&name| parent.is_html(name))
                });

            if parent_is_raw_text {
                output.push_str(text);
            } else {
                escape_into(text, false, output);
            }
        },
        NodeData::Element(element) => serialize_element(document, node, element, output),
    }
}

fn serialize_element(document: &Document, node: NodeId, element: &ElementData, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);
    for attribute in &element.attributes {
        output.push(' ');
        output.push_str(&serialized_attribute_name(attribute));
        output.push_str("=\"");
        escape_into(&attribute.value, true, output);
        output.push('"');
    }
    output.push('>');

    let is_html = element.namespace == Namespace::HTML;
    if is_html && VOID_ELEMENTS.contains(&element.name.as_str()) {
        return;
    }

    // The parser drops the first newline in these elements, so it needs to be doubled
    if is_html && NEWLINE_SENSITIVE_ELEMENTS.contains(&element.name.as_str()) {
        let starts_with_newline = document
            .children(node)
            .first()
            .is_some_and(|&child| {
                matches!(document.node(child).data(), NodeData::Text(text) if text.starts_with('\n'))
            });
        if starts_with_newline {
            output.push('\n');
        }
    }

    serialize_children(document, node, output);

    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#attribute's-serialised-name>
fn serialized_attribute_name(attribute: &Attribute) -> String {
    match attribute.namespace {
        None => attribute.name.clone(),
        Some(Namespace::XML) => format!("xml:{}", attribute.name),
        Some(Namespace::XMLNS) if attribute.name == "xmlns" => "xmlns".to_string(),
        Some(Namespace::XMLNS) => format!("xmlns:{}", attribute.name),
        Some(Namespace::XLink) => format!("xlink:{}", attribute.name),
        Some(_) => attribute.qualified_name(),
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#escapingString>
fn escape_into(text: &str, attribute_mode: bool, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{00A0}' => output.push_str("&nbsp;"),
            '"' if attribute_mode => output.push_str("&quot;"),
            '<' if !attribute_mode => output.push_str("&lt;"),
            '>' if !attribute_mode => output.push_str("&gt;"),
            other => output.push(other),
        }
    }
}

/// Dumps the tree in the format used by the html5lib tree construction tests
///
/// Every node is on its own line, prefixed with `| ` and indented by two spaces per level:
/// ```text
/// | <html>
/// |   <head>
/// |   <body>
/// |     <svg svg>
/// |       xlink href="#a"
/// |     "text"
/// ```
#[must_use]
pub fn to_test_format(document: &Document) -> String {
    let mut lines = vec![];
    for &child in document.children(document.root()) {
        dump_node(document, child, 0, &mut lines);
    }
    lines.join("\n")
}

fn dump_node(document: &Document, node: NodeId, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let line = match document.node(node).data() {
        NodeData::Document | NodeData::DocumentFragment => {
            for &child in document.children(node) {
                dump_node(document, child, depth, lines);
            }
            return;
        },
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            if public_id.is_empty() && system_id.is_empty() {
                format!("<!DOCTYPE {name}>")
            } else {
                format!("<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">")
            }
        },
        NodeData::Comment(data) => format!("<!-- {data} -->"),
        NodeData::Text(text) => format!("\"{text}\""),
        NodeData::Element(element) => {
            let line = match element.namespace {
                Namespace::HTML => format!("<{}>", element.name),
                namespace => format!("<{} {}>", namespace.prefix(), element.name),
            };
            lines.push(format!("| {indent}{line}"));

            let mut attributes: Vec<(String, &str)> = element
                .attributes
                .iter()
                .map(|attribute| {
                    let name = match attribute.namespace {
                        Some(namespace) => format!("{} {}", namespace.prefix(), attribute.name),
                        None => attribute.name.clone(),
                    };
                    (name, attribute.value.as_str())
                })
                .collect();
            attributes.sort();
            for (name, value) in attributes {
                lines.push(format!("| {indent}  {name}=\"{value}\""));
            }

            for &child in document.children(node) {
                dump_node(document, child, depth + 1, lines);
            }
            return;
        },
    };
    lines.push(format!("| {indent}{line}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_str, ParserOptions};

    fn parse(source: &str) -> Document {
        parse_str(source, ParserOptions::default()).expect("non-strict parsing never fails")
    }

    #[test]
    fn markup() {
        let document = parse("<!DOCTYPE html><p class=\"a&b\">x &lt; y<br>z</p>");
        assert_eq!(
            to_html(&document, document.root()),
            "<!DOCTYPE html><html><head></head><body><p class=\"a&amp;b\">x &lt; y<br>z</p></body></html>"
        );
    }

    #[test]
    fn raw_text_is_not_escaped() {
        let document = parse("<script>if (a < b) {}</script>");
        assert_eq!(
            to_html(&document, document.root()),
            "<html><head><script>if (a < b) {}</script></head><body></body></html>"
        );
    }

    #[test]
    fn leading_newline_survives() {
        let document = parse("<pre>\n\nfoo</pre>");
        let html = to_html(&document, document.root());
        assert!(html.contains("<pre>\n\nfoo</pre>"), "{html}");
    }

    #[test]
    fn test_format() {
        let document = parse("<!DOCTYPE html><b id=2 class=1>x<!--c--></b><svg xlink:href=y></svg>");
        assert_eq!(
            to_test_format(&document),
            [
                "| <!DOCTYPE html>",
                "| <html>",
                "|   <head>",
                "|   <body>",
                "|     <b>",
                "|       class=\"1\"",
                "|       id=\"2\"",
                "|       \"x\"",
                "|       <!-- c -->",
                "|     <svg svg>",
                "|       xlink href=\"y\"",
            ]
            .join("\n")
        );
    }
}
