//! The document tree produced by the parser
//!
//! Nodes live in an arena owned by the [Document] and are addressed by [NodeId] handles.
//! Detached nodes stay in the arena, which keeps every handle valid for the lifetime
//! of the document.

use crate::infra::Namespace;
use std::ops::Deref;

/// A handle to a node inside a [Document]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// <https://dom.spec.whatwg.org/#concept-document-quirks>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuirksMode {
    Quirks,
    LimitedQuirks,
    #[default]
    NoQuirks,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub name: String,
    pub namespace: Option<Namespace>,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    /// The attribute name including its prefix, like `xlink:href`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub namespace: Namespace,
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: Namespace, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes,
        }
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.namespace.is_none() && attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    #[inline]
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    #[inline]
    #[must_use]
    pub fn is(&self, namespace: Namespace, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    #[inline]
    #[must_use]
    pub fn is_html(&self, name: &str) -> bool {
        self.is(Namespace::HTML, name)
    }

    /// Adds every attribute that the element does not have yet
    ///
    /// Used when a second `<html>` or `<body>` start tag is seen.
    pub fn merge_missing_attributes(&mut self, attributes: &[Attribute]) {
        for attribute in attributes {
            let exists = self.attributes.iter().any(|existing| {
                existing.name == attribute.name && existing.namespace == attribute.namespace
            });
            if !exists {
                self.attributes.push(attribute.clone());
            }
        }
    }

    /// Compares names, namespaces and attribute sets, ignoring attribute order
    #[must_use]
    pub fn has_same_identity(&self, other: &Self) -> bool {
        self.name == other.name
            && self.namespace == other.namespace
            && self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .all(|attribute| other.attributes.contains(attribute))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    DocumentFragment,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    quirks_mode: QuirksMode,
    namespace_html_elements: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: vec![],
                data: NodeData::Document,
            }],
            root: NodeId(0),
            quirks_mode: QuirksMode::default(),
            namespace_html_elements: true,
        }
    }

    /// The document node, or the fragment node for parsed fragments
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    pub(crate) fn set_quirks_mode(&mut self, quirks_mode: QuirksMode) {
        self.quirks_mode = quirks_mode;
    }

    pub(crate) fn set_namespace_html_elements(&mut self, namespace_html_elements: bool) {
        self.namespace_html_elements = namespace_html_elements;
    }

    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[inline]
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes[id.0].as_element()
    }

    #[must_use]
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The namespace URI exposed for an element
    ///
    /// Elements in the HTML namespace report no namespace when the document
    /// was parsed without namespacing HTML elements.
    #[must_use]
    pub fn namespace_uri(&self, id: NodeId) -> Option<&'static str> {
        let element = self.element(id)?;
        if element.namespace == Namespace::HTML && !self.namespace_html_elements {
            return None;
        }
        Some(element.namespace.url())
    }

    /// The first element child of the root node
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&child| self.element(child).is_some())
    }

    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&child| matches!(self.node(child).data, NodeData::Doctype { .. }))
    }

    /// All nodes below `id` in tree order, not including `id` itself
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut descendants = vec![];
        let mut to_visit: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = to_visit.pop() {
            descendants.push(node);
            to_visit.extend(self.children(node).iter().rev().copied());
        }
        descendants
    }

    /// The concatenated data of all text descendants
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match &self.node(node).data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: vec![],
            data,
        });
        id
    }

    pub fn create_element(&mut self, element: ElementData) -> NodeId {
        self.create_node(NodeData::Element(element))
    }

    /// Removes a node from its parent, if it has one
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != node);
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_eq!(self.parent(child), Some(parent));
        self.detach(child);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` into `parent` right before `reference`
    ///
    /// # Panics
    /// This function panics if `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|&existing| existing == reference)
            .expect("reference node is not a child of the parent");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
    }

    /// Moves all children of `from` to the end of `to`
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(children);
    }

    /// Creates a detached shallow copy of a node
    pub fn clone_node(&mut self, node: NodeId) -> NodeId {
        let data = self.nodes[node.0].data.clone();
        self.create_node(data)
    }

    /// Inserts text into `parent`, either at the end or before `reference`
    ///
    /// If the node that would precede the new text is a text node, the data is
    /// appended to it instead of creating a new node.
    pub fn insert_text(&mut self, parent: NodeId, text: &str, reference: Option<NodeId>) {
        let siblings = &self.nodes[parent.0].children;
        let previous_sibling = match reference {
            Some(reference) => {
                let index = siblings
                    .iter()
                    .position(|&sibling| sibling == reference)
                    .expect("reference node is not a child of the parent");
                index.checked_sub(1).map(|index| siblings[index])
            },
            None => siblings.last().copied(),
        };

        if let Some(previous_sibling) = previous_sibling {
            if let NodeData::Text(existing) = &mut self.nodes[previous_sibling.0].data {
                existing.push_str(text);
                return;
            }
        }

        let text_node = self.create_node(NodeData::Text(text.to_owned()));
        match reference {
            Some(reference) => self.insert_before(parent, text_node, reference),
            None => self.append_child(parent, text_node),
        }
    }

    /// Turns the document into a fragment containing the children of `container`
    pub(crate) fn into_fragment(mut self, container: NodeId) -> Fragment {
        let fragment = self.create_node(NodeData::DocumentFragment);
        self.reparent_children(container, fragment);
        self.root = fragment;
        Fragment(self)
    }
}

/// The result of parsing a fragment
///
/// The root of the wrapped document is a `DocumentFragment` node holding the parsed nodes.
#[derive(Clone, Debug)]
pub struct Fragment(Document);

impl Fragment {
    #[must_use]
    pub fn into_document(self) -> Document {
        self.0
    }
}

impl Deref for Fragment {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(document: &mut Document, name: &str) -> NodeId {
        document.create_element(ElementData::new(name, Namespace::HTML, vec![]))
    }

    #[test]
    fn adjacent_text_is_merged() {
        let mut document = Document::new();
        let body = element(&mut document, "body");
        document.append_child(document.root(), body);

        document.insert_text(body, "foo", None);
        document.insert_text(body, "bar", None);
        assert_eq!(document.children(body).len(), 1);
        assert_eq!(document.text_content(body), "foobar");

        let span = element(&mut document, "span");
        document.append_child(body, span);
        document.insert_text(body, "baz", Some(span));
        assert_eq!(document.children(body).len(), 2);
        assert_eq!(document.text_content(body), "foobarbaz");
    }

    #[test]
    fn appending_moves_nodes() {
        let mut document = Document::new();
        let a = element(&mut document, "a");
        let b = element(&mut document, "b");
        let c = element(&mut document, "c");
        document.append_child(a, c);
        document.append_child(b, c);

        assert!(document.children(a).is_empty());
        assert_eq!(document.children(b), &[c]);
        assert_eq!(document.parent(c), Some(b));
    }

    #[test]
    fn reparenting() {
        let mut document = Document::new();
        let a = element(&mut document, "a");
        let b = element(&mut document, "b");
        let first = element(&mut document, "i");
        let second = element(&mut document, "u");
        document.append_child(a, first);
        document.append_child(a, second);

        document.reparent_children(a, b);
        assert!(document.children(a).is_empty());
        assert_eq!(document.children(b), &[first, second]);
        assert_eq!(document.parent(second), Some(b));
    }

    #[test]
    fn identity_ignores_attribute_order() {
        let first = ElementData::new(
            "a",
            Namespace::HTML,
            vec![Attribute::new("x", "1"), Attribute::new("y", "2")],
        );
        let second = ElementData::new(
            "a",
            Namespace::HTML,
            vec![Attribute::new("y", "2"), Attribute::new("x", "1")],
        );
        let third = ElementData::new("a", Namespace::HTML, vec![Attribute::new("x", "1")]);

        assert!(first.has_same_identity(&second));
        assert!(!first.has_same_identity(&third));
    }
}
