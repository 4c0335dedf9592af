//! Node creation and the bookkeeping around the stack of open elements
//!
//! The [TreeBuilder] owns the document that is being built together with every
//! structure the insertion modes manipulate: the stack of open elements, the list of
//! active formatting elements and the `<head>`/`<form>` element pointers.

use super::{
    active_formatting_elements::{ActiveFormattingElements, FormatEntry},
    open_elements::StackOfOpenElements,
};
use crate::{
    dom::{Document, ElementData, Fragment, NodeData, NodeId},
    infra::Namespace,
    tokenization::{Doctype, TagData},
};

/// Elements that cause text and elements to be foster parented when `insert_from_table` is set
const TABLE_INSERT_MODE_ELEMENTS: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

/// <https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags>
const IMPLIED_END_TAGS: &[&str] = &["dd", "dt", "li", "option", "optgroup", "p", "rp", "rt"];

/// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope>
const SCOPING_ELEMENTS: &[(Namespace, &str)] = &[
    (Namespace::HTML, "applet"),
    (Namespace::HTML, "caption"),
    (Namespace::HTML, "html"),
    (Namespace::HTML, "marquee"),
    (Namespace::HTML, "object"),
    (Namespace::HTML, "table"),
    (Namespace::HTML, "td"),
    (Namespace::HTML, "th"),
    (Namespace::MathML, "mi"),
    (Namespace::MathML, "mo"),
    (Namespace::MathML, "mn"),
    (Namespace::MathML, "ms"),
    (Namespace::MathML, "mtext"),
    (Namespace::MathML, "annotation-xml"),
    (Namespace::SVG, "foreignObject"),
    (Namespace::SVG, "desc"),
    (Namespace::SVG, "title"),
];

/// The different variants of "has an element in scope"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope>
    Default,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-button-scope>
    Button,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-list-item-scope>
    List,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-table-scope>
    Table,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-select-scope>
    Select,
}

impl Scope {
    /// Whether `element` terminates the search for a target in this scope
    #[must_use]
    fn is_boundary(&self, element: &ElementData) -> bool {
        let in_default_scope = || {
            SCOPING_ELEMENTS
                .iter()
                .any(|&(namespace, name)| element.is(namespace, name))
        };

        match self {
            Self::Default => in_default_scope(),
            Self::Button => in_default_scope() || element.is_html("button"),
            Self::List => in_default_scope() || element.is_html("ol") || element.is_html("ul"),
            Self::Table => element.is_html("html") || element.is_html("table"),
            Self::Select => !(element.is_html("optgroup") || element.is_html("option")),
        }
    }
}

/// What to look for in [TreeBuilder::element_in_scope]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeTarget<'a> {
    /// Any html element with the given name
    Name(&'a str),

    /// Exactly this node
    Node(NodeId),
}

impl<'a> From<&'a str> for ScopeTarget<'a> {
    fn from(value: &'a str) -> Self {
        Self::Name(value)
    }
}

impl From<NodeId> for ScopeTarget<'_> {
    fn from(value: NodeId) -> Self {
        Self::Node(value)
    }
}

/// <https://html.spec.whatwg.org/multipage/parsing.html#special>
#[must_use]
pub fn is_special(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::HTML => matches!(
            element.name.as_str(),
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "command"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "image"
                | "img"
                | "input"
                | "isindex"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "section"
                | "select"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "ul"
                | "wbr"
                | "xmp"
        ),
        Namespace::MathML => matches!(
            element.name.as_str(),
            "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
        ),
        Namespace::SVG => matches!(element.name.as_str(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

#[derive(Debug)]
pub struct TreeBuilder {
    document: Document,
    namespace_html_elements: bool,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#stack-of-open-elements>
    pub open_elements: StackOfOpenElements,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#list-of-active-formatting-elements>
    pub active_formatting_elements: ActiveFormattingElements,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#head-element-pointer>
    pub head: Option<NodeId>,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer>
    pub form: Option<NodeId>,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#foster-parent>
    ///
    /// Set while misplaced content inside a table is processed with the rules for "in body".
    pub insert_from_table: bool,
}

impl TreeBuilder {
    #[must_use]
    pub fn new(namespace_html_elements: bool) -> Self {
        let mut document = Document::new();
        document.set_namespace_html_elements(namespace_html_elements);

        Self {
            document,
            namespace_html_elements,
            open_elements: StackOfOpenElements::default(),
            active_formatting_elements: ActiveFormattingElements::default(),
            head: None,
            form: None,
            insert_from_table: false,
        }
    }

    /// Discards everything that was built so far
    pub fn reset(&mut self) {
        *self = Self::new(self.namespace_html_elements);
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Moves the children of the root element into a new fragment
    ///
    /// # Panics
    /// This function panics if no root element was inserted.
    #[must_use]
    pub fn into_fragment(self) -> Fragment {
        let root = self
            .open_elements
            .top_node()
            .expect("fragment parsing always inserts a root element");
        self.document.into_fragment(root)
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#current-node>
    ///
    /// # Panics
    /// This function panics if the stack of open elements is empty.
    #[must_use]
    pub fn current_node(&self) -> NodeId {
        // The current node is the bottommost node in this stack of open elements.
        self.open_elements
            .bottommost_node()
            .expect("Stack of open elements is empty")
    }

    #[must_use]
    pub fn element(&self, node: NodeId) -> &ElementData {
        self.document
            .element(node)
            .expect("Stack of open elements only contains elements")
    }

    #[must_use]
    pub fn current_element(&self) -> &ElementData {
        self.element(self.current_node())
    }

    /// Whether the current node is an html element with one of the given names
    #[must_use]
    pub fn current_node_is(&self, names: &[&str]) -> bool {
        self.open_elements.bottommost_node().is_some_and(|node| {
            let element = self.element(node);
            element.namespace == Namespace::HTML && names.contains(&element.name.as_str())
        })
    }

    #[must_use]
    pub fn create_element(&mut self, tag: &TagData, namespace: Namespace) -> NodeId {
        self.document.create_element(ElementData::new(
            tag.name.clone(),
            namespace,
            tag.attributes.clone(),
        ))
    }

    /// Creates the root element, appends it to the document and pushes it onto the stack
    pub fn insert_root(&mut self, tag: &TagData) -> NodeId {
        let element = self.create_element(tag, Namespace::HTML);
        self.open_elements.push(element);
        let root = self.document.root();
        self.document.append_child(root, element);
        element
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element>
    pub fn insert_element(&mut self, tag: &TagData, namespace: Namespace) -> NodeId {
        let element = self.create_element(tag, namespace);
        self.insert_created_element(element);
        element
    }

    /// Inserts an element at the appropriate place and pushes it onto the stack of open elements
    fn insert_created_element(&mut self, element: NodeId) {
        if self.must_foster_parent() {
            let (parent, reference) = self.table_misnested_node_position();
            match reference {
                Some(reference) => self.document.insert_before(parent, element, reference),
                None => self.document.append_child(parent, element),
            }
        } else {
            let current_node = self.current_node();
            self.document.append_child(current_node, element);
        }
        self.open_elements.push(element);
    }

    fn must_foster_parent(&self) -> bool {
        self.insert_from_table && self.current_node_is(TABLE_INSERT_MODE_ELEMENTS)
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character>
    ///
    /// Text is appended to `parent`, or to the current node if there is none.
    pub fn insert_text(&mut self, text: &str, parent: Option<NodeId>) {
        if self.must_foster_parent() {
            let (parent, reference) = self.table_misnested_node_position();
            self.document.insert_text(parent, text, reference);
        } else {
            let parent = parent.unwrap_or_else(|| self.current_node());
            self.document.insert_text(parent, text, None);
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment>
    pub fn insert_comment(&mut self, data: &str, parent: Option<NodeId>) {
        let parent = parent.unwrap_or_else(|| self.current_node());
        let comment = self.document.create_node(NodeData::Comment(data.to_owned()));
        self.document.append_child(parent, comment);
    }

    pub fn insert_doctype(&mut self, doctype: &Doctype) {
        let node = self.document.create_node(NodeData::Doctype {
            name: doctype.name.clone().unwrap_or_default(),
            public_id: doctype.public_ident.clone().unwrap_or_default(),
            system_id: doctype.system_ident.clone().unwrap_or_default(),
        });
        let root = self.document.root();
        self.document.append_child(root, node);
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope>
    ///
    /// # Panics
    /// This function panics if the stack of open elements does not contain a scope boundary,
    /// which can only happen before the root element was inserted.
    #[must_use]
    pub fn element_in_scope<'a>(&self, target: impl Into<ScopeTarget<'a>>, scope: Scope) -> bool {
        let target = target.into();

        // 1. Initialize node to be the current node (the bottommost node of the stack).
        for &node in self.open_elements.list().iter().rev() {
            let element = self.element(node);

            // 2. If node is the target node, terminate in a match state.
            let is_target = match target {
                ScopeTarget::Name(name) => element.is_html(name),
                ScopeTarget::Node(target) => node == target,
            };
            if is_target {
                return true;
            }

            // 3. Otherwise, if node is one of the element types in list, terminate in a failure state.
            if scope.is_boundary(element) {
                return false;
            }

            // 4. Otherwise, set node to the previous entry in the stack of open elements and return to step 2.
        }

        unreachable!("the root element is a boundary for every scope")
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags>
    pub fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        while let Some(node) = self.open_elements.bottommost_node() {
            let element = self.element(node);
            if element.namespace != Namespace::HTML
                || !IMPLIED_END_TAGS.contains(&element.name.as_str())
                || exclude == Some(element.name.as_str())
            {
                return;
            }
            self.open_elements.pop();
        }
    }

    /// Pops elements until an html element with the given name has been popped
    pub fn pop_until(&mut self, name: &str) {
        while let Some(node) = self.open_elements.pop() {
            if self.element(node).is_html(name) {
                return;
            }
        }
    }

    /// Pops elements until an html element with one of the given names has been popped
    pub fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(node) = self.open_elements.pop() {
            let element = self.element(node);
            if element.namespace == Namespace::HTML && names.contains(&element.name.as_str()) {
                return;
            }
        }
    }

    /// Pops elements until `target` has been popped
    pub fn pop_until_node(&mut self, target: NodeId) {
        while let Some(node) = self.open_elements.pop() {
            if node == target {
                return;
            }
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements>
    pub fn reconstruct_active_formatting_elements(&mut self) {
        let needs_no_reconstruction = |builder: &Self, entry: FormatEntry| match entry {
            FormatEntry::Marker => true,
            FormatEntry::Element(element) => builder.open_elements.contains(element),
        };

        // 1. If there are no entries in the list of active formatting elements,
        //    then there is nothing to reconstruct; stop this algorithm.
        // 2. If the last (most recently added) entry in the list of active formatting elements is a marker,
        //    or if it is an element that is in the stack of open elements, then there is nothing to reconstruct;
        //    stop this algorithm.
        match self.active_formatting_elements.last() {
            None => return,
            Some(&entry) if needs_no_reconstruction(self, entry) => return,
            Some(_) => {},
        }

        // 3. Let entry be the last (most recently added) element in the list of active formatting elements.
        let mut entry_index = self.active_formatting_elements.len() - 1;

        loop {
            // 4. Rewind: If there are no entries before entry in the list of active formatting elements,
            //    then jump to the step labeled create.
            if entry_index == 0 {
                break;
            }

            // 5. Let entry be the entry one earlier than entry in the list of active formatting elements.
            entry_index -= 1;

            // 6. If entry is neither a marker nor an element that is also in the stack of open elements,
            //    go to the step labeled rewind.
            if needs_no_reconstruction(self, self.active_formatting_elements.elements()[entry_index]) {
                // 7. Advance: Let entry be the element one later than entry in the list of active formatting elements.
                entry_index += 1;
                break;
            }
        }

        loop {
            let Some(entry) = self.active_formatting_elements.elements()[entry_index].as_element()
            else {
                panic!("cannot reconstruct a marker");
            };

            // 8. Create: Insert an HTML element for the token for which the element entry was created,
            //    to obtain new element.
            let new_element = self.document.clone_node(entry);
            self.insert_created_element(new_element);

            // 9. Replace the entry for entry in the list with an entry for new element.
            self.active_formatting_elements.set(entry_index, new_element);

            // 10. If the entry for new element in the list of active formatting elements is not the last entry in the list,
            //     return to the step labeled advance.
            entry_index += 1;
            if entry_index == self.active_formatting_elements.len() {
                break;
            }
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker>
    pub fn clear_active_formatting_elements(&mut self) {
        self.active_formatting_elements.clear_up_to_last_marker();
    }

    /// Pushes an element onto the list of active formatting elements
    pub fn push_active_formatting_element(&mut self, element: NodeId) {
        self.active_formatting_elements.push(element, &self.document);
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#foster-parent>
    ///
    /// Returns the parent that misplaced content inside a table must be inserted into
    /// and the node it must be inserted before, if any.
    #[must_use]
    pub fn table_misnested_node_position(&self) -> (NodeId, Option<NodeId>) {
        let list = self.open_elements.list();
        let last_table = list
            .iter()
            .rposition(|&node| self.element(node).is_html("table"));

        match last_table {
            Some(index) => {
                let table = list[index];
                match self.document.parent(table) {
                    Some(parent) => (parent, Some(table)),
                    None => (list[index - 1], None),
                }
            },
            None => (list[0], None),
        }
    }

    /// Whether the given node is in the list of active formatting elements
    #[must_use]
    pub fn is_active_formatting_element(&self, node: NodeId) -> bool {
        self.active_formatting_elements.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with(names: &[&str]) -> TreeBuilder {
        let mut builder = TreeBuilder::new(true);
        builder.insert_root(&TagData::new("html"));
        for name in names {
            builder.insert_element(&TagData::new(*name), Namespace::HTML);
        }
        builder
    }

    #[test]
    fn scopes() {
        let builder = builder_with(&["body", "p", "button", "span"]);
        assert!(builder.element_in_scope("p", Scope::Default));
        assert!(!builder.element_in_scope("p", Scope::Button));
        assert!(builder.element_in_scope("span", Scope::Button));

        let builder = builder_with(&["body", "table", "tr", "td", "b"]);
        assert!(builder.element_in_scope("td", Scope::Table));
        assert!(builder.element_in_scope("table", Scope::Table));
        assert!(!builder.element_in_scope("body", Scope::Default));

        let builder = builder_with(&["body", "select", "optgroup", "option"]);
        assert!(builder.element_in_scope("select", Scope::Select));

        let builder = builder_with(&["body", "select", "div"]);
        assert!(!builder.element_in_scope("select", Scope::Select));
    }

    #[test]
    fn foreign_elements_do_not_match_names() {
        let mut builder = builder_with(&["body"]);
        builder.insert_element(&TagData::new("p"), Namespace::SVG);
        assert!(!builder.element_in_scope("p", Scope::Default));
    }

    #[test]
    fn implied_end_tags() {
        let mut builder = builder_with(&["body", "ul", "li", "p"]);
        builder.generate_implied_end_tags(Some("li"));
        assert!(builder.current_node_is(&["li"]));

        builder.generate_implied_end_tags(None);
        assert!(builder.current_node_is(&["ul"]));
    }

    #[test]
    fn foster_parenting() {
        let mut builder = builder_with(&["body", "table"]);
        let table = builder.current_node();
        let body = builder.open_elements.get(1).unwrap();

        builder.insert_from_table = true;
        builder.insert_text("x", None);
        builder.insert_element(&TagData::new("div"), Namespace::HTML);

        let children = builder.document().children(body);
        assert_eq!(children.len(), 3);
        assert_eq!(children[2], table);
        assert_eq!(builder.document().text_content(body), "x");
    }

    #[test]
    fn reconstruction() {
        let mut builder = builder_with(&["body", "p"]);
        let bold = builder.insert_element(&TagData::new("b"), Namespace::HTML);
        builder.push_active_formatting_element(bold);
        let italic = builder.insert_element(&TagData::new("i"), Namespace::HTML);
        builder.push_active_formatting_element(italic);

        // Close the paragraph, which also closes both formatting elements
        builder.pop_until("p");
        builder.reconstruct_active_formatting_elements();

        assert_eq!(builder.open_elements.len(), 4);
        assert!(builder.current_node_is(&["i"]));
        assert!(!builder.is_active_formatting_element(bold));
        assert!(!builder.is_active_formatting_element(italic));
        assert_eq!(builder.active_formatting_elements.len(), 2);
    }
}
